// MIT License - Copyright (c) 2026 hekit authors

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command as ShellCommand;
use std::str::FromStr;

use bitflags::bitflags;
use serde::Deserialize;
use tracing::{debug, error, info};

use crate::error::{KitError, Result};

/// The build stages of a component, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    Setup,
    Fetch,
    Build,
    Install,
}

impl Stage {
    pub const ALL: [Stage; 4] = [Stage::Setup, Stage::Fetch, Stage::Build, Stage::Install];

    /// The ordered stage chain up to and including `upto`.
    pub fn sequence_upto(upto: Stage) -> &'static [Stage] {
        let idx = Self::ALL.iter().position(|&s| s == upto).unwrap_or(3);
        &Self::ALL[..=idx]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Setup => "setup",
            Self::Fetch => "fetch",
            Self::Build => "build",
            Self::Install => "install",
        }
    }

    fn flag(self) -> StageFlags {
        match self {
            Self::Setup => StageFlags::SETUP,
            Self::Fetch => StageFlags::FETCH,
            Self::Build => StageFlags::BUILD,
            Self::Install => StageFlags::INSTALL,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = KitError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "setup" => Ok(Self::Setup),
            "fetch" => Ok(Self::Fetch),
            "build" => Ok(Self::Build),
            "install" => Ok(Self::Install),
            other => Err(KitError::UnknownStage {
                name: other.to_string(),
            }),
        }
    }
}

bitflags! {
    /// Completed stages of a component instance, persisted in its
    /// stage-info file so re-runs can pick up where they left off.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct StageFlags: u8 {
        const SETUP   = 0b0001;
        const FETCH   = 0b0010;
        const BUILD   = 0b0100;
        const INSTALL = 0b1000;
    }
}

/// Capability contract a buildable component must satisfy.
///
/// Same shape as the data-connection contract: a fixed operation set
/// dispatched through an abstract handle, with the concrete type owning
/// all state.
pub trait Component: Send {
    fn component_name(&self) -> &str;
    fn instance_name(&self) -> &str;

    /// Whether this component should be left out of the run entirely.
    fn skip(&self) -> bool;

    fn setup(&mut self) -> Result<()>;
    fn fetch(&mut self) -> Result<()>;
    fn build(&mut self) -> Result<()>;
    fn install(&mut self) -> Result<()>;

    fn run_stage(&mut self, stage: Stage) -> Result<()> {
        match stage {
            Stage::Setup => self.setup(),
            Stage::Fetch => self.fetch(),
            Stage::Build => self.build(),
            Stage::Install => self.install(),
        }
    }
}

/// Run the stage chain up to `upto` for every non-skipped component.
///
/// A stage failure aborts the run unless `force` is set, in which case the
/// failing component is abandoned and the run moves on to the next one.
pub fn install_components(
    components: &mut [Box<dyn Component>],
    upto: Stage,
    force: bool,
) -> Result<()> {
    for component in components.iter_mut() {
        let name = component.component_name().to_string();
        let instance = component.instance_name().to_string();

        if component.skip() {
            info!("Skipping {name}/{instance}");
            continue;
        }

        for &stage in Stage::sequence_upto(upto) {
            info!("{stage} {name}/{instance}");
            if let Err(e) = component.run_stage(stage) {
                if force {
                    error!("{stage} failed for {name}/{instance}: {e}, continuing");
                    break;
                }
                return Err(e);
            }
        }
    }
    Ok(())
}

/// Parse a `"key1=value1, key2=value2"` argument list. Later duplicates
/// overwrite earlier ones.
pub fn parse_recipe_args(s: &str) -> Result<HashMap<String, String>> {
    let mut args = HashMap::new();
    for chunk in s.split(',') {
        let cleaned: String = chunk.chars().filter(|c| !c.is_whitespace()).collect();
        let parts: Vec<&str> = cleaned.split('=').collect();
        if parts.len() != 2 {
            return Err(KitError::RecipeArgFormat {
                parts: parts.into_iter().map(String::from).collect(),
            });
        }
        args.insert(parts[0].to_string(), parts[1].to_string());
    }
    Ok(args)
}

/// Substitute `%key%` placeholders from `vars`.
fn substitute(template: &str, vars: &HashMap<String, String>) -> Result<String> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('%') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let end = after
            .find('%')
            .ok_or_else(|| KitError::RecipeSymbolUnterminated {
                command: template.to_string(),
            })?;
        let symbol = &after[..end];
        let value = vars.get(symbol).ok_or_else(|| KitError::RecipeSymbol {
            symbol: symbol.to_string(),
        })?;
        out.push_str(value);
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

// ---------------------------------------------------------------------------
// Recipe-driven components
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RecipeFile {
    #[serde(default)]
    components: Vec<RecipeComponentSpec>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RecipeComponentSpec {
    name: String,
    #[serde(default)]
    instances: Vec<RecipeInstanceSpec>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RecipeInstanceSpec {
    instance: String,
    #[serde(default)]
    skip: bool,
    setup: Option<String>,
    fetch: Option<String>,
    build: Option<String>,
    install: Option<String>,
}

/// A component whose stages are shell commands from a TOML recipe.
///
/// Each instance works in `repo_location/<component>/<instance>/` and
/// records completed stages there, so a re-run only executes what is
/// missing.
pub struct RecipeComponent {
    name: String,
    instance: String,
    skip: bool,
    commands: HashMap<Stage, String>,
    root: PathBuf,
    completed: StageFlags,
}

const STAGE_INFO_FILE: &str = "hekit.info";

impl RecipeComponent {
    fn new(
        name: String,
        instance: String,
        skip: bool,
        commands: HashMap<Stage, String>,
        repo_location: &Path,
    ) -> Self {
        let root = repo_location.join(&name).join(&instance);
        let completed = Self::load_stage_info(&root);
        Self {
            name,
            instance,
            skip,
            commands,
            root,
            completed,
        }
    }

    /// Working directory of this instance.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Stages already completed according to the stage-info file.
    pub fn completed(&self) -> StageFlags {
        self.completed
    }

    fn load_stage_info(root: &Path) -> StageFlags {
        match fs::read_to_string(root.join(STAGE_INFO_FILE)) {
            Ok(text) => text
                .trim()
                .parse::<u8>()
                .map(StageFlags::from_bits_truncate)
                .unwrap_or(StageFlags::empty()),
            Err(_) => StageFlags::empty(),
        }
    }

    fn save_stage_info(&self) -> Result<()> {
        fs::create_dir_all(&self.root)?;
        fs::write(
            self.root.join(STAGE_INFO_FILE),
            format!("{}\n", self.completed.bits()),
        )?;
        Ok(())
    }

    /// Forget completion of `stage` and every stage after it.
    pub fn reset_stage_info(&mut self, stage: Stage) -> Result<()> {
        for &s in Stage::ALL.iter() {
            if s >= stage {
                self.completed.remove(s.flag());
            }
        }
        self.save_stage_info()
    }

    fn execute(&mut self, stage: Stage) -> Result<()> {
        if self.completed.contains(stage.flag()) {
            debug!(
                "{stage} already done for {}/{}, skipping",
                self.name, self.instance
            );
            return Ok(());
        }

        if let Some(command) = self.commands.get(&stage) {
            fs::create_dir_all(&self.root)?;
            debug!("Running {stage} command: {command}");
            let status = ShellCommand::new("sh")
                .arg("-c")
                .arg(command)
                .current_dir(&self.root)
                .status()?;
            if !status.success() {
                return Err(KitError::StageFailed {
                    stage,
                    component: self.name.clone(),
                    instance: self.instance.clone(),
                    reason: match status.code() {
                        Some(code) => format!("exit code {code}"),
                        None => "terminated by signal".to_string(),
                    },
                });
            }
        }

        self.completed.insert(stage.flag());
        self.save_stage_info()
    }
}

impl Component for RecipeComponent {
    fn component_name(&self) -> &str {
        &self.name
    }

    fn instance_name(&self) -> &str {
        &self.instance
    }

    fn skip(&self) -> bool {
        self.skip
    }

    fn setup(&mut self) -> Result<()> {
        self.execute(Stage::Setup)
    }

    fn fetch(&mut self) -> Result<()> {
        self.execute(Stage::Fetch)
    }

    fn build(&mut self) -> Result<()> {
        self.execute(Stage::Build)
    }

    fn install(&mut self) -> Result<()> {
        self.execute(Stage::Install)
    }
}

/// Build the components of a TOML recipe file.
///
/// `recipe_args` feed `%key%` substitution in stage commands, with
/// `name`, `instance` and `repo_location` pre-seeded per instance.
pub fn components_from_recipe(
    recipe_path: &Path,
    repo_location: &Path,
    recipe_args: &HashMap<String, String>,
) -> Result<Vec<RecipeComponent>> {
    let text = fs::read_to_string(recipe_path).map_err(|e| KitError::RecipeFile {
        path: recipe_path.display().to_string(),
        reason: e.to_string(),
    })?;
    let recipe: RecipeFile = toml::from_str(&text).map_err(|e| KitError::RecipeFile {
        path: recipe_path.display().to_string(),
        reason: e.to_string(),
    })?;

    let mut components = Vec::new();
    for spec in recipe.components {
        for inst in spec.instances {
            let mut vars = recipe_args.clone();
            vars.insert("name".to_string(), spec.name.clone());
            vars.insert("instance".to_string(), inst.instance.clone());
            vars.insert(
                "repo_location".to_string(),
                repo_location.display().to_string(),
            );

            let mut commands = HashMap::new();
            let specs = [
                (Stage::Setup, inst.setup),
                (Stage::Fetch, inst.fetch),
                (Stage::Build, inst.build),
                (Stage::Install, inst.install),
            ];
            for (stage, command) in specs {
                if let Some(command) = command {
                    commands.insert(stage, substitute(&command, &vars)?);
                }
            }

            components.push(RecipeComponent::new(
                spec.name.clone(),
                inst.instance,
                inst.skip,
                commands,
                repo_location,
            ));
        }
    }

    Ok(components)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_stage_sequence_upto_fetch() {
        assert_eq!(
            Stage::sequence_upto(Stage::Fetch),
            &[Stage::Setup, Stage::Fetch]
        );
    }

    #[test]
    fn test_stage_sequence_upto_build() {
        assert_eq!(
            Stage::sequence_upto(Stage::Build),
            &[Stage::Setup, Stage::Fetch, Stage::Build]
        );
    }

    #[test]
    fn test_stage_sequence_upto_install() {
        assert_eq!(
            Stage::sequence_upto(Stage::Install),
            &[Stage::Setup, Stage::Fetch, Stage::Build, Stage::Install]
        );
    }

    #[test]
    fn test_stage_from_str() {
        assert_eq!("fetch".parse::<Stage>().unwrap(), Stage::Fetch);
        assert!(matches!(
            "deploy".parse::<Stage>(),
            Err(KitError::UnknownStage { .. })
        ));
    }

    /// Counts stage executions; optionally fails every stage.
    struct MockComponent {
        skip: bool,
        fail: bool,
        runs: Arc<Mutex<Vec<(String, Stage)>>>,
        name: String,
    }

    impl MockComponent {
        fn run(&mut self, stage: Stage) -> Result<()> {
            self.runs.lock().unwrap().push((self.name.clone(), stage));
            if self.fail {
                return Err(KitError::StageFailed {
                    stage,
                    component: self.name.clone(),
                    instance: "instance_test".to_string(),
                    reason: "mock failure".to_string(),
                });
            }
            Ok(())
        }
    }

    impl Component for MockComponent {
        fn component_name(&self) -> &str {
            &self.name
        }
        fn instance_name(&self) -> &str {
            "instance_test"
        }
        fn skip(&self) -> bool {
            self.skip
        }
        fn setup(&mut self) -> Result<()> {
            self.run(Stage::Setup)
        }
        fn fetch(&mut self) -> Result<()> {
            self.run(Stage::Fetch)
        }
        fn build(&mut self) -> Result<()> {
            self.run(Stage::Build)
        }
        fn install(&mut self) -> Result<()> {
            self.run(Stage::Install)
        }
    }

    fn mocks(skips: &[bool], runs: &Arc<Mutex<Vec<(String, Stage)>>>) -> Vec<Box<dyn Component>> {
        skips
            .iter()
            .enumerate()
            .map(|(i, &skip)| {
                Box::new(MockComponent {
                    skip,
                    fail: false,
                    runs: runs.clone(),
                    name: format!("component_{i}"),
                }) as Box<dyn Component>
            })
            .collect()
    }

    #[test]
    fn test_install_components_all_unskipped() {
        let runs = Arc::new(Mutex::new(Vec::new()));
        let mut components = mocks(&[false, false, false], &runs);
        install_components(&mut components, Stage::Install, false).unwrap();
        // 3 components x 4 stages
        assert_eq!(runs.lock().unwrap().len(), 12);
    }

    #[test]
    fn test_install_components_all_skipped() {
        let runs = Arc::new(Mutex::new(Vec::new()));
        let mut components = mocks(&[true, true, true], &runs);
        install_components(&mut components, Stage::Install, false).unwrap();
        assert!(runs.lock().unwrap().is_empty());
    }

    #[test]
    fn test_install_components_one_unskipped() {
        let runs = Arc::new(Mutex::new(Vec::new()));
        let mut components = mocks(&[true, false, true], &runs);
        install_components(&mut components, Stage::Fetch, false).unwrap();
        let runs = runs.lock().unwrap();
        assert_eq!(
            *runs,
            vec![
                ("component_1".to_string(), Stage::Setup),
                ("component_1".to_string(), Stage::Fetch),
            ]
        );
    }

    #[test]
    fn test_install_components_failure_aborts() {
        let runs = Arc::new(Mutex::new(Vec::new()));
        let mut components: Vec<Box<dyn Component>> = vec![
            Box::new(MockComponent {
                skip: false,
                fail: true,
                runs: runs.clone(),
                name: "failing".to_string(),
            }),
            Box::new(MockComponent {
                skip: false,
                fail: false,
                runs: runs.clone(),
                name: "never_reached".to_string(),
            }),
        ];
        let err = install_components(&mut components, Stage::Install, false).unwrap_err();
        assert!(matches!(err, KitError::StageFailed { .. }));
        assert_eq!(runs.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_install_components_force_continues() {
        let runs = Arc::new(Mutex::new(Vec::new()));
        let mut components: Vec<Box<dyn Component>> = vec![
            Box::new(MockComponent {
                skip: false,
                fail: true,
                runs: runs.clone(),
                name: "failing".to_string(),
            }),
            Box::new(MockComponent {
                skip: false,
                fail: false,
                runs: runs.clone(),
                name: "survivor".to_string(),
            }),
        ];
        install_components(&mut components, Stage::Fetch, true).unwrap();
        let runs = runs.lock().unwrap();
        assert_eq!(runs.len(), 3); // failing setup + survivor setup/fetch
        assert_eq!(runs[1].0, "survivor");
    }

    #[test]
    fn test_parse_recipe_args_correct_format() {
        let args = parse_recipe_args("key1=value1, key2=value2, key3=value3").unwrap();
        assert_eq!(args.len(), 3);
        assert_eq!(args["key1"], "value1");
        assert_eq!(args["key3"], "value3");
    }

    #[test]
    fn test_parse_recipe_args_duplicated_key() {
        let args = parse_recipe_args("key1=value1, key1=value2, key3=value3").unwrap();
        assert_eq!(args.len(), 2);
        assert_eq!(args["key1"], "value2");
    }

    #[test]
    fn test_parse_recipe_args_wrong_format() {
        let err = parse_recipe_args("key1=value1, key1=value2, key3").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Wrong format for [\"key3\"]. Expected key=value"
        );
    }

    #[test]
    fn test_parse_recipe_args_missing_comma() {
        let err = parse_recipe_args("key1=value1 key2=value2, key3=value3").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Wrong format for [\"key1\", \"value1key2\", \"value2\"]. Expected key=value"
        );
    }

    #[test]
    fn test_substitute() {
        let mut vars = HashMap::new();
        vars.insert("version".to_string(), "1.2.3".to_string());
        vars.insert("name".to_string(), "hexl".to_string());
        assert_eq!(
            substitute("git clone -b v%version% %name%", &vars).unwrap(),
            "git clone -b v1.2.3 hexl"
        );
        assert_eq!(substitute("no placeholders", &vars).unwrap(), "no placeholders");
    }

    #[test]
    fn test_substitute_unknown_symbol() {
        let vars = HashMap::new();
        assert!(matches!(
            substitute("echo %missing%", &vars),
            Err(KitError::RecipeSymbol { .. })
        ));
    }

    #[test]
    fn test_substitute_unterminated_symbol() {
        let vars = HashMap::new();
        assert!(matches!(
            substitute("echo 50%", &vars),
            Err(KitError::RecipeSymbolUnterminated { .. })
        ));
    }

    #[test]
    fn test_stage_flags_roundtrip() {
        let flags = StageFlags::SETUP | StageFlags::FETCH;
        assert_eq!(StageFlags::from_bits_truncate(flags.bits()), flags);
    }
}
