// MIT License - Copyright (c) 2026 hekit authors
// hekit command-line tool

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;

use hekit::install::{components_from_recipe, install_components, Component, Stage};
use hekit::{
    find_algebras, gen_primes, load_config, parse_range, parse_range_filtered,
    parse_recipe_args, prime_factors, prime_factors_with_table, Algebra, PrimeTable,
};

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

#[derive(Parser)]
#[command(name = "hekit")]
#[command(about = "Deployment kit for homomorphic-encryption workloads")]
struct Cli {
    /// Path to the TOML configuration file (default: ~/.hekit/default.config)
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate primes in range [start, stop] inclusive
    GenPrimes {
        /// Start number
        start: u64,
        /// Stop number
        stop: u64,
    },
    /// Generate ZZ_p[x]/phi(X) algebras
    Algebras {
        /// Plaintext prime(s), e.g. "2" or "2, 5-13"
        #[arg(short = 'p', default_value = "2")]
        p: String,
        /// Number of coefficients in a slot, e.g. "1" or "1-8"
        #[arg(short = 'd', default_value = "1")]
        d: String,
        /// Max m
        #[arg(long)]
        m_max: Option<u64>,
        /// When factoring, divide out table primes before trial division
        #[arg(long)]
        part_lookup: bool,
        /// Exclude algebras whose slot degree was corrected downward
        #[arg(long)]
        no_corrected: bool,
        /// Do not print headers
        #[arg(long)]
        no_header: bool,
    },
    /// Install components listed in a recipe file
    Install {
        /// Path to the TOML recipe file
        recipe_file: PathBuf,
        /// Run stages only up to this one
        #[arg(long, default_value = "install", value_parser = parse_stage)]
        upto_stage: Stage,
        /// Recipe arguments, e.g. "version=1.2.3, toolchain=clang"
        #[arg(long)]
        recipe_arg: Option<String>,
        /// Continue with the next component when a stage fails
        #[arg(long)]
        force: bool,
    },
}

fn parse_stage(s: &str) -> Result<Stage, String> {
    s.parse().map_err(|e: hekit::KitError| e.to_string())
}

fn main() -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .without_time()
        .with_env_filter(env_filter)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::GenPrimes { start, stop } => cmd_gen_primes(start, stop),
        Command::Algebras {
            p,
            d,
            m_max,
            part_lookup,
            no_corrected,
            no_header,
        } => cmd_algebras(&p, &d, m_max, part_lookup, no_corrected, no_header),
        Command::Install {
            recipe_file,
            upto_stage,
            recipe_arg,
            force,
        } => cmd_install(cli.config, &recipe_file, upto_stage, recipe_arg, force),
    }
}

// ---------------------------------------------------------------------------
// Subcommands
// ---------------------------------------------------------------------------

fn cmd_gen_primes(start: u64, stop: u64) -> Result<()> {
    for p in gen_primes(start, stop) {
        println!("{p}");
    }
    Ok(())
}

fn cmd_algebras(
    p: &str,
    d: &str,
    m_max: Option<u64>,
    part_lookup: bool,
    no_corrected: bool,
    no_header: bool,
) -> Result<()> {
    let table = PrimeTable::ensure_default(&PrimeTable::default_path()?)
        .context("Failed to load the prime table")?;

    let ps = parse_range_filtered(p, |n| table.is_prime(n))
        .context("Invalid value for -p")?;
    if ps.is_empty() {
        bail!("prime p not found in numbers provided");
    }
    let ds = parse_range(d).context("Invalid value for -d")?;
    debug!("Searching algebras for {} primes, {} degrees", ps.len(), ds.len());

    let algebras = if part_lookup {
        find_algebras(&ps, &ds, m_max, |n| {
            prime_factors_with_table(n, &table, m_max)
        })?
    } else {
        find_algebras(&ps, &ds, m_max, prime_factors)?
    };

    if !no_header {
        print_header();
    }
    for algebra in &algebras {
        if no_corrected && algebra.corrected {
            continue;
        }
        print_row(algebra);
    }
    if !no_header {
        print_header();
    }

    Ok(())
}

const COLUMN_WIDTH: usize = 20;

fn print_header() {
    println!(
        "{:^w$} {:^w$} {:^w$} {:^w$} {:^w$}",
        "p",
        "d",
        "m",
        "phim",
        "nslots",
        w = COLUMN_WIDTH
    );
}

fn print_row(a: &Algebra) {
    println!(
        "{:^w$} {:^w$} {:^w$} {:^w$} {:^w$}",
        a.p,
        a.d,
        a.m,
        a.phi_m,
        a.nslots,
        w = COLUMN_WIDTH
    );
}

fn cmd_install(
    config_path: Option<PathBuf>,
    recipe_file: &PathBuf,
    upto_stage: Stage,
    recipe_arg: Option<String>,
    force: bool,
) -> Result<()> {
    let config_path = match config_path {
        Some(path) => path,
        None => hekit::default_config_path()?,
    };
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config {}", config_path.display()))?;

    let recipe_args = match recipe_arg {
        Some(arg) => parse_recipe_args(&arg).context("Invalid --recipe-arg")?,
        None => Default::default(),
    };

    let components = components_from_recipe(recipe_file, &config.repo_location, &recipe_args)
        .with_context(|| format!("Failed to load recipe {}", recipe_file.display()))?;
    let mut components: Vec<Box<dyn Component>> = components
        .into_iter()
        .map(|c| Box::new(c) as Box<dyn Component>)
        .collect();

    install_components(&mut components, upto_stage, force)?;
    Ok(())
}
