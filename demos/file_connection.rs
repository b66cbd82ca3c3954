//! Example: implement the data-connection contract over local files.
//!
//! Reads a line-oriented input file, deduplicates and sorts the lines,
//! and writes the result next to the input. Run with
//! `cargo run --example file_connection`.

use std::fs;
use std::path::PathBuf;

use hekit::{ConnectionOp, DataConnection, DataConnectionHandle, KitError, Result};

/// File-backed data connection: `read` pulls lines in, `process` sorts and
/// deduplicates them, `write` flushes them out.
struct FileConnection {
    input: PathBuf,
    output: PathBuf,
    lines: Vec<String>,
    open: bool,
}

impl FileConnection {
    fn new(input: PathBuf, output: PathBuf) -> Self {
        Self {
            input,
            output,
            lines: Vec::new(),
            open: false,
        }
    }
}

impl DataConnection for FileConnection {
    fn connect(&mut self) -> Result<()> {
        if !self.input.exists() {
            return Err(KitError::connection(
                ConnectionOp::Connect,
                format!("input file {} does not exist", self.input.display()),
            ));
        }
        self.open = true;
        Ok(())
    }

    fn disconnect(&mut self) -> Result<()> {
        self.lines.clear();
        self.open = false;
        Ok(())
    }

    fn read(&mut self) -> Result<()> {
        let text = fs::read_to_string(&self.input)
            .map_err(|e| KitError::connection(ConnectionOp::Read, e))?;
        self.lines = text.lines().map(String::from).collect();
        Ok(())
    }

    fn write(&mut self) -> Result<()> {
        fs::write(&self.output, self.lines.join("\n") + "\n")
            .map_err(|e| KitError::connection(ConnectionOp::Write, e))?;
        Ok(())
    }

    fn process(&mut self) -> Result<()> {
        self.lines.sort();
        self.lines.dedup();
        Ok(())
    }
}

impl Drop for FileConnection {
    fn drop(&mut self) {
        if self.open {
            eprintln!("FileConnection dropped while still open");
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let dir = std::env::temp_dir();
    let input = dir.join("hekit_demo_input.txt");
    let output = dir.join("hekit_demo_output.txt");
    fs::write(&input, "gamma\nalpha\nbeta\nalpha\n")?;

    let mut conn: DataConnectionHandle = Box::new(FileConnection::new(input, output.clone()));
    conn.connect()?;
    conn.read()?;
    conn.process()?;
    conn.write()?;
    conn.disconnect()?;

    println!("Wrote {}:", output.display());
    print!("{}", fs::read_to_string(&output)?);
    Ok(())
}
