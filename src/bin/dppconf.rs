//! Interactive configuration session for a DPP-PSD digitizer config file.
//!
//! Usage:
//!   dppconf [FILE]            edit FILE (default: tdcr.ini), creating it
//!                             from the built-in defaults when absent
//!   dppconf --summary [FILE]  print the comma-separated parameter summary
//!   dppconf --write-default [FILE]
//!                             write the default file and exit (refuses to
//!                             overwrite an existing one)

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use dppconf::{defaults, load, report, Editor, Outcome};

fn main() -> Result<()> {
    let mut summary = false;
    let mut write_default = false;
    let mut file: Option<PathBuf> = None;

    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--summary" => summary = true,
            "--write-default" => write_default = true,
            "-h" | "--help" => {
                print!("{}", USAGE);
                return Ok(());
            }
            other if other.starts_with('-') => bail!("unknown option `{other}`\n{USAGE}"),
            other => {
                if file.is_some() {
                    bail!("more than one FILE argument\n{USAGE}");
                }
                file = Some(PathBuf::from(other));
            }
        }
    }

    let path = file.unwrap_or_else(|| PathBuf::from("tdcr.ini"));

    if write_default {
        defaults::write_default_file(&path, false)
            .with_context(|| format!("writing default file {}", path.display()))?;
        println!("Default configuration written to {}.", path.display());
        return Ok(());
    }

    let (mut model, mut tracker) =
        load::load_or_create(&path).with_context(|| format!("loading {}", path.display()))?;

    if summary {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        report::write_summary(&model, &mut out)?;
        out.flush()?;
        return Ok(());
    }

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut editor = Editor::new(stdin.lock(), stdout.lock());
    match editor.run(&mut model, &mut tracker, &path)? {
        Outcome::Quit => println!("Session closed."),
        Outcome::Proceed => {
            // acquisition control takes over from here with `model`
            println!("Configuration confirmed, starting the acquisition phase.");
        }
    }
    Ok(())
}

const USAGE: &str = "\
Usage:
  dppconf [FILE]                 interactive edit (default FILE: tdcr.ini)
  dppconf --summary [FILE]       print the parameter summary
  dppconf --write-default [FILE] write the default config file and exit
";
