//! `scenejson <FILE>`: import a model and print its scene graph as JSON.
//!
//! Diagnostics share stdout with the document; logging goes to stderr.

use std::ffi::OsString;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::Parser;
use scenejson_export::{write_pretty, ExportOptions};
use scenejson_io::{import_file, ImportOptions};

const USAGE_MESSAGE: &str = "Error: Just give me one model filepath";
const IMPORT_FAILED_MESSAGE: &str = "Error: Something went wrong importing scene";

#[derive(Parser, Debug)]
#[command(name = "scenejson", version, about, long_about = None)]
struct Cli {
    /// Model file to import
    file: PathBuf,
}

fn main() -> ExitCode {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("warn")).init();

    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let code = run(std::env::args_os(), &mut out).and_then(|code| {
        out.flush().context("failed to flush stdout")?;
        Ok(code)
    });

    match code {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            log::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Parse `args`, import the model and write the document (or a diagnostic)
/// to `out`. Returns the process exit code.
fn run<I, T>(args: I, out: &mut impl Write) -> Result<u8>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => {
            log::debug!("argument error: {}", e);
            writeln!(out, "{}", USAGE_MESSAGE)?;
            return Ok(1);
        }
    };

    let scene = match import_file(&cli.file, &ImportOptions::default()) {
        Ok(scene) => scene,
        Err(e) => {
            writeln!(out, "{}", IMPORT_FAILED_MESSAGE)?;
            writeln!(out, "{}", e)?;
            return Ok(1);
        }
    };

    write_pretty(&scene, &mut *out, &ExportOptions::default())
        .with_context(|| format!("failed to write the document for {}", cli.file.display()))?;
    writeln!(out)?;
    Ok(0)
}
