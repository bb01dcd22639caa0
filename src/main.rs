//! `hpo-convert`: convert a search space file between optimizer formats.
//!
//! Usage:
//!   hpo-convert --from smac --to tpe -f params.pcs [-s space.py] [-v]

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use hpo_convert::{Converter, FormatKind};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hpo-convert")]
#[command(about = "Convert hyperparameter search spaces between SMAC, SPEARMINT and TPE")]
#[command(version)]
struct Cli {
    /// Format of the input file (SMAC, SPEARMINT, TPE or hyperopt)
    #[arg(long = "from")]
    from: FormatKind,

    /// Format to convert to
    #[arg(long = "to")]
    to: FormatKind,

    /// Input file
    #[arg(short = 'f', long = "file")]
    file: PathBuf,

    /// Where to write the result; stdout if omitted
    #[arg(short = 's', long = "save")]
    save: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "hpo_convert=debug"
    } else {
        "hpo_convert=error"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    if !cli.file.is_file() {
        bail!("{} is not a valid path", cli.file.display());
    }
    let text = fs::read_to_string(&cli.file)
        .with_context(|| format!("{} is not a valid path", cli.file.display()))?;

    let conversion = Converter::new()
        .convert(cli.from, cli.to, &text)
        .with_context(|| {
            format!(
                "failed to convert {} from {} to {}",
                cli.file.display(),
                cli.from,
                cli.to
            )
        })?;

    for warning in &conversion.warnings {
        eprintln!("WARNING: {warning}");
    }

    match cli.save {
        Some(path) => fs::write(&path, &conversion.text)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => print!("{}", conversion.text),
    }
    Ok(())
}
