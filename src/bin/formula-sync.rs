//! formula-sync - keep Python formulas in step with PyPI
//!
//! Usage:
//!   formula-sync check [--formula NAME] [--output-json PATH]   Find outdated formulas
//!   formula-sync apply --updates-file PATH                     Rewrite them
//!
//! Progress goes to stderr; `check` prints the pending-update JSON to stdout.

use anyhow::Result;
use clap::{Parser, Subcommand};
use formula_sync::{output, updates, ApplyOptions, FormulaSync, SyncConfig};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "formula-sync")]
#[command(about = "Check Python formulas for new PyPI releases and apply them")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Package index base URL
    #[arg(long, global = true, env = "FORMULA_SYNC_INDEX_URL")]
    index_url: Option<String>,

    /// Python interpreter used to build throwaway venvs
    #[arg(long, global = true, env = "FORMULA_SYNC_PYTHON")]
    python: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Check formulas for newer releases
    Check {
        /// Specific formula to check (all if not specified)
        #[arg(long)]
        formula: Option<String>,

        /// Write pending updates to this JSON file
        #[arg(long)]
        output_json: Option<PathBuf>,

        /// Directory containing formula files
        #[arg(long, default_value = "Formula")]
        formula_dir: PathBuf,
    },

    /// Apply pending updates to formula files
    Apply {
        /// JSON file produced by `check`
        #[arg(long)]
        updates_file: PathBuf,

        /// Don't regenerate resource blocks
        #[arg(long)]
        no_resources: bool,

        /// Download each tarball and check its sha256 first
        #[arg(long)]
        verify: bool,

        /// Show what would change without writing
        #[arg(short = 'n', long)]
        dry_run: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = SyncConfig::from_env();
    if let Some(url) = cli.index_url {
        config = config.with_index_url(url);
    }
    if let Some(python) = cli.python {
        config = config.with_python(python);
    }

    let sync = FormulaSync::new(config);

    match cli.command {
        Commands::Check {
            formula,
            output_json,
            formula_dir,
        } => {
            let report = sync.check_dir(&formula_dir, formula.as_deref())?;

            output::info(&format!(
                "{} update(s), {} up to date, {} failed",
                report.updates.len(),
                report.up_to_date,
                report.failures.len()
            ));

            if let Some(path) = output_json {
                updates::write_updates(&path, &report.updates)?;
                output::info(&format!(
                    "Wrote {} update(s) to {}",
                    report.updates.len(),
                    path.display()
                ));
            }

            if !report.updates.is_empty() {
                println!("{}", updates::to_json(&report.updates)?);
            }
        }

        Commands::Apply {
            updates_file,
            no_resources,
            verify,
            dry_run,
        } => {
            let pending = updates::read_updates(&updates_file)?;

            if pending.is_empty() {
                output::info("No updates to process");
                return Ok(());
            }

            let options = ApplyOptions {
                resources: !no_resources,
                verify,
                dry_run,
            };
            let report = sync.apply_updates(&pending, options);

            output::info(&format!(
                "{} updated, {} unchanged, {} failed",
                report.applied.len(),
                report.unchanged.len(),
                report.failures.len()
            ));
        }
    }

    Ok(())
}
