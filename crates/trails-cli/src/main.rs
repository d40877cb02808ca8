//! trails CLI - corridor cross-section sheets from JSON jobs.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;

mod job;

use job::{Job, Report};

#[derive(Parser)]
#[command(name = "trails")]
#[command(about = "Corridor guidelines and terrain cross-section sheets", long_about = None)]
struct Cli {
    /// Log more (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Cut sections along the alignment and lay them out on a sheet
    Sections {
        /// Job file (.json)
        job: PathBuf,
        /// Output file; prints to stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List the stations a job would place guidelines at
    Stations {
        /// Job file (.json)
        job: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Sections { job, output } => sections(&job, output.as_deref())?,
        Commands::Stations { job } => stations(&job)?,
    }

    Ok(())
}

/// Log to stderr so stdout stays clean for JSON. `RUST_LOG` adds directives.
fn init_logging(verbose: u8) {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        _ => tracing::Level::DEBUG,
    };
    let env_filter = EnvFilter::from_default_env().add_directive(level.into());

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

fn sections(path: &Path, output: Option<&Path>) -> Result<()> {
    let (terrain, alignment, settings) = Job::load(path)?.build()?;
    let result = trails::run(alignment.model(), &terrain, &settings)?;
    let report = Report::new(&result);

    for failure in &report.failures {
        eprintln!("station {:.3}: {}", failure.station, failure.reason);
    }
    if let Some((lo, hi)) = report.extent() {
        info!(
            "sheet spans ({:.1}, {:.1}) to ({:.1}, {:.1})",
            lo.x, lo.y, hi.x, hi.y
        );
    }

    let json = serde_json::to_string_pretty(&report)?;
    match output {
        Some(out) => {
            std::fs::write(out, json)?;
            println!(
                "Wrote {} profiles to {}",
                report.profiles.len(),
                out.display()
            );
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn stations(path: &Path) -> Result<()> {
    let (terrain, alignment, settings) = Job::load(path)?.build()?;
    let corridor = trails::Corridor::new(alignment.model(), &terrain);
    for station in corridor.stations(&settings.guidelines)? {
        println!("{station:.3}");
    }
    Ok(())
}
