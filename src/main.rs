//! prodmap - Well Production Mapping
//!
//! Builds a map-ready, per-well production summary for one pool from the
//! provincial control and history extracts.
//!
//! # Usage
//!
//! ```bash
//! # Full run with ./prodmap.toml (or built-in defaults)
//! prodmap run
//!
//! # Different pool, JSON output
//! prodmap run --pool CARDIUM --format json --out out/cardium.json
//!
//! # Normalize raw identifiers
//! prodmap uwi 0455051206000
//!
//! # Find a search term
//! prodmap pools --contains VIK
//! ```
//!
//! # Environment Variables
//!
//! - `PRODMAP_CONFIG`: Path to a TOML config file
//! - `RUST_LOG`: Logging level (default: info)

use anyhow::{Context, Result};
use clap::Parser;
use prodmap::config::{PipelineConfig, RunOverrides};
use prodmap::pipeline::{self, summary, uwi};
use prodmap::{acquisition, export, OutputFormat, RadiusField};
use std::path::PathBuf;
use tracing::info;

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "prodmap")]
#[command(about = "Per-well production summaries for pool maps")]
#[command(version)]
struct CliArgs {
    /// Config file (overrides PRODMAP_CONFIG and ./prodmap.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: SubCommand,
}

#[derive(clap::Subcommand, Debug)]
enum SubCommand {
    /// Run the full pipeline and write the well summary
    Run {
        /// Control extract
        #[arg(long)]
        control: Option<PathBuf>,
        /// Production history extract
        #[arg(long)]
        history: Option<PathBuf>,
        /// Horizontal-well CSV
        #[arg(long)]
        horizontal: Option<PathBuf>,
        /// Bottom-hole location CSV
        #[arg(long)]
        locations: Option<PathBuf>,
        /// Pool search term (case-sensitive substring)
        #[arg(long)]
        pool: Option<String>,
        /// Summary output path
        #[arg(long)]
        out: Option<PathBuf>,
        /// Also write the filtered rows here
        #[arg(long)]
        filtered: Option<PathBuf>,
        /// Output format: csv or json
        #[arg(long)]
        format: Option<OutputFormat>,
        /// Radius field for the map: oil, gas or liquid_gas
        #[arg(long)]
        radius: Option<RadiusField>,
    },

    /// Print the UWI for each raw well identifier
    Uwi {
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// List pool names in the control extract with row counts
    Pools {
        /// Only pools whose name contains this term
        #[arg(long)]
        contains: Option<String>,
        /// Control extract
        #[arg(long)]
        control: Option<PathBuf>,
    },

    /// Validate the config and print it as TOML
    CheckConfig,
}

// ============================================================================
// Commands
// ============================================================================

fn load_config(path: Option<&PathBuf>) -> Result<PipelineConfig> {
    match path {
        Some(p) => PipelineConfig::load_from_file(p)
            .with_context(|| format!("loading config {}", p.display())),
        None => Ok(PipelineConfig::load()),
    }
}

fn run_pipeline(config: &PipelineConfig) -> Result<()> {
    info!(
        pool = %config.filter.pool_search_term,
        control = %config.inputs.control.display(),
        history = %config.inputs.history.display(),
        "Starting pipeline run"
    );
    let output = pipeline::run(config).context("reading inputs")?;

    export::write_summary(
        &config.output.summary,
        config.output.format,
        config.output.radius,
        &output.wells,
        &config.filter.pool_search_term,
        &output.report,
    )
    .context("writing well summary")?;

    if let Some(path) = &config.output.filtered {
        export::write_filtered(path, config.output.format, &output.filtered)
            .context("writing filtered records")?;
    }

    info!(
        wells = output.wells.len(),
        out = %config.output.summary.display(),
        "Run complete"
    );
    Ok(())
}

fn list_pools(config: &PipelineConfig, contains: Option<&str>) -> Result<()> {
    let control = acquisition::read_control(&config.inputs.control, &config.layout.control)
        .context("reading control extract")?;
    for (name, rows) in summary::pool_counts(&control, contains) {
        println!("{rows:>8}  {name}");
    }
    Ok(())
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() -> Result<()> {
    let args = CliArgs::parse();

    // Initialize logging
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    if args.log_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }

    match args.command {
        SubCommand::Run {
            control,
            history,
            horizontal,
            locations,
            pool,
            out,
            filtered,
            format,
            radius,
        } => {
            let mut config = load_config(args.config.as_ref())?;
            config.apply(RunOverrides {
                control,
                history,
                horizontal,
                locations,
                pool,
                summary: out,
                filtered,
                format,
                radius,
            });
            config.validate().context("validating config")?;
            run_pipeline(&config)
        }
        SubCommand::Uwi { ids } => {
            for id in ids {
                println!("{id}\t{}", uwi::normalize(&id));
            }
            Ok(())
        }
        SubCommand::Pools { contains, control } => {
            let mut config = load_config(args.config.as_ref())?;
            config.apply(RunOverrides {
                control,
                ..RunOverrides::default()
            });
            list_pools(&config, contains.as_deref())
        }
        SubCommand::CheckConfig => {
            let config = load_config(args.config.as_ref())?;
            config.validate().context("validating config")?;
            print!("{}", config.to_toml().context("serializing config")?);
            Ok(())
        }
    }
}
