//! ospf-mismatch CLI: OSPF adjacency mismatch dataset and rule-based evaluation.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use miette::Result;

use ospf_mismatch::capture::DirectoryCapture;
use ospf_mismatch::config::PipelineConfig;
use ospf_mismatch::dataset::TimerField;
use ospf_mismatch::stages;

#[derive(Parser)]
#[command(
    name = "ospf-mismatch",
    version,
    about = "OSPF adjacency mismatch dataset and rule-based evaluation"
)]
struct Cli {
    /// Pipeline config (TOML). Defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the output directory.
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,

    /// Override the cleaning reference field (hello_a, hello_b, dead_a, dead_b).
    #[arg(long, global = true, value_parser = parse_timer_field)]
    reference_field: Option<TimerField>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a config file with every default filled in.
    Init {
        /// Destination of the config file.
        #[arg(default_value = "ospf-mismatch.toml")]
        path: PathBuf,
    },

    /// Merge one topology's captures into its JSON document.
    Build {
        /// Topology number.
        #[arg(long)]
        topology: u32,

        /// Override the capture directory.
        #[arg(long)]
        capture_dir: Option<PathBuf>,

        /// Routers to collect (comma-separated), overriding the config.
        #[arg(long, value_delimiter = ',')]
        routers: Option<Vec<String>>,
    },

    /// Convert every topology document into a cleaned adjacency dataset.
    Dataset,

    /// Label every cleaned dataset with the mismatch rules.
    Label,

    /// Build the ground-truth table from the hand-authored file.
    Truth {
        /// Override the ground-truth text file.
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Score rule labels against the ground-truth table.
    Evaluate {
        /// First topology of the range (inclusive).
        #[arg(long)]
        min: Option<u32>,

        /// Last topology of the range (inclusive).
        #[arg(long)]
        max: Option<u32>,
    },

    /// Write a human-readable mismatch report per topology.
    Report,

    /// Dataset, label and report; truth and evaluate too when the
    /// ground-truth file exists.
    Run,
}

fn parse_timer_field(s: &str) -> std::result::Result<TimerField, String> {
    TimerField::from_column(s)
        .ok_or_else(|| format!("unknown reference field \"{s}\" (expected hello_a, hello_b, dead_a or dead_b)"))
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = PipelineConfig::load_or_default(cli.config.as_deref())?;
    if let Some(dir) = cli.output_dir {
        config.output_dir = dir;
    }
    if let Some(field) = cli.reference_field {
        config.reference_field = field;
    }

    match cli.command {
        Commands::Init { path } => {
            config.save(&path)?;
            println!("Wrote default config to {}", path.display());
        }

        Commands::Build {
            topology,
            capture_dir,
            routers,
        } => {
            if let Some(dir) = capture_dir {
                config.capture_dir = dir;
            }
            if let Some(routers) = routers {
                config.routers = routers;
            }
            let source = DirectoryCapture::new(&config.capture_dir);
            let path = stages::build(&config, &source, topology)?;
            println!("Topology {topology} written to {}", path.display());
        }

        Commands::Dataset => {
            let n = stages::dataset(&config)?;
            println!("Wrote {n} cleaned datasets");
        }

        Commands::Label => {
            let n = stages::label(&config)?;
            println!("Labeled {n} datasets");
        }

        Commands::Truth { file } => {
            if let Some(file) = file {
                config.ground_truth = file;
            }
            let path = stages::truth(&config)?;
            println!("Ground-truth table written to {}", path.display());
        }

        Commands::Evaluate { min, max } => {
            if let Some(min) = min {
                config.evaluation.min_topology = min;
            }
            if let Some(max) = max {
                config.evaluation.max_topology = max;
            }
            config.validate()?;
            let evaluation = stages::evaluation(&config)?;
            print!("{}", evaluation.render_report());
        }

        Commands::Report => {
            let n = stages::reports(&config)?;
            println!("Wrote {n} mismatch reports");
        }

        Commands::Run => {
            let datasets = stages::dataset(&config)?;
            stages::label(&config)?;
            let reports = stages::reports(&config)?;
            println!("Processed {datasets} topologies, wrote {reports} reports");

            if config.ground_truth.is_file() {
                stages::truth(&config)?;
                let evaluation = stages::evaluation(&config)?;
                print!("{}", evaluation.render_report());
            } else {
                tracing::warn!(
                    path = %config.ground_truth.display(),
                    "ground-truth file not found, skipping evaluation"
                );
            }
        }
    }

    Ok(())
}
