//! Ludograph CLI - builds board game similarity graphs from a dataset snapshot
//!
//! Configuration comes from an optional YAML file; flags override it. The
//! configuration is validated before the dataset is read.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use comfy_table::{ContentArrangement, Table};
use ludograph::{build_graph, filter_edge_file, BuildConfig, Dataset, GraphMode, OutputPaths};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

#[derive(Parser)]
#[command(name = "ludograph", version, about = "Board game similarity graph builder")]
struct Cli {
    /// YAML build configuration
    #[arg(long, global = true, env = "LUDOGRAPH_CONFIG")]
    config: Option<PathBuf>,

    /// Log per-worker progress
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Summary format
    #[arg(long, default_value = "table", global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, clap::ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Args)]
struct GraphArgs {
    /// JSON snapshot of the board game database
    #[arg(long)]
    dataset: PathBuf,

    /// Node list output
    #[arg(long)]
    nodes: PathBuf,

    /// Sparsified edge list output
    #[arg(long)]
    edges: PathBuf,

    /// Also write the unfiltered edge list
    #[arg(long)]
    raw_edges: Option<PathBuf>,

    /// Fraction of each node's top edges to keep, in (0, 1]
    #[arg(long)]
    keep_percentage: Option<f64>,

    /// Similarity worker count
    #[arg(long)]
    workers: Option<usize>,
}

#[derive(Subcommand)]
enum Commands {
    /// Link board games by shared categories and mechanics
    Games {
        #[command(flatten)]
        args: GraphArgs,

        /// Minimum edge weight (0-200)
        #[arg(long)]
        threshold: Option<f64>,
    },
    /// Link categories by the games they share
    Categories {
        #[command(flatten)]
        args: GraphArgs,
    },
    /// Sparsify an existing raw edge list
    Filter {
        /// Raw edge list (Source;Target;Weight)
        #[arg(long)]
        input: PathBuf,

        /// Filtered edge list output
        #[arg(long)]
        output: PathBuf,

        /// Fraction of each node's top edges to keep, in (0, 1]
        #[arg(long)]
        keep_percentage: Option<f64>,
    },
}

fn main() {
    let cli = Cli::parse();
    ludograph::logging::init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => BuildConfig::from_yaml_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => BuildConfig::default(),
    };

    match cli.command {
        Commands::Games { args, threshold } => {
            config.mode = GraphMode::Games;
            if let Some(threshold) = threshold {
                config.edge_weight_threshold = threshold;
            }
            run_build(config, args, &cli.format)
        }
        Commands::Categories { args } => {
            config.mode = GraphMode::Categories;
            run_build(config, args, &cli.format)
        }
        Commands::Filter {
            input,
            output,
            keep_percentage,
        } => {
            if let Some(keep) = keep_percentage {
                config.keep_percentage = keep;
            }
            config.validate().context("invalid configuration")?;

            let stats = filter_edge_file(&input, &output, config.keep_percentage)
                .with_context(|| format!("filtering {}", input.display()))?;
            print_summary(
                &cli.format,
                &[
                    ("input_edges", stats.input_edges.to_string()),
                    ("kept_edges", stats.kept_edges.to_string()),
                    ("elapsed", format_duration(stats.elapsed)),
                ],
            )
        }
    }
}

fn run_build(mut config: BuildConfig, args: GraphArgs, format: &OutputFormat) -> Result<()> {
    if let Some(keep) = args.keep_percentage {
        config.keep_percentage = keep;
    }
    if let Some(workers) = args.workers {
        config.worker_count = workers;
    }
    config.validate().context("invalid configuration")?;

    let dataset = Dataset::from_json_file(&args.dataset)
        .with_context(|| format!("loading dataset {}", args.dataset.display()))?;

    info!(mode = %config.mode, keep_percentage = config.keep_percentage, "Building graph");
    let graph = build_graph(&dataset, &config).context("graph build failed")?;

    graph
        .write(&OutputPaths {
            nodes: args.nodes,
            edges: args.edges,
            raw_edges: args.raw_edges,
        })
        .context("writing graph")?;

    let stats = &graph.stats;
    print_summary(
        format,
        &[
            ("mode", graph.mode.to_string()),
            ("nodes", graph.nodes.len().to_string()),
            ("attributes", stats.attributes.to_string()),
            ("raw_edges", stats.raw_edges.to_string()),
            ("kept_edges", stats.kept_edges.to_string()),
            ("similarity", format_duration(stats.similarity_time)),
            ("sparsify", format_duration(stats.sparsify_time)),
        ],
    )
}

fn format_duration(d: Duration) -> String {
    format!("{:.3}s", d.as_secs_f64())
}

fn print_summary(format: &OutputFormat, rows: &[(&str, String)]) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let map: serde_json::Map<String, serde_json::Value> = rows
                .iter()
                .map(|(k, v)| (k.to_string(), serde_json::Value::String(v.clone())))
                .collect();
            println!("{}", serde_json::to_string_pretty(&map)?);
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table.set_content_arrangement(ContentArrangement::Dynamic);
            table.set_header(vec!["metric", "value"]);
            for (key, value) in rows {
                table.add_row(vec![key.to_string(), value.clone()]);
            }
            println!("{}", table);
        }
    }
    Ok(())
}
