//! snc - command-line interface for the stochastic network calculator
//!
//! Usage:
//!   snc show <file>                                   # Print the network described by a file
//!   snc analyze <file> --flow f1 --vertex v2          # Symbolic bound at a point of interest
//!   snc optimize <file> --flow f1 --vertex v2 --target 5 [--json]

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use snc_core::{
    analyze, optimize_with_config, AnalysisType, BoundType, FlowId, Network, OptimizationType,
    OptimizerConfig, VertexId,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "snc")]
#[command(version)]
#[command(about = "Stochastic network calculator")]
#[command(long_about = "Compute and optimize probabilistic backlog, delay and output bounds for feed-forward networks")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the vertices and flows of a network file
    Show {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Print the symbolic bound of a flow at a vertex
    Analyze {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        #[command(flatten)]
        point: PointOfInterest,

        #[arg(short, long, value_enum, default_value = "backlog")]
        bound: BoundArg,
    },

    /// Optimize the bound of a flow at a vertex over theta and Hölder exponents
    Optimize {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        #[command(flatten)]
        point: PointOfInterest,

        #[arg(short, long, value_enum, default_value = "backlog")]
        bound: BoundArg,

        /// Backlog or delay for direct bounds, violation probability for inverse bounds
        #[arg(long, value_name = "VALUE")]
        target: f64,

        #[arg(long, default_value_t = 0.1, value_name = "STEP")]
        theta_granularity: f64,

        #[arg(long, default_value_t = 0.1, value_name = "STEP")]
        hoelder_granularity: f64,

        #[arg(long, value_enum, default_value = "simple")]
        optimizer: OptimizerArg,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(clap::Args)]
struct PointOfInterest {
    /// Alias of the flow of interest
    #[arg(short, long, value_name = "ALIAS")]
    flow: String,

    /// Alias of the vertex of interest
    #[arg(long, value_name = "ALIAS")]
    vertex: String,
}

#[derive(Clone, Copy, ValueEnum)]
enum BoundArg {
    Backlog,
    Delay,
    Output,
    InverseBacklog,
    InverseDelay,
}

impl From<BoundArg> for BoundType {
    fn from(arg: BoundArg) -> Self {
        match arg {
            BoundArg::Backlog => BoundType::Backlog,
            BoundArg::Delay => BoundType::Delay,
            BoundArg::Output => BoundType::Output,
            BoundArg::InverseBacklog => BoundType::InverseBacklog,
            BoundArg::InverseDelay => BoundType::InverseDelay,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum OptimizerArg {
    Simple,
    Gradient,
}

impl From<OptimizerArg> for OptimizationType {
    fn from(arg: OptimizerArg) -> Self {
        match arg {
            OptimizerArg::Simple => OptimizationType::Simple,
            OptimizerArg::Gradient => OptimizationType::Gradient,
        }
    }
}

#[derive(Serialize)]
struct OptimizationReport<'a> {
    flow: &'a str,
    vertex: &'a str,
    bound: BoundType,
    optimizer: OptimizationType,
    target: f64,
    theta_granularity: f64,
    hoelder_granularity: f64,
    value: f64,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(message) = run(cli.command) {
        eprintln!("Error: {}", message);
        process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(command: Command) -> Result<(), String> {
    match command {
        Command::Show { file } => {
            let network = load(&file)?;
            print!("{}", network);
        }
        Command::Analyze {
            file,
            point,
            bound,
        } => {
            let network = load(&file)?;
            let (flow, vertex) = resolve(&network, &point)?;
            let arrival = analyze(flow, vertex, AnalysisType::Simple, bound.into(), &network)
                .map_err(|e| format!("analysis failed: {}", e))?;
            println!("{}", arrival);
        }
        Command::Optimize {
            file,
            point,
            bound,
            target,
            theta_granularity,
            hoelder_granularity,
            optimizer,
            json,
        } => {
            let network = load(&file)?;
            let (flow, vertex) = resolve(&network, &point)?;
            let result = optimize_with_config(
                flow,
                vertex,
                theta_granularity,
                hoelder_granularity,
                AnalysisType::Simple,
                optimizer.into(),
                bound.into(),
                target,
                &network,
                OptimizerConfig::default(),
            )
            .map_err(|e| format!("optimization failed: {}", e))?;

            if json {
                let report = OptimizationReport {
                    flow: &point.flow,
                    vertex: &point.vertex,
                    bound: bound.into(),
                    optimizer: optimizer.into(),
                    target,
                    theta_granularity,
                    hoelder_granularity,
                    value: result,
                };
                let text = serde_json::to_string_pretty(&report)
                    .map_err(|e| format!("serializing to JSON: {}", e))?;
                println!("{}", text);
            } else {
                println!("{}", result);
            }
        }
    }
    Ok(())
}

fn load(file: &Path) -> Result<Network, String> {
    snc_io::load(file).map_err(|e| format!("reading '{}': {}", file.display(), e))
}

fn resolve(network: &Network, point: &PointOfInterest) -> Result<(FlowId, VertexId), String> {
    let flow = network
        .flow_by_alias(&point.flow)
        .map(|f| f.id())
        .ok_or_else(|| format!("no flow named '{}'", point.flow))?;
    let vertex = network
        .vertex_by_alias(&point.vertex)
        .map(|v| v.id())
        .ok_or_else(|| format!("no vertex named '{}'", point.vertex))?;
    Ok((flow, vertex))
}
