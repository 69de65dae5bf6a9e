use std::{path::PathBuf, time::Duration};

use clap::Parser;
use clique_cover::{
    encoder::{EncodeOptions, Exclusion},
    parser::{self, parse_graph_file},
    pipeline,
    prelude::*,
    report::Report,
    solver::{ExternalSolver, SolverConfig},
};
use pretty_env_logger::formatted_builder;

/// Decides whether a graph can be partitioned into at most k cliques using a SAT solver.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// File containing a graph.
    #[arg(short, long)]
    input: PathBuf,

    /// Output file for the DIMACS format (i.e. the CNF formula).
    #[arg(short, long, default_value = "formula.cnf")]
    output: PathBuf,

    /// Number of cliques.
    #[arg(short)]
    k: usize,

    /// The SAT solver to be used.
    #[arg(short, long, default_value = "./glucose")]
    solver: PathBuf,

    /// Argument passed to the solver before the formula path (repeatable).
    #[arg(
        long = "solver-arg",
        value_name = "ARG",
        default_values_t = vec!["-model".to_owned()],
        allow_hyphen_values = true
    )]
    solver_args: Vec<String>,

    /// Wall-clock budget for the solver in seconds; the result is unknown when exceeded.
    #[arg(short, long, value_name = "SECONDS")]
    timeout: Option<u64>,

    /// Emit one exclusion clause per unordered pair of non-adjacent vertices.
    #[arg(long)]
    unordered_exclusion: bool,

    /// Show full solver statistics and detailed output.
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("Failed to read graph"))]
    ParserError { source: parser::Error },
    #[snafu(display("Failed to decide clique cover"))]
    PipelineError { source: pipeline::Error },
}

fn init_logger() {
    let mut builder = formatted_builder();

    if let Ok(s) = ::std::env::var("RUST_LOG") {
        builder.parse_filters(&s);
    } else if cfg!(debug_assertions) {
        builder.parse_filters("clique_cover=debug");
    } else {
        builder.parse_filters("clique_cover=warn");
    }

    builder.try_init().expect("Failed to initialize the logger");
}

fn main() -> Result<(), Report> {
    init_logger();

    let args = Args::parse();

    let graph = parse_graph_file(&args.input).context(ParserError)?;

    let options = EncodeOptions {
        exclusion: if args.unordered_exclusion {
            Exclusion::Unordered
        } else {
            Exclusion::Ordered
        },
    };
    let solver = ExternalSolver::new(SolverConfig {
        program: args.solver.clone(),
        args: args.solver_args.clone(),
        timeout: args.timeout.map(Duration::from_secs),
    });

    pipeline::write_formula(&graph, args.k, &options, &args.output).context(PipelineError)?;
    println!("CNF formula written to {}", args.output.display());

    let run = pipeline::solve_formula(&solver, &graph, args.k, &args.output)
        .context(PipelineError)?;

    println!("{}", run.summary(args.verbose));

    Ok(())
}
