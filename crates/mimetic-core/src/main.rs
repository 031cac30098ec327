//! Mimetic Contagion Engine
//!
//! Command-line driver: build, load or generate a signed graph, run a cascade
//! or a contagion on it, and write the reports.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use mimetic_core::config::{ConfigError, MimeticConfig, DEFAULT_CONFIG_PATH};
use mimetic_core::events::StepLogger;
use mimetic_core::output::{
    format_cascade, format_contagion, load_graph, report_base_name, save_graph, save_graph_as,
    GraphFormat, GraphIoError, ReportFormat,
};
use mimetic_core::setup::{self, GeneratorError, GraphKind};
use mimetic_core::{
    CascadeSimulator, ContagionSimulator, NodeChoice, Sign, SignedGraph, SimError, SimRng,
};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "mimetic")]
#[command(about = "Mimetic contagion on signed social graphs")]
struct Cli {
    /// TOML config file with run defaults
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Perturb one edge and let pressured actors rebalance
    Cascade(CascadeArgs),
    /// Spread an accusation against a scapegoat
    Contagion(ContagionArgs),
    /// Generate a graph file
    Generate(GenerateArgs),
}

/// Starting sign of every edge in a `--nodes` graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
enum Initial {
    #[default]
    AllPositive,
    AllNegative,
}

impl Initial {
    fn sign(self) -> Sign {
        match self {
            Initial::AllPositive => Sign::Positive,
            Initial::AllNegative => Sign::Negative,
        }
    }
}

/// Options shared by both simulation modes
#[derive(Args, Debug)]
struct RunArgs {
    /// Graph file (.json, .csv, .txt, .edges); generated from config if absent
    #[arg(long, conflicts_with = "nodes")]
    graph: Option<PathBuf>,

    /// Build a complete graph over these names
    #[arg(long, num_args = 1..)]
    nodes: Option<Vec<String>>,

    /// Sign of every edge in the `--nodes` graph
    #[arg(long, value_enum, default_value_t = Initial::AllPositive)]
    initial: Initial,

    /// Random seed for reproducibility
    #[arg(long)]
    seed: Option<u64>,

    /// Report style
    #[arg(long, value_enum, default_value_t = ReportFormat::All)]
    format: ReportFormat,

    /// Print reports to stdout instead of writing them to the output directory
    #[arg(long)]
    no_files: bool,

    /// Write the final graph to this file (format from extension)
    #[arg(long)]
    save_graph: Option<PathBuf>,

    /// Write a JSONL step log into the output directory
    #[arg(long)]
    log_steps: bool,

    /// Directory for reports and step logs
    #[arg(long)]
    output_dir: Option<PathBuf>,
}

impl RunArgs {
    fn output_dir(&self, config: &MimeticConfig) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| config.run.output_dir.clone())
    }

    /// Node part of report file names
    fn graph_label(&self, config: &MimeticConfig) -> String {
        if let Some(nodes) = &self.nodes {
            return nodes.join("-");
        }
        match self.graph.as_deref().and_then(Path::file_stem) {
            Some(stem) => stem.to_string_lossy().into_owned(),
            None => format!("generated-{}", config.generator.nodes),
        }
    }
}

#[derive(Args, Debug)]
struct CascadeArgs {
    #[command(flatten)]
    run: RunArgs,

    /// Edge to flip first, as `U:V` or `U V`; without it the cascade starts
    /// from existing imbalance
    #[arg(long, num_args = 1..=2, value_names = ["U:V"])]
    perturb: Option<Vec<String>>,

    /// 0.0 = random moves, 1.0 = always the best move
    #[arg(long)]
    rationality: Option<f64>,

    /// Step budget
    #[arg(long)]
    max_steps: Option<usize>,
}

#[derive(Args, Debug)]
struct ContagionArgs {
    #[command(flatten)]
    run: RunArgs,

    /// Node to accuse; random if omitted
    #[arg(long)]
    scapegoat: Option<String>,

    /// Node making the accusation; a random neighbor of the scapegoat if omitted
    #[arg(long)]
    accuser: Option<String>,
}

#[derive(Args, Debug)]
struct GenerateArgs {
    #[arg(long, value_enum)]
    kind: Option<GraphKind>,

    #[arg(long)]
    nodes: Option<usize>,

    #[arg(long)]
    p_positive: Option<f64>,

    #[arg(long)]
    min_degree: Option<usize>,

    #[arg(long)]
    max_degree: Option<usize>,

    #[arg(long)]
    seed: Option<u64>,

    /// Output file
    #[arg(long)]
    output: PathBuf,

    /// Override the format implied by the output extension
    #[arg(long, value_enum)]
    file_format: Option<GraphFormat>,
}

/// Everything that can stop the binary
#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Sim(#[from] SimError),

    #[error(transparent)]
    GraphIo(#[from] GraphIoError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Generator(#[from] GeneratorError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not render report: {0}")]
    Render(#[from] serde_json::Error),
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = MimeticConfig::load_or_default(&cli.config);

    let result = match cli.command {
        Command::Cascade(args) => run_cascade(args, config),
        Command::Contagion(args) => run_contagion(args, config),
        Command::Generate(args) => run_generate(args, config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

/// Build the `--nodes` graph, load the graph file, or generate one from the config
fn obtain_graph(
    run: &RunArgs,
    config: &MimeticConfig,
    rng: &mut SimRng,
) -> Result<SignedGraph, CliError> {
    if let Some(nodes) = &run.nodes {
        info!(nodes = nodes.len(), initial = ?run.initial, "Building complete graph");
        return Ok(SignedGraph::complete(nodes.iter().cloned(), run.initial.sign()));
    }
    match run.graph.as_deref() {
        Some(path) => Ok(load_graph(path)?),
        None => {
            info!(kind = ?config.generator.kind, nodes = config.generator.nodes, "Generating graph");
            Ok(setup::generate(&config.generator, rng)?)
        }
    }
}

/// Split `Alice:Betty` (or two separate values) into the edge to perturb
fn parse_perturbation(values: &[String]) -> Result<(String, String), SimError> {
    let pair = match values {
        [joined] => joined.split_once(':'),
        [u, v] => Some((u.as_str(), v.as_str())),
        _ => None,
    };
    match pair {
        Some((u, v)) if !u.is_empty() && !v.is_empty() && !v.contains(':') => {
            Ok((u.to_string(), v.to_string()))
        }
        _ => Err(SimError::invalid(format!(
            "perturbation must be in format Node1:Node2, got {:?}",
            values.join(" ")
        ))),
    }
}

/// Render each requested format, then print them or write one file per format
fn emit_reports(
    run: &RunArgs,
    config: &MimeticConfig,
    base_name: &str,
    render: impl Fn(ReportFormat) -> Result<String, serde_json::Error>,
) -> Result<(), CliError> {
    if run.no_files {
        println!("{}", render(run.format)?);
        return Ok(());
    }

    let dir = run.output_dir(config);
    fs::create_dir_all(&dir)?;
    for format in run.format.expand() {
        let path = dir.join(format!("{}_{}.{}", base_name, format.label(), format.extension()));
        fs::write(&path, render(*format)?)?;
        info!(path = %path.display(), "Report saved");
        println!("✓ {}: {}", format.label(), path.display());
    }
    println!("\nAll outputs written to: {}/", dir.display());
    Ok(())
}

fn step_logger(run: &RunArgs, config: &MimeticConfig, name: &str) -> Result<StepLogger, CliError> {
    if !(run.log_steps || config.run.log_steps) {
        return Ok(StepLogger::null());
    }
    let dir = run.output_dir(config);
    fs::create_dir_all(&dir)?;
    let path = dir.join(name);
    info!(path = %path.display(), "Logging steps");
    Ok(StepLogger::new(path)?)
}

fn warn_if_unseeded(seed: Option<u64>) {
    if seed.is_none() {
        warn!("No --seed provided; results will be non-deterministic");
    }
}

fn run_cascade(args: CascadeArgs, config: MimeticConfig) -> Result<(), CliError> {
    let mut cascade = config.cascade;
    if let Some(rationality) = args.rationality {
        cascade.rationality = rationality;
    }
    if let Some(max_steps) = args.max_steps {
        cascade.max_steps = max_steps;
    }
    let perturbation = args.perturb.as_deref().map(parse_perturbation).transpose()?;

    let seed = args.run.seed.or(config.run.seed);
    warn_if_unseeded(seed);
    let mut rng = SimRng::from_seed_option(seed);
    let graph = obtain_graph(&args.run, &config, &mut rng)?;
    let simulator = CascadeSimulator::new(graph, cascade, rng)?;

    let report = match &perturbation {
        Some((u, v)) => simulator.introduce_perturbation(u, v)?,
        None => simulator.run_from_current_state()?,
    };

    let mut logger = step_logger(&args.run, &config, "cascade_steps.jsonl")?;
    logger.log_cascade(&report)?;
    logger.flush()?;

    if let Some(path) = &args.run.save_graph {
        save_graph(&SignedGraph::from_snapshot(&report.final_state)?, path)?;
    }

    let event = perturbation.map_or_else(|| "none".to_string(), |(u, v)| format!("{}-{}", u, v));
    let base_name = report_base_name(&args.run.graph_label(&config), &event, seed);
    emit_reports(&args.run, &config, &base_name, |f| format_cascade(&report, f))?;
    if !args.run.no_files {
        println!("Steps: {}", report.steps.len());
        println!("Converged: {}", report.converged());
    }
    Ok(())
}

fn run_contagion(args: ContagionArgs, config: MimeticConfig) -> Result<(), CliError> {
    let seed = args.run.seed.or(config.run.seed);
    warn_if_unseeded(seed);
    let mut rng = SimRng::from_seed_option(seed);
    let graph = obtain_graph(&args.run, &config, &mut rng)?;

    let scapegoat = NodeChoice::from(args.scapegoat.or(config.contagion.scapegoat.clone()));
    let accuser = NodeChoice::from(args.accuser.or(config.contagion.accuser.clone()));
    let report = ContagionSimulator::new(graph, rng).introduce_accusation(scapegoat, accuser)?;

    let mut logger = step_logger(&args.run, &config, "contagion_steps.jsonl")?;
    logger.log_contagion(&report)?;
    logger.flush()?;

    if let Some(path) = &args.run.save_graph {
        save_graph(&SignedGraph::from_snapshot(&report.final_state)?, path)?;
    }

    let event = format!("{}-{}", report.accuser, report.scapegoat);
    let base_name = report_base_name(&args.run.graph_label(&config), &event, seed);
    emit_reports(&args.run, &config, &base_name, |f| format_contagion(&report, f))?;
    if !args.run.no_files {
        println!("Steps: {}", report.steps.len());
        println!("All against one: {}", report.all_against_one);
    }
    Ok(())
}

fn run_generate(args: GenerateArgs, config: MimeticConfig) -> Result<(), CliError> {
    let mut generator = config.generator;
    if let Some(kind) = args.kind {
        generator.kind = kind;
    }
    if let Some(nodes) = args.nodes {
        generator.nodes = nodes;
    }
    if let Some(p) = args.p_positive {
        generator.p_positive = p;
    }
    if let Some(min) = args.min_degree {
        generator.min_degree = min;
    }
    if let Some(max) = args.max_degree {
        generator.max_degree = max;
    }

    let mut rng = SimRng::from_seed_option(args.seed.or(config.run.seed));
    let graph = setup::generate(&generator, &mut rng)?;
    match args.file_format {
        Some(format) => save_graph_as(&graph, &args.output, format)?,
        None => save_graph(&graph, &args.output)?,
    }
    info!(
        path = %args.output.display(),
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        positive = graph.positive_edge_count(),
        negative = graph.negative_edge_count(),
        "Graph written"
    );
    Ok(())
}
