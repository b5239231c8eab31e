use clap::{ArgAction, Args, Parser, Subcommand};
use rowsum::config::DEFAULT_DATASET_PATH;
use rowsum::interrupt::{self, ControlEvent, ControlOutcome, InterruptController};
use rowsum::{AggregateReport, CancelToken, DatasetShape, Error, Pipeline, ReadMode, Result, RunConfig};
use rowsum_core::format::constants::{DEFAULT_COLUMNS, DEFAULT_ROWS, DEFAULT_WORKERS};
use rowsum_core::{parse_shape, parse_workers};
use serde::Serialize;
use std::io::{self, BufReader};
use std::path::PathBuf;
use std::process::{self, ExitCode};
use std::sync::mpsc;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(
    about = "Generate a binary dataset of random integers and sum it with a pool of worker threads"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    dataset: DatasetArgs,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand, Clone, Copy)]
enum Commands {
    /// Generate the dataset, then aggregate it and cross-check the sums (default)
    Run,
    /// Only generate the dataset
    Generate,
    /// Only aggregate an existing dataset
    Aggregate,
}

#[derive(Args)]
struct DatasetArgs {
    /// Dataset file, recreated on every generation
    #[arg(long, global = true, default_value = DEFAULT_DATASET_PATH)]
    path: PathBuf,

    /// Dataset shape as ROWSxCOLUMNS
    #[arg(long, global = true, value_parser = shape_arg, conflicts_with_all = ["rows", "columns"])]
    shape: Option<DatasetShape>,

    /// Number of rows
    #[arg(long, global = true, default_value_t = DEFAULT_ROWS)]
    rows: usize,

    /// Number of integers per row
    #[arg(long, global = true, default_value_t = DEFAULT_COLUMNS)]
    columns: usize,

    /// Worker threads; must divide the row count
    #[arg(short, long, global = true, default_value_t = DEFAULT_WORKERS, value_parser = workers_arg)]
    workers: usize,

    /// Seed for a reproducible dataset
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// How workers read their partitions
    #[arg(long, global = true, value_enum, default_value = "positioned")]
    read_mode: ReadMode,

    /// Seconds to wait between generation and aggregation
    #[arg(long, global = true, default_value_t = 0)]
    pause_secs: u64,

    /// Print the final report as JSON instead of progress lines
    #[arg(long, global = true)]
    json: bool,
}

impl DatasetArgs {
    fn to_config(&self) -> RunConfig {
        let shape = self.shape.unwrap_or(DatasetShape {
            rows: self.rows,
            columns: self.columns,
        });
        let config = RunConfig::default()
            .with_path(&self.path)
            .with_shape(shape)
            .with_workers(self.workers)
            .with_read_mode(self.read_mode)
            .with_pause_secs(self.pause_secs);
        match self.seed {
            Some(seed) => config.with_seed(seed),
            None => config,
        }
    }
}

fn shape_arg(value: &str) -> std::result::Result<DatasetShape, String> {
    parse_shape(value).map_err(|e| e.to_string())
}

fn workers_arg(value: &str) -> std::result::Result<usize, String> {
    parse_workers(value).map_err(|e| e.to_string())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    rowsum::logging::init(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::from(err.exit_code())
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let token = CancelToken::new();
    let (events, control) = mpsc::channel();

    // Signals are routed before any dataset resource is opened.
    interrupt::install_signal_handler(events.clone())?;
    let controller = InterruptController::new(
        control,
        token.clone(),
        BufReader::new(io::stdin()),
        io::stdout(),
    )
    .spawn()
    .map_err(|source| Error::Spawn {
        name: "interrupt".into(),
        source,
    })?;

    let json = cli.dataset.json;
    let config = cli.dataset.to_config();
    let result = match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => Pipeline::new(config, token).and_then(|p| run_all(&p, json)),
        Commands::Generate => {
            Pipeline::generation_only(config, token).and_then(|p| generate_only(&p, json))
        }
        Commands::Aggregate => Pipeline::new(config, token).and_then(|p| aggregate_only(&p, json)),
    };

    let _ = events.send(ControlEvent::Shutdown);
    let outcome = controller.join().unwrap_or(ControlOutcome::Aborted);
    match (result, outcome) {
        (Err(err), _) => Err(err),
        (Ok(()), ControlOutcome::Aborted) => Err(Error::Aborted),
        (Ok(()), ControlOutcome::Completed) => Ok(()),
    }
}

fn run_all(pipeline: &Pipeline, json: bool) -> Result<()> {
    let generated = generate_phase(pipeline, json)?;
    pipeline.pause()?;
    let aggregated = aggregate_phase(pipeline, json)?;
    let report = pipeline.finish(generated, aggregated)?;
    if json {
        print_json(&report)?;
    }
    Ok(())
}

fn generate_only(pipeline: &Pipeline, json: bool) -> Result<()> {
    let report = generate_phase(pipeline, json)?;
    if json {
        print_json(&report)?;
    }
    Ok(())
}

fn aggregate_only(pipeline: &Pipeline, json: bool) -> Result<()> {
    let report = aggregate_phase(pipeline, json)?;
    if json {
        print_json(&report)?;
    }
    Ok(())
}

fn generate_phase(pipeline: &Pipeline, json: bool) -> Result<rowsum::GenerationReport> {
    if !json {
        println!(
            "Generator running in process {}. Creating {} and generating {} numbers...\n",
            process::id(),
            pipeline.config().path.display(),
            pipeline.shape().element_count()
        );
    }
    let report = pipeline.generate()?;
    if !json {
        println!("Actual sum (calculated by the generator) is: {}\n", report.sum);
    }
    Ok(report)
}

fn aggregate_phase(pipeline: &Pipeline, json: bool) -> Result<AggregateReport> {
    if !json {
        println!(
            "Coordinator running in process {}. Dataset is complete, creating {} threads...\n",
            process::id(),
            pipeline.config().workers
        );
    }
    let report = pipeline.aggregate()?;
    if !json {
        for worker in &report.workers {
            println!("Thread {} read {} lines.", worker.worker, worker.rows);
        }
        println!("All threads have finished their work.\n");
        println!(
            "The total sum of the file (calculated by the workers) is: {}",
            report.total
        );
    }
    Ok(report)
}

fn print_json<T: Serialize>(report: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(report)
        .map_err(|e| Error::io("encoding the report", e.into()))?;
    println!("{text}");
    Ok(())
}
