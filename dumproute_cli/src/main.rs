use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use mimalloc::MiMalloc;
use tracing::{error, info};

mod error;
mod input;
mod matrix_build;
mod output;
mod parsers;
mod solve;

use error::ProblemError;
use input::ProblemFiles;
use solve::SearchOverrides;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// `--base <dir>` names the directory holding the four per-problem files;
/// the positional arguments name the problem base names within it. Absent
/// `--checkData`/`--calculateTM`, the driver runs the full solver on every
/// named problem.
#[derive(Parser)]
#[clap(author, version, about = "CVRPTW-D municipal waste collection solver", long_about = None)]
struct Cli {
    /// Directory containing `<base>.containers.txt` etc. for every problem.
    #[arg(long)]
    base: PathBuf,

    /// Problem base names to process, e.g. `day1` for `day1.containers.txt`.
    #[arg(required = true)]
    problems: Vec<String>,

    /// Validate the four input files and exit; does not run the solver.
    #[arg(long = "checkData")]
    check_data: bool,

    /// Rebuild `<base>.dmatrix-time.txt` via the routing collaborator,
    /// instead of running the solver.
    #[arg(long = "calculateTM")]
    calculate_tm: bool,

    /// Flat-earth speed (distance units / second) used by `--calculateTM`'s
    /// fallback routing engine.
    #[arg(long, default_value_t = 1.0)]
    speed: f64,

    /// Directory to write `<base>.solution.csv` into; defaults to stdout.
    #[arg(long, short = 'o')]
    out: Option<PathBuf>,

    #[arg(long)]
    tabu_tenure: Option<usize>,

    #[arg(long)]
    max_iterations: Option<usize>,

    #[arg(long, value_parser = parsers::parse_duration)]
    time_budget: Option<jiff::SignedDuration>,

    #[arg(long)]
    stagnation_ins: Option<usize>,

    #[arg(long)]
    stagnation_intra_sw: Option<usize>,

    #[arg(long)]
    stagnation_inter_sw: Option<usize>,

    /// Optional `.env`-style file to load before running (e.g. a routing
    /// engine API key consulted only by `--calculateTM`).
    #[arg(long)]
    env: Option<String>,

    #[arg(short, long)]
    debug: bool,

    /// Prints a per-family move-generation/application breakdown after
    /// solving, in addition to the one-line summary logged at info level.
    #[arg(long)]
    stats: bool,
}

fn process_one(cli: &Cli, base_name: &str) -> Result<(), ProblemError> {
    let files = ProblemFiles::new(&cli.base, base_name);

    if cli.calculate_tm {
        matrix_build::calculate_tm(&files, base_name, cli.speed)?;
        info!("{base_name}: rebuilt travel-time matrix");
        return Ok(());
    }

    if cli.check_data {
        let problem = input::check_data(&files)?;
        info!(
            "{base_name}: input data is well-formed ({} nodes, {} vehicles)",
            problem.catalog().len(),
            problem.num_vehicles(),
        );
        return Ok(());
    }

    let problem = input::parse_problem(&files)?;
    let overrides = SearchOverrides {
        tabu_tenure: cli.tabu_tenure,
        max_stagnation_ins: cli.stagnation_ins,
        max_stagnation_intra_sw: cli.stagnation_intra_sw,
        max_stagnation_inter_sw: cli.stagnation_inter_sw,
        max_outer_iterations: cli.max_iterations,
        time_budget: cli.time_budget.map(|d| std::time::Duration::from_secs_f64(d.as_secs_f64().abs())),
    };
    let (best, stats) = solve::run(&problem, overrides);
    if cli.stats {
        solve::print_stats(&stats);
    }

    match &cli.out {
        Some(out_dir) => {
            std::fs::create_dir_all(out_dir)?;
            let path = out_dir.join(format!("{base_name}.solution.csv"));
            let file = std::fs::File::create(&path)?;
            let mut writer = std::io::BufWriter::new(file);
            output::write_solution(&problem, &best, &mut writer)?;
        }
        None => {
            let stdout = std::io::stdout();
            let mut lock = stdout.lock();
            output::write_solution(&problem, &best, &mut lock)?;
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(env) = &cli.env {
        dotenvy::from_filename(env).ok();
    }

    tracing_subscriber::fmt()
        .with_max_level(if cli.debug { tracing::Level::DEBUG } else { tracing::Level::INFO })
        .init();

    let mut any_failed = false;
    for base_name in &cli.problems {
        if let Err(err) = process_one(&cli, base_name) {
            error!("{base_name}: {err}");
            any_failed = true;
        }
    }

    if any_failed { ExitCode::FAILURE } else { ExitCode::SUCCESS }
}
