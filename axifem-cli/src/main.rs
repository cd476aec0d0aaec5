//! `axifem` - run an axisymmetric static analysis from a JSON problem file.

mod report;

use anyhow::{Context, Result};
use axifem_core::{run_analysis, AnalysisOptions, Problem, SolverType};
use clap::{ArgAction, Parser, ValueEnum};
use log::info;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "axifem", version, about = "Axisymmetric Q8 static FEM solver")]
struct Args {
    /// Problem file (JSON)
    input: PathBuf,

    /// Write results JSON here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Linear solver, overrides the problem file
    #[arg(long, value_enum)]
    solver: Option<SolverArg>,

    /// Gravity acceleration for self-weight, overrides the problem file
    #[arg(long)]
    gravity: Option<f64>,

    /// Assembly worker threads (0 = all cores)
    #[arg(long)]
    threads: Option<usize>,

    /// Integrate edge tractions over the full revolution (2π)
    #[arg(long)]
    revolve_edge_loads: bool,

    /// Also write afq/strains/stresses/principal tables into this directory
    #[arg(long)]
    tables: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SolverArg {
    Direct,
    Dense,
    Auto,
}

impl From<SolverArg> for SolverType {
    fn from(arg: SolverArg) -> Self {
        match arg {
            SolverArg::Direct => SolverType::Direct,
            SolverArg::Dense => SolverType::Dense,
            SolverArg::Auto => SolverType::Auto,
        }
    }
}

impl Args {
    fn apply_overrides(&self, options: &mut AnalysisOptions) {
        if let Some(solver) = self.solver {
            options.solver.solver_type = solver.into();
        }
        if let Some(gravity) = self.gravity {
            options.gravity = gravity;
        }
        if let Some(threads) = self.threads {
            options.assembly.n_threads = threads;
        }
        if self.revolve_edge_loads {
            options.assembly.revolve_edge_loads = true;
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn run(args: &Args) -> Result<()> {
    let file = File::open(&args.input)
        .with_context(|| format!("cannot open problem file {}", args.input.display()))?;
    let problem: Problem = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("cannot parse problem file {}", args.input.display()))?;

    let mut options = problem.options.clone();
    args.apply_overrides(&mut options);
    info!("options: {:?}", options);

    let results = run_analysis(&problem, &options).context("analysis failed")?;

    match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("cannot create {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, &results)?;
            writer.flush()?;
            info!("results written to {}", path.display());
        }
        None => {
            let stdout = io::stdout();
            let mut writer = BufWriter::new(stdout.lock());
            serde_json::to_writer_pretty(&mut writer, &results)?;
            writeln!(writer)?;
        }
    }

    if let Some(dir) = &args.tables {
        report::write_tables(dir, &results)
            .with_context(|| format!("cannot write tables to {}", dir.display()))?;
        info!("tables written to {}", dir.display());
    }

    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}
