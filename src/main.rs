use std::io::{self, Write};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::thread;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, Level};

use zero_one_solver::{
    batch::{canonize_data, run_batch, BatchConfig},
    render, solve_to_path, DegreePair, OutputFormat,
};

/// Searches for a proof of the 0-1 Polynomial Conjecture for given degrees.
#[derive(Parser)]
#[command(name = "zero-one-solver", version)]
struct Args {
    /// More log output on stderr (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Solve a single degree pair.
    Solve {
        /// Degree of P.
        p_degree: u64,
        /// Degree of Q.
        q_degree: u64,
        #[arg(long, value_enum, default_value_t = Format::Plain)]
        format: Format,
        /// Check system invariants after every step.
        #[arg(long)]
        paranoid: bool,
        /// Write to this file instead of stdout, replacing it only on success.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Write leaf files for every pair up to a total degree.
    Batch {
        #[arg(long)]
        max_total_degree: u16,
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,
        /// Worker threads; one less than the available cores by default.
        #[arg(long)]
        jobs: Option<usize>,
        #[arg(long)]
        paranoid: bool,
    },
    /// Deduplicate leaf systems and write Macaulay2 scripts.
    Canonize {
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,
        #[arg(long, default_value_t = 500)]
        block_size: usize,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Plain,
    Wolfram,
    Latex,
    Binary,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Plain => OutputFormat::PlainText,
            Format::Wolfram => OutputFormat::Wolfram,
            Format::Latex => OutputFormat::Latex,
            Format::Binary => OutputFormat::Binary,
        }
    }
}

fn default_jobs() -> usize {
    thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(8)
        .saturating_sub(1)
        .max(1)
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = match args.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(level)
        .init();

    match args.command {
        Command::Solve {
            p_degree,
            q_degree,
            format,
            paranoid,
            output,
        } => {
            let degrees = DegreePair::new(p_degree, q_degree)?;
            let summary = match output {
                Some(path) => solve_to_path(&path, degrees, format.into(), paranoid)
                    .with_context(|| format!("failed to write {}", path.display()))?,
                None => {
                    let mut stdout = io::stdout().lock();
                    let summary = render(&mut stdout, degrees, format.into(), paranoid)?;
                    stdout.flush()?;
                    summary
                }
            };
            info!(
                %degrees,
                splits = summary.splits,
                leaves = summary.leaves.len(),
                proof = summary.is_proof(),
                "done"
            );
        }
        Command::Batch {
            max_total_degree,
            data_dir,
            jobs,
            paranoid,
        } => {
            let summary = run_batch(&BatchConfig {
                data_dir,
                max_total_degree,
                jobs: jobs.unwrap_or_else(default_jobs),
                paranoid,
            })?;
            info!(
                solved = summary.solved.len(),
                skipped = summary.skipped.len(),
                "batch finished"
            );
        }
        Command::Canonize {
            data_dir,
            block_size,
        } => {
            let summary = canonize_data(&data_dir, block_size)
                .with_context(|| format!("failed to canonize {}", data_dir.display()))?;
            println!(
                "Files for degree <= {} are available. Wrote {} systems in {} blocks.",
                summary.max_total_degree, summary.systems, summary.blocks
            );
        }
    }

    Ok(())
}
