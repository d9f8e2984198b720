use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use std::thread;

use tracing::info;

use crate::{
    canon::deduplicate,
    config::DegreePair,
    error::Result,
    parse::parse_leaf_blocks,
    persist::write_atomic,
    polynomial::VariableIndex,
    report::{solve_to_path, OutputFormat},
};

/// Pairs `(i, j)` with `i > j > 0` and `i + j <= max_total`, ordered by
/// `i + j` and then by increasing `j`.
pub fn degree_pairs(max_total: VariableIndex) -> impl Iterator<Item = DegreePair> {
    (0..=u64::from(max_total))
        .flat_map(|total| (0..=total).map(move |j| (total - j, j)))
        .filter(|&(i, j)| i > j && j > 0)
        // i <= max_total, so every pair is in range
        .filter_map(|(i, j)| DegreePair::new(i, j).ok())
}

pub fn leaf_file_name(degrees: DegreePair) -> String {
    format!(
        "ZeroOneEquations_{:04}_{:04}.txt",
        degrees.p_degree(),
        degrees.q_degree()
    )
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchConfig {
    pub data_dir: PathBuf,
    pub max_total_degree: VariableIndex,
    pub jobs: usize,
    pub paranoid: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub solved: Vec<DegreePair>,
    pub skipped: Vec<DegreePair>,
}

/// Writes the plain-text leaf file of every pair up to the configured total
/// degree that does not have one yet, `jobs` pairs at a time.
pub fn run_batch(config: &BatchConfig) -> Result<BatchSummary> {
    fs::create_dir_all(&config.data_dir)?;

    let mut summary = BatchSummary::default();
    let mut pending = Vec::new();
    for degrees in degree_pairs(config.max_total_degree) {
        let path = config.data_dir.join(leaf_file_name(degrees));
        if path.is_file() {
            info!(%degrees, path = %path.display(), "already computed");
            summary.skipped.push(degrees);
        } else {
            pending.push((degrees, path));
        }
    }

    let queue = Mutex::new(pending.into_iter());
    let results: Vec<Result<Vec<DegreePair>>> = thread::scope(|scope| {
        let workers: Vec<_> = (0..config.jobs.max(1))
            .map(|_| scope.spawn(|| solve_queued(&queue, config.paranoid)))
            .collect();
        workers
            .into_iter()
            .map(|worker| {
                worker
                    .join()
                    .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
            })
            .collect()
    });

    for solved in results {
        summary.solved.extend(solved?);
    }
    summary.solved.sort_by_key(|degrees| (degrees.total(), degrees.q_degree()));
    Ok(summary)
}

fn solve_queued(
    queue: &Mutex<impl Iterator<Item = (DegreePair, PathBuf)>>,
    paranoid: bool,
) -> Result<Vec<DegreePair>> {
    let mut solved = Vec::new();
    loop {
        let next = queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .next();
        let Some((degrees, path)) = next else {
            return Ok(solved);
        };

        info!(%degrees, "starting computation");
        let result = solve_to_path(&path, degrees, OutputFormat::PlainText, paranoid)?;
        info!(%degrees, leaves = result.leaves.len(), "finished computation");
        solved.push(degrees);
    }
}

/// The largest `k` such that every pair with `i + j <= k` has a leaf file.
pub fn count_available(data_dir: &Path) -> VariableIndex {
    let complete = |total: VariableIndex| {
        degree_pairs(total)
            .filter(|degrees| degrees.total() == u32::from(total))
            .all(|degrees| data_dir.join(leaf_file_name(degrees)).is_file())
    };
    // totals 0, 1 and 2 have no pairs and are always complete
    (1..=VariableIndex::MAX)
        .find(|&total| !complete(total))
        .map_or(VariableIndex::MAX, |total| total - 1)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanonizeSummary {
    pub max_total_degree: VariableIndex,
    pub systems: usize,
    pub blocks: usize,
}

pub fn block_file_name(block: usize) -> String {
    format!("CanonizedEquationBlock_{block:04}.m2")
}

/// Reads every leaf file up to the largest complete total degree, keeps one
/// system per renaming class and writes them as Macaulay2 scripts,
/// `block_size` systems per file.
pub fn canonize_data(data_dir: &Path, block_size: usize) -> Result<CanonizeSummary> {
    let max_total_degree = count_available(data_dir);
    info!(max_total_degree, "leaf files are available");

    let mut systems = Vec::new();
    for degrees in degree_pairs(max_total_degree) {
        let text = fs::read_to_string(data_dir.join(leaf_file_name(degrees)))?;
        systems.extend(parse_leaf_blocks(&text)?);
    }
    let unique = deduplicate(systems);

    let mut blocks = 0;
    for (index, chunk) in unique.chunks(block_size.max(1)).enumerate() {
        let script: String = chunk.iter().map(|system| system.macaulay_script()).collect();
        write_atomic(&data_dir.join(block_file_name(index)), script.as_bytes())?;
        blocks += 1;
    }
    info!(systems = unique.len(), blocks, "canonized leaf systems");

    Ok(CanonizeSummary {
        max_total_degree,
        systems: unique.len(),
        blocks,
    })
}
