use crate::config::SimulationConfig;
use crate::fallback;
use crate::io::results::{ResultSource, SimulationResult};
use crate::profile::CrossSectionProfile;
use crate::storage;
use indicatif::ProgressBar;
use rayon::prelude::*;
use std::sync::Arc;

/// A node scenario for batch runs: id plus its cross-section, if any.
#[derive(Debug, Clone)]
pub struct NodeJob {
    pub node_id: String,
    pub profile: Option<CrossSectionProfile>,
}

/// Run one reach: the storage model when the profile has at least two points
/// and a positive Manning n, otherwise the fallback shape named by
/// `config.scheme_kind`.
pub fn run(config: &SimulationConfig, profile: Option<&CrossSectionProfile>) -> SimulationResult {
    if let Some(profile) = profile {
        if profile.points.len() >= 2 {
            if let Some(n) = profile.usable_manning_n() {
                let points = storage::run_storage_model(config, profile, n);
                return SimulationResult::new(ResultSource::Storage, points);
            }
        }
    }

    log::debug!(
        "No usable cross-section, using {} fallback shape",
        config.scheme_kind
    );
    let points = fallback::generate(config, config.scheme_kind);
    SimulationResult::new(ResultSource::Fallback(config.scheme_kind), points)
}

/// Run independent node scenarios in parallel.
///
/// Results come back in the order of `jobs`.
pub fn run_batch(
    config: &SimulationConfig,
    jobs: &[NodeJob],
    pb: Arc<ProgressBar>,
) -> Vec<(String, SimulationResult)> {
    jobs.par_iter()
        .map(|job| {
            let result = run(config, job.profile.as_ref());
            pb.inc(1);
            (job.node_id.clone(), result)
        })
        .collect()
}

/// Build a rayon pool sized to `threads`, or the number of CPUs when `None`.
pub fn build_thread_pool(threads: Option<usize>) -> anyhow::Result<rayon::ThreadPool> {
    let threads = threads.unwrap_or_else(num_cpus::get).max(1);
    let pool = rayon::ThreadPoolBuilder::new().num_threads(threads).build()?;
    Ok(pool)
}
