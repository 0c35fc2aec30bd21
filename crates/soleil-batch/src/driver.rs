//! Worker pool that computes and saves missing horizon profiles

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use soleil_core::{
    build_profile, ComputedProfile, ObstacleSource, ObstacleSourceFactory, PendingPoint, PointId,
    ProfileStore, SEARCH_RADIUS_M,
};
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, error, info, instrument, warn};

use crate::{BatchError, BatchResult, Progress, ProfileBuffer};

pub const DEFAULT_BATCH_SIZE: usize = 100;

pub const DEFAULT_PROGRESS_EVERY: usize = 100;

/// One worker per core, leaving one core free
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(2)
        .saturating_sub(1)
        .max(1)
}

#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub workers: usize,
    pub batch_size: usize,
    pub progress_every: usize,
    pub search_radius_m: f64,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            batch_size: DEFAULT_BATCH_SIZE,
            progress_every: DEFAULT_PROGRESS_EVERY,
            search_radius_m: SEARCH_RADIUS_M,
        }
    }
}

/// Result of one point, sent from a worker to the collector
#[derive(Debug)]
pub enum PointOutcome {
    Computed(ComputedProfile),
    Failed { id: PointId, error: String },
}

/// Totals of a batch run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    /// Points in the backlog when the run started
    pub total: usize,

    /// Profiles computed
    pub computed: usize,

    /// Points without a saved profile after the run, computation or save failures
    pub failed: usize,

    /// Profiles written to the store
    pub persisted: usize,

    pub elapsed: Duration,
}

type WorkQueue = Arc<Mutex<VecDeque<PendingPoint>>>;

/// Compute and save profiles for every point that does not have one yet.
///
/// Per-point failures are logged and leave the point in the backlog for the
/// next run. Only a failure to read the backlog aborts the run.
#[instrument(skip(store, factory))]
pub async fn run_batch(
    store: &dyn ProfileStore,
    factory: Arc<dyn ObstacleSourceFactory>,
    options: &BatchOptions,
) -> BatchResult<BatchReport> {
    if options.workers == 0 {
        return Err(BatchError::InvalidOptions("workers must be at least 1".into()));
    }
    if options.batch_size == 0 {
        return Err(BatchError::InvalidOptions("batch size must be at least 1".into()));
    }

    let pending = store
        .pending_points()
        .await
        .map_err(|e| BatchError::Backlog(format!("{:#}", e)))?;

    if pending.is_empty() {
        info!("All points already have horizon profiles, nothing to do");
        return Ok(BatchReport::default());
    }

    let total = pending.len();
    let workers = options.workers.min(total);
    info!(total, workers, "Computing horizon profiles");

    let queue: WorkQueue = Arc::new(Mutex::new(pending.into_iter().collect()));
    let (tx, mut rx) = mpsc::channel(options.batch_size * 2);

    let handles: Vec<_> = (0..workers)
        .map(|worker_id| {
            tokio::spawn(run_worker(
                worker_id,
                factory.clone(),
                queue.clone(),
                tx.clone(),
                options.search_radius_m,
            ))
        })
        .collect();
    drop(tx);

    let mut report = BatchReport {
        total,
        ..Default::default()
    };
    let mut buffer = ProfileBuffer::new(options.batch_size);
    let mut progress = Progress::new(total, options.progress_every);

    while let Some(outcome) = rx.recv().await {
        match outcome {
            PointOutcome::Computed(profile) => {
                report.computed += 1;
                if buffer.push(profile) {
                    flush(store, &mut buffer, &mut report).await;
                }
            }
            PointOutcome::Failed { id, error } => {
                report.failed += 1;
                warn!(point_id = id, error = %error, "Profile computation failed");
            }
        }
        progress.record();
    }

    flush(store, &mut buffer, &mut report).await;

    for handle in handles {
        if let Err(e) = handle.await {
            error!(error = %e, "Batch worker panicked");
        }
    }

    // Points a panicked worker took off the queue never reported back
    report.failed += total.saturating_sub(progress.done());

    report.elapsed = progress.elapsed();
    let secs = report.elapsed.as_secs_f64();
    info!(
        total = report.total,
        computed = report.computed,
        failed = report.failed,
        persisted = report.persisted,
        elapsed_secs = %format!("{:.1}", secs),
        rate = %format!("{:.1}", if secs > 0.0 { report.computed as f64 / secs } else { 0.0 }),
        "Batch complete"
    );

    Ok(report)
}

async fn flush(store: &dyn ProfileStore, buffer: &mut ProfileBuffer, report: &mut BatchReport) {
    if buffer.is_empty() {
        return;
    }

    let batch = buffer.drain();
    match store.upsert_profiles(&batch).await {
        Ok(()) => {
            report.persisted += batch.len();
            debug!(count = batch.len(), "Saved profile batch");
        }
        Err(e) => {
            report.failed += batch.len();
            error!(count = batch.len(), error = %format!("{:#}", e), "Failed to save profile batch");
        }
    }
}

async fn run_worker(
    worker_id: usize,
    factory: Arc<dyn ObstacleSourceFactory>,
    queue: WorkQueue,
    results: mpsc::Sender<PointOutcome>,
    radius_m: f64,
) {
    let source = match factory.connect().await {
        Ok(source) => Ok(source),
        Err(e) => {
            error!(worker_id, error = %format!("{:#}", e), "Worker could not open obstacle source");
            Err(format!("obstacle source unavailable: {:#}", e))
        }
    };

    loop {
        let next = queue.lock().await.pop_front();
        let Some(point) = next else {
            break;
        };

        let outcome = match &source {
            Ok(source) => compute_point(source.as_ref(), point, radius_m).await,
            Err(error) => PointOutcome::Failed {
                id: point.id,
                error: error.clone(),
            },
        };

        if results.send(outcome).await.is_err() {
            break;
        }
    }

    debug!(worker_id, "Worker finished");
}

async fn compute_point(source: &dyn ObstacleSource, point: PendingPoint, radius_m: f64) -> PointOutcome {
    let obstacles = match source.obstacles_near(&point.point, radius_m).await {
        Ok(obstacles) => obstacles,
        Err(e) => {
            return PointOutcome::Failed {
                id: point.id,
                error: format!("{:#}", e),
            }
        }
    };

    let location = point.point;
    match tokio::task::spawn_blocking(move || build_profile(&location, &obstacles)).await {
        Ok(profile) => PointOutcome::Computed(ComputedProfile {
            point_id: point.id,
            profile,
            computed_at: Utc::now(),
        }),
        Err(e) => PointOutcome::Failed {
            id: point.id,
            error: e.to_string(),
        },
    }
}
