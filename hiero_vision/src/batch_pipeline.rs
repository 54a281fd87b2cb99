// THEORY:
// Segmenting one grid is strictly sequential, but separate scans share nothing,
// so a batch of images can be spread over worker threads. Each job brings its
// own grid and gets its own transient scan state; the only thing shared is the
// read-only pipeline configuration.
//
// Scans are CPU-bound, so they run on tokio's blocking pool. A semaphore caps
// how many run at once, and results come back in input order regardless of
// which finished first.

use crate::core_modules::pixel_grid::PixelGrid;
use crate::error::{Result, SegmentationError};
use crate::pipeline::{PipelineConfig, Segmentation, SegmentationPipeline};
use futures::future::join_all;
use log::info;
use std::sync::Arc;
use tokio::sync::Semaphore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchConfig {
    /// Upper bound on concurrently running scans. Values below 1 are raised to 1.
    pub max_concurrency: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_concurrency: num_cpus::get(),
        }
    }
}

/// One image to segment, tagged with the caller's job identifier.
#[derive(Debug, Clone)]
pub struct BatchJob {
    pub job_id: String,
    pub grid: PixelGrid,
}

#[derive(Debug)]
pub struct BatchOutcome {
    pub job_id: String,
    /// The job's grid, handed back for rendering crops and annotations.
    pub grid: Arc<PixelGrid>,
    pub result: Result<Segmentation>,
}

pub struct BatchPipeline {
    pipeline: Arc<SegmentationPipeline>,
    permits: Arc<Semaphore>,
    max_concurrency: usize,
}

impl BatchPipeline {
    pub fn new(config: PipelineConfig, batch: BatchConfig) -> Result<Self> {
        let pipeline = SegmentationPipeline::new(config)?;
        let max_concurrency = batch.max_concurrency.max(1);
        Ok(Self {
            pipeline: Arc::new(pipeline),
            permits: Arc::new(Semaphore::new(max_concurrency)),
            max_concurrency,
        })
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    pub fn pipeline(&self) -> &SegmentationPipeline {
        &self.pipeline
    }

    /// Segments every job and returns one outcome per job, in input order.
    /// A failed worker only affects its own slot.
    pub async fn segment_all(&self, jobs: Vec<BatchJob>) -> Vec<BatchOutcome> {
        let job_count = jobs.len();
        let tasks = jobs.into_iter().map(|job| self.segment_one(job));
        let outcomes = join_all(tasks).await;

        let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
        info!(
            "segmented {} images ({} failed) with up to {} workers",
            job_count, failed, self.max_concurrency
        );
        outcomes
    }

    async fn segment_one(&self, job: BatchJob) -> BatchOutcome {
        let job_id = job.job_id;
        let grid = Arc::new(job.grid);

        let permit = match Arc::clone(&self.permits).acquire_owned().await {
            Ok(permit) => permit,
            Err(e) => {
                return BatchOutcome {
                    job_id,
                    grid,
                    result: Err(SegmentationError::Worker {
                        message: e.to_string(),
                    }),
                };
            }
        };

        let pipeline = Arc::clone(&self.pipeline);
        let worker_grid = Arc::clone(&grid);
        let handle = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            pipeline.segment(&worker_grid)
        });

        let result = handle.await.map_err(|e| SegmentationError::Worker {
            message: e.to_string(),
        });
        BatchOutcome {
            job_id,
            grid,
            result,
        }
    }
}
