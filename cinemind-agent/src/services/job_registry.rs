//! In-memory rating job registry
//!
//! Jobs live in an `Arc<RwLock<HashMap>>` shared by the HTTP handlers (poll)
//! and the background tasks running the pipeline (update). Finished jobs
//! older than the retention period are pruned whenever a new job is
//! submitted.

use chrono::{Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::models::{
    JobStatus, JobStep, RatingJob, ReviewRequest, ReviewResponse, StateTransition,
    TransitionRejected,
};

/// Upper bound keeping the retention inside chrono's range
const MAX_RETENTION_SECONDS: u64 = 100 * 365 * 24 * 3600;

#[derive(Clone)]
pub struct JobRegistry {
    jobs: Arc<RwLock<HashMap<Uuid, RatingJob>>>,
    retention: Duration,
}

impl JobRegistry {
    pub fn new(retention_seconds: u64) -> Self {
        Self {
            jobs: Arc::new(RwLock::new(HashMap::new())),
            retention: Duration::seconds(retention_seconds.min(MAX_RETENTION_SECONDS) as i64),
        }
    }

    /// Register a pending job
    pub async fn submit(&self, request: ReviewRequest) -> JobStatus {
        let job = RatingJob::new(request);
        let status = job.status();

        let mut jobs = self.jobs.write().await;
        let pruned = prune_finished(&mut jobs, self.retention);
        if pruned > 0 {
            debug!(pruned, "Pruned finished jobs");
        }
        jobs.insert(job.job_id, job);

        info!(job_id = %status.job_id, title = %status.title, "Job submitted");
        status
    }

    /// Handle for reporting progress on one job
    pub fn handle(&self, job_id: Uuid) -> JobHandle {
        JobHandle {
            registry: self.clone(),
            job_id,
        }
    }

    pub async fn status(&self, job_id: Uuid) -> Option<JobStatus> {
        self.jobs.read().await.get(&job_id).map(RatingJob::status)
    }

    /// Full job copy, including a completed result
    pub async fn snapshot(&self, job_id: Uuid) -> Option<RatingJob> {
        self.jobs.read().await.get(&job_id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.jobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.jobs.read().await.is_empty()
    }

    /// Drop finished jobs past the retention period
    pub async fn prune(&self) -> usize {
        prune_finished(&mut *self.jobs.write().await, self.retention)
    }

    async fn apply<F>(&self, job_id: Uuid, update: F) -> bool
    where
        F: FnOnce(&mut RatingJob) -> Result<StateTransition, TransitionRejected>,
    {
        let mut jobs = self.jobs.write().await;
        let Some(job) = jobs.get_mut(&job_id) else {
            warn!(job_id = %job_id, "Update for unknown job ignored");
            return false;
        };

        let current = job.state.name();
        match update(&mut *job) {
            Ok(transition) => {
                debug!(
                    job_id = %job_id,
                    from = transition.old_state,
                    to = transition.new_state,
                    percent = job.percent,
                    "Job state changed"
                );
                true
            }
            Err(reason) => {
                warn!(job_id = %job_id, state = current, ?reason, "Job update ignored");
                false
            }
        }
    }
}

fn prune_finished(jobs: &mut HashMap<Uuid, RatingJob>, retention: Duration) -> usize {
    let cutoff = Utc::now() - retention;
    let before = jobs.len();
    jobs.retain(|_, job| job.finished_at.map_or(true, |finished| finished > cutoff));
    before - jobs.len()
}

/// Progress reporter bound to one job
#[derive(Clone)]
pub struct JobHandle {
    registry: JobRegistry,
    job_id: Uuid,
}

impl JobHandle {
    pub fn job_id(&self) -> Uuid {
        self.job_id
    }

    pub async fn advance(&self, step: JobStep) -> bool {
        self.registry.apply(self.job_id, |job| job.advance(step)).await
    }

    pub async fn complete(&self, result: ReviewResponse) -> bool {
        self.registry.apply(self.job_id, |job| job.complete(result)).await
    }

    pub async fn fail(&self, error: impl Into<String>) -> bool {
        let error = error.into();
        self.registry.apply(self.job_id, |job| job.fail(error)).await
    }
}
