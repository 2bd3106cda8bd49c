//! Folder size job service.
//!
//! Jobs are kept in memory, run as tokio tasks bounded by a semaphore and
//! dropped some time after they finish.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, RwLock, Semaphore};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::calculator::{compute, FolderSizeError, ScanLimits};
use super::job::{
    websocket_path, FolderSizeEvent, FolderSizeJob, FolderSizeJobView, FolderSizeLaunchResponse,
};
use crate::config::FolderSizeConfig;
use crate::keys::normalize_prefix;
use crate::storage::{BucketRegistry, ObjectStore};
use crate::{NavError, Result};

/// Interval of the retention sweep.
const CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

/// A listener's view of a job: the snapshot at attach time and every later
/// event.
pub struct Subscription {
    pub snapshot: FolderSizeEvent,
    pub events: broadcast::Receiver<FolderSizeEvent>,
}

/// Launches, tracks and cancels folder size jobs.
pub struct FolderSizeJobService {
    registry: Arc<BucketRegistry>,
    config: FolderSizeConfig,
    jobs: RwLock<HashMap<String, Arc<FolderSizeJob>>>,
    permits: Arc<Semaphore>,
}

impl FolderSizeJobService {
    /// Create a service with `config.parallel_jobs()` workers.
    pub fn new(registry: Arc<BucketRegistry>, config: FolderSizeConfig) -> Self {
        let permits = Arc::new(Semaphore::new(config.parallel_jobs()));
        Self {
            registry,
            config,
            jobs: RwLock::new(HashMap::new()),
            permits,
        }
    }

    /// Queue a job for `prefix` in `bucket_id`.
    pub async fn start(&self, bucket_id: &str, prefix: &str) -> Result<FolderSizeLaunchResponse> {
        let store = Arc::clone(&self.registry.require(bucket_id)?.store);
        let job = Arc::new(FolderSizeJob::new(bucket_id, normalize_prefix(Some(prefix))));
        let view = job.view();

        self.jobs
            .write()
            .await
            .insert(job.id().to_string(), Arc::clone(&job));

        let limits = ScanLimits {
            max_objects: self.config.max_objects,
            max_runtime: self.config.max_runtime(),
        };
        let handle = tokio::spawn(run_job(
            Arc::clone(&job),
            store,
            Arc::clone(&self.permits),
            limits,
            self.config.page_interval(),
        ));
        job.set_worker(handle.abort_handle());

        info!(job_id = %view.id, bucket = bucket_id, prefix = %view.prefix, "Queued folder size job");
        Ok(FolderSizeLaunchResponse {
            websocket_path: websocket_path(&view.id),
            job: view,
        })
    }

    async fn find(&self, job_id: &str) -> Result<Arc<FolderSizeJob>> {
        self.jobs
            .read()
            .await
            .get(job_id)
            .cloned()
            .ok_or_else(|| NavError::NotFound(format!("Job '{job_id}'")))
    }

    async fn find_in_bucket(&self, bucket_id: &str, job_id: &str) -> Result<Arc<FolderSizeJob>> {
        let job = self.find(job_id).await?;
        if job.bucket_id() != bucket_id {
            return Err(NavError::NotFound(format!("Job '{job_id}'")));
        }
        Ok(job)
    }

    /// Current state of a job in `bucket_id`.
    pub async fn get(&self, bucket_id: &str, job_id: &str) -> Result<FolderSizeJobView> {
        Ok(self.find_in_bucket(bucket_id, job_id).await?.view())
    }

    /// Cancel a job in `bucket_id`. Finished jobs are returned unchanged.
    pub async fn cancel(&self, bucket_id: &str, job_id: &str) -> Result<FolderSizeJobView> {
        let job = self.find_in_bucket(bucket_id, job_id).await?;
        Ok(cancel_job(&job))
    }

    /// Cancel a job by id alone, as the stream does.
    pub async fn cancel_by_id(&self, job_id: &str) -> Result<FolderSizeJobView> {
        let job = self.find(job_id).await?;
        Ok(cancel_job(&job))
    }

    /// Whether `job_id` is tracked.
    pub async fn contains(&self, job_id: &str) -> bool {
        self.jobs.read().await.contains_key(job_id)
    }

    /// Register `listener` on a job.
    pub async fn attach_listener(&self, job_id: &str, listener: Uuid) -> Result<Subscription> {
        let job = self.find(job_id).await?;
        let (snapshot, events) = job.subscribe(listener);
        debug!(job_id, %listener, "Listener attached");
        Ok(Subscription { snapshot, events })
    }

    /// Remove `listener`; with cancel-on-disconnect, the last listener leaving
    /// cancels an unfinished job.
    pub async fn detach_listener(&self, job_id: &str, listener: &Uuid) {
        let Ok(job) = self.find(job_id).await else {
            return;
        };
        let remaining = job.unsubscribe(listener);
        debug!(job_id, %listener, remaining, "Listener detached");

        if self.config.cancel_on_disconnect && remaining == 0 && !job.is_terminal() {
            info!(job_id, "Canceling folder size job because all listeners detached");
            job.cancel();
        }
    }

    /// Number of tracked jobs.
    pub async fn job_count(&self) -> usize {
        self.jobs.read().await.len()
    }

    /// Drop finished jobs older than the retention period.
    pub async fn cleanup_expired(&self) -> usize {
        let retention = chrono::Duration::seconds(self.config.retention().as_secs() as i64);
        self.cleanup_finished_before(Utc::now() - retention).await
    }

    async fn cleanup_finished_before(&self, cutoff: DateTime<Utc>) -> usize {
        let mut jobs = self.jobs.write().await;
        let before = jobs.len();
        jobs.retain(|_, job| {
            !(job.is_terminal() && job.finished_at().is_some_and(|finished| finished < cutoff))
        });
        before - jobs.len()
    }

    /// Start the background retention sweep.
    pub fn start_cleanup_task(self: &Arc<Self>) -> JoinHandle<()> {
        let service = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(CLEANUP_INTERVAL);

            // Skip the first immediate tick
            interval.tick().await;

            loop {
                interval.tick().await;
                let removed = service.cleanup_expired().await;
                if removed > 0 {
                    info!(removed, "Cleaned up finished folder size jobs");
                }
            }
        })
    }

    /// Cancel every unfinished job.
    pub async fn shutdown(&self) {
        let jobs = self.jobs.read().await;
        let mut canceled = 0;
        for job in jobs.values() {
            if job.cancel() {
                canceled += 1;
            }
        }
        if canceled > 0 {
            info!(canceled, "Canceled running folder size jobs on shutdown");
        }
    }
}

fn cancel_job(job: &FolderSizeJob) -> FolderSizeJobView {
    if job.cancel() {
        info!(job_id = job.id(), "Canceled folder size job");
    }
    job.view()
}

async fn run_job(
    job: Arc<FolderSizeJob>,
    store: Arc<dyn ObjectStore>,
    permits: Arc<Semaphore>,
    limits: ScanLimits,
    page_interval: u32,
) {
    let Ok(_permit) = permits.acquire_owned().await else {
        job.fail("Worker pool closed");
        return;
    };
    if !job.mark_running() {
        return;
    }
    info!(job_id = job.id(), bucket = job.bucket_id(), prefix = job.prefix(), "Starting folder size job");

    let result = compute(
        store.as_ref(),
        job.prefix(),
        limits,
        job.cancel_flag(),
        page_interval,
        |totals| job.apply_progress(totals),
    )
    .await;

    match result {
        Ok(totals) => {
            info!(
                job_id = job.id(),
                objects = totals.objects_scanned,
                bytes = totals.total_size_bytes,
                partial = totals.partial(),
                "Folder size job finished"
            );
            job.complete(&totals);
        }
        Err(FolderSizeError::Canceled) => {
            debug!(job_id = job.id(), "Folder size job stopped after cancel");
        }
        Err(FolderSizeError::Storage(e)) => {
            warn!(job_id = job.id(), error = %e, "Folder size job failed");
            job.fail(e.to_string());
        }
    }
}
