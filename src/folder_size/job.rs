//! Folder size job state and events.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio::task::AbortHandle;
use utoipa::ToSchema;
use uuid::Uuid;

use super::calculator::ScanTotals;

/// Maximum number of events buffered per subscriber.
const CHANNEL_CAPACITY: usize = 64;

/// Lifecycle status of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FolderSizeStatus {
    Queued,
    Running,
    Completed,
    Failed,
    Canceled,
}

impl FolderSizeStatus {
    /// COMPLETED, FAILED and CANCELED are final.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            FolderSizeStatus::Completed | FolderSizeStatus::Failed | FolderSizeStatus::Canceled
        )
    }
}

/// Kind of a pushed event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FolderSizeEventKind {
    Snapshot,
    Started,
    Progress,
    Partial,
    Completed,
    Failed,
    Canceled,
}

impl FolderSizeEventKind {
    /// Events after which the stream ends.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            FolderSizeEventKind::Partial
                | FolderSizeEventKind::Completed
                | FolderSizeEventKind::Failed
                | FolderSizeEventKind::Canceled
        )
    }
}

/// Public view of a job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FolderSizeJobView {
    pub id: String,
    pub bucket_id: String,
    pub prefix: String,
    pub status: FolderSizeStatus,
    pub objects_scanned: u64,
    pub total_size_bytes: u64,
    pub partial: bool,
    pub partial_reason: Option<String>,
    pub message: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

/// One state transition pushed to listeners.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FolderSizeEvent {
    pub event: FolderSizeEventKind,
    pub job: FolderSizeJobView,
}

/// Response of a job launch.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FolderSizeLaunchResponse {
    pub job: FolderSizeJobView,
    pub websocket_path: String,
}

/// WebSocket path streaming a job's events.
pub fn websocket_path(job_id: &str) -> String {
    format!("/api/ws/folder-size/{job_id}")
}

#[derive(Debug)]
struct JobState {
    status: FolderSizeStatus,
    objects_scanned: u64,
    total_size_bytes: u64,
    partial_reason: Option<String>,
    message: Option<String>,
    started_at: Option<DateTime<Utc>>,
    finished_at: Option<DateTime<Utc>>,
    listeners: HashSet<Uuid>,
}

/// A running or finished folder size job.
///
/// State changes happen under the job lock and the matching event is sent
/// before the lock is released, so subscribers observe transitions in order
/// and nothing after a terminal one.
pub struct FolderSizeJob {
    id: String,
    bucket_id: String,
    prefix: String,
    cancel_requested: AtomicBool,
    state: Mutex<JobState>,
    events: broadcast::Sender<FolderSizeEvent>,
    worker: Mutex<Option<AbortHandle>>,
}

impl FolderSizeJob {
    /// Create a QUEUED job for a normalized prefix.
    pub fn new(bucket_id: impl Into<String>, prefix: impl Into<String>) -> Self {
        let (events, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            id: Uuid::new_v4().to_string(),
            bucket_id: bucket_id.into(),
            prefix: prefix.into(),
            cancel_requested: AtomicBool::new(false),
            state: Mutex::new(JobState {
                status: FolderSizeStatus::Queued,
                objects_scanned: 0,
                total_size_bytes: 0,
                partial_reason: None,
                message: None,
                started_at: None,
                finished_at: None,
                listeners: HashSet::new(),
            }),
            events,
            worker: Mutex::new(None),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn bucket_id(&self) -> &str {
        &self.bucket_id
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Flag polled by the calculator.
    pub fn cancel_flag(&self) -> &AtomicBool {
        &self.cancel_requested
    }

    fn lock(&self) -> MutexGuard<'_, JobState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn view_of(&self, state: &JobState) -> FolderSizeJobView {
        FolderSizeJobView {
            id: self.id.clone(),
            bucket_id: self.bucket_id.clone(),
            prefix: self.prefix.clone(),
            status: state.status,
            objects_scanned: state.objects_scanned,
            total_size_bytes: state.total_size_bytes,
            partial: state.partial_reason.is_some(),
            partial_reason: state.partial_reason.clone(),
            message: state.message.clone(),
            started_at: state.started_at,
            finished_at: state.finished_at,
        }
    }

    fn publish(&self, state: &JobState, event: FolderSizeEventKind) {
        // No receivers is fine: nobody is watching yet.
        let _ = self.events.send(FolderSizeEvent {
            event,
            job: self.view_of(state),
        });
    }

    /// Current view.
    pub fn view(&self) -> FolderSizeJobView {
        self.view_of(&self.lock())
    }

    pub fn status(&self) -> FolderSizeStatus {
        self.lock().status
    }

    pub fn is_terminal(&self) -> bool {
        self.status().is_terminal()
    }

    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.lock().finished_at
    }

    /// QUEUED → RUNNING with a STARTED event. Returns false when the job is no
    /// longer queued.
    pub fn mark_running(&self) -> bool {
        let mut state = self.lock();
        if state.status != FolderSizeStatus::Queued {
            return false;
        }
        state.status = FolderSizeStatus::Running;
        state.started_at = Some(Utc::now());
        self.publish(&state, FolderSizeEventKind::Started);
        true
    }

    /// Record running totals with a PROGRESS event.
    pub fn apply_progress(&self, totals: &ScanTotals) {
        let mut state = self.lock();
        if state.status != FolderSizeStatus::Running {
            return;
        }
        state.objects_scanned = state.objects_scanned.max(totals.objects_scanned);
        state.total_size_bytes = state.total_size_bytes.max(totals.total_size_bytes);
        self.publish(&state, FolderSizeEventKind::Progress);
    }

    /// Final totals: COMPLETED, or PARTIAL when a cap stopped the scan.
    pub fn complete(&self, totals: &ScanTotals) {
        let mut state = self.lock();
        if state.status.is_terminal() {
            return;
        }
        state.objects_scanned = state.objects_scanned.max(totals.objects_scanned);
        state.total_size_bytes = state.total_size_bytes.max(totals.total_size_bytes);
        state.status = FolderSizeStatus::Completed;
        state.finished_at = Some(Utc::now());

        let event = match totals.partial_reason {
            Some(reason) => {
                state.partial_reason = Some(reason.as_str().to_string());
                state.message = Some(reason.message());
                FolderSizeEventKind::Partial
            }
            None => FolderSizeEventKind::Completed,
        };
        self.publish(&state, event);
    }

    /// FAILED with the error message.
    pub fn fail(&self, message: impl Into<String>) {
        let mut state = self.lock();
        if state.status.is_terminal() {
            return;
        }
        state.status = FolderSizeStatus::Failed;
        state.message = Some(message.into());
        state.finished_at = Some(Utc::now());
        self.publish(&state, FolderSizeEventKind::Failed);
    }

    /// Raise the cancel flag, stop the worker and move to CANCELED.
    ///
    /// Returns false when the job had already finished.
    pub fn cancel(&self) -> bool {
        self.cancel_requested.store(true, Ordering::SeqCst);
        {
            let mut state = self.lock();
            if state.status.is_terminal() {
                return false;
            }
            state.status = FolderSizeStatus::Canceled;
            state.message = Some("Canceled".to_string());
            state.finished_at = Some(Utc::now());
            self.publish(&state, FolderSizeEventKind::Canceled);
        }
        self.abort_worker();
        true
    }

    /// Remember the task computing this job.
    pub fn set_worker(&self, handle: AbortHandle) {
        *self.worker.lock().unwrap_or_else(PoisonError::into_inner) = Some(handle);
    }

    fn abort_worker(&self) {
        if let Some(handle) = self
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            handle.abort();
        }
    }

    /// Register a listener. Returns a SNAPSHOT of the current state and a
    /// receiver for every later event.
    pub fn subscribe(
        &self,
        listener: Uuid,
    ) -> (FolderSizeEvent, broadcast::Receiver<FolderSizeEvent>) {
        let mut state = self.lock();
        state.listeners.insert(listener);
        let receiver = self.events.subscribe();
        let snapshot = FolderSizeEvent {
            event: FolderSizeEventKind::Snapshot,
            job: self.view_of(&state),
        };
        (snapshot, receiver)
    }

    /// Drop a listener and return how many remain.
    pub fn unsubscribe(&self, listener: &Uuid) -> usize {
        let mut state = self.lock();
        state.listeners.remove(listener);
        state.listeners.len()
    }

    pub fn listener_count(&self) -> usize {
        self.lock().listeners.len()
    }
}
