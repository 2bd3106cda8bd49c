//! Asynchronous folder size jobs.
//!
//! A job sums the sizes of every object under a prefix in the background and
//! pushes its state to listeners as it goes: a snapshot on attach, STARTED,
//! PROGRESS, then exactly one of COMPLETED, PARTIAL, FAILED or CANCELED.

pub mod calculator;
pub mod job;
pub mod service;

pub use calculator::{compute, FolderSizeError, PartialReason, ScanLimits, ScanTotals};
pub use job::{
    websocket_path, FolderSizeEvent, FolderSizeEventKind, FolderSizeJob, FolderSizeJobView,
    FolderSizeLaunchResponse, FolderSizeStatus,
};
pub use service::{FolderSizeJobService, Subscription};
