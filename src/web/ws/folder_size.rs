//! Folder size progress stream.
//!
//! The socket receives a SNAPSHOT of the job, then every event as a JSON text
//! frame, and is closed normally after the terminal one. A `cancel` text
//! frame cancels the job.

use axum::{
    extract::{
        ws::{close_code, CloseFrame, Message, WebSocket},
        Path, State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::{stream::SplitSink, SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use uuid::Uuid;

use crate::folder_size::{FolderSizeEvent, FolderSizeJobService, Subscription};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::web::middleware::AuthUser;

type WsSender = SplitSink<WebSocket, Message>;

/// GET /api/ws/folder-size/{job_id}
///
/// Browsers pass the session cookie or `?token=` since they cannot set an
/// `Authorization` header on the upgrade request.
pub async fn folder_size_ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Path(job_id): Path<String>,
) -> Result<Response, ApiError> {
    if !state.jobs.contains(&job_id).await {
        return Err(ApiError::not_found(format!("Job '{job_id}' not found")));
    }
    tracing::debug!(username = %claims.sub, job_id = %job_id, "Folder size stream requested");

    let jobs = Arc::clone(&state.jobs);
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, jobs, job_id)))
}

/// Whether a text frame asks to cancel the job.
fn is_cancel_command(text: &str) -> bool {
    text.trim().eq_ignore_ascii_case("cancel")
}

/// Send `event`; returns false when the client is gone.
async fn send_event(sender: &mut WsSender, event: &FolderSizeEvent) -> bool {
    match serde_json::to_string(event) {
        Ok(json) => sender.send(Message::Text(json)).await.is_ok(),
        Err(e) => {
            tracing::warn!("Failed to serialize folder size event: {}", e);
            true
        }
    }
}

async fn close_normally(sender: &mut WsSender) {
    let _ = sender
        .send(Message::Close(Some(CloseFrame {
            code: close_code::NORMAL,
            reason: "Job finished".into(),
        })))
        .await;
}

async fn handle_socket(socket: WebSocket, jobs: Arc<FolderSizeJobService>, job_id: String) {
    let listener = Uuid::new_v4();
    let (mut ws_sender, mut ws_receiver) = socket.split();

    let Subscription {
        snapshot,
        mut events,
    } = match jobs.attach_listener(&job_id, listener).await {
        Ok(subscription) => subscription,
        Err(e) => {
            tracing::debug!(job_id = %job_id, "Folder size stream rejected: {}", e);
            let _ = ws_sender
                .send(Message::Close(Some(CloseFrame {
                    code: close_code::POLICY,
                    reason: "Unknown job".into(),
                })))
                .await;
            return;
        }
    };

    let mut open = send_event(&mut ws_sender, &snapshot).await;
    if open && snapshot.job.status.is_terminal() {
        close_normally(&mut ws_sender).await;
        open = false;
    }

    while open {
        tokio::select! {
            msg = ws_receiver.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        if is_cancel_command(&text) {
                            tracing::debug!(job_id = %job_id, "Cancel requested over stream");
                            if let Err(e) = jobs.cancel_by_id(&job_id).await {
                                tracing::debug!(job_id = %job_id, "Cancel over stream failed: {}", e);
                            }
                        }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        let _ = ws_sender.send(Message::Pong(data)).await;
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        tracing::debug!(job_id = %job_id, "Folder size stream closed by client");
                        break;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::debug!(job_id = %job_id, "WebSocket error: {}", e);
                        break;
                    }
                }
            }

            event = events.recv() => {
                match event {
                    Ok(event) => {
                        if !send_event(&mut ws_sender, &event).await {
                            break;
                        }
                        if event.job.status.is_terminal() {
                            close_normally(&mut ws_sender).await;
                            break;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        // Every event carries the full job state, the next one catches up.
                        tracing::warn!(job_id = %job_id, skipped, "Folder size stream lagged");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        }
    }

    jobs.detach_listener(&job_id, &listener).await;
    tracing::debug!(job_id = %job_id, "Folder size stream ended");
}
