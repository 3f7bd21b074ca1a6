use log::{error, info};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio_util::sync::CancellationToken;

use crate::api::ApiClient;
use crate::capture::CaptureSink;
use crate::connection::{Connection, OutboundMessage};
use crate::models::{FramePayload, StudentIdentity};

use super::state::{BackendStatus, StudentViewState};

/// Bridges captured frames to the backend and tracks what the student sees.
#[derive(Clone)]
pub struct StudentApp {
    api: ApiClient,
    identity: StudentIdentity,
    connection: Option<Connection>,
    state: Arc<Mutex<StudentViewState>>,
    shutdown: CancellationToken,
}

impl StudentApp {
    pub fn new(api: ApiClient, identity: StudentIdentity) -> Self {
        Self {
            api,
            identity,
            connection: None,
            state: Arc::new(Mutex::new(StudentViewState::default())),
            shutdown: CancellationToken::new(),
        }
    }

    /// Mirror a summary of every frame onto the (mock) realtime connection.
    pub fn with_connection(mut self, connection: Connection) -> Self {
        self.connection = Some(connection);
        self
    }

    pub fn identity(&self) -> &StudentIdentity {
        &self.identity
    }

    fn lock_state(&self) -> MutexGuard<'_, StudentViewState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn snapshot(&self) -> StudentViewState {
        self.lock_state().clone()
    }

    /// Submits one frame. A failed submission is dropped; the next tick supersedes it.
    pub async fn handle_frame(&self, frame_data: String) -> Option<BackendStatus> {
        if self.shutdown.is_cancelled() {
            return None;
        }

        let size = frame_data.len();
        info!("Frame received: {size} bytes");
        self.lock_state().last_frame_size = size;

        if let Some(connection) = &self.connection {
            connection.send(
                &OutboundMessage::new("FRAME")
                    .with("studentId", self.identity.student_id.as_str())
                    .with("sessionId", self.identity.session_id.as_str())
                    .with("bytes", size),
            );
        }

        let payload = FramePayload::new(&self.identity, frame_data);
        let outcome = tokio::select! {
            result = self.api.submit_frame(&payload) => result,
            _ = self.shutdown.cancelled() => return None,
        };

        let mut state = self.lock_state();
        match outcome {
            Ok(_) => {
                state.backend_status = BackendStatus::Connected;
                state.frames_submitted += 1;
            }
            Err(err) => {
                error!("Backend Error: {err}");
                state.backend_status = BackendStatus::Offline;
                state.frames_failed += 1;
            }
        }
        Some(state.backend_status)
    }

    pub fn handle_camera_error(&self, message: &str) {
        error!("Camera Error in App: {message}");
        self.lock_state().camera_error = Some(message.to_string());
    }

    /// Abandons in-flight submissions; nothing updates the view afterwards.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }
}

impl CaptureSink for StudentApp {
    fn on_frame(&self, frame_data: String) {
        let app = self.clone();
        tokio::spawn(async move {
            app.handle_frame(frame_data).await;
        });
    }

    fn on_error(&self, message: &str) {
        self.handle_camera_error(message);
    }
}
