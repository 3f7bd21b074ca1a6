use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum BackendStatus {
    Checking,
    Connected,
    Offline,
}

impl Default for BackendStatus {
    fn default() -> Self {
        BackendStatus::Checking
    }
}

impl fmt::Display for BackendStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BackendStatus::Checking => "Checking...",
            BackendStatus::Connected => "Connected",
            BackendStatus::Offline => "Backend Offline",
        };
        f.write_str(label)
    }
}

/// What the student view displays. Only the size of the last frame is kept,
/// never the frame itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentViewState {
    pub last_frame_size: usize,
    pub camera_error: Option<String>,
    pub backend_status: BackendStatus,
    pub frames_submitted: u64,
    pub frames_failed: u64,
}

impl StudentViewState {
    pub fn header_line(&self) -> String {
        let camera = if self.camera_error.is_some() { "Error" } else { "Ready" };
        format!("Camera: {camera} | Backend: {}", self.backend_status)
    }

    pub fn debug_line(&self) -> String {
        if let Some(error) = &self.camera_error {
            format!("[ERROR] {error}")
        } else if self.last_frame_size > 0 {
            format!(
                "[INFO] Frame Received • Size: {:.2} KB",
                self.last_frame_size as f64 / 1024.0
            )
        } else {
            "[WAITING] Initializing camera feed...".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_line_prefers_camera_error() {
        let mut state = StudentViewState::default();
        assert_eq!(state.debug_line(), "[WAITING] Initializing camera feed...");
        assert_eq!(state.header_line(), "Camera: Ready | Backend: Checking...");

        state.last_frame_size = 2048;
        assert_eq!(state.debug_line(), "[INFO] Frame Received • Size: 2.00 KB");

        state.camera_error = Some("No camera device found.".into());
        assert_eq!(state.debug_line(), "[ERROR] No camera device found.");
        assert!(state.header_line().starts_with("Camera: Error"));
    }
}
