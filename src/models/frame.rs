use serde::{Deserialize, Serialize};

pub const DEFAULT_STUDENT_ID: &str = "S1";
pub const DEFAULT_SESSION_ID: &str = "LIVE_SESSION";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentIdentity {
    pub student_id: String,
    pub session_id: String,
}

impl Default for StudentIdentity {
    fn default() -> Self {
        Self {
            student_id: DEFAULT_STUDENT_ID.into(),
            session_id: DEFAULT_SESSION_ID.into(),
        }
    }
}

/// Body of `POST /student/process-frame`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FramePayload {
    pub student_id: String,
    pub session_id: String,
    /// JPEG data URI (`data:image/jpeg;base64,...`).
    pub frame_data: String,
}

impl FramePayload {
    pub fn new(identity: &StudentIdentity, frame_data: String) -> Self {
        Self {
            student_id: identity.student_id.clone(),
            session_id: identity.session_id.clone(),
            frame_data,
        }
    }
}
