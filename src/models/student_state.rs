use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StudentStatus {
    Focused,
    Confused,
    Distracted,
    Offline,
    /// Anything the backend reports that this client does not know about.
    Other(String),
}

impl StudentStatus {
    pub fn as_str(&self) -> &str {
        match self {
            StudentStatus::Focused => "FOCUSED",
            StudentStatus::Confused => "CONFUSED",
            StudentStatus::Distracted => "DISTRACTED",
            StudentStatus::Offline => "OFFLINE",
            StudentStatus::Other(raw) => raw,
        }
    }
}

impl From<String> for StudentStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "FOCUSED" => StudentStatus::Focused,
            "CONFUSED" => StudentStatus::Confused,
            "DISTRACTED" => StudentStatus::Distracted,
            "OFFLINE" => StudentStatus::Offline,
            _ => StudentStatus::Other(value),
        }
    }
}

impl From<StudentStatus> for String {
    fn from(value: StudentStatus) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for StudentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Alert code attached to a student. `NONE` is the only non-alert value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AlertCode {
    None,
    Raised(String),
}

impl AlertCode {
    pub fn is_active(&self) -> bool {
        !matches!(self, AlertCode::None)
    }

    pub fn as_str(&self) -> &str {
        match self {
            AlertCode::None => "NONE",
            AlertCode::Raised(code) => code,
        }
    }

    /// Human label for the timeline, e.g. `NO_FACE` -> `NO FACE`.
    /// Only the first underscore is replaced.
    pub fn label(&self) -> String {
        self.as_str().replacen('_', " ", 1)
    }
}

impl Default for AlertCode {
    fn default() -> Self {
        AlertCode::None
    }
}

impl From<String> for AlertCode {
    fn from(value: String) -> Self {
        if value == "NONE" {
            AlertCode::None
        } else {
            AlertCode::Raised(value)
        }
    }
}

impl From<AlertCode> for String {
    fn from(value: AlertCode) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for AlertCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_face_count() -> u32 {
    1
}

/// Per-student state as published by `GET /teacher/sessions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentState {
    pub student_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    pub status: StudentStatus,
    #[serde(default)]
    pub alert: AlertCode,
    #[serde(default)]
    pub confusion_score: Option<f64>,
    #[serde(default = "default_face_count")]
    pub face_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<f64>,
}

impl StudentState {
    pub fn display_name(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => &self.student_id,
        }
    }
}
