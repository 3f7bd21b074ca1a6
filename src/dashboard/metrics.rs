use serde::Serialize;

use crate::models::{AlertCode, StudentState, StudentStatus};

/// Half-up rounding, matching how the dashboard has always rounded scores.
fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// `max(0, 100 - round(confusion_score))`. Not clamped above for negative input.
pub fn engagement_from_confusion(confusion_score: f64) -> u32 {
    let engagement = 100.0 - round_half_up(confusion_score);
    engagement.max(0.0) as u32
}

pub fn engagement_score(student: &StudentState) -> u32 {
    engagement_from_confusion(student.confusion_score.unwrap_or(0.0))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassroomSummary {
    pub student_count: usize,
    pub average_engagement: u32,
    pub confused_count: usize,
    pub alert_count: usize,
}

impl ClassroomSummary {
    pub fn from_students(students: &[StudentState]) -> Self {
        if students.is_empty() {
            return Self::default();
        }

        let total: u64 = students.iter().map(|s| u64::from(engagement_score(s))).sum();
        let average = round_half_up(total as f64 / students.len() as f64) as u32;

        Self {
            student_count: students.len(),
            average_engagement: average,
            confused_count: students
                .iter()
                .filter(|s| s.status == StudentStatus::Confused)
                .count(),
            alert_count: students.iter().filter(|s| s.alert.is_active()).count(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusColor {
    Red,
    Green,
    Yellow,
    Orange,
    Gray,
    Blue,
}

impl StatusColor {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusColor::Red => "red",
            StatusColor::Green => "green",
            StatusColor::Yellow => "yellow",
            StatusColor::Orange => "orange",
            StatusColor::Gray => "gray",
            StatusColor::Blue => "blue",
        }
    }
}

/// Any active alert overrides status coloring; unknown statuses fall back to blue.
pub fn status_color(status: &StudentStatus, alert: &AlertCode) -> StatusColor {
    if alert.is_active() {
        return StatusColor::Red;
    }
    match status {
        StudentStatus::Focused => StatusColor::Green,
        StudentStatus::Confused => StatusColor::Yellow,
        StudentStatus::Distracted => StatusColor::Orange,
        StudentStatus::Offline => StatusColor::Gray,
        StudentStatus::Other(_) => StatusColor::Blue,
    }
}

pub fn engagement_bar_color(score: u32) -> StatusColor {
    if score < 50 {
        StatusColor::Red
    } else {
        StatusColor::Blue
    }
}

pub fn confusion_highlight(confusion_score: f64) -> StatusColor {
    if confusion_score > 50.0 {
        StatusColor::Yellow
    } else {
        StatusColor::Green
    }
}
