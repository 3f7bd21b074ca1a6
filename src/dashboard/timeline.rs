use chrono::NaiveTime;
use serde::Serialize;
use std::collections::{HashMap, VecDeque};

use crate::models::{AlertCode, StudentState, StudentStatus};

/// Entries kept per student.
pub const TIMELINE_CAPACITY: usize = 10;
/// Entries shown per student card.
pub const TIMELINE_DISPLAY: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineEntry {
    pub status: StudentStatus,
    pub alert: AlertCode,
    /// Wall clock, `HH:MM:SS`.
    pub time: String,
}

impl TimelineEntry {
    pub fn observe(state: &StudentState, at: NaiveTime) -> Self {
        Self {
            status: state.status.clone(),
            alert: state.alert.clone(),
            time: at.format("%H:%M:%S").to_string(),
        }
    }

    /// An active alert wins over the status.
    pub fn label(&self) -> String {
        if self.alert.is_active() {
            self.alert.label()
        } else {
            self.status.to_string()
        }
    }
}

/// Newest-first history per student. Histories are only ever truncated by the
/// cap, never dropped, even for students missing from later polls.
#[derive(Debug, Clone, Default)]
pub struct Timeline {
    histories: HashMap<String, VecDeque<TimelineEntry>>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, student_id: &str, entry: TimelineEntry) {
        let history = self
            .histories
            .entry(student_id.to_string())
            .or_insert_with(|| VecDeque::with_capacity(TIMELINE_CAPACITY));
        history.push_front(entry);
        history.truncate(TIMELINE_CAPACITY);
    }

    pub fn history(&self, student_id: &str) -> Option<&VecDeque<TimelineEntry>> {
        self.histories.get(student_id)
    }

    pub fn len_for(&self, student_id: &str) -> usize {
        self.histories.get(student_id).map_or(0, VecDeque::len)
    }

    pub fn recent(&self, student_id: &str) -> Vec<&TimelineEntry> {
        self.histories
            .get(student_id)
            .map(|history| history.iter().take(TIMELINE_DISPLAY).collect())
            .unwrap_or_default()
    }

    pub fn tracked_students(&self) -> usize {
        self.histories.len()
    }
}
