use chrono::NaiveTime;
use serde::Serialize;

use crate::api::ApiError;
use crate::models::StudentState;

use super::{
    metrics::ClassroomSummary,
    timeline::{Timeline, TimelineEntry},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConnectionStatus {
    Connected,
    Disconnected,
}

impl ConnectionStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ConnectionStatus::Connected => "Live System",
            ConnectionStatus::Disconnected => "Disconnected",
        }
    }
}

#[derive(Debug, Clone)]
pub struct DashboardState {
    pub students: Vec<StudentState>,
    pub timeline: Timeline,
    pub connection_status: ConnectionStatus,
    pub polls: u64,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self {
            students: Vec::new(),
            timeline: Timeline::new(),
            connection_status: ConnectionStatus::Connected,
            polls: 0,
        }
    }
}

impl DashboardState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the student list wholesale and prepends one timeline entry per pulled student.
    pub fn apply_poll(&mut self, students: Vec<StudentState>, now: NaiveTime) {
        for student in &students {
            self.timeline
                .record(&student.student_id, TimelineEntry::observe(student, now));
        }
        self.students = students;
        self.polls += 1;
    }

    /// A failed fetch degrades to an empty pull; only the connection indicator differs.
    pub fn apply_poll_result(
        &mut self,
        result: Result<Vec<StudentState>, ApiError>,
        now: NaiveTime,
    ) {
        match result {
            Ok(students) => {
                self.connection_status = ConnectionStatus::Connected;
                self.apply_poll(students, now);
            }
            Err(_) => {
                self.connection_status = ConnectionStatus::Disconnected;
                self.apply_poll(Vec::new(), now);
            }
        }
    }

    pub fn summary(&self) -> ClassroomSummary {
        ClassroomSummary::from_students(&self.students)
    }
}
