use std::fmt::Write;

use super::{
    metrics::{confusion_highlight, engagement_bar_color, engagement_score, status_color},
    state::DashboardState,
};

const BAR_WIDTH: u32 = 20;

/// Receives the dashboard after every poll.
pub trait DashboardView: Send + Sync {
    fn render(&self, state: &DashboardState);
}

/// Prints the dashboard to stdout.
pub struct TerminalView;

impl DashboardView for TerminalView {
    fn render(&self, state: &DashboardState) {
        println!("{}", render_dashboard(state));
    }
}

fn engagement_bar(score: u32) -> String {
    let filled = (score.min(100) * BAR_WIDTH / 100) as usize;
    format!(
        "[{}{}]",
        "#".repeat(filled),
        ".".repeat(BAR_WIDTH as usize - filled)
    )
}

pub fn render_dashboard(state: &DashboardState) -> String {
    let summary = state.summary();
    let mut out = String::new();

    let _ = writeln!(
        out,
        "SmartSession | Teacher View    ({})",
        state.connection_status.label()
    );
    let _ = writeln!(
        out,
        "Active Students: {}  Avg Engagement: {}%  Confused: {}  Alerts: {}",
        summary.student_count, summary.average_engagement, summary.confused_count, summary.alert_count
    );

    if state.students.is_empty() {
        let _ = writeln!(out, "  (no students)");
        return out;
    }

    for student in &state.students {
        let score = engagement_score(student);
        let confusion = student.confusion_score.unwrap_or(0.0);

        let _ = writeln!(
            out,
            "- {} ({}) [{}: {}]",
            student.display_name(),
            student.student_id,
            status_color(&student.status, &student.alert).as_str(),
            student.status
        );
        let _ = writeln!(
            out,
            "    engagement {} {score}% ({})  faces {}  score {confusion} ({})",
            engagement_bar(score),
            engagement_bar_color(score).as_str(),
            student.face_count,
            confusion_highlight(confusion).as_str()
        );

        for entry in state.timeline.recent(&student.student_id) {
            let _ = writeln!(out, "    {}  {}", entry.time, entry.label());
        }
    }

    out
}
