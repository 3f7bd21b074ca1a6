pub mod commands;
pub mod controller;
pub mod metrics;
pub mod render;
pub mod state;
pub mod timeline;

pub use controller::{poll_once, DashboardController, POLL_INTERVAL};
pub use metrics::{engagement_score, status_color, ClassroomSummary, StatusColor};
pub use render::{render_dashboard, DashboardView, TerminalView};
pub use state::{ConnectionStatus, DashboardState};
pub use timeline::{Timeline, TimelineEntry, TIMELINE_CAPACITY, TIMELINE_DISPLAY};
