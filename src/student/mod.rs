pub mod app;
pub mod commands;
pub mod state;

pub use app::StudentApp;
pub use state::{BackendStatus, StudentViewState};
