//! HTTP collaborator: frame submission and student-state polling.

mod client;

pub use client::{ApiClient, ApiError, PROCESS_FRAME_PATH, SESSIONS_PATH};
