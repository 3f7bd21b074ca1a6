use anyhow::{Context, Result};
use log::info;
use std::sync::Arc;

use crate::api::ApiClient;
use crate::config::ClientConfig;

use super::{DashboardController, TerminalView};

/// Polls and prints the classroom until Ctrl-C.
pub async fn run_teacher(config: &ClientConfig) -> Result<()> {
    let api = ApiClient::new(config).context("failed to build HTTP client")?;
    let mut dashboard = DashboardController::new(api, Arc::new(TerminalView));

    dashboard.start()?;
    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for Ctrl-C")?;

    info!("Shutting down teacher dashboard");
    dashboard.stop().await?;

    let state = dashboard.snapshot().await;
    info!(
        "Dashboard polled {} times, tracked {} students",
        state.polls,
        state.timeline.tracked_students()
    );
    Ok(())
}
