use anyhow::{Context, Result};
use log::{info, warn};
use std::sync::Arc;
use tokio::time::{self, Duration};

use crate::api::ApiClient;
use crate::capture::{CameraDevice, CameraView, FfmpegCamera, SyntheticCamera};
use crate::config::ClientConfig;
use crate::connection::Connection;
use crate::models::StudentIdentity;

use super::StudentApp;

const STATUS_INTERVAL: Duration = Duration::from_secs(2);
const SOCKET_PATH: &str = "ws/student";

#[derive(Debug, Clone)]
pub struct StudentOptions {
    pub identity: StudentIdentity,
    pub device_index: usize,
    pub synthetic: bool,
}

/// Captures and submits frames until Ctrl-C, then releases the camera and the connection.
pub async fn run_student(config: &ClientConfig, options: StudentOptions) -> Result<()> {
    let api = ApiClient::new(config).context("failed to build HTTP client")?;

    let connection = Connection::new();
    let listener = connection.subscribe(|event| info!("connection event: {event:?}"));
    connection.connect(&config.socket_url(SOCKET_PATH));

    let app = StudentApp::new(api, options.identity.clone()).with_connection(connection.clone());

    let device: Arc<dyn CameraDevice> = if options.synthetic {
        Arc::new(SyntheticCamera::new())
    } else {
        Arc::new(FfmpegCamera::new(options.device_index))
    };

    info!(
        "Student {} joining session {} via {}",
        options.identity.student_id,
        options.identity.session_id,
        config.base_url
    );

    let mut camera = CameraView::new(device);
    camera.start(Arc::new(app.clone()))?;

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);
    let mut status_ticker = time::interval(STATUS_INTERVAL);
    let mut reported_error = false;

    loop {
        tokio::select! {
            result = &mut shutdown => {
                if let Err(err) = result {
                    warn!("failed to listen for Ctrl-C: {err}");
                }
                break;
            }
            _ = status_ticker.tick() => {
                let view = app.snapshot();
                println!("{}  {}", view.header_line(), view.debug_line());
                if view.camera_error.is_some() && !reported_error {
                    reported_error = true;
                    println!("Capture is stopped. Restart the client to retry.");
                }
            }
        }
    }

    info!("Shutting down student client");
    camera.stop().await?;
    app.shutdown();
    connection.unsubscribe(listener);
    connection.shutdown();

    let view = app.snapshot();
    info!(
        "Submitted {} frames ({} failed)",
        view.frames_submitted, view.frames_failed
    );
    Ok(())
}
