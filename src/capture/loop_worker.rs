use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::time::{Duration, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use super::{
    device::{CameraDevice, StreamConstraints, StreamGuard},
    encode::encode_frame_data_uri,
    CaptureSink, CaptureStatus,
};

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_error, log_info, log_warn};

pub const CAPTURE_INTERVAL: Duration = Duration::from_millis(200);

pub async fn capture_loop(
    device: Arc<dyn CameraDevice>,
    constraints: StreamConstraints,
    interval: Duration,
    sink: Arc<dyn CaptureSink>,
    status: Arc<CaptureStatus>,
    cancel_token: CancellationToken,
) {
    // Acquisition is not raced against cancellation: a stream opened while we
    // were being torn down still has to pass through the guard to be released.
    let opened = tokio::task::spawn_blocking(move || device.open(&constraints)).await;

    let mut guard = match opened {
        Ok(Ok(stream)) => StreamGuard::new(stream),
        Ok(Err(err)) => {
            log_error!("Camera initialization failed: {err:?}");
            let message = err.to_string();
            status.set_error(message.clone());
            sink.on_error(&message);
            return;
        }
        Err(join_err) => {
            log_error!("Camera initialization worker failed: {join_err}");
            let message = super::device::AcquireError::other(join_err.to_string()).to_string();
            status.set_error(message.clone());
            sink.on_error(&message);
            return;
        }
    };

    if cancel_token.is_cancelled() {
        log_info!("capture cancelled during acquisition, releasing stream");
        return;
    }

    log_info!("camera stream acquired, capturing every {}ms", interval.as_millis());

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match capture_tick(&mut guard, &status).await {
                    Ok(Some(frame_data)) => {
                        status.record_frame();
                        sink.on_frame(frame_data);
                    }
                    Ok(None) => {}
                    Err(err) => log_warn!("capture tick failed: {err:?}"),
                }
            }
            _ = cancel_token.cancelled() => {
                log_info!("capture loop shutting down");
                break;
            }
        }
    }

    status.set_inactive();
    drop(guard);
}

/// One capture tick. `Ok(None)` until the stream is active and has nonzero dimensions.
pub(crate) async fn capture_tick(
    guard: &mut StreamGuard,
    status: &CaptureStatus,
) -> Result<Option<String>> {
    let Some(metadata) = guard.stream().metadata() else {
        return Ok(None);
    };

    if status.mark_active() {
        log_info!("camera metadata loaded: {}x{}", metadata.width, metadata.height);
    }

    if !metadata.has_dimensions() {
        return Ok(None);
    }

    let tick_start = Instant::now();
    let frame = guard.stream().grab().context("frame grab failed")?;

    let frame_data = tokio::task::spawn_blocking(move || encode_frame_data_uri(&frame))
        .await
        .context("frame encoding worker join failed")??;

    log_debug!(
        "captured frame: {} bytes in {}ms",
        frame_data.len(),
        tick_start.elapsed().as_millis()
    );

    Ok(Some(frame_data))
}
