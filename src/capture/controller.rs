use anyhow::{bail, Context, Result};
use log::info;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::Duration;
use tokio_util::sync::CancellationToken;

use super::{
    device::{CameraDevice, StreamConstraints},
    loop_worker::{capture_loop, CAPTURE_INTERVAL},
    CaptureSink, CaptureStatus,
};

/// Owns the camera for as long as capture runs. Every `start` must be paired
/// with `stop`, which cancels the ticker and waits until the stream is released.
pub struct CameraView {
    device: Arc<dyn CameraDevice>,
    constraints: StreamConstraints,
    interval: Duration,
    status: Arc<CaptureStatus>,
    handle: Option<JoinHandle<()>>,
    cancel_token: Option<CancellationToken>,
}

impl CameraView {
    pub fn new(device: Arc<dyn CameraDevice>) -> Self {
        Self {
            device,
            constraints: StreamConstraints::default(),
            interval: CAPTURE_INTERVAL,
            status: Arc::new(CaptureStatus::default()),
            handle: None,
            cancel_token: None,
        }
    }

    pub fn with_constraints(mut self, constraints: StreamConstraints) -> Self {
        self.constraints = constraints;
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn start(&mut self, sink: Arc<dyn CaptureSink>) -> Result<()> {
        if self.handle.is_some() {
            bail!("capture already active");
        }

        // A fresh status per run so a previous error does not leak into this one.
        self.status = Arc::new(CaptureStatus::default());

        let cancel_token = CancellationToken::new();
        let handle = tokio::spawn(capture_loop(
            Arc::clone(&self.device),
            self.constraints,
            self.interval,
            sink,
            Arc::clone(&self.status),
            cancel_token.clone(),
        ));

        info!(
            "camera capture started ({}x{} ideal, {}ms interval)",
            self.constraints.ideal_width,
            self.constraints.ideal_height,
            self.interval.as_millis()
        );

        self.handle = Some(handle);
        self.cancel_token = Some(cancel_token);
        Ok(())
    }

    pub async fn stop(&mut self) -> Result<()> {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }

        if let Some(handle) = self.handle.take() {
            handle
                .await
                .context("capture loop task failed to join")
                .map(|_| ())
        } else {
            Ok(())
        }
    }

    /// Tear down and re-acquire, e.g. after the sink changed.
    pub async fn restart(&mut self, sink: Arc<dyn CaptureSink>) -> Result<()> {
        self.stop().await?;
        self.start(sink)
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    pub fn is_stream_active(&self) -> bool {
        self.status.is_active()
    }

    pub fn error(&self) -> Option<String> {
        self.status.error()
    }

    pub fn frames_emitted(&self) -> u64 {
        self.status.frames_emitted()
    }
}

impl Drop for CameraView {
    fn drop(&mut self) {
        // The loop releases the stream as soon as it observes the cancellation.
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{AcquireError, SyntheticCamera};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSink {
        frames: Mutex<Vec<String>>,
        errors: Mutex<Vec<String>>,
    }

    impl CaptureSink for RecordingSink {
        fn on_frame(&self, frame_data: String) {
            self.frames.lock().unwrap().push(frame_data);
        }

        fn on_error(&self, message: &str) {
            self.errors.lock().unwrap().push(message.to_string());
        }
    }

    fn small_camera() -> SyntheticCamera {
        SyntheticCamera::new().with_dimensions(32, 24)
    }

    #[tokio::test(start_paused = true)]
    async fn emits_jpeg_frames_once_metadata_is_loaded() {
        let camera = small_camera().with_metadata_delay(Duration::from_millis(450));
        let sink = Arc::new(RecordingSink::default());
        let mut view = CameraView::new(Arc::new(camera.clone()));

        view.start(sink.clone()).unwrap();
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert!(!view.is_stream_active());
        assert!(sink.frames.lock().unwrap().is_empty());

        tokio::time::sleep(Duration::from_millis(700)).await;
        assert!(view.is_stream_active());
        let frames = sink.frames.lock().unwrap().clone();
        assert!(!frames.is_empty());
        assert!(frames.iter().all(|f| f.starts_with("data:image/jpeg;base64,")));

        view.stop().await.unwrap();
        assert_eq!(camera.open_count(), 1);
        assert_eq!(camera.stop_count(), 1);
        assert!(!view.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn zero_sized_video_emits_nothing() {
        let camera = SyntheticCamera::new().with_dimensions(0, 0);
        let sink = Arc::new(RecordingSink::default());
        let mut view = CameraView::new(Arc::new(camera.clone()));

        view.start(sink.clone()).unwrap();
        tokio::time::sleep(Duration::from_secs(2)).await;

        assert!(view.is_stream_active());
        assert!(sink.frames.lock().unwrap().is_empty());
        assert_eq!(view.frames_emitted(), 0);

        view.stop().await.unwrap();
        assert_eq!(camera.stop_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_are_noops_without_metadata() {
        let camera = small_camera().without_metadata();
        let sink = Arc::new(RecordingSink::default());
        let mut view = CameraView::new(Arc::new(camera.clone()));

        view.start(sink.clone()).unwrap();
        tokio::time::sleep(Duration::from_secs(2)).await;

        assert!(!view.is_stream_active());
        assert!(sink.frames.lock().unwrap().is_empty());
        view.stop().await.unwrap();
        assert_eq!(camera.stop_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn acquisition_failure_reaches_error_sink() {
        let camera = small_camera().failing_with(AcquireError::PermissionDenied);
        let sink = Arc::new(RecordingSink::default());
        let mut view = CameraView::new(Arc::new(camera));

        view.start(sink.clone()).unwrap();
        tokio::time::sleep(Duration::from_millis(500)).await;

        let expected = "Permission denied. Please allow camera access.";
        assert_eq!(view.error().as_deref(), Some(expected));
        assert_eq!(*sink.errors.lock().unwrap(), vec![expected.to_string()]);
        assert!(sink.frames.lock().unwrap().is_empty());
        view.stop().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn restart_releases_previous_stream() {
        let camera = small_camera();
        let sink = Arc::new(RecordingSink::default());
        let mut view = CameraView::new(Arc::new(camera.clone()));

        view.start(sink.clone()).unwrap();
        assert!(view.start(sink.clone()).is_err());
        tokio::time::sleep(Duration::from_millis(500)).await;

        view.restart(sink.clone()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(500)).await;
        view.stop().await.unwrap();

        assert_eq!(camera.open_count(), 2);
        assert_eq!(camera.stop_count(), 2);
    }
}
