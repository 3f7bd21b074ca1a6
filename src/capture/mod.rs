pub mod controller;
pub mod device;
pub mod encode;
pub mod ffmpeg;
pub mod loop_worker;
pub mod synthetic;

pub use controller::CameraView;
pub use device::{AcquireError, CameraDevice, StreamConstraints, VideoMetadata, VideoStream};
pub use ffmpeg::FfmpegCamera;
pub use loop_worker::CAPTURE_INTERVAL;
pub use synthetic::SyntheticCamera;

use std::sync::{
    atomic::{AtomicBool, AtomicU64, Ordering},
    Mutex,
};

/// Receives the capture loop's output. Calls must not block: frames are emitted
/// fire-and-forget from the capture task.
pub trait CaptureSink: Send + Sync {
    fn on_frame(&self, frame_data: String);
    fn on_error(&self, message: &str);
}

/// Local capture state shared between the loop and its owner.
#[derive(Debug, Default)]
pub struct CaptureStatus {
    active: AtomicBool,
    frames_emitted: AtomicU64,
    error: Mutex<Option<String>>,
}

impl CaptureStatus {
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Returns true on the inactive -> active transition.
    pub(crate) fn mark_active(&self) -> bool {
        !self.active.swap(true, Ordering::SeqCst)
    }

    pub(crate) fn set_inactive(&self) {
        self.active.store(false, Ordering::SeqCst);
    }

    pub fn frames_emitted(&self) -> u64 {
        self.frames_emitted.load(Ordering::SeqCst)
    }

    pub(crate) fn record_frame(&self) {
        self.frames_emitted.fetch_add(1, Ordering::SeqCst);
    }

    pub fn error(&self) -> Option<String> {
        self.error
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub(crate) fn set_error(&self, message: String) {
        *self
            .error
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(message);
    }
}
