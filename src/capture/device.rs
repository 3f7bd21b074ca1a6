use anyhow::Result;
use image::RgbImage;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamConstraints {
    pub ideal_width: u32,
    pub ideal_height: u32,
    pub max_frame_rate: u32,
    pub audio: bool,
}

impl Default for StreamConstraints {
    fn default() -> Self {
        Self {
            ideal_width: 640,
            ideal_height: 480,
            max_frame_rate: 30,
            audio: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoMetadata {
    pub width: u32,
    pub height: u32,
}

impl VideoMetadata {
    pub fn has_dimensions(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

/// Why a camera stream could not be acquired. `Display` is the message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AcquireError {
    #[error("Permission denied. Please allow camera access.")]
    PermissionDenied,
    #[error("No camera device found.")]
    NotFound,
    #[error("Camera is likely in use by another app.")]
    InUse,
    #[error("Could not access camera.")]
    Other { detail: String },
}

impl AcquireError {
    pub fn other(detail: impl Into<String>) -> Self {
        AcquireError::Other {
            detail: detail.into(),
        }
    }
}

/// A live video stream. Dropping it without calling `stop` leaks the device,
/// so the capture loop always holds it through a [`StreamGuard`].
pub trait VideoStream: Send {
    /// `None` until the first frame dimensions are known.
    fn metadata(&self) -> Option<VideoMetadata>;

    /// Current frame at native resolution.
    fn grab(&mut self) -> Result<RgbImage>;

    /// Stops every track. Must be idempotent.
    fn stop(&mut self);
}

pub trait CameraDevice: Send + Sync {
    fn open(&self, constraints: &StreamConstraints) -> Result<Box<dyn VideoStream>, AcquireError>;
}

pub struct StreamGuard {
    stream: Box<dyn VideoStream>,
}

impl StreamGuard {
    pub fn new(stream: Box<dyn VideoStream>) -> Self {
        Self { stream }
    }

    pub fn stream(&mut self) -> &mut dyn VideoStream {
        self.stream.as_mut()
    }
}

impl Drop for StreamGuard {
    fn drop(&mut self) {
        self.stream.stop();
    }
}
