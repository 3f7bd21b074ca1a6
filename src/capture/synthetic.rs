use anyhow::{bail, Result};
use image::{Rgb, RgbImage};
use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};
use tokio::time::Instant;

use super::device::{AcquireError, CameraDevice, StreamConstraints, VideoMetadata, VideoStream};

/// Generated test-pattern camera for demos and tests.
#[derive(Clone)]
pub struct SyntheticCamera {
    width: Option<u32>,
    height: Option<u32>,
    metadata_delay: Option<Duration>,
    failure: Option<AcquireError>,
    opened: Arc<AtomicUsize>,
    stopped: Arc<AtomicUsize>,
}

impl SyntheticCamera {
    /// Uses the constraint's ideal resolution and reports metadata immediately.
    pub fn new() -> Self {
        Self {
            width: None,
            height: None,
            metadata_delay: Some(Duration::ZERO),
            failure: None,
            opened: Arc::new(AtomicUsize::new(0)),
            stopped: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn with_metadata_delay(mut self, delay: Duration) -> Self {
        self.metadata_delay = Some(delay);
        self
    }

    /// Metadata never arrives.
    pub fn without_metadata(mut self) -> Self {
        self.metadata_delay = None;
        self
    }

    pub fn failing_with(mut self, error: AcquireError) -> Self {
        self.failure = Some(error);
        self
    }

    pub fn open_count(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn stop_count(&self) -> usize {
        self.stopped.load(Ordering::SeqCst)
    }
}

impl Default for SyntheticCamera {
    fn default() -> Self {
        Self::new()
    }
}

impl CameraDevice for SyntheticCamera {
    fn open(&self, constraints: &StreamConstraints) -> Result<Box<dyn VideoStream>, AcquireError> {
        if let Some(error) = &self.failure {
            return Err(error.clone());
        }

        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(SyntheticStream {
            width: self.width.unwrap_or(constraints.ideal_width),
            height: self.height.unwrap_or(constraints.ideal_height),
            metadata_at: self.metadata_delay.map(|delay| Instant::now() + delay),
            frame_index: 0,
            stopped: false,
            stop_counter: Arc::clone(&self.stopped),
        }))
    }
}

struct SyntheticStream {
    width: u32,
    height: u32,
    metadata_at: Option<Instant>,
    frame_index: u32,
    stopped: bool,
    stop_counter: Arc<AtomicUsize>,
}

impl VideoStream for SyntheticStream {
    fn metadata(&self) -> Option<VideoMetadata> {
        if self.stopped {
            return None;
        }
        let ready_at = self.metadata_at?;
        (Instant::now() >= ready_at).then_some(VideoMetadata {
            width: self.width,
            height: self.height,
        })
    }

    fn grab(&mut self) -> Result<RgbImage> {
        if self.stopped {
            bail!("synthetic stream already stopped");
        }
        if self.width == 0 || self.height == 0 {
            bail!("synthetic stream has no dimensions");
        }

        // A vertical bar sweeping across a gradient, so consecutive frames differ.
        let bar = self.frame_index.wrapping_mul(8) % self.width;
        let (width, height) = (self.width, self.height);
        self.frame_index = self.frame_index.wrapping_add(1);

        Ok(RgbImage::from_fn(width, height, |x, y| {
            if x.abs_diff(bar) < 4 {
                Rgb([255, 255, 255])
            } else {
                Rgb([
                    (x * 255 / width) as u8,
                    (y * 255 / height) as u8,
                    96,
                ])
            }
        }))
    }

    fn stop(&mut self) {
        if !self.stopped {
            self.stopped = true;
            self.stop_counter.fetch_add(1, Ordering::SeqCst);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stream_follows_constraints_and_stops_once() {
        let camera = SyntheticCamera::new();
        let mut stream = camera.open(&StreamConstraints::default()).unwrap();

        assert_eq!(
            stream.metadata(),
            Some(VideoMetadata { width: 640, height: 480 })
        );
        let frame = stream.grab().unwrap();
        assert_eq!(frame.dimensions(), (640, 480));

        stream.stop();
        stream.stop();
        assert_eq!(camera.stop_count(), 1);
        assert!(stream.grab().is_err());
    }

    #[test]
    fn configured_failure_is_returned_without_opening() {
        let camera = SyntheticCamera::new().failing_with(AcquireError::InUse);
        let err = camera.open(&StreamConstraints::default()).err().unwrap();

        assert_eq!(err, AcquireError::InUse);
        assert_eq!(camera.open_count(), 0);
    }
}
