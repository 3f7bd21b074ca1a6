use anyhow::{anyhow, Result};
use image::RgbImage;
use log::{debug, warn};
use std::{
    io::{ErrorKind, Read},
    process::{Child, ChildStderr, ChildStdout, Command, Stdio},
    sync::{mpsc, Arc, Mutex},
    thread::{self, JoinHandle},
    time::Duration,
};

use super::device::{AcquireError, CameraDevice, StreamConstraints, VideoMetadata, VideoStream};

const OPEN_TIMEOUT: Duration = Duration::from_secs(5);

/// Webcam read through an `ffmpeg` child process emitting raw RGB24 frames.
pub struct FfmpegCamera {
    device_index: usize,
}

impl FfmpegCamera {
    pub fn new(device_index: usize) -> Self {
        Self { device_index }
    }

    fn input_args(&self) -> Vec<String> {
        if cfg!(target_os = "macos") {
            vec![
                "-f".into(),
                "avfoundation".into(),
                "-i".into(),
                format!("{}:none", self.device_index),
            ]
        } else if cfg!(target_os = "windows") {
            vec![
                "-f".into(),
                "dshow".into(),
                "-i".into(),
                format!("video={}", self.device_index),
            ]
        } else {
            vec![
                "-f".into(),
                "v4l2".into(),
                "-i".into(),
                format!("/dev/video{}", self.device_index),
            ]
        }
    }
}

impl CameraDevice for FfmpegCamera {
    fn open(&self, constraints: &StreamConstraints) -> Result<Box<dyn VideoStream>, AcquireError> {
        let (width, height) = (constraints.ideal_width, constraints.ideal_height);
        let size = format!("{width}x{height}");
        let frame_rate = constraints.max_frame_rate.to_string();

        let mut command = Command::new("ffmpeg");
        command
            .args(["-hide_banner", "-loglevel", "error"])
            .args(["-video_size", size.as_str(), "-framerate", frame_rate.as_str()])
            .args(self.input_args());
        if !constraints.audio {
            command.arg("-an");
        }
        // Scale on output so every frame has the size we advertise.
        command
            .args(["-s", size.as_str(), "-f", "rawvideo", "-pix_fmt", "rgb24", "-"])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = command.spawn().map_err(|err| match err.kind() {
            ErrorKind::NotFound => AcquireError::other("ffmpeg executable not found"),
            ErrorKind::PermissionDenied => AcquireError::PermissionDenied,
            _ => AcquireError::other(err.to_string()),
        })?;

        let (Some(stdout), Some(stderr)) = (child.stdout.take(), child.stderr.take()) else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(AcquireError::other("ffmpeg pipes unavailable"));
        };

        let latest = Arc::new(Mutex::new(None));
        let stderr_log = Arc::new(Mutex::new(String::new()));
        let (first_tx, first_rx) = mpsc::channel();

        let stderr_reader = spawn_stderr_reader(stderr, Arc::clone(&stderr_log));
        let frame_reader = spawn_frame_reader(
            stdout,
            width,
            height,
            Arc::clone(&latest),
            first_tx,
        );

        let mut stream = FfmpegStream {
            child,
            latest,
            width,
            height,
            readers: vec![frame_reader, stderr_reader],
            stopped: false,
        };

        match first_rx.recv_timeout(OPEN_TIMEOUT) {
            Ok(()) => {
                debug!("ffmpeg camera {} streaming {size}", self.device_index);
                Ok(Box::new(stream))
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                stream.stop();
                let stderr = stderr_log
                    .lock()
                    .unwrap_or_else(|poisoned| poisoned.into_inner())
                    .clone();
                Err(classify_ffmpeg_error(&stderr))
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {
                stream.stop();
                Err(AcquireError::other(format!(
                    "no frame from camera {} within {}s",
                    self.device_index,
                    OPEN_TIMEOUT.as_secs()
                )))
            }
        }
    }
}

fn spawn_stderr_reader(mut stderr: ChildStderr, sink: Arc<Mutex<String>>) -> JoinHandle<()> {
    thread::spawn(move || {
        let mut buffer = String::new();
        let _ = stderr.read_to_string(&mut buffer);
        if !buffer.trim().is_empty() {
            debug!("ffmpeg stderr: {}", buffer.trim());
        }
        *sink.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = buffer;
    })
}

fn spawn_frame_reader(
    mut stdout: ChildStdout,
    width: u32,
    height: u32,
    latest: Arc<Mutex<Option<RgbImage>>>,
    first_frame: mpsc::Sender<()>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let frame_len = width as usize * height as usize * 3;
        let mut first_frame = Some(first_frame);
        loop {
            let mut buffer = vec![0u8; frame_len];
            if stdout.read_exact(&mut buffer).is_err() {
                break;
            }
            let Some(frame) = RgbImage::from_raw(width, height, buffer) else {
                warn!("ffmpeg produced a frame of unexpected size");
                break;
            };
            *latest.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(frame);
            if let Some(tx) = first_frame.take() {
                let _ = tx.send(());
            }
        }
    })
}

pub(crate) fn classify_ffmpeg_error(stderr: &str) -> AcquireError {
    let lower = stderr.to_ascii_lowercase();
    if lower.contains("permission denied") || lower.contains("not authorized") {
        AcquireError::PermissionDenied
    } else if lower.contains("device or resource busy") || lower.contains("in use") {
        AcquireError::InUse
    } else if lower.contains("no such file or directory")
        || lower.contains("no such device")
        || lower.contains("could not find")
    {
        AcquireError::NotFound
    } else {
        AcquireError::other(stderr.trim().to_string())
    }
}

struct FfmpegStream {
    child: Child,
    latest: Arc<Mutex<Option<RgbImage>>>,
    width: u32,
    height: u32,
    readers: Vec<JoinHandle<()>>,
    stopped: bool,
}

impl VideoStream for FfmpegStream {
    fn metadata(&self) -> Option<VideoMetadata> {
        let has_frame = self
            .latest
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .is_some();
        (has_frame && !self.stopped).then_some(VideoMetadata {
            width: self.width,
            height: self.height,
        })
    }

    fn grab(&mut self) -> Result<RgbImage> {
        if self.stopped {
            return Err(anyhow!("camera stream already stopped"));
        }
        self.latest
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
            .ok_or_else(|| anyhow!("no frame available yet"))
    }

    fn stop(&mut self) {
        if self.stopped {
            return;
        }
        self.stopped = true;
        if let Err(err) = self.child.kill() {
            debug!("ffmpeg already exited: {err}");
        }
        let _ = self.child.wait();
        for reader in self.readers.drain(..) {
            let _ = reader.join();
        }
    }
}

impl Drop for FfmpegStream {
    fn drop(&mut self) {
        self.stop();
    }
}
