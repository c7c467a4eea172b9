use std::path::{Path, PathBuf};

use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::audio::AudioBackend;
use crate::error::{Error, Result};
use crate::session::Workspace;

/// Recording lifecycle states.
///
/// `Capturing` is entered only from `Idle`, `Finalizing` only from
/// `Capturing`, and every path returns to `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderState {
    Idle,
    Capturing,
    Finalizing,
}

struct CaptureTask {
    /// The capture task owns the frame buffer; joining it hands the
    /// accumulated samples to the finalize step by value.
    handle: JoinHandle<Vec<i16>>,
    dir: PathBuf,
}

/// Owns the capture lifecycle for one recording at a time.
///
/// At most one capture task is alive system-wide: the controller is a single
/// object behind the session manager and rejects `begin` while a capture is
/// active.
pub struct RecordingController {
    backend: Box<dyn AudioBackend>,
    sample_rate: u32,
    channels: u16,
    state: RecorderState,
    capture: Option<CaptureTask>,
}

impl RecordingController {
    pub fn new(backend: Box<dyn AudioBackend>, sample_rate: u32, channels: u16) -> Self {
        Self {
            backend,
            sample_rate,
            channels,
            state: RecorderState::Idle,
            capture: None,
        }
    }

    pub fn state(&self) -> RecorderState {
        self.state
    }

    pub fn is_recording(&self) -> bool {
        self.state == RecorderState::Capturing
    }

    /// Start capturing into the given workspace.
    ///
    /// Opens the capture device and spawns the capture loop. On
    /// `DeviceUnavailable` the controller remains `Idle`.
    pub async fn begin(&mut self, workspace: &Workspace) -> Result<()> {
        if self.state != RecorderState::Idle {
            return Err(Error::InvalidState(format!(
                "cannot begin recording while {:?}",
                self.state
            )));
        }

        let mut frame_rx = self
            .backend
            .start()
            .await
            .map_err(|e| Error::DeviceUnavailable(format!("{:#}", e)))?;

        // The capture task exclusively owns the buffer. It exits when the
        // frame channel closes, which happens when the device is stopped
        // during finalization.
        let handle = tokio::spawn(async move {
            let mut samples: Vec<i16> = Vec::new();

            while let Some(frame) = frame_rx.recv().await {
                samples.extend_from_slice(&frame.samples);
            }

            samples
        });

        self.capture = Some(CaptureTask {
            handle,
            dir: workspace.dir().to_path_buf(),
        });
        self.state = RecorderState::Capturing;

        info!("Recording started in {}", workspace.dir().display());

        Ok(())
    }

    /// Stop capturing and finalize the buffer into the next-indexed WAV
    /// artifact. Returns the artifact path.
    ///
    /// The state flips to `Finalizing` before the buffer is touched, and the
    /// capture task is joined before the buffer is read: the samples are the
    /// task's return value, so no live mutable buffer is ever shared between
    /// the capture loop and the finalize step. The controller returns to
    /// `Idle` whether or not the artifact write succeeds; a write failure is
    /// reported, not retried.
    pub async fn end(&mut self) -> Result<PathBuf> {
        let capture = self.take_capture("end")?;
        let dir = capture.dir;

        let samples = self.join_capture(capture.handle).await?;

        let workspace = Workspace::open(&dir)?;
        let index = workspace.next_audio_index()?;
        let path = workspace.audio_path(index);

        self.write_artifact(&path, &samples)?;

        info!(
            "Recording stopped, wrote {} samples to {}",
            samples.len(),
            path.display()
        );

        Ok(path)
    }

    /// Stop capturing and discard the buffer without writing an artifact.
    /// Performs the same stop/join sequence as `end`.
    pub async fn abort(&mut self) -> Result<()> {
        let capture = self.take_capture("abort")?;

        let discarded = self.join_capture(capture.handle).await?;

        warn!("Recording aborted, {} samples discarded", discarded.len());

        Ok(())
    }

    fn take_capture(&mut self, op: &str) -> Result<CaptureTask> {
        if self.state != RecorderState::Capturing {
            return Err(Error::InvalidState(format!(
                "cannot {} recording while {:?}",
                op, self.state
            )));
        }

        match self.capture.take() {
            Some(capture) => {
                self.state = RecorderState::Finalizing;
                Ok(capture)
            }
            None => Err(Error::InvalidState(
                "capturing state without an active capture task".to_string(),
            )),
        }
    }

    /// Close the device and join the capture task. Stopping the device
    /// drops the frame sender, the loop drains what was already captured and
    /// exits, and the join hands the buffer over. Always leaves the
    /// controller `Idle`, even when the join fails.
    async fn join_capture(&mut self, handle: JoinHandle<Vec<i16>>) -> Result<Vec<i16>> {
        let stop_result = self.backend.stop().await;
        let joined = handle.await;

        self.state = RecorderState::Idle;

        if let Err(e) = stop_result {
            warn!("Capture backend stop reported: {:#}", e);
        }

        Ok(joined?)
    }

    fn write_artifact(&self, path: &Path, samples: &[i16]) -> Result<()> {
        let spec = hound::WavSpec {
            channels: self.channels,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let mut writer = hound::WavWriter::create(path, spec)?;
        for &sample in samples {
            writer.write_sample(sample)?;
        }
        writer.finalize()?;

        Ok(())
    }
}
