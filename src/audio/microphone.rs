use anyhow::{anyhow, Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Sample, SizedSample};
use std::sync::mpsc as std_mpsc;
use std::thread;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use super::backend::{AudioBackend, AudioBackendConfig, AudioFrame};

/// Microphone capture backend built on cpal.
///
/// cpal streams are not `Send`, so the stream lives on a dedicated OS thread
/// for the duration of one capture. The thread converts device samples to
/// i16 PCM, groups them into fixed-size frames, and forwards them into a
/// tokio channel. `stop` signals the thread and joins it, which drops the
/// stream and closes the frame channel.
pub struct MicrophoneBackend {
    config: AudioBackendConfig,
    worker: Option<CaptureWorker>,
}

struct CaptureWorker {
    stop_tx: std_mpsc::Sender<()>,
    thread: thread::JoinHandle<()>,
}

impl MicrophoneBackend {
    pub fn new(config: AudioBackendConfig) -> Self {
        Self {
            config,
            worker: None,
        }
    }

    fn open_device(device_name: &str) -> Result<cpal::Device> {
        let host = cpal::default_host();

        if device_name == "default" {
            host.default_input_device()
                .context("no default input device")
        } else {
            host.input_devices()
                .context("failed to enumerate input devices")?
                .find(|d| d.name().ok().as_deref() == Some(device_name))
                .with_context(|| format!("input device not found: {}", device_name))
        }
    }

    /// Build and run the capture stream on the current (dedicated) thread,
    /// parking until a stop signal arrives.
    fn run_capture(
        config: AudioBackendConfig,
        frame_tx: mpsc::Sender<AudioFrame>,
        stop_rx: std_mpsc::Receiver<()>,
        ready_tx: std_mpsc::Sender<Result<()>>,
    ) {
        let stream = match Self::build_capture_stream(&config, frame_tx) {
            Ok(stream) => stream,
            Err(e) => {
                let _ = ready_tx.send(Err(e));
                return;
            }
        };

        if let Err(e) = stream.play() {
            let _ = ready_tx.send(Err(anyhow!("failed to start capture stream: {}", e)));
            return;
        }

        let _ = ready_tx.send(Ok(()));

        // Park until stop is signalled (or the backend is dropped).
        let _ = stop_rx.recv();
        drop(stream);
    }

    fn build_capture_stream(
        config: &AudioBackendConfig,
        frame_tx: mpsc::Sender<AudioFrame>,
    ) -> Result<cpal::Stream> {
        let device = Self::open_device(&config.device)?;
        info!("Input device: {:?}", device.name());

        let default_config = device
            .default_input_config()
            .context("failed to query default input config")?;

        let stream_config = cpal::StreamConfig {
            channels: config.channels,
            sample_rate: cpal::SampleRate(config.sample_rate),
            buffer_size: cpal::BufferSize::Fixed(config.chunk_samples),
        };

        match default_config.sample_format() {
            cpal::SampleFormat::F32 => {
                Self::build_stream::<f32>(&device, &stream_config, config, frame_tx)
            }
            cpal::SampleFormat::I16 => {
                Self::build_stream::<i16>(&device, &stream_config, config, frame_tx)
            }
            cpal::SampleFormat::U16 => {
                Self::build_stream::<u16>(&device, &stream_config, config, frame_tx)
            }
            cpal::SampleFormat::I32 => {
                Self::build_stream::<i32>(&device, &stream_config, config, frame_tx)
            }
            other => anyhow::bail!("unsupported sample format: {:?}", other),
        }
    }

    fn build_stream<T>(
        device: &cpal::Device,
        stream_config: &cpal::StreamConfig,
        config: &AudioBackendConfig,
        frame_tx: mpsc::Sender<AudioFrame>,
    ) -> Result<cpal::Stream>
    where
        T: SizedSample + Sample + Send + 'static,
        <T as Sample>::Float: Into<f32>,
    {
        let sample_rate = config.sample_rate;
        let channels = config.channels;
        let chunk_samples = config.chunk_samples as usize;
        let mut pending: Vec<i16> = Vec::with_capacity(chunk_samples);

        let data_callback = move |data: &[T], _info: &cpal::InputCallbackInfo| {
            for &sample in data {
                let f: f32 = sample.to_float_sample().into();
                let clamped = f.clamp(-1.0, 1.0);
                pending.push((clamped * i16::MAX as f32) as i16);
            }

            while pending.len() >= chunk_samples {
                let rest = pending.split_off(chunk_samples);
                let samples = std::mem::replace(&mut pending, rest);

                let frame = AudioFrame {
                    samples,
                    sample_rate,
                    channels,
                };

                // Never block the audio callback; a full channel means the
                // consumer has fallen behind and the frame is dropped.
                match frame_tx.try_send(frame) {
                    Ok(_) => {}
                    Err(mpsc::error::TrySendError::Full(_)) => {
                        warn!("Frame channel full, dropping capture buffer");
                    }
                    Err(mpsc::error::TrySendError::Closed(_)) => {}
                }
            }
        };

        let error_callback = move |err| {
            error!("Capture stream error: {}", err);
        };

        device
            .build_input_stream(stream_config, data_callback, error_callback, None)
            .context("failed to build input stream")
    }
}

#[async_trait::async_trait]
impl AudioBackend for MicrophoneBackend {
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioFrame>> {
        if self.worker.is_some() {
            anyhow::bail!("microphone capture already running");
        }

        let (frame_tx, frame_rx) = mpsc::channel(64);
        let (stop_tx, stop_rx) = std_mpsc::channel();
        let (ready_tx, ready_rx) = std_mpsc::channel();

        let config = self.config.clone();
        let thread = thread::Builder::new()
            .name("mic-capture".to_string())
            .spawn(move || Self::run_capture(config, frame_tx, stop_rx, ready_tx))
            .context("failed to spawn capture thread")?;

        // Wait for the stream to open (or fail) without blocking the runtime.
        let startup = tokio::task::spawn_blocking(move || ready_rx.recv()).await?;
        match startup {
            Ok(Ok(())) => {
                info!("Microphone capture started");
                self.worker = Some(CaptureWorker { stop_tx, thread });
                Ok(frame_rx)
            }
            Ok(Err(e)) => {
                let _ = thread.join();
                Err(e)
            }
            Err(_) => {
                let _ = thread.join();
                Err(anyhow!("capture thread exited before reporting readiness"))
            }
        }
    }

    async fn stop(&mut self) -> Result<()> {
        if let Some(worker) = self.worker.take() {
            let _ = worker.stop_tx.send(());
            tokio::task::spawn_blocking(move || worker.thread.join())
                .await?
                .map_err(|_| anyhow!("capture thread panicked"))?;
            info!("Microphone capture stopped");
        }
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.worker.is_some()
    }

    fn name(&self) -> &str {
        "microphone"
    }
}

impl Drop for MicrophoneBackend {
    fn drop(&mut self) {
        if let Some(worker) = self.worker.take() {
            let _ = worker.stop_tx.send(());
        }
    }
}
