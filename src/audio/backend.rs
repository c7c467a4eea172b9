use anyhow::Result;
use tokio::sync::mpsc;

/// One buffer's worth of captured audio (16-bit PCM)
#[derive(Debug, Clone)]
pub struct AudioFrame {
    /// Raw audio samples (i16 PCM)
    pub samples: Vec<i16>,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of channels
    pub channels: u16,
}

/// Configuration for an audio capture backend
#[derive(Debug, Clone)]
pub struct AudioBackendConfig {
    /// Input device name, or "default"
    pub device: String,
    /// Capture sample rate in Hz
    pub sample_rate: u32,
    /// Channel count (1 = mono)
    pub channels: u16,
    /// Samples per capture buffer
    pub chunk_samples: u32,
}

impl Default for AudioBackendConfig {
    fn default() -> Self {
        Self {
            device: "default".to_string(),
            sample_rate: 16000, // speech-to-text engines expect 16kHz
            channels: 1,        // Mono
            chunk_samples: 1024,
        }
    }
}

/// Audio capture backend trait
///
/// `start` opens the device and returns a channel receiver that delivers
/// audio frames until the capture is stopped; `stop` closes the device and
/// the channel.
#[async_trait::async_trait]
pub trait AudioBackend: Send + Sync {
    /// Start capturing audio
    ///
    /// Returns a channel receiver that will receive audio frames
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioFrame>>;

    /// Stop capturing audio
    async fn stop(&mut self) -> Result<()>;

    /// Check if backend is currently capturing
    fn is_capturing(&self) -> bool;

    /// Get backend name for logging
    fn name(&self) -> &str;
}

/// Audio backend factory
pub struct AudioBackendFactory;

impl AudioBackendFactory {
    /// Create the capture backend for the configured device
    pub fn create(config: AudioBackendConfig) -> Result<Box<dyn AudioBackend>> {
        let backend = super::microphone::MicrophoneBackend::new(config);
        Ok(Box::new(backend))
    }
}
