use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub audio: AudioConfig,
    pub sessions: SessionsConfig,
    pub transcriber: TranscriberConfig,
    pub classifier: ClassifierConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct AudioConfig {
    /// Input device name, or "default"
    pub device: String,
    pub sample_rate: u32,
    pub channels: u16,
    /// Samples per capture buffer
    pub chunk_samples: u32,
}

#[derive(Debug, Deserialize)]
pub struct SessionsConfig {
    /// Root directory holding one subdirectory per session
    pub root: String,
    /// Path of the persisted session metadata file
    pub store_file: String,
}

#[derive(Debug, Deserialize)]
pub struct TranscriberConfig {
    /// External speech-to-text command; the WAV path is appended as the last argument
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct ClassifierConfig {
    /// External classifier command; transcript text is piped on stdin
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
