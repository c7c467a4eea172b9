//! Speech-to-text gating
//!
//! The speech-to-text engine is an external collaborator: it consumes a
//! mono 16-bit 16 kHz WAV file and returns UTF-8 text. `TranscriptionGate`
//! enforces the artifact preconditions before the collaborator is invoked
//! and persists the resulting transcript into the workspace.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use anyhow::Context;
use tokio::process::Command;
use tracing::info;

use crate::error::{Error, Result};
use crate::session::Workspace;

/// Speech-to-text collaborator seam.
#[async_trait::async_trait]
pub trait SpeechToText: Send + Sync {
    /// Transcribe a mono 16-bit 16 kHz WAV file into UTF-8 text.
    async fn transcribe(&self, audio: &Path) -> anyhow::Result<String>;

    /// Get engine name for logging
    fn name(&self) -> &str;
}

/// Speech-to-text adapter that shells out to an external command.
///
/// The WAV path is appended as the last argument; the transcript is read
/// from stdout. A non-zero exit status is a collaborator failure.
pub struct CommandTranscriber {
    command: String,
    args: Vec<String>,
}

impl CommandTranscriber {
    pub fn new(command: String, args: Vec<String>) -> Self {
        Self { command, args }
    }
}

#[async_trait::async_trait]
impl SpeechToText for CommandTranscriber {
    async fn transcribe(&self, audio: &Path) -> anyhow::Result<String> {
        let output = Command::new(&self.command)
            .args(&self.args)
            .arg(audio)
            .stdin(Stdio::null())
            .output()
            .await
            .with_context(|| format!("failed to run transcriber command {}", self.command))?;

        if !output.status.success() {
            anyhow::bail!(
                "transcriber command exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        let text = String::from_utf8(output.stdout).context("transcriber output is not UTF-8")?;
        Ok(text.trim().to_string())
    }

    fn name(&self) -> &str {
        &self.command
    }
}

/// Invokes the speech-to-text collaborator on finalized audio artifacts and
/// persists transcripts into the workspace.
pub struct TranscriptionGate {
    engine: Box<dyn SpeechToText>,
}

impl TranscriptionGate {
    pub fn new(engine: Box<dyn SpeechToText>) -> Self {
        Self { engine }
    }

    /// Transcribe a finalized audio artifact.
    ///
    /// The artifact must exist and be mono 16-bit 16 kHz; violations fail
    /// without invoking the collaborator. Collaborator failures surface
    /// verbatim, with no retry.
    pub async fn transcribe(&self, audio: &Path) -> Result<String> {
        if !audio.exists() {
            return Err(Error::ArtifactNotFound(audio.to_path_buf()));
        }

        validate_capture_format(audio)?;

        info!(
            "Transcribing {} with engine {}",
            audio.display(),
            self.engine.name()
        );

        self.engine
            .transcribe(audio)
            .await
            .map_err(Error::CollaboratorFailure)
    }

    /// Write `text` to the next-indexed transcript file in the workspace.
    ///
    /// The index is always computed fresh by directory scan, so repeated
    /// transcriptions produce distinct files rather than a silent overwrite.
    pub fn persist(&self, workspace: &Workspace, text: &str) -> Result<PathBuf> {
        let index = workspace.next_transcript_index()?;
        let path = workspace.transcript_path(index);

        fs::write(&path, text)?;

        info!("Transcript saved to {}", path.display());

        Ok(path)
    }
}

/// Check the WAV header against the fixed capture format.
fn validate_capture_format(audio: &Path) -> Result<()> {
    let reader = hound::WavReader::open(audio)?;
    let spec = reader.spec();

    let ok = spec.channels == 1
        && spec.bits_per_sample == 16
        && spec.sample_rate == 16000
        && spec.sample_format == hound::SampleFormat::Int;

    if !ok {
        return Err(Error::UnsupportedAudioFormat {
            got: format!(
                "{} channel(s), {}-bit {:?}, {} Hz",
                spec.channels, spec.bits_per_sample, spec.sample_format, spec.sample_rate
            ),
        });
    }

    Ok(())
}
