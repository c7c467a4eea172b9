use std::path::PathBuf;

use thiserror::Error;

/// Crate-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Error kinds for the recording/transcription/analysis pipeline.
///
/// Every variant here is returned to the caller with the pipeline in a
/// well-defined state; none is fatal to the process. A corrupted session
/// store is recovered internally (treated as empty) and never surfaces
/// through this type.
#[derive(Debug, Error)]
pub enum Error {
    /// The capture device could not be opened or started.
    #[error("audio device unavailable: {0}")]
    DeviceUnavailable(String),

    /// An operation was attempted from a state that does not permit it.
    /// No side effect has occurred.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// The referenced audio artifact does not exist.
    #[error("audio artifact not found: {0}")]
    ArtifactNotFound(PathBuf),

    /// The audio artifact is not mono 16-bit 16 kHz PCM.
    #[error("unsupported audio format: expected mono 16-bit 16000 Hz, got {got}")]
    UnsupportedAudioFormat { got: String },

    /// Analysis was requested on a workspace with no transcript files.
    #[error("no transcript available for analysis")]
    NoTranscript,

    /// The latest transcript contains only whitespace.
    #[error("transcript is empty, nothing to analyze")]
    EmptyTranscript,

    /// An external collaborator (speech-to-text or classifier) failed.
    /// Surfaced verbatim; retry policy belongs to the caller.
    #[error("collaborator failure: {0:#}")]
    CollaboratorFailure(#[source] anyhow::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Wav(#[from] hound::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("capture task failed: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}
