pub mod analyze;
pub mod audio;
pub mod config;
pub mod error;
pub mod http;
pub mod recorder;
pub mod session;
pub mod transcribe;

pub use analyze::{
    AnalysisGate, AnalysisResult, Classifier, CommandClassifier, Condition, Prediction,
};
pub use audio::{AudioBackend, AudioBackendConfig, AudioBackendFactory, AudioFrame};
pub use config::Config;
pub use error::{Error, Result};
pub use http::{create_router, AppState};
pub use recorder::{RecorderState, RecordingController};
pub use session::{SessionManager, SessionRecord, SessionStore, SessionView, Workspace};
pub use transcribe::{CommandTranscriber, SpeechToText, TranscriptionGate};
