use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use super::store::{SessionRecord, SessionStore};
use super::workspace::Workspace;
use crate::analyze::{AnalysisGate, AnalysisResult};
use crate::error::{Error, Result};
use crate::recorder::RecordingController;
use crate::transcribe::TranscriptionGate;

/// Snapshot of one session for the control surface.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub name: String,
    /// Derived from workspace contents: a session with existing output is
    /// permanently barred from further recording/analysis.
    pub frozen: bool,
    /// Accumulated transcript text (all transcript files, in order)
    pub transcript: String,
}

/// Outcome of stopping a recording: the finalized audio artifact, the
/// persisted transcript, and its text.
#[derive(Debug, Clone, Serialize)]
pub struct StopOutcome {
    pub audio_path: PathBuf,
    pub transcript_path: PathBuf,
    pub text: String,
}

struct CurrentSession {
    name: String,
    path: PathBuf,
    frozen: bool,
}

/// Single serialized owner of the capture-and-analysis pipeline.
///
/// All session mutations funnel through this object; the control surface
/// holds it behind a mutex, which also gives the session store its required
/// single-writer discipline.
pub struct SessionManager {
    root: PathBuf,
    store: SessionStore,
    recorder: RecordingController,
    transcription: TranscriptionGate,
    analysis: AnalysisGate,
    sessions: Vec<SessionRecord>,
    current: Option<CurrentSession>,
}

impl SessionManager {
    /// Build the manager and restore sessions from the persisted store.
    ///
    /// Records whose workspace directory no longer exists are skipped, not
    /// repaired: the store keeps them, but they are not loadable.
    pub fn new(
        root: impl AsRef<Path>,
        store: SessionStore,
        recorder: RecordingController,
        transcription: TranscriptionGate,
        analysis: AnalysisGate,
    ) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;

        let sessions: Vec<SessionRecord> = store
            .list()
            .into_iter()
            .filter(|record| {
                if record.path.is_dir() {
                    true
                } else {
                    warn!(
                        "Skipping session {} with missing directory {}",
                        record.name,
                        record.path.display()
                    );
                    false
                }
            })
            .collect();

        info!("Restored {} session(s)", sessions.len());

        Ok(Self {
            root,
            store,
            recorder,
            transcription,
            analysis,
            sessions,
            current: None,
        })
    }

    pub fn sessions(&self) -> &[SessionRecord] {
        &self.sessions
    }

    pub fn current_session(&self) -> Option<&str> {
        self.current.as_ref().map(|c| c.name.as_str())
    }

    pub fn is_recording(&self) -> bool {
        self.recorder.is_recording()
    }

    /// Create `Session_<N>` with N = count of persisted sessions + 1, create
    /// its workspace directory, persist the record, and select it.
    pub fn create_session(&mut self) -> Result<SessionRecord> {
        let index = self.store.list().len() + 1;
        let name = format!("Session_{}", index);
        let path = self.root.join(&name);

        Workspace::open(&path)?;

        let record = SessionRecord {
            name: name.clone(),
            path: path.clone(),
            created_at: Utc::now(),
        };

        self.store.append(record.clone())?;
        self.sessions.push(record.clone());

        // A brand-new workspace is never frozen.
        self.current = Some(CurrentSession {
            name,
            path,
            frozen: false,
        });

        info!("Created session {}", record.name);

        Ok(record)
    }

    /// Select a session by name. The frozen flag is recomputed from the
    /// workspace contents at selection time.
    pub fn select_session(&mut self, name: &str) -> Result<Option<SessionView>> {
        let record = match self.sessions.iter().find(|r| r.name == name) {
            Some(record) => record.clone(),
            None => return Ok(None),
        };

        let workspace = Workspace::open(&record.path)?;
        let frozen = workspace.is_analyzed();
        let transcript = read_transcripts(&workspace)?;

        self.current = Some(CurrentSession {
            name: record.name.clone(),
            path: record.path.clone(),
            frozen,
        });

        info!("Selected session {} (frozen: {})", record.name, frozen);

        Ok(Some(SessionView {
            name: record.name,
            frozen,
            transcript,
        }))
    }

    /// Delete a session's directory and store record. Deleting an unknown
    /// name is a no-op reported as `false`, not an error.
    pub fn delete_session(&mut self, name: &str) -> Result<bool> {
        let Some(pos) = self.sessions.iter().position(|r| r.name == name) else {
            return Ok(false);
        };

        let record = self.sessions.remove(pos);
        if record.path.exists() {
            fs::remove_dir_all(&record.path)?;
        }

        self.store.replace(&self.sessions)?;

        if self.current.as_ref().map(|c| c.name.as_str()) == Some(name) {
            self.current = None;
        }

        info!("Deleted session {}", name);

        Ok(true)
    }

    /// Remove every session directory, recreate the empty root, and reset
    /// the store to an empty collection.
    pub fn clear_sessions(&mut self) -> Result<()> {
        if self.root.exists() {
            fs::remove_dir_all(&self.root)?;
        }
        fs::create_dir_all(&self.root)?;

        self.sessions.clear();
        self.store.replace(&[])?;
        self.current = None;

        info!("Cleared all sessions");

        Ok(())
    }

    /// Start recording into the current session's workspace.
    pub async fn start_recording(&mut self) -> Result<()> {
        let current = self.require_current()?;
        if current.frozen {
            return Err(Error::InvalidState(format!(
                "session {} is frozen",
                current.name
            )));
        }

        let workspace = Workspace::open(&current.path)?;
        self.recorder.begin(&workspace).await
    }

    /// Stop recording, then transcribe the finalized artifact and persist
    /// the transcript.
    pub async fn stop_recording(&mut self) -> Result<StopOutcome> {
        let path = {
            let current = self.require_current()?;
            current.path.clone()
        };

        let audio_path = self.recorder.end().await?;
        let text = self.transcription.transcribe(&audio_path).await?;

        let workspace = Workspace::open(&path)?;
        let transcript_path = self.transcription.persist(&workspace, &text)?;

        Ok(StopOutcome {
            audio_path,
            transcript_path,
            text,
        })
    }

    /// Discard the active recording without writing an artifact.
    pub async fn abort_recording(&mut self) -> Result<()> {
        self.recorder.abort().await
    }

    /// Analyze the current session's latest transcript. On success the
    /// session is frozen for the rest of its lifetime (until deleted and
    /// recreated).
    pub async fn analyze(&mut self) -> Result<AnalysisResult> {
        let path = {
            let current = self.require_current()?;
            if current.frozen {
                return Err(Error::InvalidState(format!(
                    "session {} is frozen",
                    current.name
                )));
            }
            current.path.clone()
        };

        let workspace = Workspace::open(&path)?;
        let result = self.analysis.analyze(&workspace).await?;

        if let Some(current) = self.current.as_mut() {
            current.frozen = true;
        }

        Ok(result)
    }

    /// Accumulated transcript text for a session, in transcript order.
    pub fn transcript_text(&self, name: &str) -> Result<Option<String>> {
        let Some(record) = self.sessions.iter().find(|r| r.name == name) else {
            return Ok(None);
        };

        let workspace = Workspace::open(&record.path)?;
        Ok(Some(read_transcripts(&workspace)?))
    }

    fn require_current(&self) -> Result<&CurrentSession> {
        self.current
            .as_ref()
            .ok_or_else(|| Error::InvalidState("no session selected".to_string()))
    }
}

fn read_transcripts(workspace: &Workspace) -> Result<String> {
    let mut parts = Vec::new();

    for name in workspace.transcripts()? {
        let content = fs::read_to_string(workspace.dir().join(&name))?;
        parts.push(content);
    }

    Ok(parts.join("\n\n"))
}
