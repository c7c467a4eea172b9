// Shared test doubles: a scripted capture backend and canned collaborators.
#![allow(dead_code)]

use anyhow::Result;
use clinic_scribe::analyze::{AnalysisGate, Classifier};
use clinic_scribe::audio::{AudioBackend, AudioFrame};
use clinic_scribe::recorder::RecordingController;
use clinic_scribe::session::{SessionManager, SessionStore};
use clinic_scribe::transcribe::{SpeechToText, TranscriptionGate};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// Capture backend driven by the test: frames pushed through the
/// `FeedHandle` appear on the receiver returned by `start`. `stop` drops
/// the sender, closing the frame channel like a real device teardown.
pub struct ScriptedBackend {
    feed: Arc<Mutex<Option<mpsc::Sender<AudioFrame>>>>,
    fail_start: bool,
}

#[derive(Clone)]
pub struct FeedHandle {
    feed: Arc<Mutex<Option<mpsc::Sender<AudioFrame>>>>,
}

impl ScriptedBackend {
    pub fn new() -> (Self, FeedHandle) {
        let feed = Arc::new(Mutex::new(None));
        (
            Self {
                feed: Arc::clone(&feed),
                fail_start: false,
            },
            FeedHandle { feed },
        )
    }

    /// Backend whose device can never be opened.
    pub fn unavailable() -> Self {
        Self {
            feed: Arc::new(Mutex::new(None)),
            fail_start: true,
        }
    }
}

impl FeedHandle {
    pub async fn send(&self, samples: Vec<i16>) -> Result<()> {
        let tx = {
            let guard = self.feed.lock().unwrap();
            guard.clone().expect("capture not started")
        };
        tx.send(AudioFrame {
            samples,
            sample_rate: 16000,
            channels: 1,
        })
        .await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl AudioBackend for ScriptedBackend {
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioFrame>> {
        if self.fail_start {
            anyhow::bail!("no input device");
        }
        let (tx, rx) = mpsc::channel(64);
        *self.feed.lock().unwrap() = Some(tx);
        Ok(rx)
    }

    async fn stop(&mut self) -> Result<()> {
        self.feed.lock().unwrap().take();
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.feed.lock().unwrap().is_some()
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Speech-to-text double returning canned text, with an invocation counter.
pub struct CannedTranscriber {
    pub text: String,
    pub calls: Arc<AtomicUsize>,
}

impl CannedTranscriber {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait::async_trait]
impl SpeechToText for CannedTranscriber {
    async fn transcribe(&self, _audio: &Path) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.text.clone())
    }

    fn name(&self) -> &str {
        "canned"
    }
}

/// Speech-to-text double that always fails.
pub struct FailingTranscriber;

#[async_trait::async_trait]
impl SpeechToText for FailingTranscriber {
    async fn transcribe(&self, _audio: &Path) -> Result<String> {
        anyhow::bail!("model unavailable")
    }

    fn name(&self) -> &str {
        "failing"
    }
}

/// Classifier double returning canned label/probability pairs.
pub struct CannedClassifier {
    pub pairs: Vec<(String, f32)>,
}

impl CannedClassifier {
    pub fn new(pairs: &[(&str, f32)]) -> Self {
        Self {
            pairs: pairs
                .iter()
                .map(|(label, p)| (label.to_string(), *p))
                .collect(),
        }
    }

    pub fn top2() -> Self {
        Self::new(&[("Pneumonia", 0.72), ("Rhinitis", 0.44)])
    }
}

#[async_trait::async_trait]
impl Classifier for CannedClassifier {
    async fn classify(&self, _text: &str) -> Result<Vec<(String, f32)>> {
        Ok(self.pairs.clone())
    }

    fn name(&self) -> &str {
        "canned"
    }
}

/// Full manager wired with test doubles over a temp directory.
pub fn build_manager(root: &Path, transcript_text: &str) -> Result<(SessionManager, FeedHandle)> {
    let (backend, feed) = ScriptedBackend::new();
    let recorder = RecordingController::new(Box::new(backend), 16000, 1);
    let transcription = TranscriptionGate::new(Box::new(CannedTranscriber::new(transcript_text)));
    let analysis = AnalysisGate::new(Box::new(CannedClassifier::top2()));
    let store = SessionStore::new(root.join("sessions.json"));

    let manager = SessionManager::new(
        root.join("sessions"),
        store,
        recorder,
        transcription,
        analysis,
    )?;

    Ok((manager, feed))
}

/// Write a WAV file with the given format, for gate precondition tests.
pub fn write_wav(path: &Path, sample_rate: u32, channels: u16, samples: &[i16]) -> Result<()> {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
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
