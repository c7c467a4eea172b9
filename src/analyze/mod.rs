//! Condition analysis gating
//!
//! The disease classifier is an external collaborator: it consumes free
//! text and returns the top-2 ranked condition labels with probabilities.
//! `AnalysisGate` selects the latest transcript, enforces the preconditions,
//! appends the formatted result block, and reports the result. The label set
//! is a fixed closed enumeration of seven conditions.

use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::process::Stdio;

use anyhow::Context;
use serde::Serialize;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::info;

use crate::error::{Error, Result};
use crate::session::Workspace;

/// Closed set of conditions the classifier can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Condition {
    #[serde(rename = "Upper Respiratory Tract Infection")]
    UpperRespiratoryTractInfection,
    Dermatitis,
    Gastritis,
    Rhinitis,
    #[serde(rename = "Viral Hepatitis")]
    ViralHepatitis,
    Enteritis,
    Pneumonia,
}

impl Condition {
    pub const ALL: [Condition; 7] = [
        Condition::UpperRespiratoryTractInfection,
        Condition::Dermatitis,
        Condition::Gastritis,
        Condition::Rhinitis,
        Condition::ViralHepatitis,
        Condition::Enteritis,
        Condition::Pneumonia,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Condition::UpperRespiratoryTractInfection => "Upper Respiratory Tract Infection",
            Condition::Dermatitis => "Dermatitis",
            Condition::Gastritis => "Gastritis",
            Condition::Rhinitis => "Rhinitis",
            Condition::ViralHepatitis => "Viral Hepatitis",
            Condition::Enteritis => "Enteritis",
            Condition::Pneumonia => "Pneumonia",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.label() == label)
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One ranked classifier prediction.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Prediction {
    pub condition: Condition,
    /// Probability in [0, 1]
    pub probability: f32,
}

/// Top-2 classifier result, ranked descending by probability.
///
/// The two probabilities are independent top-2 scores, not a normalized
/// distribution; their sum need not be 1.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct AnalysisResult {
    pub top: [Prediction; 2],
}

impl AnalysisResult {
    /// The block appended to the transcript file, matching the persisted
    /// report format: a header line plus one `label: NN.NN%` line per
    /// prediction.
    pub fn report_block(&self) -> String {
        let lines: Vec<String> = self
            .top
            .iter()
            .map(|p| format!("{}: {:.2}%", p.condition, p.probability * 100.0))
            .collect();

        format!("\n\nAnalysis Result:\n{}", lines.join("\n"))
    }
}

/// Classifier collaborator seam.
///
/// Returns ranked `(label, probability)` pairs, best first. The gate maps
/// labels onto the closed `Condition` set and validates the reply shape.
#[async_trait::async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, text: &str) -> anyhow::Result<Vec<(String, f32)>>;

    /// Get classifier name for logging
    fn name(&self) -> &str;
}

/// Classifier adapter that shells out to an external command.
///
/// The transcript text is piped on stdin; stdout must be a JSON array of
/// `[label, probability]` pairs ranked descending.
pub struct CommandClassifier {
    command: String,
    args: Vec<String>,
}

impl CommandClassifier {
    pub fn new(command: String, args: Vec<String>) -> Self {
        Self { command, args }
    }
}

#[async_trait::async_trait]
impl Classifier for CommandClassifier {
    async fn classify(&self, text: &str) -> anyhow::Result<Vec<(String, f32)>> {
        let mut child = Command::new(&self.command)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("failed to run classifier command {}", self.command))?;

        if let Some(stdin) = child.stdin.as_mut() {
            stdin
                .write_all(text.as_bytes())
                .await
                .context("failed to write transcript to classifier stdin")?;
        }

        let output = child
            .wait_with_output()
            .await
            .context("failed to wait for classifier command")?;

        if !output.status.success() {
            anyhow::bail!(
                "classifier command exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        let pairs: Vec<(String, f32)> =
            serde_json::from_slice(&output.stdout).context("malformed classifier output")?;
        Ok(pairs)
    }

    fn name(&self) -> &str {
        &self.command
    }
}

/// Invokes the classifier collaborator on the latest transcript and appends
/// the result block. A successful analysis freezes the owning session; the
/// freeze itself is derived from workspace contents and latched by the
/// session manager, not persisted here.
pub struct AnalysisGate {
    classifier: Box<dyn Classifier>,
}

impl AnalysisGate {
    pub fn new(classifier: Box<dyn Classifier>) -> Self {
        Self { classifier }
    }

    /// Analyze the lexicographically latest transcript in the workspace.
    ///
    /// Fails with `NoTranscript` when the workspace holds no transcript and
    /// `EmptyTranscript` when the latest one is whitespace-only; neither
    /// invokes the collaborator. On success the result block is appended to
    /// the transcript file, preserving the existing content.
    pub async fn analyze(&self, workspace: &Workspace) -> Result<AnalysisResult> {
        let transcript = workspace.latest_transcript()?.ok_or(Error::NoTranscript)?;

        let text = fs::read_to_string(&transcript)?;
        let text = text.trim();
        if text.is_empty() {
            return Err(Error::EmptyTranscript);
        }

        info!(
            "Analyzing {} with classifier {}",
            transcript.display(),
            self.classifier.name()
        );

        let pairs = self
            .classifier
            .classify(text)
            .await
            .map_err(Error::CollaboratorFailure)?;

        let result = validate_predictions(&pairs)?;

        append_report(&transcript, &result)?;

        info!(
            "Analysis complete: {} ({:.2}%), {} ({:.2}%)",
            result.top[0].condition,
            result.top[0].probability * 100.0,
            result.top[1].condition,
            result.top[1].probability * 100.0
        );

        Ok(result)
    }
}

/// Validate the collaborator reply: exactly two known labels with
/// probabilities in [0, 1], ranked descending. Anything else is a
/// collaborator failure.
fn validate_predictions(pairs: &[(String, f32)]) -> Result<AnalysisResult> {
    if pairs.len() != 2 {
        return Err(Error::CollaboratorFailure(anyhow::anyhow!(
            "classifier returned {} predictions, expected 2",
            pairs.len()
        )));
    }

    let mut top = [Prediction {
        condition: Condition::Pneumonia,
        probability: 0.0,
    }; 2];

    for (i, (label, probability)) in pairs.iter().enumerate() {
        let condition = Condition::from_label(label).ok_or_else(|| {
            Error::CollaboratorFailure(anyhow::anyhow!("unknown condition label: {}", label))
        })?;

        if !(0.0..=1.0).contains(probability) {
            return Err(Error::CollaboratorFailure(anyhow::anyhow!(
                "probability out of range for {}: {}",
                label,
                probability
            )));
        }

        top[i] = Prediction {
            condition,
            probability: *probability,
        };
    }

    if top[0].probability < top[1].probability {
        return Err(Error::CollaboratorFailure(anyhow::anyhow!(
            "classifier predictions are not ranked descending"
        )));
    }

    Ok(AnalysisResult { top })
}

/// Append the result block to the transcript file. This append is the only
/// permitted post-write mutation of a transcript.
fn append_report(transcript: &Path, result: &AnalysisResult) -> Result<()> {
    let mut file = OpenOptions::new().append(true).open(transcript)?;
    file.write_all(result.report_block().as_bytes())?;
    Ok(())
}
