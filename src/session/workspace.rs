use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;

const AUDIO_PREFIX: &str = "output";
const AUDIO_SUFFIX: &str = ".wav";
const TRANSCRIPT_PREFIX: &str = "transcription";
const TRANSCRIPT_SUFFIX: &str = ".txt";

/// Filesystem convention for one session's artifacts.
///
/// A workspace holds sequentially numbered audio captures (`output<N>.wav`)
/// and their transcripts (`transcription<N>.txt`), N starting at 1. Indices
/// are always recomputed by directory scan, never cached, so a workspace
/// tampered with externally is self-healing on next use.
#[derive(Debug, Clone)]
pub struct Workspace {
    dir: PathBuf,
}

impl Workspace {
    /// Open an existing workspace directory, creating it if absent.
    /// Idempotent.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn audio_path(&self, index: u32) -> PathBuf {
        self.dir
            .join(format!("{}{}{}", AUDIO_PREFIX, index, AUDIO_SUFFIX))
    }

    pub fn transcript_path(&self, index: u32) -> PathBuf {
        self.dir
            .join(format!("{}{}{}", TRANSCRIPT_PREFIX, index, TRANSCRIPT_SUFFIX))
    }

    /// Next free audio artifact index: max existing index + 1, or 1.
    pub fn next_audio_index(&self) -> Result<u32> {
        self.next_index(AUDIO_PREFIX, AUDIO_SUFFIX)
    }

    /// Next free transcript index: max existing index + 1, or 1.
    pub fn next_transcript_index(&self) -> Result<u32> {
        self.next_index(TRANSCRIPT_PREFIX, TRANSCRIPT_SUFFIX)
    }

    /// Transcript filenames sorted lexicographically.
    ///
    /// Lexicographic order matches numeric order only while indices stay
    /// within the same digit count (`transcription10` sorts before
    /// `transcription2`). Kept deliberately: changing the sort would change
    /// which transcript `latest_transcript` selects.
    pub fn transcripts(&self) -> Result<Vec<String>> {
        let mut names = self.artifact_names(TRANSCRIPT_PREFIX, TRANSCRIPT_SUFFIX)?;
        names.sort();
        Ok(names)
    }

    /// Lexicographically last transcript file, if any.
    pub fn latest_transcript(&self) -> Result<Option<PathBuf>> {
        let names = self.transcripts()?;
        Ok(names.last().map(|name| self.dir.join(name)))
    }

    /// True once the workspace contains any transcript or audio artifact.
    ///
    /// This is the derived "frozen" signal: a session whose workspace
    /// already holds output is barred from further recording/analysis.
    pub fn is_analyzed(&self) -> bool {
        let has_transcripts = self
            .artifact_names(TRANSCRIPT_PREFIX, TRANSCRIPT_SUFFIX)
            .map(|names| !names.is_empty())
            .unwrap_or(false);
        let has_audio = self
            .artifact_names(AUDIO_PREFIX, AUDIO_SUFFIX)
            .map(|names| !names.is_empty())
            .unwrap_or(false);

        has_transcripts || has_audio
    }

    fn next_index(&self, prefix: &str, suffix: &str) -> Result<u32> {
        let max = self
            .artifact_names(prefix, suffix)?
            .iter()
            .filter_map(|name| parse_index(name, prefix, suffix))
            .max()
            .unwrap_or(0);

        Ok(max + 1)
    }

    fn artifact_names(&self, prefix: &str, suffix: &str) -> Result<Vec<String>> {
        let mut names = Vec::new();

        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if parse_index(&name, prefix, suffix).is_some() {
                names.push(name);
            }
        }

        Ok(names)
    }
}

fn parse_index(name: &str, prefix: &str, suffix: &str) -> Option<u32> {
    name.strip_prefix(prefix)?
        .strip_suffix(suffix)?
        .parse()
        .ok()
}
