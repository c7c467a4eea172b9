// Integration tests for the per-session workspace convention.
//
// Artifact indices are always recomputed by directory scan, so externally
// tampered workspaces self-heal on next use.

use anyhow::Result;
use clinic_scribe::session::Workspace;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_open_creates_directory_idempotently() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let dir = temp_dir.path().join("Session_1");

    let ws = Workspace::open(&dir)?;
    assert!(dir.is_dir());

    // Opening an existing workspace is a no-op.
    let again = Workspace::open(&dir)?;
    assert_eq!(ws.dir(), again.dir());

    Ok(())
}

#[test]
fn test_indices_start_at_one() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let ws = Workspace::open(temp_dir.path())?;

    assert_eq!(ws.next_audio_index()?, 1);
    assert_eq!(ws.next_transcript_index()?, 1);

    Ok(())
}

#[test]
fn test_next_index_is_max_plus_one() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let ws = Workspace::open(temp_dir.path())?;

    fs::write(ws.audio_path(1), b"")?;
    fs::write(ws.audio_path(3), b"")?;
    fs::write(ws.transcript_path(2), b"")?;

    assert_eq!(ws.next_audio_index()?, 4, "gaps do not reset the index");
    assert_eq!(ws.next_transcript_index()?, 3);

    Ok(())
}

#[test]
fn test_index_recovers_after_deletion() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let ws = Workspace::open(temp_dir.path())?;

    fs::write(ws.audio_path(1), b"")?;
    assert_eq!(ws.next_audio_index()?, 2);

    fs::remove_file(ws.audio_path(1))?;
    assert_eq!(
        ws.next_audio_index()?,
        1,
        "re-scan must observe the deletion"
    );

    Ok(())
}

#[test]
fn test_unrelated_files_are_ignored() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let ws = Workspace::open(temp_dir.path())?;

    fs::write(temp_dir.path().join("notes.txt"), b"")?;
    fs::write(temp_dir.path().join("outputX.wav"), b"")?;
    fs::write(temp_dir.path().join("transcription.txt"), b"")?;

    assert_eq!(ws.next_audio_index()?, 1);
    assert_eq!(ws.next_transcript_index()?, 1);
    assert!(ws.transcripts()?.is_empty());
    assert!(!ws.is_analyzed());

    Ok(())
}

#[test]
fn test_transcripts_sorted_lexicographically() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let ws = Workspace::open(temp_dir.path())?;

    fs::write(ws.transcript_path(2), b"second")?;
    fs::write(ws.transcript_path(1), b"first")?;

    assert_eq!(
        ws.transcripts()?,
        vec!["transcription1.txt", "transcription2.txt"]
    );
    assert_eq!(ws.latest_transcript()?, Some(ws.transcript_path(2)));

    Ok(())
}

#[test]
fn test_latest_transcript_none_when_empty() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let ws = Workspace::open(temp_dir.path())?;

    assert_eq!(ws.latest_transcript()?, None);

    Ok(())
}

#[test]
fn test_is_analyzed_from_either_artifact_kind() -> Result<()> {
    let temp_dir = TempDir::new()?;

    let audio_only = Workspace::open(temp_dir.path().join("audio_only"))?;
    fs::write(audio_only.audio_path(1), b"")?;
    assert!(audio_only.is_analyzed());

    let transcript_only = Workspace::open(temp_dir.path().join("transcript_only"))?;
    fs::write(transcript_only.transcript_path(1), b"")?;
    assert!(transcript_only.is_analyzed());

    let fresh = Workspace::open(temp_dir.path().join("fresh"))?;
    assert!(!fresh.is_analyzed());

    Ok(())
}
