// Integration tests for the recording state machine.
//
// A scripted backend feeds frames through a channel; stopping closes the
// channel, the capture task drains and exits, and the join hands the
// buffer to the finalize step.

mod common;

use anyhow::Result;
use clinic_scribe::error::Error;
use clinic_scribe::recorder::{RecorderState, RecordingController};
use clinic_scribe::session::Workspace;
use common::ScriptedBackend;
use tempfile::TempDir;

fn controller() -> (RecordingController, common::FeedHandle) {
    let (backend, feed) = ScriptedBackend::new();
    (RecordingController::new(Box::new(backend), 16000, 1), feed)
}

#[tokio::test]
async fn test_begin_end_writes_indexed_artifact() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let ws = Workspace::open(temp_dir.path())?;
    let (mut recorder, feed) = controller();

    recorder.begin(&ws).await?;
    assert_eq!(recorder.state(), RecorderState::Capturing);
    assert!(recorder.is_recording());

    // Three capture buffers of 1600 samples each
    for _ in 0..3 {
        feed.send(vec![7i16; 1600]).await?;
    }

    let path = recorder.end().await?;
    assert_eq!(recorder.state(), RecorderState::Idle);
    assert_eq!(path, ws.audio_path(1));

    let reader = hound::WavReader::open(&path)?;
    let spec = reader.spec();
    assert_eq!(spec.channels, 1);
    assert_eq!(spec.sample_rate, 16000);
    assert_eq!(spec.bits_per_sample, 16);
    assert_eq!(
        reader.len(),
        3 * 1600,
        "artifact must hold every buffer appended before the join"
    );

    Ok(())
}

#[tokio::test]
async fn test_immediate_end_yields_valid_empty_wav() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let ws = Workspace::open(temp_dir.path())?;
    let (mut recorder, _feed) = controller();

    recorder.begin(&ws).await?;
    let path = recorder.end().await?;

    // Zero captured buffers still finalize into a readable WAV.
    let reader = hound::WavReader::open(&path)?;
    assert_eq!(reader.len(), 0);

    Ok(())
}

#[tokio::test]
async fn test_consecutive_recordings_increment_index() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let ws = Workspace::open(temp_dir.path())?;
    let (mut recorder, feed) = controller();

    recorder.begin(&ws).await?;
    feed.send(vec![1i16; 160]).await?;
    let first = recorder.end().await?;

    recorder.begin(&ws).await?;
    feed.send(vec![2i16; 160]).await?;
    let second = recorder.end().await?;

    assert_eq!(first, ws.audio_path(1));
    assert_eq!(second, ws.audio_path(2));

    Ok(())
}

#[tokio::test]
async fn test_begin_while_capturing_is_invalid_state() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let ws = Workspace::open(temp_dir.path())?;
    let (mut recorder, _feed) = controller();

    recorder.begin(&ws).await?;

    let err = recorder.begin(&ws).await.unwrap_err();
    assert!(matches!(err, Error::InvalidState(_)));
    // The active capture is unaffected.
    assert_eq!(recorder.state(), RecorderState::Capturing);

    recorder.end().await?;

    Ok(())
}

#[tokio::test]
async fn test_end_and_abort_while_idle_are_invalid_state() {
    let (mut recorder, _feed) = controller();

    assert!(matches!(
        recorder.end().await.unwrap_err(),
        Error::InvalidState(_)
    ));
    assert!(matches!(
        recorder.abort().await.unwrap_err(),
        Error::InvalidState(_)
    ));
    assert_eq!(recorder.state(), RecorderState::Idle);
}

#[tokio::test]
async fn test_abort_discards_buffer_and_returns_to_idle() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let ws = Workspace::open(temp_dir.path())?;
    let (mut recorder, feed) = controller();

    recorder.begin(&ws).await?;
    feed.send(vec![9i16; 1600]).await?;
    recorder.abort().await?;

    assert_eq!(recorder.state(), RecorderState::Idle);
    assert!(
        !ws.audio_path(1).exists(),
        "abort must not write an artifact"
    );

    // The controller is reusable after an abort.
    recorder.begin(&ws).await?;
    let path = recorder.end().await?;
    assert_eq!(path, ws.audio_path(1));

    Ok(())
}

#[tokio::test]
async fn test_unavailable_device_leaves_controller_idle() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let ws = Workspace::open(temp_dir.path())?;
    let backend = ScriptedBackend::unavailable();
    let mut recorder = RecordingController::new(Box::new(backend), 16000, 1);

    let err = recorder.begin(&ws).await.unwrap_err();
    assert!(matches!(err, Error::DeviceUnavailable(_)));
    assert_eq!(recorder.state(), RecorderState::Idle);
    assert!(!recorder.is_recording());

    Ok(())
}
