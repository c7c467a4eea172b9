// Integration tests for configuration loading.

use anyhow::Result;
use clinic_scribe::Config;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_load_full_config_file() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("clinic-scribe.toml");

    fs::write(
        &path,
        r#"
[service]
name = "clinic-scribe"

[service.http]
bind = "0.0.0.0"
port = 9000

[audio]
device = "default"
sample_rate = 16000
channels = 1
chunk_samples = 1024

[sessions]
root = "/tmp/sessions"
store_file = "/tmp/sessions.json"

[transcriber]
command = "/usr/local/bin/transcribe-wav"
args = ["--model", "base"]

[classifier]
command = "/usr/local/bin/classify-dialog"
"#,
    )?;

    let stem = temp_dir.path().join("clinic-scribe");
    let cfg = Config::load(stem.to_str().unwrap())?;

    assert_eq!(cfg.service.name, "clinic-scribe");
    assert_eq!(cfg.service.http.bind, "0.0.0.0");
    assert_eq!(cfg.service.http.port, 9000);
    assert_eq!(cfg.audio.sample_rate, 16000);
    assert_eq!(cfg.audio.channels, 1);
    assert_eq!(cfg.audio.chunk_samples, 1024);
    assert_eq!(cfg.sessions.root, "/tmp/sessions");
    assert_eq!(cfg.transcriber.args, vec!["--model", "base"]);
    // args default to empty when omitted
    assert!(cfg.classifier.args.is_empty());

    Ok(())
}

#[test]
fn test_load_missing_file_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    let stem = temp_dir.path().join("does-not-exist");

    assert!(Config::load(stem.to_str().unwrap()).is_err());
}
