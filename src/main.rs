use anyhow::{Context, Result};
use clap::Parser;
use clinic_scribe::analyze::{AnalysisGate, CommandClassifier};
use clinic_scribe::audio::{AudioBackendConfig, AudioBackendFactory};
use clinic_scribe::http::{create_router, AppState};
use clinic_scribe::recorder::RecordingController;
use clinic_scribe::session::{SessionManager, SessionStore};
use clinic_scribe::transcribe::{CommandTranscriber, TranscriptionGate};
use clinic_scribe::Config;
use tracing::info;

#[derive(Parser)]
#[command(name = "clinic-scribe", about = "Clinical dialog capture and analysis service")]
struct Cli {
    /// Configuration file (without extension, resolved by the config crate)
    #[arg(long, default_value = "config/clinic-scribe")]
    config: String,

    /// Override the configured listen address (host:port)
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let cfg = Config::load(&cli.config)?;

    info!("{} v{}", cfg.service.name, env!("CARGO_PKG_VERSION"));
    info!("Sessions root: {}", cfg.sessions.root);
    info!("Session store: {}", cfg.sessions.store_file);

    let backend = AudioBackendFactory::create(AudioBackendConfig {
        device: cfg.audio.device.clone(),
        sample_rate: cfg.audio.sample_rate,
        channels: cfg.audio.channels,
        chunk_samples: cfg.audio.chunk_samples,
    })?;

    let recorder = RecordingController::new(backend, cfg.audio.sample_rate, cfg.audio.channels);

    let transcription = TranscriptionGate::new(Box::new(CommandTranscriber::new(
        cfg.transcriber.command.clone(),
        cfg.transcriber.args.clone(),
    )));

    let analysis = AnalysisGate::new(Box::new(CommandClassifier::new(
        cfg.classifier.command.clone(),
        cfg.classifier.args.clone(),
    )));

    let store = SessionStore::new(&cfg.sessions.store_file);
    let manager = SessionManager::new(&cfg.sessions.root, store, recorder, transcription, analysis)?;

    let state = AppState::new(manager);
    let app = create_router(state);

    let addr = cli
        .bind
        .unwrap_or_else(|| format!("{}:{}", cfg.service.http.bind, cfg.service.http.port));
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
