use super::state::AppState;
use crate::analyze::AnalysisResult;
use crate::error::Error;
use crate::session::{SessionRecord, StopOutcome};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Serialize;
use tracing::{error, info};

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct SessionListResponse {
    pub sessions: Vec<SessionRecord>,
}

#[derive(Debug, Serialize)]
pub struct CreateSessionResponse {
    pub session: SessionRecord,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct DeleteSessionResponse {
    pub deleted: bool,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct TranscriptResponse {
    pub name: String,
    pub transcript: String,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub current_session: Option<String>,
    pub recording: bool,
}

#[derive(Debug, Serialize)]
pub struct StartRecordingResponse {
    pub status: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct StopRecordingResponse {
    pub status: String,
    pub outcome: StopOutcome,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub result: AnalysisResult,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Map pipeline error kinds onto HTTP statuses.
fn error_response(e: Error) -> (StatusCode, Json<ErrorResponse>) {
    let status = match &e {
        Error::InvalidState(_) => StatusCode::CONFLICT,
        Error::ArtifactNotFound(_) | Error::NoTranscript => StatusCode::NOT_FOUND,
        Error::UnsupportedAudioFormat { .. } | Error::EmptyTranscript => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        Error::DeviceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        Error::CollaboratorFailure(_)
        | Error::Io(_)
        | Error::Wav(_)
        | Error::Json(_)
        | Error::TaskJoin(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    error!("Request failed: {}", e);

    (
        status,
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /sessions
pub async fn list_sessions(State(state): State<AppState>) -> impl IntoResponse {
    let manager = state.manager.lock().await;
    let sessions = manager.sessions().to_vec();
    (StatusCode::OK, Json(SessionListResponse { sessions }))
}

/// POST /sessions
pub async fn create_session(State(state): State<AppState>) -> impl IntoResponse {
    let mut manager = state.manager.lock().await;

    match manager.create_session() {
        Ok(session) => {
            info!("Session {} created via API", session.name);
            (
                StatusCode::OK,
                Json(CreateSessionResponse {
                    message: format!("New session {} created", session.name),
                    session,
                }),
            )
                .into_response()
        }
        Err(e) => error_response(e).into_response(),
    }
}

/// POST /sessions/:name/select
pub async fn select_session(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> impl IntoResponse {
    let mut manager = state.manager.lock().await;

    match manager.select_session(&name) {
        Ok(Some(view)) => (StatusCode::OK, Json(view)).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("Session {} not found", name),
            }),
        )
            .into_response(),
        Err(e) => error_response(e).into_response(),
    }
}

/// DELETE /sessions/:name
pub async fn delete_session(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> impl IntoResponse {
    let mut manager = state.manager.lock().await;

    match manager.delete_session(&name) {
        Ok(deleted) => {
            let message = if deleted {
                format!("Session {} deleted", name)
            } else {
                "No session selected to delete".to_string()
            };
            (
                StatusCode::OK,
                Json(DeleteSessionResponse { deleted, message }),
            )
                .into_response()
        }
        Err(e) => error_response(e).into_response(),
    }
}

/// DELETE /sessions
pub async fn clear_sessions(State(state): State<AppState>) -> impl IntoResponse {
    let mut manager = state.manager.lock().await;

    match manager.clear_sessions() {
        Ok(()) => (
            StatusCode::OK,
            Json(DeleteSessionResponse {
                deleted: true,
                message: "All sessions cleared".to_string(),
            }),
        )
            .into_response(),
        Err(e) => error_response(e).into_response(),
    }
}

/// GET /sessions/:name/transcript
pub async fn get_transcript(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> impl IntoResponse {
    let manager = state.manager.lock().await;

    match manager.transcript_text(&name) {
        Ok(Some(transcript)) => {
            (StatusCode::OK, Json(TranscriptResponse { name, transcript })).into_response()
        }
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("Session {} not found", name),
            }),
        )
            .into_response(),
        Err(e) => error_response(e).into_response(),
    }
}

/// POST /record/start
pub async fn start_recording(State(state): State<AppState>) -> impl IntoResponse {
    let mut manager = state.manager.lock().await;

    match manager.start_recording().await {
        Ok(()) => (
            StatusCode::OK,
            Json(StartRecordingResponse {
                status: "recording".to_string(),
                message: "Recording started".to_string(),
            }),
        )
            .into_response(),
        Err(e) => error_response(e).into_response(),
    }
}

/// POST /record/stop
pub async fn stop_recording(State(state): State<AppState>) -> impl IntoResponse {
    let mut manager = state.manager.lock().await;

    match manager.stop_recording().await {
        Ok(outcome) => (
            StatusCode::OK,
            Json(StopRecordingResponse {
                status: "stopped".to_string(),
                outcome,
            }),
        )
            .into_response(),
        Err(e) => error_response(e).into_response(),
    }
}

/// POST /analyze
pub async fn analyze(State(state): State<AppState>) -> impl IntoResponse {
    let mut manager = state.manager.lock().await;

    match manager.analyze().await {
        Ok(result) => (
            StatusCode::OK,
            Json(AnalyzeResponse {
                result,
                message: "Analysis successful".to_string(),
            }),
        )
            .into_response(),
        Err(e) => error_response(e).into_response(),
    }
}

/// GET /status
pub async fn get_status(State(state): State<AppState>) -> impl IntoResponse {
    let manager = state.manager.lock().await;

    (
        StatusCode::OK,
        Json(StatusResponse {
            current_session: manager.current_session().map(str::to_string),
            recording: manager.is_recording(),
        }),
    )
}

/// GET /health
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
