//! HTTP API server.
//!
//! Each client creates its own session; sessions live in memory until deleted
//! or the server stops.

use crate::agent::{self, RecordingObserver, ThoughtEvent, ToolCallRecord};
use crate::cli::preflight::missing_key_message;
use crate::cli::Output;
use crate::config::{Prompts, Settings};
use crate::conversation::Message;
use crate::error::MathmateError;
use crate::session::{Session, Submission};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};
use uuid::Uuid;

/// Shared application state.
struct AppState {
    settings: Settings,
    prompts: Prompts,
    sessions: RwLock<HashMap<Uuid, Arc<SessionEntry>>>,
}

impl AppState {
    fn session(&self, id: Uuid) -> Option<Arc<SessionEntry>> {
        self.sessions
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&id)
            .cloned()
    }
}

/// A live session and a copy of its history as of the last finished turn.
///
/// The copy lets history be read without waiting on a turn in flight.
struct SessionEntry {
    session: Mutex<Session>,
    history: RwLock<Vec<Message>>,
}

impl SessionEntry {
    fn new(session: Session) -> Self {
        let history = session.history().to_vec();
        Self {
            session: Mutex::new(session),
            history: RwLock::new(history),
        }
    }

    fn history(&self) -> Vec<Message> {
        self.history.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn record_history(&self, session: &Session) {
        *self.history.write().unwrap_or_else(|e| e.into_inner()) = session.history().to_vec();
    }
}

/// Run the HTTP API server.
pub async fn run_serve(host: Option<String>, port: Option<u16>, settings: Settings) -> anyhow::Result<()> {
    let host = host.unwrap_or_else(|| settings.server.host.clone());
    let port = port.unwrap_or(settings.server.port);
    let prompts = Prompts::from_settings(&settings)?;

    let state = Arc::new(AppState {
        settings,
        prompts,
        sessions: RwLock::new(HashMap::new()),
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = router(state).layer(cors);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Mathmate API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET    /health");
    Output::kv("New session", "POST   /sessions");
    Output::kv("History", "GET    /sessions/:id/messages");
    Output::kv("Ask", "POST   /sessions/:id/messages");
    Output::kv("End session", "DELETE /sessions/:id");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/sessions", post(create_session))
        .route("/sessions/{id}", delete(end_session))
        .route("/sessions/{id}/messages", get(history).post(ask))
        .with_state(state)
}

// === Request/Response Types ===

#[derive(Deserialize, Default)]
struct CreateSessionRequest {
    /// Model service key. Falls back to the server's environment.
    #[serde(default)]
    api_key: Option<String>,
}

#[derive(Serialize)]
struct CreateSessionResponse {
    session_id: Uuid,
    model: String,
    tools: Vec<String>,
}

#[derive(Deserialize)]
struct AskRequest {
    question: String,
}

#[derive(Serialize)]
struct AskResponse {
    answer: String,
    thoughts: Vec<ThoughtEvent>,
    tool_calls: Vec<ToolCallRecord>,
}

#[derive(Serialize)]
struct HistoryResponse {
    session_id: Uuid,
    messages: Vec<Message>,
}

#[derive(Serialize)]
struct WarningResponse {
    warning: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

fn error_response(status: StatusCode, error: impl ToString) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
        }),
    )
        .into_response()
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn create_session(
    State(state): State<Arc<AppState>>,
    body: Option<Json<CreateSessionRequest>>,
) -> Response {
    let request = body.map(|Json(r)| r).unwrap_or_default();
    let key = request
        .api_key
        .filter(|k| !k.trim().is_empty())
        .or_else(|| state.settings.api_key_from_env());

    let session = match Session::bootstrap(key.as_deref(), |credential| {
        agent::assemble(&state.settings, &state.prompts, credential)
    }) {
        Ok(session) => session,
        Err(MathmateError::MissingCredential) => {
            return error_response(StatusCode::UNAUTHORIZED, missing_key_message(&state.settings))
        }
        Err(e) => return error_response(StatusCode::INTERNAL_SERVER_ERROR, e),
    };

    let response = CreateSessionResponse {
        session_id: session.id(),
        model: session.agent().model_name().to_string(),
        tools: session
            .agent()
            .tools()
            .names()
            .into_iter()
            .map(str::to_string)
            .collect(),
    };

    let id = session.id();
    {
        let mut sessions = state.sessions.write().unwrap_or_else(|e| e.into_inner());
        if sessions.len() >= state.settings.server.max_sessions {
            warn!("Refusing new session: {} already open", sessions.len());
            return error_response(
                StatusCode::SERVICE_UNAVAILABLE,
                "Too many open sessions, end one and try again",
            );
        }
        sessions.insert(id, Arc::new(SessionEntry::new(session)));
    }
    info!("Session {} started", id);

    (StatusCode::CREATED, Json(response)).into_response()
}

async fn history(State(state): State<Arc<AppState>>, Path(id): Path<Uuid>) -> Response {
    let Some(entry) = state.session(id) else {
        return error_response(StatusCode::NOT_FOUND, format!("Session not found: {}", id));
    };

    Json(HistoryResponse {
        session_id: id,
        messages: entry.history(),
    })
    .into_response()
}

async fn ask(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<AskRequest>,
) -> Response {
    let Some(entry) = state.session(id) else {
        return error_response(StatusCode::NOT_FOUND, format!("Session not found: {}", id));
    };

    // One question at a time per session.
    let Ok(mut session) = entry.session.try_lock() else {
        return error_response(
            StatusCode::CONFLICT,
            "A question is already being answered in this session",
        );
    };

    let observer = RecordingObserver::new();
    let outcome = session.submit(&req.question, &observer).await;
    entry.record_history(&session);
    match outcome {
        Ok(Submission::Rejected { warning }) => {
            (StatusCode::UNPROCESSABLE_ENTITY, Json(WarningResponse { warning })).into_response()
        }
        Ok(Submission::Answered(response)) => Json(AskResponse {
            answer: response.reply.content().to_string(),
            thoughts: observer.into_events(),
            tool_calls: response.tool_calls,
        })
        .into_response(),
        Err(e) => {
            warn!("Session {} turn failed: {}", id, e);
            error_response(StatusCode::BAD_GATEWAY, e)
        }
    }
}

async fn end_session(State(state): State<Arc<AppState>>, Path(id): Path<Uuid>) -> Response {
    let removed = state
        .sessions
        .write()
        .unwrap_or_else(|e| e.into_inner())
        .remove(&id);

    match removed {
        Some(_) => {
            info!("Session {} ended", id);
            StatusCode::NO_CONTENT.into_response()
        }
        None => error_response(StatusCode::NOT_FOUND, format!("Session not found: {}", id)),
    }
}
