//! JSON HTTP API over a single shared session.
//!
//! Every request acts on the same [`Session`], so the API behaves like one
//! user driving the application: navigation, deletion and chat all change
//! the state that `GET /session` and `GET /render` report.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`    | `/health` | Health check (returns version) |
//! | `GET`    | `/session` | Current view, selection, awaiting flag, counts |
//! | `POST`   | `/view` | Navigate to `{"screen": "dashboard" \| "library" \| "chat"}` |
//! | `POST`   | `/documents/{id}/open` | Open the detail view |
//! | `POST`   | `/back` | Leave the detail view |
//! | `GET`    | `/dashboard` | Dashboard statistics |
//! | `GET`    | `/documents` | Library rows |
//! | `GET`    | `/documents/{id}` | Full document |
//! | `DELETE` | `/documents/{id}?confirm=true` | Delete (declined without `confirm=true`) |
//! | `GET`    | `/chat` | Transcript with resolved citations |
//! | `POST`   | `/chat` | Submit `{"query": "..."}` and wait for the answer |
//! | `GET`    | `/render` | Plain-text rendering of the current screen |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "bad_request", "message": "query must not be empty" } }
//! ```
//!
//! Error codes: `bad_request` (400), `not_found` (404), `awaiting_response`
//! (409), `ai_unavailable` (503), `internal` (500).
//!
//! # Concurrency
//!
//! The session sits behind a `std::sync::Mutex` that no handler holds across
//! an `.await`. While `POST /chat` waits for the model, other endpoints keep
//! answering and a second `POST /chat` gets 409. A submission runs on its own
//! task, so the answer is still recorded when the client goes away first.
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tower_http::cors::{Any, CorsLayer};

use prospan_core::dashboard::{dashboard_stats, DashboardStats};
use prospan_core::models::{ChatMessage, Document, DocumentStatus, DocumentType};
use prospan_core::session::{
    ChatRejection, DeleteOutcome, Screen, Session, SessionSnapshot, TranscriptEntry,
};

use crate::chat::{self, lock_session, ChatError};
use crate::config::Config;
use crate::genai::{create_model, GenerativeModel};
use crate::render::render;

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
struct AppState {
    config: Arc<Config>,
    model: Arc<dyn GenerativeModel>,
    session: Arc<Mutex<Session>>,
}

/// Starts the HTTP server with the configured provider and a seeded session.
///
/// Binds to `[server].bind` and runs until the process is terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let model = create_model(&config.ai)?;
    let session = Arc::new(Mutex::new(Session::seeded()?));
    run_server_with(config, model, session).await
}

/// Starts the HTTP server with an explicit model and session.
pub async fn run_server_with(
    config: &Config,
    model: Arc<dyn GenerativeModel>,
    session: Arc<Mutex<Session>>,
) -> anyhow::Result<()> {
    let bind_addr = config.server.bind.clone();
    let app = router(Arc::new(config.clone()), model, session);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(bind = %bind_addr, "server started");
    println!("Prospan Lib server listening on http://{}", bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}

/// Build the application router.
pub fn router(
    config: Arc<Config>,
    model: Arc<dyn GenerativeModel>,
    session: Arc<Mutex<Session>>,
) -> Router {
    let state = AppState {
        config,
        model,
        session,
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route("/session", get(handle_session))
        .route("/view", post(handle_view))
        .route("/back", post(handle_back))
        .route("/dashboard", get(handle_dashboard))
        .route("/documents", get(handle_list_documents))
        .route(
            "/documents/{id}",
            get(handle_get_document).delete(handle_delete_document),
        )
        .route("/documents/{id}/open", post(handle_open_document))
        .route("/chat", get(handle_get_chat).post(handle_post_chat))
        .route("/render", get(handle_render))
        .layer(cors)
        .with_state(state)
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    /// Machine-readable error code (e.g., `"bad_request"`, `"not_found"`).
    code: String,
    message: String,
}

/// Internal error type that converts into an Axum HTTP response.
struct AppError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl AppError {
    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code.to_string(),
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError::new(StatusCode::BAD_REQUEST, "bad_request", message)
}

fn not_found(message: impl Into<String>) -> AppError {
    AppError::new(StatusCode::NOT_FOUND, "not_found", message)
}

fn document_not_found(id: &str) -> AppError {
    not_found(format!("document not found: {}", id))
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        bad_request(rejection.body_text())
    }
}

impl From<ChatError> for AppError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::Rejected(ChatRejection::EmptyQuery) => bad_request(err.to_string()),
            ChatError::Rejected(ChatRejection::AwaitingResponse) => {
                AppError::new(StatusCode::CONFLICT, "awaiting_response", err.to_string())
            }
            ChatError::Unavailable(ref e) if e.is_configuration() => {
                AppError::new(StatusCode::SERVICE_UNAVAILABLE, "ai_unavailable", err.to_string())
            }
            ChatError::Unavailable(_) => {
                AppError::new(StatusCode::INTERNAL_SERVER_ERROR, "internal", err.to_string())
            }
        }
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
    model: String,
}

async fn handle_health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        model: state.model.model_name().to_string(),
    })
}

// ============ Session and navigation ============

async fn handle_session(State(state): State<AppState>) -> Json<SessionSnapshot> {
    Json(lock_session(&state.session).snapshot())
}

#[derive(Deserialize)]
struct ViewRequest {
    screen: String,
}

async fn handle_view(
    State(state): State<AppState>,
    payload: Result<Json<ViewRequest>, JsonRejection>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let Json(req) = payload?;
    let screen: Screen = req.screen.parse().map_err(|e| bad_request(format!("{}", e)))?;
    let mut session = lock_session(&state.session);
    session.navigate(screen);
    Ok(Json(session.snapshot()))
}

async fn handle_open_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let mut session = lock_session(&state.session);
    session
        .open_document(&id)
        .map_err(|_| document_not_found(&id))?;
    Ok(Json(session.snapshot()))
}

async fn handle_back(State(state): State<AppState>) -> Json<SessionSnapshot> {
    let mut session = lock_session(&state.session);
    session.back();
    Json(session.snapshot())
}

// ============ Library ============

async fn handle_dashboard(State(state): State<AppState>) -> Json<DashboardStats> {
    Json(dashboard_stats(lock_session(&state.session).store()))
}

/// One row of `GET /documents`.
#[derive(Serialize)]
struct DocumentRow {
    id: String,
    title: String,
    file_name: String,
    doc_type: DocumentType,
    status: DocumentStatus,
    publication_date: Option<String>,
    ingredients: Vec<String>,
}

impl From<&Document> for DocumentRow {
    fn from(doc: &Document) -> Self {
        let meta = doc.metadata();
        Self {
            id: doc.id().to_string(),
            title: meta.title.clone(),
            file_name: doc.file_name().to_string(),
            doc_type: doc.doc_type(),
            status: doc.status(),
            publication_date: meta.publication_date.clone(),
            ingredients: meta.ingredients.clone().unwrap_or_default(),
        }
    }
}

#[derive(Serialize)]
struct DocumentListResponse {
    documents: Vec<DocumentRow>,
}

async fn handle_list_documents(State(state): State<AppState>) -> Json<DocumentListResponse> {
    let session = lock_session(&state.session);
    Json(DocumentListResponse {
        documents: session.documents().iter().map(DocumentRow::from).collect(),
    })
}

async fn handle_get_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Document>, AppError> {
    let session = lock_session(&state.session);
    session
        .store()
        .find_by_id(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| document_not_found(&id))
}

#[derive(Deserialize)]
struct DeleteParams {
    #[serde(default)]
    confirm: bool,
}

#[derive(Serialize)]
struct DeleteResponse {
    outcome: DeleteOutcome,
    session: SessionSnapshot,
}

async fn handle_delete_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<DeleteParams>,
) -> Result<Json<DeleteResponse>, AppError> {
    let mut session = lock_session(&state.session);
    let outcome = session.delete_document(&id, |_| params.confirm);
    match outcome {
        DeleteOutcome::NotFound => Err(document_not_found(&id)),
        DeleteOutcome::Deleted => {
            tracing::info!(id = %id, "document deleted");
            Ok(Json(DeleteResponse {
                outcome,
                session: session.snapshot(),
            }))
        }
        DeleteOutcome::Declined => Ok(Json(DeleteResponse {
            outcome,
            session: session.snapshot(),
        })),
    }
}

// ============ Chat ============

#[derive(Serialize)]
struct ChatResponse {
    awaiting_response: bool,
    messages: Vec<TranscriptEntry>,
}

async fn handle_get_chat(State(state): State<AppState>) -> Json<ChatResponse> {
    let session = lock_session(&state.session);
    Json(ChatResponse {
        awaiting_response: session.is_awaiting_response(),
        messages: session.resolved_transcript(),
    })
}

#[derive(Deserialize)]
struct ChatRequest {
    #[serde(default)]
    query: String,
}

#[derive(Serialize)]
struct ChatReply {
    message: ChatMessage,
}

async fn handle_post_chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatReply>, AppError> {
    let Json(req) = payload?;
    // Detached from the request: a dropped connection must not leave the
    // query pending.
    let submission = tokio::spawn(async move {
        chat::submit(
            &state.session,
            state.model.as_ref(),
            &state.config.assistant,
            &req.query,
        )
        .await
    });
    let message = submission.await.map_err(|e| {
        AppError::new(StatusCode::INTERNAL_SERVER_ERROR, "internal", e.to_string())
    })??;
    Ok(Json(ChatReply { message }))
}

// ============ GET /render ============

async fn handle_render(State(state): State<AppState>) -> Response {
    let text = render(&lock_session(&state.session));
    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        text,
    )
        .into_response()
}
