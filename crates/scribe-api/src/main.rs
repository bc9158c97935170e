//! scribe-api - HTTP API server for scribe.

use std::collections::HashMap;
use std::net::SocketAddr;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;

use scribe_api::services::{NoteService, NotebookService};
use scribe_cache::ViewCache;
use scribe_core::{
    CacheConfig, CreateNoteRequest, Error, NotebookView, NoteView, UpdateNoteRequest,
};
use scribe_db::Database;

// =============================================================================
// APPLICATION STATE
// =============================================================================

/// Application state shared across handlers.
#[derive(Clone)]
struct AppState {
    notebooks: NotebookService,
    notes: NoteService,
}

// =============================================================================
// REQUEST TYPES
// =============================================================================

#[derive(Debug, Deserialize, utoipa::ToSchema)]
struct CreateNotebookRequest {
    name: String,
}

#[derive(Debug, Deserialize)]
struct BatchQuery {
    /// Comma-separated notebook ids.
    ids: String,
}

#[derive(Debug, Deserialize)]
struct TagFilterQuery {
    tag: String,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
struct TagsRequest {
    tags: Vec<String>,
}

// =============================================================================
// NOTEBOOK HANDLERS
// =============================================================================

#[utoipa::path(
    post,
    path = "/notebooks",
    request_body = CreateNotebookRequest,
    responses(
        (status = 201, description = "Notebook created", body = NotebookView),
        (status = 400, description = "Missing name"),
        (status = 500, description = "Internal server error")
    )
)]
async fn create_notebook(
    State(state): State<AppState>,
    Json(req): Json<CreateNotebookRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.name.trim().is_empty() {
        return Err(ApiError::BadRequest("please provide name".to_string()));
    }
    let view = state.notebooks.create(&req.name).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

#[utoipa::path(
    get,
    path = "/notebooks",
    responses(
        (status = 200, description = "All notebooks with their notes", body = [NotebookView]),
        (status = 500, description = "Internal server error")
    )
)]
async fn list_notebooks(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let views = state.notebooks.list_all().await?;
    Ok(Json(views))
}

#[utoipa::path(
    get,
    path = "/notebooks/batch",
    params(("ids" = String, Query, description = "Comma-separated notebook ids")),
    responses(
        (status = 200, description = "Notebooks for the ids that exist", body = [NotebookView]),
        (status = 400, description = "Malformed id list"),
        (status = 500, description = "Internal server error")
    )
)]
async fn get_notebooks_batch(
    State(state): State<AppState>,
    Query(query): Query<BatchQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let ids = query
        .ids
        .split(',')
        .map(|raw| raw.trim().parse::<i64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| {
            ApiError::BadRequest(format!(
                "ids must be a comma-separated list of integers, got '{}'",
                query.ids
            ))
        })?;
    let views = state.notebooks.get_many(&ids).await?;
    Ok(Json(views))
}

#[utoipa::path(
    get,
    path = "/notebooks/{id}",
    params(("id" = i64, Path, description = "Notebook id")),
    responses(
        (status = 200, description = "Notebook with all its notes", body = NotebookView),
        (status = 404, description = "Notebook not found"),
        (status = 500, description = "Internal server error")
    )
)]
async fn get_notebook(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let view = state.notebooks.get(id).await?;
    Ok(Json(view))
}

#[utoipa::path(
    get,
    path = "/notebooks/{id}/notes",
    params(
        ("id" = i64, Path, description = "Notebook id"),
        ("tag" = String, Query, description = "Tag value the returned notes must carry")
    ),
    responses(
        (status = 200, description = "Notebook with only the matching notes", body = NotebookView),
        (status = 404, description = "Notebook not found"),
        (status = 500, description = "Internal server error")
    )
)]
async fn get_notebook_by_tag(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<TagFilterQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let view = state.notebooks.get_by_tag(id, &query.tag).await?;
    Ok(Json(view))
}

#[utoipa::path(
    delete,
    path = "/notebooks/{id}",
    params(("id" = i64, Path, description = "Notebook id")),
    responses(
        (status = 200, description = "Deleted notebook id", body = i64),
        (status = 404, description = "Notebook not found"),
        (status = 500, description = "Internal server error")
    )
)]
async fn delete_notebook(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let deleted = state.notebooks.delete(id).await?;
    Ok(Json(deleted))
}

// =============================================================================
// NOTE HANDLERS
// =============================================================================

#[utoipa::path(
    post,
    path = "/notes",
    request_body = CreateNoteRequest,
    responses(
        (status = 201, description = "Note created", body = NoteView),
        (status = 400, description = "Missing title or body"),
        (status = 404, description = "Owning notebook not found"),
        (status = 500, description = "Internal server error")
    )
)]
async fn create_note(
    State(state): State<AppState>,
    Json(req): Json<CreateNoteRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.title.trim().is_empty() {
        return Err(ApiError::BadRequest("please provide title".to_string()));
    }
    if req.body.trim().is_empty() {
        return Err(ApiError::BadRequest("please provide body".to_string()));
    }
    let view = state.notes.create(req).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

#[utoipa::path(
    get,
    path = "/notes/{id}",
    params(("id" = i64, Path, description = "Note id")),
    responses(
        (status = 200, description = "Note with its tags", body = NoteView),
        (status = 404, description = "Note not found"),
        (status = 500, description = "Internal server error")
    )
)]
async fn get_note(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let view = state.notes.get(id).await?;
    Ok(Json(view))
}

#[utoipa::path(
    put,
    path = "/notes/{id}",
    params(("id" = i64, Path, description = "Note id")),
    request_body = UpdateNoteRequest,
    responses(
        (status = 200, description = "Updated note", body = NoteView),
        (status = 400, description = "Missing title or body"),
        (status = 404, description = "Note not found"),
        (status = 500, description = "Internal server error")
    )
)]
async fn update_note(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateNoteRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.title.trim().is_empty() {
        return Err(ApiError::BadRequest("please provide title".to_string()));
    }
    if req.body.trim().is_empty() {
        return Err(ApiError::BadRequest("please provide body".to_string()));
    }
    let view = state.notes.update(id, req).await?;
    Ok(Json(view))
}

#[utoipa::path(
    patch,
    path = "/notes/{id}",
    params(("id" = i64, Path, description = "Note id")),
    responses(
        (status = 200, description = "Updated note", body = NoteView),
        (status = 400, description = "Unknown field name"),
        (status = 403, description = "Attempted tag modification"),
        (status = 404, description = "Note not found"),
        (status = 500, description = "Internal server error")
    )
)]
async fn update_note_partial(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(fields): Json<HashMap<String, String>>,
) -> Result<impl IntoResponse, ApiError> {
    let view = state.notes.update_partial(id, &fields).await?;
    Ok(Json(view))
}

#[utoipa::path(
    delete,
    path = "/notes/{id}",
    params(("id" = i64, Path, description = "Note id")),
    responses(
        (status = 200, description = "Deleted note id", body = i64),
        (status = 404, description = "Note not found"),
        (status = 500, description = "Internal server error")
    )
)]
async fn delete_note(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let deleted = state.notes.delete(id).await?;
    Ok(Json(deleted))
}

// =============================================================================
// TAG HANDLERS
// =============================================================================

#[utoipa::path(
    post,
    path = "/notes/{id}/tags",
    params(("id" = i64, Path, description = "Note id")),
    request_body = TagsRequest,
    responses(
        (status = 200, description = "Note with the combined tag set", body = NoteView),
        (status = 400, description = "Missing tags"),
        (status = 404, description = "Note not found"),
        (status = 500, description = "Internal server error")
    )
)]
async fn add_note_tags(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<TagsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.tags.is_empty() {
        return Err(ApiError::BadRequest("please provide tags".to_string()));
    }
    let view = state.notes.add_tags(id, &req.tags).await?;
    Ok(Json(view))
}

#[utoipa::path(
    delete,
    path = "/notes/{id}/tags",
    params(("id" = i64, Path, description = "Note id")),
    request_body = TagsRequest,
    responses(
        (status = 200, description = "Note with the remaining tags", body = NoteView),
        (status = 400, description = "Missing tags"),
        (status = 404, description = "Note not found"),
        (status = 500, description = "Internal server error")
    )
)]
async fn delete_note_tags(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<TagsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.tags.is_empty() {
        return Err(ApiError::BadRequest("please provide tags".to_string()));
    }
    let view = state.notes.delete_tags(id, &req.tags).await?;
    Ok(Json(view))
}

// =============================================================================
// SERVICE ENDPOINTS
// =============================================================================

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        create_notebook,
        list_notebooks,
        get_notebooks_batch,
        get_notebook,
        get_notebook_by_tag,
        delete_notebook,
        create_note,
        get_note,
        update_note,
        update_note_partial,
        delete_note,
        add_note_tags,
        delete_note_tags,
    ),
    components(schemas(
        CreateNotebookRequest,
        TagsRequest,
        CreateNoteRequest,
        UpdateNoteRequest,
        NotebookView,
        NoteView,
    ))
)]
struct ApiDoc;

// =============================================================================
// ERROR HANDLING
// =============================================================================

#[derive(Debug)]
enum ApiError {
    Core(Error),
    BadRequest(String),
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError::Core(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match &self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Core(err) => {
                let status = match err {
                    Error::NotebookNotFound(_) | Error::NoteNotFound(_) => StatusCode::NOT_FOUND,
                    Error::IllegalField(_) => StatusCode::BAD_REQUEST,
                    Error::IllegalTagModification => StatusCode::FORBIDDEN,
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, err.to_string())
            }
        };

        let body = Json(serde_json::json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}

// =============================================================================
// STARTUP
// =============================================================================

fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api-docs/openapi.json", get(openapi_json))
        .route("/notebooks", post(create_notebook).get(list_notebooks))
        .route("/notebooks/batch", get(get_notebooks_batch))
        .route(
            "/notebooks/:id",
            get(get_notebook).delete(delete_notebook),
        )
        .route("/notebooks/:id/notes", get(get_notebook_by_tag))
        .route("/notes", post(create_note))
        .route(
            "/notes/:id",
            get(get_note)
                .put(update_note)
                .patch(update_note_partial)
                .delete(delete_note),
        )
        .route(
            "/notes/:id/tags",
            post(add_note_tags).delete(delete_note_tags),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(env_filter);

    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    if log_format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "postgres://localhost/scribe".to_string());
    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000);

    // invalid cache settings abort startup before anything is served
    let cache_config = CacheConfig::from_env()?;

    let db = Database::connect(&database_url).await?;
    db.migrate().await?;

    let cache = ViewCache::new(&cache_config)?;
    let state = AppState {
        notebooks: NotebookService::new(db.clone(), cache.clone()),
        notes: NoteService::new(db, cache),
    };

    let addr: SocketAddr = format!("{host}:{port}").parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "scribe-api listening");
    axum::serve(listener, app(state)).await?;
    Ok(())
}
