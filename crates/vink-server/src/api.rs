use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::{HeaderValue, Method, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use uuid::Uuid;

use crate::blob_store::BlobStore;
use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::service::{CreateVanish, UploadedFile, VanishService, VanishSnapshot};

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<VanishService>,
    pub blob_store: Arc<BlobStore>,
    pub config: Arc<ServerConfig>,
}

pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    Router::new()
        .route("/health", get(health_check))
        .route("/api/vanish", post(create_vanish))
        .route("/api/vanish/:public_id", get(get_vanish))
        .route("/files/:id", get(file_download))
        .layer(DefaultBodyLimit::max(state.config.max_upload_size))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any);

    if config.allowed_origins.is_empty() {
        cors.allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        cors.allow_origin(origins)
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateVanishResponse {
    public_id: String,
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn create_vanish(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<CreateVanishResponse>), ServerError> {
    let mut input = CreateVanish::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServerError::BadRequest(format!("Multipart error: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "title" => input.title = Some(text_field(field).await?),
            "content" => input.content = Some(text_field(field).await?),
            "expiryTime" => input.expiry_directive = Some(text_field(field).await?),
            "isOneTime" => {
                let value = text_field(field).await?;
                input.is_one_time =
                    value.eq_ignore_ascii_case("true") || value == "1";
            }
            "file" => {
                let file_name = field.file_name().unwrap_or("file").to_string();
                let content_type = field.content_type().map(String::from);
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ServerError::BadRequest(format!("Failed to read file: {}", e)))?
                    .to_vec();
                input.files.push(UploadedFile {
                    file_name,
                    content_type,
                    data,
                });
            }
            _ => {} // unknown fields are ignored
        }
    }

    let public_id = state.service.create(input).await?;

    info!(public_id = %public_id, "Vanish created via API");

    Ok((
        StatusCode::CREATED,
        Json(CreateVanishResponse { public_id }),
    ))
}

async fn get_vanish(
    State(state): State<AppState>,
    Path(public_id): Path<String>,
) -> Result<Json<VanishSnapshot>, ServerError> {
    let snapshot = state
        .service
        .read(&public_id)
        .await?
        .ok_or(ServerError::NotFound)?;
    Ok(Json(snapshot))
}

async fn file_download(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Vec<u8>, ServerError> {
    state.blob_store.read(id).await
}

async fn text_field(field: axum::extract::multipart::Field<'_>) -> Result<String, ServerError> {
    field
        .text()
        .await
        .map_err(|e| ServerError::BadRequest(format!("Failed to read field: {}", e)))
}

pub async fn serve(state: AppState, addr: std::net::SocketAddr) -> anyhow::Result<()> {
    let app = build_router(state);

    info!(addr = %addr, "Starting HTTP API server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
