/*!
 * Interactive page for uploading a document and listening to the result.
 *
 * - `GET /` renders the upload form
 * - `POST /generate` runs the pipeline on the uploaded file
 * - `GET /audio` streams the last generated audio file
 */

use anyhow::{Context, Result};
use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Router,
};
use log::{error, info, warn};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::app_config::{Config, ServerConfig};
use crate::errors::AppError;
use crate::file_utils::FileManager;
use crate::pipeline::{LogProgress, PodcastPipeline};
use crate::summary::PodcastDuration;

pub use self::pages::{escape_html, render_page, GeneratedPodcast, PageView};

pub mod pages;

/// Shared state of the page handlers
#[derive(Clone)]
pub struct AppState {
    pipeline: Arc<PodcastPipeline>,
    server: Arc<ServerConfig>,
    default_duration: PodcastDuration,
    /// Held for the whole run so two uploads never share the fixed file names
    run_lock: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(pipeline: PodcastPipeline, server: ServerConfig, default_duration: PodcastDuration) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            server: Arc::new(server),
            default_duration,
            run_lock: Arc::new(Mutex::new(())),
        }
    }
}

/// Build the router for the page
pub fn router(state: AppState) -> Router {
    let upload_limit = state.server.max_upload_bytes;

    Router::new()
        .route("/", get(index))
        .route("/generate", post(generate).layer(DefaultBodyLimit::max(upload_limit)))
        .route("/audio", get(audio))
        .with_state(state)
}

/// Serve the page until the process is stopped
pub async fn serve(config: Config) -> Result<()> {
    FileManager::ensure_dir(&config.server.work_dir)
        .with_context(|| format!("Failed to create work directory: {:?}", config.server.work_dir))?;

    let pipeline = PodcastPipeline::from_config(&config)?;
    let address = config.server.bind_address();
    let state = AppState::new(pipeline, config.server.clone(), config.summarization.common.default_duration);

    let listener = tokio::net::TcpListener::bind(&address).await
        .with_context(|| format!("Failed to bind to address: {}", address))?;

    info!("pdfcast listening on http://{}", address);

    axum::serve(listener, router(state))
        .await
        .context("HTTP server failed")?;

    Ok(())
}

async fn index(State(state): State<AppState>) -> Html<String> {
    Html(render_page(&PageView::with_duration(state.default_duration)))
}

/// Render the page with an error message and the given status
fn error_page(status: StatusCode, duration: PodcastDuration, message: impl Into<String>) -> Response {
    let page = render_page(&PageView::with_duration(duration).error(message));
    (status, Html(page)).into_response()
}

/// Status code shown for a failed run
fn status_for(error: &AppError) -> StatusCode {
    match error {
        AppError::Extraction(_) => StatusCode::UNPROCESSABLE_ENTITY,
        AppError::Summarization(_) | AppError::Synthesis(_) => StatusCode::BAD_GATEWAY,
    }
}

async fn generate(State(state): State<AppState>, mut multipart: Multipart) -> Response {
    let mut document: Option<bytes::Bytes> = None;
    let mut duration_field: Option<String> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                warn!("Rejected upload: {}", e);
                return error_page(e.status(), state.default_duration, format!("Upload failed: {}", e.body_text()));
            }
        };

        let name = field.name().unwrap_or_default().to_string();
        let result = match name.as_str() {
            "document" => field.bytes().await.map(|b| document = Some(b)),
            "duration" => field.text().await.map(|t| duration_field = Some(t)),
            _ => Ok(()),
        };
        if let Err(e) = result {
            warn!("Rejected upload: {}", e);
            return error_page(e.status(), state.default_duration, format!("Upload failed: {}", e.body_text()));
        }
    }

    let duration = match duration_field.as_deref() {
        Some(value) => match value.parse::<PodcastDuration>() {
            Ok(duration) => duration,
            Err(e) => return error_page(StatusCode::BAD_REQUEST, state.default_duration, e.to_string()),
        },
        None => state.default_duration,
    };

    let document = match document {
        Some(bytes) if !bytes.is_empty() => bytes,
        _ => return error_page(StatusCode::BAD_REQUEST, duration, "Please upload a PDF file first."),
    };

    let _guard = state.run_lock.lock().await;

    let upload_path = state.server.upload_path();
    let output_path = state.server.output_path();

    if let Err(e) = FileManager::write_bytes_atomic(&upload_path, &document) {
        error!("Failed to store upload at {:?}: {}", upload_path, e);
        return error_page(StatusCode::INTERNAL_SERVER_ERROR, duration, "Failed to store the uploaded file.");
    }

    info!("Generating {} podcast from a {} byte upload", duration.label().to_lowercase(), document.len());

    match state.pipeline.generate(&upload_path, &output_path, duration, &LogProgress).await {
        Ok(output) => {
            let podcast = GeneratedPodcast {
                audio_url: format!("/audio?v={}", chrono::Utc::now().timestamp_millis()),
                transcript: output.transcript,
            };
            Html(render_page(&PageView::with_duration(duration).podcast(podcast))).into_response()
        }
        Err(e) => {
            error!("Podcast generation failed: {}", e);
            error_page(status_for(&e), duration, e.to_string())
        }
    }
}

async fn audio(State(state): State<AppState>) -> Response {
    let output_path = state.server.output_path();

    match tokio::fs::read(&output_path).await {
        Ok(bytes) => (
            [
                (header::CONTENT_TYPE, "audio/mpeg"),
                (header::CACHE_CONTROL, "no-store, no-cache, must-revalidate"),
            ],
            bytes,
        ).into_response(),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            (StatusCode::NOT_FOUND, "No podcast has been generated yet").into_response()
        }
        Err(e) => {
            error!("Failed to read audio file {:?}: {}", output_path, e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to read the audio file").into_response()
        }
    }
}
