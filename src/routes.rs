use axum::{Json, Router, extract::{DefaultBodyLimit, Path, State}, http::StatusCode, response::{IntoResponse, Response}, routing::{get, post, put}};
use serde_json::json;
use std::sync::Arc;
use tower_http::{cors::{Any, CorsLayer}, trace::TraceLayer};

use crate::{
    catalog,
    models::{CustomPromptPayload, GeneratedImage, HairstyleOption, ImagePayload, LanguagePayload, ModePayload, ReferencePayload, ResultEntry, StylePayload, ToggleResponse, ViewPayload},
    orchestrator::{GenerationOutcome, Orchestrator, StudioSnapshot},
    upload::{accept_image, UploadError, MAX_UPLOAD_BYTES},
};

#[derive(Clone)]
pub struct AppState {
    pub studio: Arc<Orchestrator>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/styles", get(list_styles))
        .route("/api/state", get(get_state))
        .route("/api/photo", post(upload_photo).delete(clear_photo))
        .route("/api/mode", put(set_mode))
        .route("/api/style", put(select_style))
        .route("/api/style/random", post(random_style))
        .route("/api/custom-prompt", put(set_custom_prompt))
        .route("/api/reference", put(set_reference))
        .route("/api/language", put(set_language))
        .route("/api/view", put(set_view))
        .route("/api/generate", post(generate))
        .route("/api/results", get(displayed_results))
        .route("/api/session", get(session_results))
        .route("/api/favorites", get(list_favorites))
        .route("/api/favorites/:id/toggle", post(toggle_favorite))
        // room for a 5 MiB image once base64-encoded inside JSON
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES * 2))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        )
        .with_state(state)
}

fn error_body(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

fn upload_rejection(err: UploadError) -> Response {
    tracing::warn!("🚫 Image rejected: {}", err);
    let status = match err {
        UploadError::TooLarge => StatusCode::PAYLOAD_TOO_LARGE,
        UploadError::NotAnImage | UploadError::InvalidEncoding => StatusCode::BAD_REQUEST,
    };
    error_body(status, err.to_string())
}

pub async fn list_styles() -> Json<&'static [HairstyleOption]> {
    Json(catalog::hairstyle_options())
}

pub async fn get_state(State(state): State<AppState>) -> Json<StudioSnapshot> {
    Json(state.studio.snapshot())
}

pub async fn upload_photo(State(state): State<AppState>, Json(body): Json<ImagePayload>) -> Response {
    match accept_image(&body.image) {
        Ok(image) => {
            state.studio.upload_photo(image);
            Json(state.studio.snapshot()).into_response()
        }
        Err(e) => upload_rejection(e),
    }
}

pub async fn clear_photo(State(state): State<AppState>) -> Json<StudioSnapshot> {
    state.studio.clear_photo();
    Json(state.studio.snapshot())
}

pub async fn set_mode(State(state): State<AppState>, Json(body): Json<ModePayload>) -> Json<StudioSnapshot> {
    state.studio.set_mode(body.mode);
    Json(state.studio.snapshot())
}

pub async fn select_style(State(state): State<AppState>, Json(body): Json<StylePayload>) -> Result<Json<StudioSnapshot>, StatusCode> {
    if catalog::find_option(&body.id).is_none() {
        return Err(StatusCode::NOT_FOUND);
    }
    state.studio.select_style(&body.id);
    Ok(Json(state.studio.snapshot()))
}

pub async fn random_style(State(state): State<AppState>) -> Json<HairstyleOption> {
    Json(state.studio.randomize_style())
}

pub async fn set_custom_prompt(State(state): State<AppState>, Json(body): Json<CustomPromptPayload>) -> Json<StudioSnapshot> {
    state.studio.set_custom_prompt(&body.text);
    Json(state.studio.snapshot())
}

pub async fn set_reference(State(state): State<AppState>, Json(body): Json<ReferencePayload>) -> Response {
    let image = match body.image.as_deref().map(accept_image).transpose() {
        Ok(image) => image,
        Err(e) => return upload_rejection(e),
    };
    state.studio.set_reference_image(image);
    Json(state.studio.snapshot()).into_response()
}

pub async fn set_language(State(state): State<AppState>, Json(body): Json<LanguagePayload>) -> Json<StudioSnapshot> {
    state.studio.set_language(body.language);
    Json(state.studio.snapshot())
}

pub async fn set_view(State(state): State<AppState>, Json(body): Json<ViewPayload>) -> Json<StudioSnapshot> {
    state.studio.set_view(body.view);
    Json(state.studio.snapshot())
}

pub async fn generate(State(state): State<AppState>) -> Response {
    // Run on its own task so a disconnecting client cannot cancel the flight.
    let studio = Arc::clone(&state.studio);
    let handle = tokio::spawn(async move { studio.generate().await });

    match handle.await {
        Ok(Ok(GenerationOutcome::Succeeded(image))) => Json(image).into_response(),
        Ok(Ok(GenerationOutcome::Failed(message))) => error_body(StatusCode::BAD_GATEWAY, message),
        Ok(Err(rejected)) => error_body(StatusCode::CONFLICT, rejected.to_string()),
        Err(e) => {
            tracing::error!("❌ Generation task panicked: {}", e);
            error_body(StatusCode::INTERNAL_SERVER_ERROR, catalog::generic_error(state.studio.snapshot().language))
        }
    }
}

pub async fn displayed_results(State(state): State<AppState>) -> Json<Vec<ResultEntry>> {
    Json(state.studio.displayed())
}

pub async fn session_results(State(state): State<AppState>) -> Json<Vec<GeneratedImage>> {
    Json(state.studio.session_results())
}

pub async fn list_favorites(State(state): State<AppState>) -> Json<Vec<GeneratedImage>> {
    Json(state.studio.favorites())
}

pub async fn toggle_favorite(Path(id): Path<String>, State(state): State<AppState>) -> Result<Json<ToggleResponse>, StatusCode> {
    state.studio.toggle_favorite(&id).await.map(Json).ok_or(StatusCode::NOT_FOUND)
}
