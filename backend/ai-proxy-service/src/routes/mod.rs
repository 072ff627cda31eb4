use crate::state::AppState;
use axum::middleware;
use axum::{routing::get, routing::post, Router};

pub mod chat;
pub mod code;
pub mod discover;
pub mod document;
pub mod image;
pub mod quiz;
pub mod search;
pub mod suggest;
pub mod transcribe;

use chat::chat;
use code::generate_code;
use discover::discover;
use document::{generate_document, process_document};
use image::generate_image;
use quiz::generate_quiz;
use search::web_search;
use suggest::ai_suggest;
use transcribe::voice_transcribe;

async fn health() -> &'static str {
    "OK"
}

async fn metrics() -> String {
    crate::metrics::render()
}

pub fn build_router(state: AppState) -> Router {
    let public = Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics));

    let api_v1 = Router::new()
        .route("/chat", post(chat))
        .route("/generate-image", post(generate_image))
        .route("/generate-quiz", post(generate_quiz))
        .route("/generate-document", post(generate_document))
        .route("/generate-code", post(generate_code))
        .route("/discover", post(discover))
        .route("/web-search", post(web_search))
        .route("/ai-suggest", post(ai_suggest))
        .route("/voice-transcribe", post(voice_transcribe))
        .route("/process-document", post(process_document));

    let secured_api_v1 = api_v1.layer(middleware::from_fn_with_state(
        state.clone(),
        crate::middleware::auth::auth_middleware,
    ));

    let router = public
        .merge(Router::new().nest("/api/v1", secured_api_v1))
        .with_state(state);

    crate::middleware::with_defaults(router)
}
