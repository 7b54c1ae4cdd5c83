//! Health check and service banner

use crate::core::Capability;
use crate::server::state::AppState;
use actix_web::{HttpResponse, Result as ActixResult, web};
use serde_json::json;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index))
        .route("/health", web::get().to(health_check));
}

/// Service banner and endpoint index
async fn index(state: web::Data<AppState>) -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(json!({
        "status": "running",
        "name": "pitchreel",
        "version": env!("CARGO_PKG_VERSION"),
        "providers": {
            "text": state.router.chain(Capability::Text),
            "speech": state.router.chain(Capability::Speech),
            "video": state.router.chain(Capability::Video),
        },
        "endpoints": {
            "research": "POST /api/research - Research a company",
            "script": "POST /api/script - Generate sales script",
            "voice": "POST /api/voice - Generate voice audio",
            "voice_clone": "POST /api/voice/clone - Clone a voice from audio sample",
            "voice_profiles": "GET /api/voice/profiles - List saved voice profiles",
            "video": "POST /api/video - Generate video",
            "talking_head": "POST /api/video/talking-head - Talking-head video",
            "generate": "POST /api/generate - Full pipeline",
            "status": "GET /api/status/{job_id} - Check job status",
        }
    })))
}

/// Liveness probe
async fn health_check() -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(json!({ "status": "healthy" })))
}
