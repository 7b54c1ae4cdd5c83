//! Full pipeline endpoint: research → script → voice → video → merge

use crate::server::state::AppState;
use crate::services::pipeline::GenerateRequest;
use crate::utils::error::GatewayError;
use actix_web::{HttpResponse, web};
use serde::Serialize;
use tracing::info;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/generate", web::post().to(generate))
        .route("/api/generate/status/{job_id}", web::get().to(status));
}

#[derive(Debug, Serialize)]
struct GenerateResponse {
    job_id: String,
    status: &'static str,
    message: &'static str,
}

/// Kick off the full sales-video pipeline
async fn generate(
    state: web::Data<AppState>,
    request: web::Json<GenerateRequest>,
) -> Result<HttpResponse, GatewayError> {
    info!(url = %request.company_url, skip_video = request.skip_video, "pipeline requested");

    let job_id = state.pipeline.start_generate(request.into_inner());

    Ok(HttpResponse::Ok().json(GenerateResponse {
        job_id,
        status: "pending",
        message: "Pipeline started. Poll /api/generate/status/{job_id} for updates.",
    }))
}

/// Poll a pipeline job
async fn status(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, GatewayError> {
    let job_id = path.into_inner();
    match state.jobs.get(&job_id) {
        Some(record) => Ok(HttpResponse::Ok().json(record)),
        None => Err(GatewayError::NotFound("job not found".to_string())),
    }
}
