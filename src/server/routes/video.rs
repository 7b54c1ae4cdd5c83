//! Video generation endpoints
//!
//! Video is slow, so generation runs as background jobs the client polls.

use crate::core::Capability;
use crate::core::types::{TalkingHeadRequest, VideoRequest};
use crate::server::state::AppState;
use crate::utils::error::GatewayError;
use actix_multipart::form::{MultipartForm, tempfile::TempFile};
use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::PathBuf;
use tracing::info;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/video", web::post().to(generate_video))
        .route("/api/video/talking-head", web::post().to(talking_head))
        .route("/api/video/face", web::post().to(upload_face))
        .route("/api/video/providers", web::get().to(video_providers))
        .route("/api/status/{job_id}", web::get().to(job_status));
}

#[derive(Debug, Deserialize)]
struct VideoJobRequest {
    prompt: String,
    /// Provider-side model override
    #[serde(default)]
    model: Option<String>,
    #[serde(default = "default_duration")]
    duration: u32,
}

fn default_duration() -> u32 {
    6
}

#[derive(Debug, Serialize)]
struct JobStartedResponse {
    job_id: String,
    status: &'static str,
    message: String,
}

/// Start a text-to-video job
async fn generate_video(
    state: web::Data<AppState>,
    request: web::Json<VideoJobRequest>,
) -> Result<HttpResponse, GatewayError> {
    info!(duration = request.duration, "video job requested");

    let mut video_request = VideoRequest::new(&request.prompt);
    video_request.model = request.model.clone();
    video_request.duration = request.duration;

    let job_id = state.pipeline.start_video(video_request);

    Ok(HttpResponse::Ok().json(JobStartedResponse {
        job_id,
        status: "pending",
        message: "Video generation started. Poll /api/status/{job_id} for updates.".to_string(),
    }))
}

#[derive(Debug, Deserialize)]
struct TalkingHeadJobRequest {
    /// Narration audio on local disk (e.g. produced by /api/voice)
    audio_path: PathBuf,
    /// Face image on local disk (e.g. uploaded via /api/video/face)
    face_image_path: PathBuf,
    /// Public URL of the face image, needed by cloud providers
    #[serde(default)]
    image_url: Option<String>,
    #[serde(default)]
    prompt: Option<String>,
    #[serde(default = "default_duration")]
    duration: u32,
}

/// Start a talking-head job
async fn talking_head(
    state: web::Data<AppState>,
    request: web::Json<TalkingHeadJobRequest>,
) -> Result<HttpResponse, GatewayError> {
    info!("talking-head job requested");

    let request = request.into_inner();
    let job_id = state.pipeline.start_talking_head(TalkingHeadRequest {
        audio_path: request.audio_path,
        face_image_path: request.face_image_path,
        image_url: request.image_url,
        prompt: request.prompt,
        duration: request.duration,
    });

    Ok(HttpResponse::Ok().json(JobStartedResponse {
        job_id,
        status: "pending",
        message: "Talking-head generation started. Poll /api/status/{job_id} for updates."
            .to_string(),
    }))
}

#[derive(Debug, MultipartForm)]
struct FaceUploadForm {
    /// Face reference image (JPEG/PNG portrait)
    #[multipart(limit = "10MB")]
    image: TempFile,
}

/// Upload and validate a face reference image
async fn upload_face(
    state: web::Data<AppState>,
    form: MultipartForm<FaceUploadForm>,
) -> Result<HttpResponse, GatewayError> {
    let file_name = form
        .image
        .file_name
        .clone()
        .unwrap_or_else(|| "face.jpg".to_string());
    let data = std::fs::read(form.image.file.path())?;

    info!(file = %file_name, bytes = data.len(), "face upload");

    let path = state.assets.save_image(&data, &file_name).await?;

    Ok(HttpResponse::Ok().json(json!({
        "face_image_path": path.display().to_string(),
        "message": "Face image stored. Pass face_image_path to /api/video/talking-head.",
    })))
}

/// Poll a job
async fn job_status(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, GatewayError> {
    let job_id = path.into_inner();
    match state.jobs.get(&job_id) {
        Some(record) => Ok(HttpResponse::Ok().json(record)),
        None => Err(GatewayError::NotFound("job not found".to_string())),
    }
}

/// Current video provider and fallbacks
async fn video_providers(state: web::Data<AppState>) -> Result<HttpResponse, GatewayError> {
    Ok(HttpResponse::Ok().json(json!({
        "current": state.router.primary(Capability::Video),
        "chain": state.router.chain(Capability::Video),
        "available": state.router.available(Capability::Video),
    })))
}
