//! Voice synthesis, cloning and profile endpoints

use crate::core::Capability;
use crate::core::types::{SpeechRequest, VoiceSample, estimate_speech_seconds};
use crate::server::state::AppState;
use crate::services::voice_profiles::VoiceProfile;
use crate::utils::error::GatewayError;
use actix_multipart::form::{MultipartForm, tempfile::TempFile, text::Text};
use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/voice", web::post().to(generate_voice))
        .route("/api/voice/voices/list", web::get().to(list_voices))
        .route("/api/voice/clone", web::post().to(clone_voice))
        .route("/api/voice/profiles", web::get().to(list_profiles))
        .route("/api/voice/profiles/{profile_id}", web::get().to(get_profile))
        .route(
            "/api/voice/profiles/{profile_id}",
            web::delete().to(delete_profile),
        )
        .route("/api/voice/providers", web::get().to(voice_providers))
        // keep the wildcard download route last so it cannot shadow the others
        .route("/api/voice/download/{filename}", web::get().to(download));
}

#[derive(Debug, Deserialize)]
struct VoiceRequest {
    text: String,
    #[serde(default = "default_voice")]
    voice_id: String,
    #[serde(default = "default_speed")]
    speed: f32,
    #[serde(default = "default_emotion")]
    emotion: String,
}

fn default_voice() -> String {
    "female-shaonv".to_string()
}

fn default_speed() -> f32 {
    1.0
}

fn default_emotion() -> String {
    "happy".to_string()
}

#[derive(Debug, Serialize)]
struct VoiceResponse {
    audio_path: String,
    duration_estimate: u32,
    file_size: usize,
}

/// Synthesize narration audio and store it as an output artifact
async fn generate_voice(
    state: web::Data<AppState>,
    request: web::Json<VoiceRequest>,
) -> Result<HttpResponse, GatewayError> {
    info!(voice = %request.voice_id, "voice requested");

    let mut speech_request = SpeechRequest::new(&request.text, &request.voice_id);
    speech_request.speed = request.speed;
    speech_request.emotion = Some(request.emotion.clone());

    let routed = state.router.synthesize_speech(&speech_request).await?;

    let filename = format!("voice_{}.mp3", &Uuid::new_v4().simple().to_string()[..8]);
    let audio_path = state.config.storage.output_dir.join(filename);
    tokio::fs::write(&audio_path, &routed.value.audio).await?;

    Ok(HttpResponse::Ok().json(VoiceResponse {
        audio_path: audio_path.display().to_string(),
        duration_estimate: estimate_speech_seconds(&request.text, request.speed) as u32,
        file_size: routed.value.audio.len(),
    }))
}

/// Built-in voices of the current speech provider
async fn list_voices(state: web::Data<AppState>) -> Result<HttpResponse, GatewayError> {
    let voices = state.router.voices()?;
    Ok(HttpResponse::Ok().json(json!({
        "voices": voices,
        "provider": state.router.primary(Capability::Speech),
    })))
}

#[derive(Debug, MultipartForm)]
struct VoiceCloneForm {
    /// Audio sample (MP3/WAV/M4A, roughly 10s-5min of clear speech)
    #[multipart(limit = "25MB")]
    audio: TempFile,
    /// Name for the cloned voice
    name: Text<String>,
}

#[derive(Debug, Serialize)]
struct VoiceCloneResponse {
    profile_id: String,
    name: String,
    voice_id: String,
    message: String,
}

/// Clone a voice from an uploaded audio sample
async fn clone_voice(
    state: web::Data<AppState>,
    form: MultipartForm<VoiceCloneForm>,
) -> Result<HttpResponse, GatewayError> {
    let file_name = form
        .audio
        .file_name
        .clone()
        .unwrap_or_else(|| "audio.mp3".to_string());
    let data = std::fs::read(form.audio.file.path())?;
    let name = form.name.to_string();

    info!(file = %file_name, bytes = data.len(), "voice clone requested");

    // validate and keep the sample before any provider round-trip
    state.assets.save_audio(&data, &file_name).await?;

    let sample = VoiceSample {
        data: data.into(),
        file_name,
        voice_name: sanitize_voice_name(&name),
    };
    let routed = state.router.clone_voice(&sample).await?;

    let profile = state.profiles.add(VoiceProfile::new(
        name.clone(),
        routed.value.voice_id.clone(),
        routed.value.provider.clone(),
        None,
    ))?;

    Ok(HttpResponse::Ok().json(VoiceCloneResponse {
        profile_id: profile.id,
        name: profile.name,
        voice_id: profile.voice_id.clone(),
        message: format!(
            "Voice '{}' cloned successfully. Use voice_id '{}' for TTS.",
            name, profile.voice_id
        ),
    }))
}

/// Provider voice ids must be identifier-like
fn sanitize_voice_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("{}_{}", cleaned, &Uuid::new_v4().simple().to_string()[..6])
}

async fn list_profiles(state: web::Data<AppState>) -> Result<HttpResponse, GatewayError> {
    Ok(HttpResponse::Ok().json(json!({ "profiles": state.profiles.list() })))
}

async fn get_profile(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, GatewayError> {
    let profile_id = path.into_inner();
    match state.profiles.get(&profile_id) {
        Some(profile) => Ok(HttpResponse::Ok().json(profile)),
        None => Err(GatewayError::NotFound("voice profile not found".to_string())),
    }
}

async fn delete_profile(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, GatewayError> {
    let profile_id = path.into_inner();
    if state.profiles.remove(&profile_id)? {
        Ok(HttpResponse::Ok().json(json!({
            "message": "Voice profile deleted",
            "profile_id": profile_id,
        })))
    } else {
        Err(GatewayError::NotFound("voice profile not found".to_string()))
    }
}

/// Current speech provider and fallbacks
async fn voice_providers(state: web::Data<AppState>) -> Result<HttpResponse, GatewayError> {
    Ok(HttpResponse::Ok().json(json!({
        "current": state.router.primary(Capability::Speech),
        "chain": state.router.chain(Capability::Speech),
        "available": state.router.available(Capability::Speech),
    })))
}

/// Download a generated audio file
async fn download(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<actix_files::NamedFile, GatewayError> {
    let filename = path.into_inner();
    // reject traversal; artifacts are flat files in the output dir
    if filename.contains('/') || filename.contains("..") {
        return Err(GatewayError::BadRequest("invalid filename".to_string()));
    }
    let file_path = state.config.storage.output_dir.join(filename);
    actix_files::NamedFile::open_async(&file_path)
        .await
        .map_err(|_| GatewayError::NotFound("file not found".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn voice_names_become_identifier_like() {
        let sanitized = sanitize_voice_name("Jane's CEO voice!");
        assert!(sanitized.starts_with("Jane_s_CEO_voice_"));
        assert!(sanitized.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'));
    }
}
