//! Sales script generation endpoint

use crate::core::types::TextRequest;
use crate::server::state::AppState;
use crate::services::prompts;
use crate::utils::error::GatewayError;
use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use tracing::info;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/script", web::post().to(generate_script));
}

#[derive(Debug, Deserialize)]
struct ScriptRequest {
    /// Research profile from /api/research
    research: serde_json::Value,
    #[serde(default = "default_product")]
    our_product: String,
    /// Override the tone suggested by research
    #[serde(default)]
    tone: Option<String>,
    #[serde(default = "default_max_words")]
    max_words: u32,
}

fn default_product() -> String {
    "AI-powered sales automation platform that helps B2B companies create \
     personalized video outreach at scale"
        .to_string()
}

fn default_max_words() -> u32 {
    150
}

#[derive(Debug, Serialize)]
struct ScriptResponse {
    script: String,
    word_count: usize,
    estimated_duration_seconds: u32,
}

/// Generate a personalized sales script from a research profile
async fn generate_script(
    state: web::Data<AppState>,
    request: web::Json<ScriptRequest>,
) -> Result<HttpResponse, GatewayError> {
    info!("script requested");

    let mut prompt = prompts::render_script_prompt(&request.research, &request.our_product);
    if let Some(tone) = &request.tone {
        prompt.push_str(&format!("\n\nUse a {} tone.", tone));
    }
    prompt.push_str(&format!("\n\nKeep it under {} words.", request.max_words));

    let routed = state
        .router
        .generate_text(&TextRequest::new(prompt).with_max_tokens(1000))
        .await?;
    let script = prompts::clean_script(&routed.value.content);

    let word_count = script.split_whitespace().count();
    // average speaking rate: ~150 words per minute
    let estimated_duration_seconds = ((word_count as f32 / 150.0) * 60.0) as u32;

    Ok(HttpResponse::Ok().json(ScriptResponse {
        script,
        word_count,
        estimated_duration_seconds,
    }))
}
