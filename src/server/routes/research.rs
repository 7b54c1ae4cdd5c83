//! Company research endpoint

use crate::core::types::TextRequest;
use crate::server::state::AppState;
use crate::services::{prompts, scraper};
use crate::utils::error::GatewayError;
use actix_web::{HttpResponse, web};
use serde::Deserialize;
use tracing::info;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/research", web::post().to(research_company));
}

#[derive(Debug, Deserialize)]
struct ResearchRequest {
    url: String,
    /// Attach the scraped text sample to the response
    #[serde(default)]
    deep_scrape: bool,
}

/// Scrape a company site and produce a research profile
async fn research_company(
    state: web::Data<AppState>,
    request: web::Json<ResearchRequest>,
) -> Result<HttpResponse, GatewayError> {
    info!(url = %request.url, "research requested");

    let snapshot = scraper::scrape_company(&request.url).await;
    if snapshot.is_empty() {
        return Err(GatewayError::BadRequest(
            "could not scrape any useful content from URL".to_string(),
        ));
    }

    let prompt = prompts::render_research_prompt(
        &request.url,
        snapshot.display_name(),
        &snapshot.prompt_context(),
    );

    let routed = state.router.generate_text(&TextRequest::new(prompt)).await?;
    let mut research = prompts::extract_json(&routed.value.content)?;

    if request.deep_scrape {
        if let (Some(object), Some(sample)) = (research.as_object_mut(), &snapshot.text_sample) {
            object.insert(
                "raw_content".to_string(),
                serde_json::Value::String(sample.clone()),
            );
        }
    }

    Ok(HttpResponse::Ok().json(research))
}
