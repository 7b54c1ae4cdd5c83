//! Prompt templates and LLM-output cleanup
//!
//! The research prompt asks for a strict JSON profile; the script prompt asks
//! for a `SCRIPT:` block. Models decorate both with reasoning tags and
//! markdown fences, so the extractors here strip all of that before parsing.

use crate::utils::error::{GatewayError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static THINK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<think>.*?</think>").unwrap());

const RESEARCH_TEMPLATE: &str = r#"You are a B2B sales researcher. Analyze the company below and produce a research profile.

Company URL: {company_url}
Company Name: {company_name}

Scraped website data:
{scraped_data}

Respond with ONLY a JSON object with these fields:
- "company_name": the company's name
- "industry": their primary industry
- "products_services": array of their main products or services
- "value_proposition": one sentence on what they sell and to whom
- "target_audience": who their customers are
- "pain_points": array of likely business pain points
- "company_size": estimated size (startup, smb, mid-market, enterprise)
- "tone": the tone their website uses (formal, casual, technical, ...)
- "personalization_hooks": array of specific details usable in outreach

No prose before or after the JSON."#;

const SCRIPT_TEMPLATE: &str = r#"You are writing a short, personalized B2B sales video script.

Research profile of the prospect:
{research_profile}

We are reaching out on behalf of: {sender_name}

Write a warm, specific 30-45 second script that opens with a detail from the
research, connects one of their pain points to what we offer, and ends with a
soft call to action. Speak naturally, no bullet points, no stage directions.

Respond in this exact format:
SCRIPT:
<the script text>
WORD_COUNT: <number>"#;

/// Fill the research prompt template
pub fn render_research_prompt(
    company_url: &str,
    company_name: &str,
    scraped_data: &str,
) -> String {
    RESEARCH_TEMPLATE
        .replace("{company_url}", company_url)
        .replace("{company_name}", company_name)
        .replace("{scraped_data}", scraped_data)
}

/// Fill the script prompt template
pub fn render_script_prompt(research: &Value, sender_name: &str) -> String {
    let profile = serde_json::to_string_pretty(research).unwrap_or_default();
    SCRIPT_TEMPLATE
        .replace("{research_profile}", &profile)
        .replace("{sender_name}", sender_name)
}

/// Parse a JSON object out of an LLM response.
///
/// Strips `<think>` blocks and markdown fences, then takes the outermost
/// `{...}` span.
pub fn extract_json(text: &str) -> Result<Value> {
    let mut clean = THINK_RE.replace_all(text.trim(), "").trim().to_string();

    if clean.starts_with("```") {
        let parts: Vec<&str> = clean.split("```").collect();
        if parts.len() >= 2 {
            let mut inner = parts[1];
            if let Some(stripped) = inner.strip_prefix("json") {
                inner = stripped;
            }
            clean = inner.trim().to_string();
        }
    }

    let start = clean.find('{');
    let end = clean.rfind('}');
    if let (Some(start), Some(end)) = (start, end) {
        if end > start {
            clean = clean[start..=end].to_string();
        }
    }

    serde_json::from_str(&clean)
        .map_err(|e| GatewayError::Internal(format!("model did not return valid JSON: {}", e)))
}

/// Clean a generated script down to the spoken text
pub fn clean_script(text: &str) -> String {
    let mut clean = THINK_RE.replace_all(text.trim(), "").trim().to_string();

    if clean.starts_with("```") {
        let parts: Vec<&str> = clean.split("```").collect();
        if parts.len() >= 2 {
            clean = parts[1].trim().to_string();
        }
    }

    if let Some(script_start) = clean.find("SCRIPT:") {
        let after = &clean[script_start + "SCRIPT:".len()..];
        let script_end = after.find("WORD_COUNT:").unwrap_or(after.len());
        clean = after[..script_end].trim().to_string();
    }

    clean
}
