//! Company website scraper
//!
//! Fetches a company's landing page and pulls out whatever is useful as
//! research-prompt input: name, description, services, contact details,
//! social presence, tech signals. Failures never abort a pipeline; they are
//! recorded on the snapshot and the research prompt works with what it has.
//!
//! The HTML document is parsed and mined inside a synchronous helper so the
//! non-Send parse tree never lives across an await point.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;
use url::Url;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\w.+-]+@[\w-]+\.[\w.-]+").unwrap());
static PHONE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\+?\(?\d{1,3}\)?[-\s.]?\d{3}[-\s.]?\d{4,6}").unwrap()
});
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

const INDUSTRY_KEYWORDS: &[(&str, &[&str])] = &[
    ("healthcare", &["health", "medical", "clinic", "patient", "doctor", "hospital", "therapy", "wellness"]),
    ("ecommerce", &["shop", "store", "cart", "buy", "shipping", "retail", "commerce"]),
    ("saas", &["software", "platform", "cloud", "dashboard", "analytics", "api", "integration", "subscription"]),
    ("fintech", &["finance", "payment", "banking", "invest", "loan", "insurance", "fintech"]),
    ("manufacturing", &["manufacturing", "factory", "production", "industrial", "supply chain", "assembly"]),
    ("real_estate", &["property", "real estate", "realty", "homes", "listings", "broker", "mortgage"]),
    ("education", &["education", "learning", "school", "course", "training", "student", "teach"]),
    ("professional_services", &["consulting", "agency", "legal", "accounting", "advisory", "firm"]),
];

const TECH_SIGNALS: &[(&str, &str)] = &[
    ("react", "React.js"),
    ("angular", "Angular"),
    ("vue", "Vue.js"),
    ("wordpress", "WordPress"),
    ("shopify", "Shopify"),
    ("hubspot", "HubSpot"),
    ("salesforce", "Salesforce"),
    ("intercom", "Intercom"),
    ("zendesk", "Zendesk"),
    ("stripe", "Stripe"),
    ("segment", "Segment"),
    ("google-analytics", "Google Analytics"),
    ("hotjar", "Hotjar"),
    ("mixpanel", "Mixpanel"),
];

const SOCIAL_DOMAINS: &[(&str, &str)] = &[
    ("linkedin.com", "linkedin"),
    ("twitter.com", "twitter"),
    ("x.com", "twitter"),
    ("facebook.com", "facebook"),
    ("instagram.com", "instagram"),
    ("youtube.com", "youtube"),
    ("github.com", "github"),
];

/// Everything the scraper could learn about a company site
#[derive(Debug, Clone, Default, Serialize)]
pub struct CompanySnapshot {
    pub url: String,
    pub domain: String,
    pub company_name: Option<String>,
    pub title: Option<String>,
    pub meta_description: Option<String>,
    pub tagline: Option<String>,
    pub about_text: Option<String>,
    pub services: Vec<String>,
    pub industries: Vec<String>,
    pub team_page_exists: bool,
    pub careers_page_exists: bool,
    pub contact_info: HashMap<String, String>,
    pub social_links: HashMap<String, String>,
    pub tech_signals: Vec<String>,
    /// First stretch of main-content text
    pub text_sample: Option<String>,
    pub error: Option<String>,
}

impl CompanySnapshot {
    /// The best name available for prompts and file naming
    pub fn display_name(&self) -> &str {
        self.company_name.as_deref().unwrap_or(&self.domain)
    }

    /// Whether anything useful was extracted at all
    pub fn is_empty(&self) -> bool {
        self.company_name.is_none() && self.title.is_none()
    }

    /// Render the snapshot as research-prompt context
    pub fn prompt_context(&self) -> String {
        let mut lines = vec![
            format!("URL: {}", self.url),
            format!("Domain: {}", self.domain),
        ];
        if let Some(name) = &self.company_name {
            lines.push(format!("Company Name: {}", name));
        }
        if let Some(title) = &self.title {
            lines.push(format!("Page Title: {}", title));
        }
        if let Some(desc) = &self.meta_description {
            lines.push(format!("Description: {}", desc));
        }
        if let Some(tagline) = &self.tagline {
            lines.push(format!("Tagline: {}", tagline));
        }
        if let Some(about) = &self.about_text {
            lines.push(format!("About: {}", about));
        }
        if !self.services.is_empty() {
            lines.push(format!("Services/Products: {}", self.services.join(", ")));
        }
        if !self.industries.is_empty() {
            lines.push(format!("Industries: {}", self.industries.join(", ")));
        }
        if self.team_page_exists {
            lines.push("Has Team Page: Yes (suggests established company)".to_string());
        }
        if self.careers_page_exists {
            lines.push("Has Careers Page: Yes (likely hiring/growing)".to_string());
        }
        if !self.contact_info.is_empty() {
            let mut keys: Vec<_> = self.contact_info.iter().collect();
            keys.sort_by_key(|(k, _)| k.clone());
            let rendered: Vec<String> =
                keys.iter().map(|(k, v)| format!("{}: {}", k, v)).collect();
            lines.push(format!("Contact: {}", rendered.join(", ")));
        }
        if !self.social_links.is_empty() {
            let mut names: Vec<_> = self.social_links.keys().cloned().collect();
            names.sort();
            lines.push(format!("Social Presence: {}", names.join(", ")));
        }
        if !self.tech_signals.is_empty() {
            lines.push(format!("Tech Signals: {}", self.tech_signals.join(", ")));
        }
        if let Some(sample) = &self.text_sample {
            let cut = sample.chars().take(500).collect::<String>();
            lines.push(format!("Content Sample: {}", cut));
        }
        lines.join("\n")
    }
}

/// Scrape a company website into a [`CompanySnapshot`]
pub async fn scrape_company(raw_url: &str) -> CompanySnapshot {
    let url = normalize_url(raw_url);
    let domain = Url::parse(&url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.trim_start_matches("www.").to_string()))
        .unwrap_or_else(|| raw_url.to_string());

    let mut snapshot = CompanySnapshot {
        url: url.clone(),
        domain,
        ..CompanySnapshot::default()
    };

    let client = match reqwest::Client::builder()
        .timeout(Duration::from_secs(15))
        .redirect(reqwest::redirect::Policy::limited(5))
        .user_agent("Mozilla/5.0 (compatible; PitchreelResearchBot/1.0)")
        .build()
    {
        Ok(client) => client,
        Err(e) => {
            snapshot.error = Some(format!("client setup failed: {}", e));
            return snapshot;
        }
    };

    let html = match client.get(&url).send().await {
        Ok(response) => match response.error_for_status() {
            Ok(response) => match response.text().await {
                Ok(html) => html,
                Err(e) => {
                    snapshot.error = Some(format!("failed to read body: {}", e));
                    return snapshot;
                }
            },
            Err(e) => {
                snapshot.error = Some(format!("HTTP error: {}", e));
                return snapshot;
            }
        },
        Err(e) => {
            snapshot.error = Some(format!("request failed: {}", e));
            return snapshot;
        }
    };

    extract_into(&mut snapshot, &html);

    snapshot.team_page_exists =
        any_page_exists(&client, &url, &["team", "about-us", "about", "our-team"]).await;
    snapshot.careers_page_exists =
        any_page_exists(&client, &url, &["careers", "jobs", "join-us", "work-with-us"]).await;

    debug!(domain = %snapshot.domain, name = ?snapshot.company_name, "scraped company site");
    snapshot
}

fn normalize_url(url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("https://{}", url)
    }
}

/// All HTML mining happens here, synchronously
fn extract_into(snapshot: &mut CompanySnapshot, html: &str) {
    let doc = Html::parse_document(html);

    snapshot.title = extract_title(&doc);
    snapshot.meta_description = extract_meta_description(&doc);
    snapshot.company_name = infer_company_name(&doc, &snapshot.domain, snapshot.title.as_deref());
    snapshot.tagline = extract_tagline(&doc);
    snapshot.about_text = extract_about_text(&doc);
    snapshot.services = extract_services(&doc);
    snapshot.social_links = extract_social_links(&doc);
    snapshot.contact_info = extract_contact_info(&doc);
    snapshot.text_sample = extract_text_sample(&doc);

    let html_lower = html.to_lowercase();
    snapshot.tech_signals = TECH_SIGNALS
        .iter()
        .filter(|(needle, _)| html_lower.contains(needle))
        .map(|(_, name)| name.to_string())
        .collect();
    snapshot.industries = INDUSTRY_KEYWORDS
        .iter()
        .filter(|(_, keywords)| {
            keywords.iter().filter(|kw| html_lower.contains(*kw)).count() >= 2
        })
        .map(|(industry, _)| industry.to_string())
        .collect();
}

fn sel(selector: &str) -> Selector {
    Selector::parse(selector).expect("static selector")
}

fn element_text(element: scraper::ElementRef<'_>) -> String {
    WHITESPACE_RE
        .replace_all(element.text().collect::<String>().trim(), " ")
        .to_string()
}

fn extract_title(doc: &Html) -> Option<String> {
    let title = element_text(doc.select(&sel("title")).next()?);
    if title.is_empty() {
        return None;
    }
    // Strip "| Company" style suffixes
    let mut cleaned = title.as_str();
    for sep in [" | ", " - ", " – ", " — "] {
        if let Some(idx) = cleaned.find(sep) {
            cleaned = &cleaned[..idx];
        }
    }
    Some(cleaned.trim().to_string())
}

fn extract_meta_description(doc: &Html) -> Option<String> {
    for selector in ["meta[name=description]", "meta[property='og:description']"] {
        if let Some(content) = doc
            .select(&sel(selector))
            .next()
            .and_then(|m| m.value().attr("content"))
        {
            let content = content.trim();
            if !content.is_empty() {
                return Some(content.to_string());
            }
        }
    }
    None
}

fn infer_company_name(doc: &Html, domain: &str, title: Option<&str>) -> Option<String> {
    if let Some(name) = doc
        .select(&sel("meta[property='og:site_name']"))
        .next()
        .and_then(|m| m.value().attr("content"))
    {
        return Some(name.trim().to_string());
    }

    // Structured data often carries the organization name
    for script in doc.select(&sel("script[type='application/ld+json']")) {
        let raw = script.text().collect::<String>();
        if let Ok(data) = serde_json::from_str::<Value>(&raw) {
            if let Some(name) = data
                .get("name")
                .or_else(|| data.pointer("/organization/name"))
                .and_then(Value::as_str)
            {
                return Some(name.to_string());
            }
        }
    }

    if let Some(title) = title {
        if title.len() < 50 {
            return Some(title.to_string());
        }
    }

    // Fall back to a cleaned-up domain
    let stem = domain.split('.').next()?;
    let words: Vec<String> = stem
        .split(['-', '_'])
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect();
    Some(words.join(" "))
}

fn extract_tagline(doc: &Html) -> Option<String> {
    for selector in ["h1", "h2", ".tagline", ".hero-text", ".headline"] {
        for element in doc.select(&sel(selector)) {
            let text = element_text(element);
            if text.len() > 20 && text.len() < 200 {
                return Some(text);
            }
        }
    }
    None
}

fn extract_about_text(doc: &Html) -> Option<String> {
    for selector in ["[id*=about]", "[class*=about]"] {
        if let Some(element) = doc.select(&sel(selector)).next() {
            let text = element_text(element);
            if !text.is_empty() {
                return Some(text.chars().take(500).collect());
            }
        }
    }
    None
}

fn extract_services(doc: &Html) -> Vec<String> {
    let mut services = Vec::new();

    for selector in [
        "[id*=service] h3, [id*=service] h4, [id*=service] li",
        "[class*=service] h3, [class*=service] h4, [class*=service] li",
        "[id*=product] h3, [id*=product] h4, [id*=product] li",
        "[class*=solution] h3, [class*=solution] h4, [class*=solution] li",
        "[class*=feature] h3, [class*=feature] h4",
    ] {
        for element in doc.select(&sel(selector)) {
            let text = element_text(element);
            if text.len() > 3 && text.len() < 100 && !services.contains(&text) {
                services.push(text);
            }
        }
    }

    // Navigation links pointing at service pages
    for link in doc.select(&sel("nav a[href]")) {
        let href = link.value().attr("href").unwrap_or("").to_lowercase();
        if ["service", "product", "solution"]
            .iter()
            .any(|kw| href.contains(kw))
        {
            let text = element_text(link);
            if text.len() > 3 && text.len() < 50 && !services.contains(&text) {
                services.push(text);
            }
        }
    }

    services.truncate(10);
    services
}

fn extract_social_links(doc: &Html) -> HashMap<String, String> {
    let mut social = HashMap::new();
    for link in doc.select(&sel("a[href]")) {
        let href = link.value().attr("href").unwrap_or("").to_lowercase();
        for (domain, name) in SOCIAL_DOMAINS {
            if href.contains(domain) && !social.contains_key(*name) {
                social.insert(name.to_string(), href.clone());
            }
        }
    }
    social
}

fn extract_contact_info(doc: &Html) -> HashMap<String, String> {
    let mut contact = HashMap::new();
    let text = doc.root_element().text().collect::<String>();

    if let Some(email) = EMAIL_RE.find(&text) {
        contact.insert("email".to_string(), email.as_str().to_string());
    }
    if let Some(phone) = PHONE_RE.find(&text) {
        contact.insert("phone".to_string(), phone.as_str().to_string());
    }
    if let Some(address) = doc.select(&sel("[itemprop=address]")).next() {
        contact.insert("address".to_string(), element_text(address));
    }
    contact
}

fn extract_text_sample(doc: &Html) -> Option<String> {
    for selector in ["main", "article"] {
        if let Some(element) = doc.select(&sel(selector)).next() {
            let text = element_text(element);
            if !text.is_empty() {
                return Some(text.chars().take(1000).collect());
            }
        }
    }

    // No main content container; join visible text blocks so script and style
    // bodies stay out of the sample.
    let mut parts = Vec::new();
    for element in doc.select(&sel("p, h1, h2, h3, li")) {
        let text = element_text(element);
        if !text.is_empty() {
            parts.push(text);
        }
        if parts.len() > 40 {
            break;
        }
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" ").chars().take(1000).collect())
    }
}

/// HEAD-probe a handful of well-known paths
async fn any_page_exists(client: &reqwest::Client, base_url: &str, paths: &[&str]) -> bool {
    let Ok(base) = Url::parse(base_url) else {
        return false;
    };
    for path in paths {
        if let Ok(probe) = base.join(&format!("/{}", path)) {
            let result = client
                .head(probe)
                .timeout(Duration::from_secs(5))
                .send()
                .await;
            if matches!(result, Ok(resp) if resp.status().is_success()) {
                return true;
            }
        }
    }
    false
}
