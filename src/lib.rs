//! # pitchreel
//!
//! Backend for generating personalized sales videos: scrape a company's
//! website, write a research profile and sales script with a text provider,
//! narrate the script with a speech provider, generate footage with a video
//! provider, and merge the result with FFmpeg.
//!
//! Every generative step is dispatched through a capability router with an
//! ordered fallback chain per capability, so the same pipeline runs against
//! cloud APIs or locally hosted models, selected purely by configuration:
//!
//! ```yaml
//! routing:
//!   text: [vllm, minimax]
//!   speech: [xtts, minimax]
//!   video: [sadtalker, minimax]
//! ```
//!
//! ## Running the server
//!
//! ```rust,no_run
//! use pitchreel::{Config, server};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load(None).await?;
//!     let server = server::HttpServer::new(&config)?;
//!     server.start().await?;
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod config;
pub mod core;
pub mod server;
pub mod services;
pub mod utils;

// Re-export main types
pub use config::Config;
pub use core::Capability;
pub use core::providers::{ProviderError, ProviderId, ProviderRegistry};
pub use core::router::{ProviderRouter, Routed, RouterError};
pub use utils::error::{GatewayError, Result};

/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Name of the crate
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constants_match_manifest() {
        assert_eq!(VERSION, env!("CARGO_PKG_VERSION"));
        assert_eq!(NAME, "pitchreel");
    }
}
