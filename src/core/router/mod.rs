//! Provider routing
//!
//! The router owns the registry and the per-capability fallback chains. Every
//! generative call in the system goes through here: providers are tried
//! strictly in configured order, the first success wins, and exhaustion
//! surfaces every attempt. The router keeps no state between calls.

mod error;
mod router;

#[cfg(test)]
mod tests;

pub use error::{ProviderAttempt, RouterError};
pub use router::{ProviderRouter, Routed};
