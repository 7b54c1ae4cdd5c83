//! HTTP route modules

pub mod generate;
pub mod health;
pub mod research;
pub mod script;
pub mod video;
pub mod voice;
