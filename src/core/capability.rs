//! Capability enumeration
//!
//! A capability is one category of generative work the pipeline needs performed
//! by some backing service. The set is fixed and closed.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Category of generative work
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    /// Text generation (research profiles, sales scripts)
    Text,
    /// Speech synthesis (script narration, voice cloning)
    Speech,
    /// Video generation (text-to-video, talking heads)
    Video,
}

impl Capability {
    /// All capabilities, in pipeline order
    pub const ALL: [Capability; 3] = [Capability::Text, Capability::Speech, Capability::Video];

    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::Text => "text",
            Capability::Speech => "speech",
            Capability::Video => "video",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Capability {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(Capability::Text),
            "speech" | "tts" => Ok(Capability::Speech),
            "video" => Ok(Capability::Video),
            other => Err(format!("unknown capability '{}'", other)),
        }
    }
}
