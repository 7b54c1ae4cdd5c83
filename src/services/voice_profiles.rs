//! Voice profile persistence
//!
//! Cloned voices are worth keeping: re-cloning costs an upload and provider
//! round-trip. Profiles live in a JSON file under the data directory and are
//! written through on every mutation. A corrupt file starts fresh.

use crate::utils::error::Result;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::warn;
use uuid::Uuid;

const PROFILES_FILE: &str = "voice_profiles.json";

/// A saved cloned voice
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceProfile {
    pub id: String,
    pub name: String,
    /// Identifier usable in speech requests
    pub voice_id: String,
    /// Provider that holds the clone
    pub provider: String,
    pub created_at: String,
    pub audio_duration_estimate: Option<u32>,
}

impl VoiceProfile {
    pub fn new(
        name: impl Into<String>,
        voice_id: impl Into<String>,
        provider: impl Into<String>,
        audio_duration_estimate: Option<u32>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().simple().to_string()[..12].to_string(),
            name: name.into(),
            voice_id: voice_id.into(),
            provider: provider.into(),
            created_at: chrono::Utc::now().to_rfc3339(),
            audio_duration_estimate,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ProfilesFile {
    profiles: Vec<VoiceProfile>,
}

/// JSON-file-backed profile store
#[derive(Debug)]
pub struct ProfileStore {
    path: PathBuf,
    profiles: RwLock<HashMap<String, VoiceProfile>>,
}

impl ProfileStore {
    /// Load existing profiles from the data directory
    pub fn load(data_dir: &Path) -> Self {
        let path = data_dir.join(PROFILES_FILE);
        let mut profiles = HashMap::new();

        if path.exists() {
            match std::fs::read_to_string(&path)
                .map_err(|e| e.to_string())
                .and_then(|content| {
                    serde_json::from_str::<ProfilesFile>(&content).map_err(|e| e.to_string())
                }) {
                Ok(file) => {
                    for profile in file.profiles {
                        profiles.insert(profile.id.clone(), profile);
                    }
                }
                Err(e) => {
                    warn!("voice profile file unreadable, starting fresh: {}", e);
                }
            }
        }

        Self {
            path,
            profiles: RwLock::new(profiles),
        }
    }

    pub fn add(&self, profile: VoiceProfile) -> Result<VoiceProfile> {
        let mut guard = self.profiles.write();
        guard.insert(profile.id.clone(), profile.clone());
        self.persist(&guard)?;
        Ok(profile)
    }

    pub fn get(&self, id: &str) -> Option<VoiceProfile> {
        self.profiles.read().get(id).cloned()
    }

    /// All profiles, newest first
    pub fn list(&self) -> Vec<VoiceProfile> {
        let mut profiles: Vec<VoiceProfile> = self.profiles.read().values().cloned().collect();
        profiles.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        profiles
    }

    /// Remove a profile; returns whether it existed
    pub fn remove(&self, id: &str) -> Result<bool> {
        let mut guard = self.profiles.write();
        let removed = guard.remove(id).is_some();
        if removed {
            self.persist(&guard)?;
        }
        Ok(removed)
    }

    fn persist(&self, profiles: &HashMap<String, VoiceProfile>) -> Result<()> {
        let file = ProfilesFile {
            profiles: profiles.values().cloned().collect(),
        };
        let content = serde_json::to_string_pretty(&file)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_get_list_remove_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProfileStore::load(dir.path());

        let profile = store
            .add(VoiceProfile::new("CEO voice", "ceo_clone", "minimax", Some(42)))
            .unwrap();

        assert_eq!(store.get(&profile.id).unwrap().name, "CEO voice");
        assert_eq!(store.list().len(), 1);
        assert!(store.remove(&profile.id).unwrap());
        assert!(store.get(&profile.id).is_none());
        assert!(!store.remove(&profile.id).unwrap());
    }

    #[test]
    fn profiles_survive_reload() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = ProfileStore::load(dir.path());
            store
                .add(VoiceProfile::new("Keeper", "keeper_clone", "xtts", None))
                .unwrap();
        }

        let reloaded = ProfileStore::load(dir.path());
        let profiles = reloaded.list();
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].voice_id, "keeper_clone");
    }

    #[test]
    fn corrupt_file_starts_fresh() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(PROFILES_FILE), "{not json").unwrap();

        let store = ProfileStore::load(dir.path());
        assert!(store.list().is_empty());
    }
}
