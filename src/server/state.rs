//! Application state shared across HTTP handlers

use crate::config::Config;
use crate::core::router::ProviderRouter;
use crate::services::assets::AssetStore;
use crate::services::pipeline::{JobStore, PipelineService};
use crate::services::voice_profiles::ProfileStore;
use std::sync::Arc;

/// Shared resources for request handlers
///
/// Everything is behind an `Arc`: configuration and the router are read-only
/// after startup, the job table and profile store synchronize internally.
#[derive(Clone)]
pub struct AppState {
    /// Validated configuration (read-only)
    pub config: Arc<Config>,
    /// Capability router with fallback chains
    pub router: Arc<ProviderRouter>,
    /// Generation job table
    pub jobs: Arc<JobStore>,
    /// Cloned voice profiles
    pub profiles: Arc<ProfileStore>,
    /// Validated upload storage
    pub assets: Arc<AssetStore>,
    /// Job spawner
    pub pipeline: Arc<PipelineService>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let config = Arc::new(config);
        let router = Arc::new(ProviderRouter::from_config(&config));
        let jobs = Arc::new(JobStore::new());
        let profiles = Arc::new(ProfileStore::load(&config.storage.data_dir));
        let assets = Arc::new(AssetStore::new(config.storage.upload_dir.clone()));
        let pipeline = Arc::new(PipelineService::new(
            router.clone(),
            jobs.clone(),
            config.storage.output_dir.clone(),
        ));

        Self {
            config,
            router,
            jobs,
            profiles,
            assets,
            pipeline,
        }
    }
}
