pub mod cache;
pub mod clear;
pub mod sync;
pub mod sync_ui;

use color_eyre::eyre::{eyre, Context};
use color_eyre::Result;
use std::sync::Arc;
use trakt_sync_config::{AuthorizationStore, Config, PathManager};
use trakt_sync_core::{FileStore, TraktCache};
use trakt_sync_sources::TraktClient;

/// Everything a command needs to talk to the cache and Trakt.
pub struct AppContext {
    pub paths: PathManager,
    pub config: Config,
    pub authorization: AuthorizationStore,
    pub cache: Arc<TraktCache>,
}

pub fn load_context() -> Result<AppContext> {
    let paths = PathManager::default();
    paths
        .ensure_directories()
        .map_err(|e| eyre!("Failed to create application directories: {}", e))?;

    let config_file = paths.config_file();
    let config = Config::load_or_default(&config_file)
        .map_err(|e| eyre!("Failed to load {}: {}", config_file.display(), e))?;

    let authorization = AuthorizationStore::new(paths.authorization_file());
    let client = TraktClient::from_config(&config, &authorization);
    let store = FileStore::new(paths.cache_dir())
        .wrap_err_with(|| format!("Failed to open cache directory {}", paths.cache_dir().display()))?;
    let cache = Arc::new(TraktCache::new(Arc::new(client), Arc::new(store)));

    Ok(AppContext {
        paths,
        config,
        authorization,
        cache,
    })
}
