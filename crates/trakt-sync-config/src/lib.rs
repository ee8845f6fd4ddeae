pub mod authorization;
pub mod config;
pub mod paths;

pub use authorization::{Authorization, AuthorizationStore};
pub use config::{Config, SyncSettings, TraktConfig, DEFAULT_API_URL};
pub use paths::{container_base_path, PathManager};
