use axum::extract::FromRef;

use crate::catalog::SongCatalog;
use std::sync::Arc;
use std::time::Instant;

use super::ServerConfig;

pub type GuardedSongCatalog = Arc<SongCatalog>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub catalog: GuardedSongCatalog,
    pub hash: String,
}

impl ServerState {
    pub fn new(config: ServerConfig, catalog: GuardedSongCatalog) -> Self {
        ServerState {
            config,
            start_time: Instant::now(),
            catalog,
            hash: env!("GIT_HASH").to_string(),
        }
    }
}

impl FromRef<ServerState> for GuardedSongCatalog {
    fn from_ref(input: &ServerState) -> Self {
        input.catalog.clone()
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}
