//! Per-client rate limiting using tower-governor
//!
//! Clients are keyed by peer IP address, so the server must be served with
//! `ConnectInfo<SocketAddr>`.

use anyhow::{Context, Result};
use axum::{
    extract::{ConnectInfo, Request},
    Router,
};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::KeyExtractor, GovernorError, GovernorLayer,
};
use tracing::info;

use crate::server::config::LimiterConfig;

/// Extracts the peer IP address from ConnectInfo.
#[derive(Clone)]
pub struct IpKeyExtractor;

impl KeyExtractor for IpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        req.extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip())
            .ok_or(GovernorError::UnableToExtractKey)
    }
}

/// Milliseconds between two replenished request slots.
fn replenish_interval_ms(rps: f64) -> u64 {
    ((1000.0 / rps).round() as u64).max(1)
}

/// Wraps `router` in a limiter allowing `rps` requests per second per IP,
/// with bursts of up to `burst`.
pub fn apply_rate_limit(router: Router, config: &LimiterConfig) -> Result<Router> {
    let governor_config = GovernorConfigBuilder::default()
        .per_millisecond(replenish_interval_ms(config.rps))
        .burst_size(config.burst)
        .key_extractor(IpKeyExtractor)
        .finish()
        .context("Invalid rate limiter settings")?;

    info!("Rate limiting enabled: {} requests/s, burst {}", config.rps, config.burst);
    Ok(router.layer(GovernorLayer::new(Arc::new(governor_config))))
}
