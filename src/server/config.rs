use super::RequestsLoggingLevel;

/// Per-IP request limiting.
#[derive(Clone, Debug, PartialEq)]
pub struct LimiterConfig {
    pub enabled: bool,
    /// Requests per second replenished for each client.
    pub rps: f64,
    pub burst: u32,
}

impl Default for LimiterConfig {
    fn default() -> Self {
        LimiterConfig {
            enabled: true,
            rps: 2.0,
            burst: 4,
        }
    }
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub requests_logging_level: RequestsLoggingLevel,
    pub port: u16,
    /// Reported by the healthcheck (development, staging or production).
    pub env: String,
    pub limiter: LimiterConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            requests_logging_level: RequestsLoggingLevel::Path,
            port: 8080,
            env: "development".to_string(),
            limiter: LimiterConfig::default(),
        }
    }
}
