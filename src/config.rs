use std::env;
use std::time::Duration;

/// Runtime configuration, read once at startup from the environment.
///
/// The JWT signing secrets (`JWT_ACCESS_SECRET_KEY`, `JWT_REFRESH_SECRET_KEY`)
/// are intentionally not collected here; the token module reads them at the
/// point of use so that a missing secret fails the operation, not the boot.
pub struct Config {
    pub database_url: String,
    pub server_host: String,
    pub server_port: u16,
    pub cors_origin: String,
    /// How long a soft-deleted task stays recoverable before the sweep
    /// removes it for good.
    pub trash_retention: chrono::Duration,
    /// Wall-clock interval between sweep runs.
    pub sweep_interval: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        let retention_days: i64 = env::var("TRASH_RETENTION_DAYS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30);
        let sweep_secs: u64 = env::var("TRASH_SWEEP_INTERVAL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(3600);

        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "4001".to_string())
                .parse()
                .expect("SERVER_PORT must be a number"),
            cors_origin: env::var("CORS_ORIGIN")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            trash_retention: chrono::Duration::days(retention_days),
            sweep_interval: Duration::from_secs(sweep_secs),
        }
    }

    pub fn server_addr(&self) -> (String, u16) {
        (self.server_host.clone(), self.server_port)
    }
}
