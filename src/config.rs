use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub max_connections: u32,
    pub retention_hours: u32,
    pub purge_interval: Duration,
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key/value source. `from_env` passes the process
    /// environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env_required = |key: &str| {
            lookup(key).ok_or_else(|| format!("Missing required environment variable: {key}"))
        };
        let env_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let database_url = env_required("DATABASE_URL")?;

        let max_connections: u32 = env_or("WASABI_DB_MAX_CONNECTIONS", "10")
            .parse()
            .map_err(|e| format!("Invalid WASABI_DB_MAX_CONNECTIONS: {e}"))?;

        let retention_hours: u32 = env_or("WASABI_RETENTION_HOURS", "24")
            .parse()
            .map_err(|e| format!("Invalid WASABI_RETENTION_HOURS: {e}"))?;
        if retention_hours == 0 {
            return Err("WASABI_RETENTION_HOURS must be greater than zero".to_string());
        }

        let purge_interval_secs: u64 = env_or("WASABI_PURGE_INTERVAL_SECS", "3600")
            .parse()
            .map_err(|e| format!("Invalid WASABI_PURGE_INTERVAL_SECS: {e}"))?;
        if purge_interval_secs == 0 {
            return Err("WASABI_PURGE_INTERVAL_SECS must be greater than zero".to_string());
        }

        let log_level = env_or("WASABI_LOG_LEVEL", "info");

        Ok(Config {
            database_url,
            max_connections,
            retention_hours,
            purge_interval: Duration::from_secs(purge_interval_secs),
            log_level,
        })
    }
}
