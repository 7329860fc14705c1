//! Environment-driven service configuration.

use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Absent selects the in-memory catalog, orders and cart mirror.
    pub database_url: Option<String>,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub db_max_connections: u32,
    pub whatsapp_number: Option<String>,
    pub currency_symbol: String,
    pub catalog_path: Option<PathBuf>,
    pub nats_url: Option<String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

/// Load configuration, reading a `.env` file first when one exists.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    build_app_config(|key| std::env::var(key))
}

fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let optional = |var: &str| lookup(var).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
    let or_default = |var: &str, default: &str| optional(var).unwrap_or_else(|| default.to_string());
    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar { var: var.to_string(), reason };

    let bind_addr = or_default("SHOPWHATS_BIND_ADDR", "0.0.0.0:8083")
        .parse::<SocketAddr>()
        .map_err(|e| invalid("SHOPWHATS_BIND_ADDR", e.to_string()))?;

    let db_max_connections = or_default("SHOPWHATS_DB_MAX_CONNECTIONS", "10")
        .parse::<u32>()
        .map_err(|e| invalid("SHOPWHATS_DB_MAX_CONNECTIONS", e.to_string()))?;
    if db_max_connections == 0 {
        return Err(invalid("SHOPWHATS_DB_MAX_CONNECTIONS", "must be at least 1".into()));
    }

    let whatsapp_number = optional("SHOPWHATS_WHATSAPP_NUMBER")
        .map(|raw| crate::checkout::whatsapp::normalize_phone(&raw).ok_or_else(|| invalid("SHOPWHATS_WHATSAPP_NUMBER", format!("{raw:?} is not a phone number"))))
        .transpose()?;

    Ok(AppConfig {
        database_url: optional("DATABASE_URL"),
        bind_addr,
        log_level: or_default("SHOPWHATS_LOG_LEVEL", "info"),
        db_max_connections,
        whatsapp_number,
        currency_symbol: or_default("SHOPWHATS_CURRENCY_SYMBOL", "R$"),
        catalog_path: optional("SHOPWHATS_CATALOG_PATH").map(PathBuf::from),
        nats_url: optional("NATS_URL"),
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::env::VarError;

    use super::*;

    fn lookup_from_map<'a>(map: &'a HashMap<&'a str, &'a str>) -> impl Fn(&str) -> Result<String, VarError> + 'a {
        move |key| map.get(key).map(|v| (*v).to_string()).ok_or(VarError::NotPresent)
    }

    #[test]
    fn defaults_apply_with_empty_env() {
        let map = HashMap::new();
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.database_url, None);
        assert_eq!(cfg.bind_addr, "0.0.0.0:8083".parse().unwrap());
        assert_eq!(cfg.log_level, "info");
        assert_eq!(cfg.db_max_connections, 10);
        assert_eq!(cfg.currency_symbol, "R$");
        assert_eq!(cfg.whatsapp_number, None);
    }

    #[test]
    fn whatsapp_number_is_normalized() {
        let map = HashMap::from([("SHOPWHATS_WHATSAPP_NUMBER", "+55 (11) 98765-4321")]);
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.whatsapp_number.as_deref(), Some("5511987654321"));
    }

    #[test]
    fn invalid_bind_addr_fails() {
        let map = HashMap::from([("SHOPWHATS_BIND_ADDR", "not-an-addr")]);
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "SHOPWHATS_BIND_ADDR"),
            "expected InvalidEnvVar(SHOPWHATS_BIND_ADDR), got: {result:?}"
        );
    }

    #[test]
    fn zero_pool_size_fails() {
        let map = HashMap::from([("SHOPWHATS_DB_MAX_CONNECTIONS", "0")]);
        assert!(build_app_config(lookup_from_map(&map)).is_err());
    }

    #[test]
    fn short_whatsapp_number_fails() {
        let map = HashMap::from([("SHOPWHATS_WHATSAPP_NUMBER", "12-34")]);
        assert!(build_app_config(lookup_from_map(&map)).is_err());
    }

    #[test]
    fn blank_values_count_as_unset() {
        let map = HashMap::from([("DATABASE_URL", "  "), ("SHOPWHATS_CATALOG_PATH", "./catalog.json")]);
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.database_url, None);
        assert_eq!(cfg.catalog_path, Some(PathBuf::from("./catalog.json")));
    }
}
