//! Service configuration

use anyhow::{bail, Context, Result};

/// Service configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// PostgreSQL connection URL; without one the service runs on the seeded in-memory store
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub port: u16,
    /// NATS server for domain events (optional)
    pub nats_url: Option<String>,
    pub nats_subject_prefix: String,
    /// Bearer token for `/api/admin/*`
    pub admin_token: String,
    /// Environment: development | staging | production
    pub environment: String,
    /// Reject backward order-status moves
    pub strict_order_transitions: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: None,
            database_max_connections: 10,
            port: 8083,
            nats_url: None,
            nats_subject_prefix: "storefront".into(),
            admin_token: "dev-ADMIN_TOKEN-not-for-production".into(),
            environment: "development".into(),
            strict_order_transitions: true,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();
        let environment = var("ENVIRONMENT").unwrap_or(defaults.environment);
        let non_empty = |name: &str| var(name).filter(|v| !v.trim().is_empty());

        let admin_token = match non_empty("ADMIN_TOKEN") {
            Some(token) => token,
            None if environment == "development" => defaults.admin_token,
            None => bail!("ADMIN_TOKEN must be set in {environment} environment"),
        };

        Ok(Self {
            database_url: non_empty("DATABASE_URL"),
            database_max_connections: parse_or(&var, "DATABASE_MAX_CONNECTIONS", defaults.database_max_connections)?,
            port: parse_or(&var, "PORT", defaults.port)?,
            nats_url: non_empty("NATS_URL"),
            nats_subject_prefix: non_empty("NATS_SUBJECT_PREFIX").unwrap_or(defaults.nats_subject_prefix),
            admin_token,
            strict_order_transitions: parse_or(&var, "STRICT_ORDER_TRANSITIONS", defaults.strict_order_transitions)?,
            environment,
        })
    }

    pub fn is_development(&self) -> bool { self.environment == "development" }
}

fn parse_or<T>(var: &impl Fn(&str) -> Option<String>, name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match var(name).filter(|v| !v.trim().is_empty()) {
        Some(raw) => raw.trim().parse().with_context(|| format!("invalid {name}: {raw}")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config, Config::default());
        assert!(config.is_development());
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("DATABASE_URL", "postgres://localhost/gopak"),
            ("PORT", "9000"),
            ("STRICT_ORDER_TRANSITIONS", "false"),
            ("ADMIN_TOKEN", "s3cret"),
            ("NATS_URL", ""),
        ]).unwrap();
        assert_eq!(config.database_url.as_deref(), Some("postgres://localhost/gopak"));
        assert_eq!(config.port, 9000);
        assert!(!config.strict_order_transitions);
        assert_eq!(config.admin_token, "s3cret");
        assert_eq!(config.nats_url, None);
    }

    #[test]
    fn test_production_requires_admin_token() {
        assert!(load(&[("ENVIRONMENT", "production")]).is_err());
        assert!(load(&[("ENVIRONMENT", "production"), ("ADMIN_TOKEN", "t")]).is_ok());
    }

    #[test]
    fn test_invalid_number() {
        assert!(load(&[("PORT", "eighty")]).is_err());
    }
}
