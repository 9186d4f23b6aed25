use std::env;

use anyhow::{Result, bail};

/// Connection settings for the meal plan database.
///
/// `MEALPLAN_DATABASE_URL` names the database (default
/// `postgresql://localhost:5432/mealplan`); `MEALPLAN_DB_MAX_CONNECTIONS`
/// sizes the pool (default 5).
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Full PostgreSQL connection URL, optionally with a `?query` part.
    pub database_url: String,
    pub max_connections: u32,
}

impl DbConfig {
    pub const ENV_VAR: &str = "MEALPLAN_DATABASE_URL";
    pub const MAX_CONNECTIONS_ENV_VAR: &str = "MEALPLAN_DB_MAX_CONNECTIONS";

    pub const DEFAULT_URL: &str = "postgresql://localhost:5432/mealplan";
    pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

    /// Read both settings from the environment. An unparsable pool size
    /// falls back to the default.
    pub fn from_env() -> Self {
        let url = env::var(Self::ENV_VAR).unwrap_or_else(|_| Self::DEFAULT_URL.to_owned());
        Self::new(url)
    }

    /// Use `database_url`; the pool size still comes from the environment.
    pub fn new(database_url: impl Into<String>) -> Self {
        let max_connections = env::var(Self::MAX_CONNECTIONS_ENV_VAR)
            .ok()
            .and_then(|raw| raw.trim().parse().ok())
            .filter(|n| *n > 0)
            .unwrap_or(Self::DEFAULT_MAX_CONNECTIONS);
        Self {
            database_url: database_url.into(),
            max_connections,
        }
    }

    /// `(before the database name, name, query string)`; the query string
    /// keeps its leading `?`.
    fn split_url(&self) -> Option<(&str, &str, &str)> {
        let slash = self.database_url.rfind('/')?;
        let (base, rest) = (&self.database_url[..slash], &self.database_url[slash + 1..]);
        let (name, query) = match rest.find('?') {
            Some(q) => rest.split_at(q),
            None => (rest, ""),
        };
        Some((base, name, query))
    }

    /// Database name from the URL path, if there is one.
    pub fn database_name(&self) -> Option<&str> {
        self.split_url()
            .map(|(_, name, _)| name)
            .filter(|name| !name.is_empty())
    }

    /// Database name, checked to be safe for `CREATE DATABASE` (which takes
    /// no bind parameters).
    pub fn checked_database_name(&self) -> Result<&str> {
        let Some(name) = self.database_name() else {
            bail!("no database name in URL {}", self.database_url);
        };
        if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            bail!("database name {name:?} may only contain letters, digits and underscores");
        }
        Ok(name)
    }

    /// The same server's `postgres` database, with the original query string.
    pub fn maintenance_url(&self) -> String {
        match self.split_url() {
            Some((base, _, query)) => format!("{base}/postgres{query}"),
            None => self.database_url.clone(),
        }
    }
}

impl Default for DbConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_url() {
        let cfg = DbConfig::new(DbConfig::DEFAULT_URL);
        assert_eq!(cfg.database_url, "postgresql://localhost:5432/mealplan");
        assert_eq!(cfg.database_name(), Some("mealplan"));
        assert!(cfg.max_connections > 0);
    }

    #[test]
    fn database_name_ignores_query_string() {
        let cfg = DbConfig::new("postgresql://localhost:5432/plans?sslmode=disable");
        assert_eq!(cfg.database_name(), Some("plans"));
    }

    #[test]
    fn database_name_missing() {
        let cfg = DbConfig::new("postgresql://localhost:5432/");
        assert_eq!(cfg.database_name(), None);
        assert!(cfg.checked_database_name().is_err());
    }

    #[test]
    fn unsafe_database_name_is_rejected() {
        let cfg = DbConfig::new("postgresql://localhost:5432/plans;drop");
        let err = cfg.checked_database_name().unwrap_err();
        assert!(err.to_string().contains("plans;drop"));
        assert_eq!(
            DbConfig::new("postgresql://h/meal_plans_2").checked_database_name().unwrap(),
            "meal_plans_2"
        );
    }

    #[test]
    fn maintenance_url_swaps_database_only() {
        let cfg = DbConfig::new("postgresql://localhost:5432/mealplan");
        assert_eq!(cfg.maintenance_url(), "postgresql://localhost:5432/postgres");

        let cfg = DbConfig::new("postgresql://u:p@db:5432/mealplan?sslmode=require");
        assert_eq!(
            cfg.maintenance_url(),
            "postgresql://u:p@db:5432/postgres?sslmode=require"
        );
    }
}
