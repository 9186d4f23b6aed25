//! Configuration file management for mealplan.
//!
//! Provides a TOML-based config file at `~/.config/mealplan/config.toml` and a
//! resolution chain: CLI flag > env var > config file > default.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use mealplan_db::config::DbConfig;

/// Env var naming the owner whose plans the CLI works on.
pub const OWNER_ENV_VAR: &str = "MEALPLAN_OWNER_ID";

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Serialize, Deserialize)]
pub struct ConfigFile {
    pub database: DatabaseSection,
    pub owner: OwnerSection,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DatabaseSection {
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OwnerSection {
    pub id: Uuid,
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the mealplan config directory.
///
/// Always uses XDG layout: `$XDG_CONFIG_HOME/mealplan` or `~/.config/mealplan`,
/// also on macOS.
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("mealplan");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("mealplan")
}

/// Return the path to the mealplan config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

// -----------------------------------------------------------------------
// Read / write
// -----------------------------------------------------------------------

/// Load and parse the config file. Returns an error if it does not exist.
pub fn load_config() -> Result<ConfigFile> {
    let path = config_path();
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&contents).context("failed to parse config file")?;
    Ok(config)
}

/// Serialize and write the config file, creating parent dirs as needed.
/// Sets file permissions to 0600 on Unix.
pub fn save_config(config: &ConfigFile) -> Result<()> {
    let path = config_path();
    let dir = config_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create config directory {}", dir.display()))?;

    let contents = toml::to_string_pretty(config).context("failed to serialize config")?;
    std::fs::write(&path, &contents)
        .with_context(|| format!("failed to write config file at {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(&path, perms)
            .with_context(|| format!("failed to set permissions on {}", path.display()))?;
    }

    Ok(())
}

// -----------------------------------------------------------------------
// Resolved config
// -----------------------------------------------------------------------

/// Resolve only the database URL: `cli_db_url` > `MEALPLAN_DATABASE_URL` env >
/// `config_file.database.url` > `DbConfig::DEFAULT_URL`.
pub fn resolve_db_config(cli_db_url: Option<&str>) -> DbConfig {
    db_config_from(cli_db_url, load_config().ok().as_ref())
}

fn db_config_from(cli_db_url: Option<&str>, file_config: Option<&ConfigFile>) -> DbConfig {
    let db_url = if let Some(url) = cli_db_url {
        url.to_string()
    } else if let Ok(url) = std::env::var(DbConfig::ENV_VAR) {
        url
    } else if let Some(cfg) = file_config {
        cfg.database.url.clone()
    } else {
        DbConfig::DEFAULT_URL.to_string()
    };
    DbConfig::new(db_url)
}

/// Fully resolved configuration, ready for use.
#[derive(Debug)]
pub struct MealplanConfig {
    pub db_config: DbConfig,
    pub owner_id: Uuid,
}

impl MealplanConfig {
    /// Resolve configuration using the chain: CLI flag > env var > config file > default.
    ///
    /// - DB URL: see [`resolve_db_config`]
    /// - Owner: `cli_owner` > `MEALPLAN_OWNER_ID` env > `config_file.owner.id` > error
    pub fn resolve(cli_db_url: Option<&str>, cli_owner: Option<Uuid>) -> Result<Self> {
        let file_config = load_config().ok();
        let db_config = db_config_from(cli_db_url, file_config.as_ref());

        let owner_id = if let Some(id) = cli_owner {
            id
        } else if let Ok(raw) = std::env::var(OWNER_ENV_VAR) {
            Uuid::parse_str(raw.trim())
                .with_context(|| format!("{OWNER_ENV_VAR} is not a valid UUID: {raw:?}"))?
        } else if let Some(cfg) = &file_config {
            cfg.owner.id
        } else {
            bail!(
                "owner id not found; set {OWNER_ENV_VAR} or run `mealplan init` to create a config file"
            );
        };

        Ok(Self {
            db_config,
            owner_id,
        })
    }
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------
