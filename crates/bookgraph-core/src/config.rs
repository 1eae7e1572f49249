use std::{
    env,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use config as cfg;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::info;

const MIN_JWT_SECRET_LEN: usize = 32;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 4000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    // Do not serialize secrets; allow deserialization from config/env only.
    #[serde(default, skip_serializing)]
    pub jwt_secret: Option<SecretString>,
    #[serde(default = "AuthConfig::default_token_ttl_hours")]
    pub token_ttl_hours: u64,
}

impl AuthConfig {
    fn default_token_ttl_hours() -> u64 {
        24
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            token_ttl_hours: Self::default_token_ttl_hours(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_string()
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "Settings::default_env")]
    pub env: String,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            env: Self::default_env(),
            server: ServerConfig::default(),
            auth: AuthConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Settings {
    fn default_env() -> String {
        env::var("APP_ENV")
            .ok()
            .or_else(|| env::var("RUST_ENV").ok())
            .unwrap_or_else(|| "development".to_string())
    }

    /// Loads settings from the default config directory and the environment.
    pub fn load(env_override: Option<String>) -> Result<Self> {
        let env_name = env_override.unwrap_or_else(Self::default_env);
        let mut settings = Self::load_from_sources(&Self::default_config_dir(), &env_name)?;
        settings.apply_legacy_secret();
        settings.validate()?;
        Ok(settings)
    }

    /// Priority order: `./config/`, then the current directory.
    pub fn default_config_dir() -> PathBuf {
        let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let project_config = cwd.join("config");
        if project_config.exists() {
            info!("Using config directory: {:?}", project_config);
            return project_config;
        }

        info!("Using config directory: {:?}", cwd);
        cwd
    }

    pub fn load_from_sources(config_dir: &Path, env_name: &str) -> Result<Self> {
        let settings: Settings = cfg::Config::builder()
            .add_source(cfg::File::from(config_dir.join("default.toml")).required(false))
            .add_source(
                cfg::File::from(config_dir.join(format!("{}.toml", env_name))).required(false),
            )
            .add_source(cfg::File::from(config_dir.join("local.toml")).required(false))
            .add_source(cfg::Environment::with_prefix("BOOKGRAPH").separator("__"))
            .build()
            .context("building configuration")?
            .try_deserialize()
            .context("deserializing configuration")?;
        Ok(settings)
    }

    /// Falls back to a plain `JWT_SECRET` variable when no secret was
    /// configured through the layered sources.
    fn apply_legacy_secret(&mut self) {
        if self.auth.jwt_secret.is_none() {
            if let Ok(secret) = env::var("JWT_SECRET") {
                self.auth.jwt_secret = Some(SecretString::from(secret));
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            !self.server.host.trim().is_empty(),
            "server.host cannot be empty"
        );
        anyhow::ensure!(self.server.port > 0, "server.port must be > 0");
        anyhow::ensure!(
            self.auth.token_ttl_hours > 0,
            "auth.token_ttl_hours must be > 0"
        );

        let secret = self
            .auth
            .jwt_secret
            .as_ref()
            .context("auth.jwt_secret (or JWT_SECRET) must be set")?;
        anyhow::ensure!(
            secret.expose_secret().len() >= MIN_JWT_SECRET_LEN,
            "auth.jwt_secret must be at least {} characters",
            MIN_JWT_SECRET_LEN
        );

        Ok(())
    }
}
