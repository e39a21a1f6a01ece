use crate::error::{Error, Result};
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

pub const ENV_CLIENT_SECRET_FILE: &str = "GALLERY_CLIENT_SECRET_FILE";
pub const ENV_TOKEN_FILE: &str = "GALLERY_TOKEN_FILE";
pub const ENV_SCRATCH_DIR: &str = "GALLERY_SCRATCH_DIR";
pub const ENV_BIND_ADDR: &str = "GALLERY_BIND_ADDR";
pub const ENV_CLIENT_SECRET_JSON: &str = "GALLERY_CLIENT_SECRET_JSON";
pub const ENV_TOKEN_SNAPSHOT_B64: &str = "GALLERY_TOKEN_B64";
pub const DEFAULT_CLIENT_SECRET_FILE: &str = "client_secret.json";
pub const DEFAULT_TOKEN_FILE: &str = "token.json";
pub const DEFAULT_SCRATCH_DIR: &str = "temp_uploads";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Runtime configuration resolved from environment and optional config file.
#[derive(Debug, Clone)]
pub struct Config {
    pub client_secret_file: PathBuf,
    pub token_file: PathBuf,
    pub scratch_dir: PathBuf,
    pub bind_addr: String,
    pub bootstrap: Option<SecretsBootstrap>,
}

/// Inline secrets supplied by the hosting environment. When present, the
/// credential provider materializes them to the configured file paths on
/// startup so a fresh host never needs an interactive login.
#[derive(Debug, Clone)]
pub struct SecretsBootstrap {
    pub client_secret_json: String,
    pub token_snapshot_b64: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
struct ConfigFile {
    client_secret_file: Option<String>,
    token_file: Option<String>,
    scratch_dir: Option<String>,
    bind_addr: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConfigDoctor {
    pub client_secret_file: String,
    pub token_file: String,
    pub scratch_dir: String,
    pub bind_addr: String,
    pub source: String,
    pub inline_client_secret: bool,
    pub inline_token_snapshot: bool,
}

impl Config {
    pub fn load() -> Result<Self> {
        let file_path = config_path();
        let file_config = file_path
            .as_ref()
            .and_then(|path| fs::read_to_string(path).ok())
            .map(|contents| toml::from_str::<ConfigFile>(&contents))
            .transpose()
            .map_err(|err| Error::InvalidConfig(format!("config parse error: {err}")))?;

        let client_secret_file = std::env::var(ENV_CLIENT_SECRET_FILE)
            .ok()
            .or_else(|| file_config.as_ref().and_then(|c| c.client_secret_file.clone()))
            .unwrap_or_else(|| DEFAULT_CLIENT_SECRET_FILE.to_string());

        let token_file = std::env::var(ENV_TOKEN_FILE)
            .ok()
            .or_else(|| file_config.as_ref().and_then(|c| c.token_file.clone()))
            .unwrap_or_else(|| DEFAULT_TOKEN_FILE.to_string());

        let scratch_dir = std::env::var(ENV_SCRATCH_DIR)
            .ok()
            .or_else(|| file_config.as_ref().and_then(|c| c.scratch_dir.clone()))
            .unwrap_or_else(|| DEFAULT_SCRATCH_DIR.to_string());

        let bind_addr = std::env::var(ENV_BIND_ADDR)
            .ok()
            .or_else(|| file_config.as_ref().and_then(|c| c.bind_addr.clone()))
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());

        let bootstrap = resolve_bootstrap();

        Ok(Self {
            client_secret_file: PathBuf::from(client_secret_file),
            token_file: PathBuf::from(token_file),
            scratch_dir: PathBuf::from(scratch_dir),
            bind_addr,
            bootstrap,
        })
    }

    pub fn doctor(&self) -> ConfigDoctor {
        let source = if std::env::var(ENV_CLIENT_SECRET_FILE).is_ok()
            || std::env::var(ENV_BIND_ADDR).is_ok()
        {
            "environment".to_string()
        } else {
            "config file / defaults".to_string()
        };
        ConfigDoctor {
            client_secret_file: self.client_secret_file.display().to_string(),
            token_file: self.token_file.display().to_string(),
            scratch_dir: self.scratch_dir.display().to_string(),
            bind_addr: self.bind_addr.clone(),
            source,
            inline_client_secret: self.bootstrap.is_some(),
            inline_token_snapshot: self
                .bootstrap
                .as_ref()
                .is_some_and(|b| b.token_snapshot_b64.is_some()),
        }
    }
}

fn resolve_bootstrap() -> Option<SecretsBootstrap> {
    let client_secret_json = std::env::var(ENV_CLIENT_SECRET_JSON)
        .ok()
        .filter(|v| !v.trim().is_empty());
    let token_snapshot_b64 = std::env::var(ENV_TOKEN_SNAPSHOT_B64)
        .ok()
        .filter(|v| !v.trim().is_empty());

    client_secret_json.map(|client_secret_json| SecretsBootstrap {
        client_secret_json,
        token_snapshot_b64,
    })
}

fn config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("gallery").join("config.toml"))
}
