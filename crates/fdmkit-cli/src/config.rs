use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use fdmkit_client::ClientConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct ProfileConfig {
    pub server: Option<String>,
    pub base_path: Option<String>,
    pub verify_tls: Option<bool>,
    pub timeout_secs: Option<u64>,
    pub format: Option<String>,
}

impl ProfileConfig {
    pub const KEYS: [&'static str; 5] = ["server", "base_path", "verify_tls", "timeout_secs", "format"];

    /// Sets `key` from its string form.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "server" => self.server = Some(value.to_string()),
            "base_path" => self.base_path = Some(value.to_string()),
            "verify_tls" => {
                self.verify_tls = Some(
                    value
                        .parse()
                        .with_context(|| format!("verify_tls must be true or false, got {value}"))?,
                );
            }
            "timeout_secs" => {
                self.timeout_secs = Some(
                    value
                        .parse()
                        .with_context(|| format!("timeout_secs must be a number, got {value}"))?,
                );
            }
            "format" => {
                if crate::cli::OutputFormat::parse_config(value).is_none() {
                    anyhow::bail!("format must be json, yaml or table, got {value}");
                }
                self.format = Some(value.to_string());
            }
            other => anyhow::bail!(
                "Unknown config key: {other}. Valid keys: {}",
                Self::KEYS.join(", ")
            ),
        }
        Ok(())
    }

    /// Client settings for `server`, with this profile's overrides applied.
    pub fn client_config(&self, server: &str) -> Result<ClientConfig> {
        let mut config = ClientConfig::new(server)?;
        if let Some(base_path) = &self.base_path {
            config = config.with_base_path(base_path.clone());
        }
        if let Some(verify_tls) = self.verify_tls {
            config = config.with_verify_tls(verify_tls);
        }
        if let Some(secs) = self.timeout_secs {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        Ok(config)
    }
}

pub type ConfigFile = HashMap<String, ProfileConfig>;

pub fn config_dir() -> Result<PathBuf> {
    let dir = dirs::home_dir()
        .context("Cannot determine home directory")?
        .join(".fdmkit");
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

fn config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

fn load_all_from(path: &Path) -> Result<ConfigFile> {
    if !path.exists() {
        return Ok(ConfigFile::new());
    }
    let content = fs::read_to_string(path)?;
    let cfg: ConfigFile =
        toml::from_str(&content).with_context(|| format!("Invalid config file {}", path.display()))?;
    Ok(cfg)
}

fn save_profile_to(path: &Path, profile: &str, config: &ProfileConfig) -> Result<()> {
    let mut all = load_all_from(path)?;
    all.insert(profile.to_string(), config.clone());
    let content = toml::to_string_pretty(&all)?;
    fs::write(path, content)?;
    Ok(())
}

pub fn load_profile(profile: &str) -> Result<ProfileConfig> {
    let all = load_all_from(&config_path()?)?;
    Ok(all.get(profile).cloned().unwrap_or_default())
}

pub fn save_profile(profile: &str, config: &ProfileConfig) -> Result<()> {
    save_profile_to(&config_path()?, profile, config)
}

pub fn resolve_server(cli_server: &Option<String>, profile: &str) -> Result<String> {
    // 1. --server flag / FDMKIT_URL env
    if let Some(s) = cli_server {
        return Ok(s.clone());
    }
    // 2. config.toml profile
    let cfg = load_profile(profile)?;
    if let Some(s) = cfg.server {
        return Ok(s);
    }
    // 3. Stored session for this profile
    if let Ok(Some(stored)) = crate::auth::load_session(profile) {
        return Ok(stored.server);
    }
    anyhow::bail!(
        "No server URL configured. Use --server, set FDMKIT_URL env var, or run: fdmkit config set server <url>"
    )
}
