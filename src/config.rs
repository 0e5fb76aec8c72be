use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::Deserialize;

use crate::error::ConfigError;
use crate::types::DEFAULT_PAGE_SIZE;

pub const DEFAULT_UPSTREAM_URL: &str = "https://gateway.marvel.com/v1/public";
pub const DEFAULT_PROXY_URL: &str = "http://127.0.0.1:3000";
pub const DEFAULT_DEBOUNCE_MS: u64 = 500;
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_PLACEHOLDER_IMAGE: &str = "/placeholder-character.jpg";

pub const PUBLIC_KEY_ENV: &str = "CAMEO_PUBLIC_KEY";
pub const PRIVATE_KEY_ENV: &str = "CAMEO_PRIVATE_KEY";

// On-disk shape; every key optional so partial files work.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    #[serde(default)]
    bind: Option<String>,
    #[serde(default)]
    upstream_url: Option<String>,
    #[serde(default)]
    proxy_url: Option<String>,
    #[serde(default)]
    page_size: Option<u32>,
    #[serde(default)]
    debounce_ms: Option<u64>,
    #[serde(default)]
    upstream_timeout_secs: Option<u64>,
    #[serde(default)]
    placeholder_image: Option<String>,
}

/// Resolved settings. API keys are never part of this; the proxy reads them
/// from the environment on every request.
#[derive(Debug, Clone, PartialEq)]
pub struct CameoConfig {
    pub bind: SocketAddr,
    pub upstream_url: String,
    pub proxy_url: String,
    pub page_size: u32,
    pub debounce: Duration,
    pub upstream_timeout: Duration,
    pub placeholder_image: String,
}

impl Default for CameoConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 3000)),
            upstream_url: DEFAULT_UPSTREAM_URL.to_string(),
            proxy_url: DEFAULT_PROXY_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            upstream_timeout: Duration::from_secs(DEFAULT_UPSTREAM_TIMEOUT_SECS),
            placeholder_image: DEFAULT_PLACEHOLDER_IMAGE.to_string(),
        }
    }
}

impl CameoConfig {
    /// Load defaults, then the config file (explicit path or the per-user
    /// default if it exists), then `CAMEO_*` environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut cfg = Self::default();
        let file = match path {
            Some(p) => Some(read_file(p)?),
            None => match default_config_path() {
                Some(p) if p.exists() => Some(read_file(&p)?),
                _ => None,
            },
        };
        if let Some(file) = file { cfg.apply_file(file)?; }
        cfg.apply_env(|key| std::env::var(key).ok())?;
        Ok(cfg)
    }

    fn apply_file(&mut self, f: FileConfig) -> Result<(), ConfigError> {
        if let Some(v) = f.bind { self.bind = parse_bind(&v)?; }
        if let Some(v) = f.upstream_url { self.upstream_url = v; }
        if let Some(v) = f.proxy_url { self.proxy_url = v; }
        if let Some(v) = f.page_size { self.page_size = check_page_size(v)?; }
        if let Some(v) = f.debounce_ms { self.debounce = Duration::from_millis(v); }
        if let Some(v) = f.upstream_timeout_secs { self.upstream_timeout = Duration::from_secs(v); }
        if let Some(v) = f.placeholder_image { self.placeholder_image = v; }
        Ok(())
    }

    fn apply_env(&mut self, get: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        if let Some(v) = get("CAMEO_BIND") { self.bind = parse_bind(&v)?; }
        if let Some(v) = get("CAMEO_UPSTREAM_URL") { self.upstream_url = v; }
        if let Some(v) = get("CAMEO_PROXY_URL") { self.proxy_url = v; }
        if let Some(v) = get("CAMEO_PAGE_SIZE") {
            let n = v.trim().parse().map_err(|_| ConfigError::InvalidValue { key: "CAMEO_PAGE_SIZE", value: v.clone() })?;
            self.page_size = check_page_size(n)?;
        }
        if let Some(v) = get("CAMEO_DEBOUNCE_MS") {
            let ms = v.trim().parse().map_err(|_| ConfigError::InvalidValue { key: "CAMEO_DEBOUNCE_MS", value: v.clone() })?;
            self.debounce = Duration::from_millis(ms);
        }
        Ok(())
    }
}

/// `config.toml` in the per-user config directory.
pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("dev", "cameo", "cameo").map(|p| p.config_dir().join("config.toml"))
}

fn read_file(path: &Path) -> Result<FileConfig, ConfigError> {
    let display = path.display().to_string();
    let raw = std::fs::read_to_string(path)
        .map_err(|source| ConfigError::Read { path: display.clone(), source })?;
    toml::from_str(&raw).map_err(|source| ConfigError::Parse { path: display, source })
}

fn parse_bind(v: &str) -> Result<SocketAddr, ConfigError> {
    v.trim().parse().map_err(|_| ConfigError::InvalidValue { key: "bind", value: v.to_string() })
}

fn check_page_size(n: u32) -> Result<u32, ConfigError> {
    if n == 0 {
        return Err(ConfigError::InvalidValue { key: "page_size", value: n.to_string() });
    }
    Ok(n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn file_values_override_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "bind = \"0.0.0.0:8080\"\npage_size = 10\ndebounce_ms = 250\n").unwrap();
        let mut cfg = CameoConfig::default();
        cfg.apply_file(read_file(&path).unwrap()).unwrap();
        assert_eq!(cfg.bind, "0.0.0.0:8080".parse().unwrap());
        assert_eq!(cfg.page_size, 10);
        assert_eq!(cfg.debounce, Duration::from_millis(250));
        assert_eq!(cfg.upstream_url, DEFAULT_UPSTREAM_URL);
    }

    #[test]
    fn env_overrides_file() {
        let env: HashMap<&str, &str> = [("CAMEO_PAGE_SIZE", "5"), ("CAMEO_PROXY_URL", "http://proxy:9")].into();
        let mut cfg = CameoConfig { page_size: 10, ..CameoConfig::default() };
        cfg.apply_env(|k| env.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(cfg.page_size, 5);
        assert_eq!(cfg.proxy_url, "http://proxy:9");
    }

    #[test]
    fn zero_page_size_is_rejected() {
        let env: HashMap<&str, &str> = [("CAMEO_PAGE_SIZE", "0")].into();
        let err = CameoConfig::default().apply_env(|k| env.get(k).map(|v| v.to_string())).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "page_size", .. }));
    }

    #[test]
    fn unknown_keys_fail_to_parse() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "private_key = \"nope\"\n").unwrap();
        assert!(matches!(read_file(&path), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let err = CameoConfig::load(Some(&tmp.path().join("absent.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
