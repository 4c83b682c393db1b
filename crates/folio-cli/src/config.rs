//! `folio.toml` plus environment overrides

use anyhow::{Context, Result};
use folio_auth::AuthConfig;
use folio_content::AssetBase;
use folio_store::EngineConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file read when `--config` is not given
pub(crate) const DEFAULT_CONFIG_FILE: &str = "folio.toml";

/// Everything the binary needs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct FolioConfig {
    /// Content tree and rendering
    pub(crate) content: EngineConfig,
    /// Static file server; replaces `content.assets`
    pub(crate) assets: AssetBase,
    /// Accounts and sessions
    pub(crate) auth: AuthConfig,
}

impl FolioConfig {
    /// Load `path`, or `folio.toml` when present, then apply `FOLIO_*` variables
    pub(crate) fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Apply overrides from `lookup`
    pub(crate) fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(dir) = lookup("FOLIO_CONTENT_DIR") {
            self.content.content_dir = PathBuf::from(dir);
        }
        if let Some(host) = lookup("FOLIO_HOST") {
            self.assets.host = host;
        }
        if let Some(port) = lookup("FOLIO_PORT") {
            self.assets.port = port
                .parse()
                .with_context(|| format!("FOLIO_PORT '{port}' is not a port number"))?;
        }
        if let Some(prefix) = lookup("FOLIO_STATIC_PREFIX") {
            self.assets = self.assets.clone().with_prefix(prefix);
        }
        if let Some(path) = lookup("FOLIO_USERS_DB") {
            self.auth.users_db = PathBuf::from(path);
        }
        if let Some(path) = lookup("FOLIO_SESSIONS_DB") {
            self.auth.sessions_db = PathBuf::from(path);
        }
        if let Some(ttl) = lookup("FOLIO_TOKEN_TTL_SECS") {
            self.auth.token_ttl_secs = ttl
                .parse()
                .with_context(|| format!("FOLIO_TOKEN_TTL_SECS '{ttl}' is not a number"))?;
        }
        Ok(())
    }

    /// Engine config with the asset base applied
    pub(crate) fn engine(&self) -> EngineConfig {
        self.content.clone().with_assets(self.assets.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    #[test]
    fn toml_sections_fill_defaults() {
        let config: FolioConfig = toml::from_str(
            r#"
            [content]
            content_dir = "site/content"
            page_size = 9

            [assets]
            host = "cdn.example.org"
            port = 443
            scheme = "https"
            "#,
        )
        .unwrap();
        assert_eq!(config.content.content_dir, PathBuf::from("site/content"));
        assert_eq!(config.content.page_size, 9);
        assert_eq!(config.assets.origin(), "https://cdn.example.org:443");
        assert_eq!(config.auth, AuthConfig::default());
        assert_eq!(config.engine().assets, config.assets);
    }

    #[test]
    fn env_overrides_win() {
        let vars: HashMap<&str, &str> = [
            ("FOLIO_CONTENT_DIR", "/srv/content"),
            ("FOLIO_PORT", "8080"),
            ("FOLIO_STATIC_PREFIX", "/uploads/"),
            ("FOLIO_TOKEN_TTL_SECS", "60"),
        ]
        .into_iter()
        .collect();
        let mut config = FolioConfig::default();
        config
            .apply_env(|key| vars.get(key).map(ToString::to_string))
            .unwrap();
        assert_eq!(config.content.content_dir, PathBuf::from("/srv/content"));
        assert_eq!(config.assets.port, 8080);
        assert_eq!(config.assets.prefix, "uploads");
        assert_eq!(config.auth.token_ttl_secs, 60);
    }

    #[test]
    fn bad_port_is_reported() {
        let mut config = FolioConfig::default();
        let err = config
            .apply_env(|key| (key == "FOLIO_PORT").then(|| "http".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains("FOLIO_PORT"));
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(FolioConfig::load(Some(Path::new("/nonexistent/folio.toml"))).is_err());
    }
}
