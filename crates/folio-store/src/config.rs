//! Engine configuration

use crate::error::{StoreError, StoreResult};
use folio_content::{AssetBase, DEFAULT_PAGE_SIZE};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Largest document read by default (10 MiB)
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Content store configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Directory holding one folder per language
    pub content_dir: PathBuf,
    /// Static server media is qualified against
    pub assets: AssetBase,
    /// Cards per listing page
    pub page_size: usize,
    /// Documents larger than this are refused
    pub max_file_size: u64,
    /// Pass raw HTML in bodies through to the output
    pub allow_raw_html: bool,
}

impl EngineConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With content directory
    #[inline]
    #[must_use]
    pub fn with_content_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.content_dir = dir.into();
        self
    }

    /// With asset base
    #[inline]
    #[must_use]
    pub fn with_assets(mut self, assets: AssetBase) -> Self {
        self.assets = assets;
        self
    }

    /// With page size
    #[inline]
    #[must_use]
    pub fn with_page_size(mut self, size: usize) -> Self {
        self.page_size = size;
        self
    }

    /// With maximum file size in bytes
    #[inline]
    #[must_use]
    pub fn with_max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size = bytes;
        self
    }

    /// With raw HTML handling
    #[inline]
    #[must_use]
    pub fn with_raw_html(mut self, allow: bool) -> Self {
        self.allow_raw_html = allow;
        self
    }

    /// Check the configuration is usable
    ///
    /// # Errors
    /// Returns [`StoreError::Config`] naming the first bad setting.
    pub fn validate(&self) -> StoreResult<()> {
        if self.content_dir.as_os_str().is_empty() {
            return Err(StoreError::Config("content_dir is empty".into()));
        }
        if self.page_size == 0 {
            return Err(StoreError::Config("page_size must be positive".into()));
        }
        if self.max_file_size == 0 {
            return Err(StoreError::Config("max_file_size must be positive".into()));
        }
        if self.assets.host.is_empty() {
            return Err(StoreError::Config("assets.host is empty".into()));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            content_dir: PathBuf::from("content"),
            assets: AssetBase::default(),
            page_size: DEFAULT_PAGE_SIZE,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            allow_raw_html: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.page_size, 6);
        assert_eq!(config.assets.port, 4000);
    }

    #[test]
    fn zero_page_size_rejected() {
        let err = EngineConfig::new().with_page_size(0).validate().unwrap_err();
        assert!(err.to_string().contains("page_size"));
    }

    #[test]
    fn partial_config_deserializes() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"content_dir": "/srv/content", "page_size": 9}"#).unwrap();
        assert_eq!(config.content_dir, PathBuf::from("/srv/content"));
        assert_eq!(config.page_size, 9);
        assert_eq!(config.max_file_size, DEFAULT_MAX_FILE_SIZE);
    }
}
