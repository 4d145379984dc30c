//! Configuration management for acton-files
//!
//! Configuration is loaded from multiple sources with clear precedence:
//!
//! 1. Environment variables (highest priority, `ACTON_FILES_` prefix, `__`
//!    separates nested keys)
//! 2. The `[files]` table of `./config.toml` (or an explicit file)
//! 3. Hardcoded defaults (fallback)
//!
//! # Example Configuration
//!
//! ```toml
//! # config.toml
//! [files]
//! default_disk = "local"
//! app_url = "https://shop.example.com"
//! base_path = "/srv/shop"
//! remove_public_from_url = false
//!
//! [files.disks.local]
//! driver = "local"
//! root = "/srv/shop/storage/app"
//!
//! [files.disks.public]
//! driver = "local"
//! root = "/srv/shop/public/uploads"
//!
//! [files.disks.s3]
//! driver = "s3"
//! url = "https://bucket.s3.amazonaws.com"
//!
//! [files.fallbacks]
//! products = "https://shop.example.com/img/no-product.png"
//! users = "https://shop.example.com/img/avatar.png"
//! ```
//!
//! Setting `ACTON_FILES_FALLBACKS__PRODUCTS=/img/none.png` overrides the
//! product fallback above.
//!
//! # Usage
//!
//! ```rust,no_run
//! use acton_files::config::FilesConfig;
//!
//! # fn example() -> anyhow::Result<()> {
//! let config = FilesConfig::load_from("./config/production.toml")?;
//! let root = config.disk_root("local")?;
//! let link = config.root_link("public")?;
//! # Ok(())
//! # }
//! ```

use crate::error::{AttachmentError, AttachmentResult};
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "ACTON_FILES_";

/// Settings for one named disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiskSettings {
    /// Backend driver (`local` is built in, anything else must be registered)
    pub driver: String,

    /// Absolute filesystem root of the disk
    pub root: Option<PathBuf>,

    /// Public URL the disk is served under, overriding the derived one
    pub url: Option<String>,
}

impl Default for DiskSettings {
    fn default() -> Self {
        Self {
            driver: "local".to_string(),
            root: None,
            url: None,
        }
    }
}

impl DiskSettings {
    /// Local disk rooted at `root`
    #[must_use]
    pub fn local(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
            ..Self::default()
        }
    }

    /// Sets the public URL of the disk
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}

/// File attachment configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilesConfig {
    /// Disk used when a record does not select one
    pub default_disk: String,

    /// Base URL of the application
    pub app_url: String,

    /// Application root, stripped from disk roots when deriving URLs
    pub base_path: PathBuf,

    /// Strip `public/` from derived URLs when the application is served from
    /// its public directory (development servers)
    pub remove_public_from_url: bool,

    /// Named disks
    pub disks: HashMap<String, DiskSettings>,

    /// Fallback URL per table, returned when a record has no file
    pub fallbacks: HashMap<String, String>,
}

impl Default for FilesConfig {
    fn default() -> Self {
        let mut disks = HashMap::new();
        disks.insert("local".to_string(), DiskSettings::local("./storage/app"));
        disks.insert("public".to_string(), DiskSettings::local("./storage/app/public"));

        Self {
            default_disk: "local".to_string(),
            app_url: "http://localhost:3000".to_string(),
            base_path: PathBuf::from("."),
            remove_public_from_url: false,
            disks,
            fallbacks: HashMap::new(),
        }
    }
}

impl FilesConfig {
    /// Load configuration from `./config.toml` and the environment
    ///
    /// A missing file is not an error; defaults and environment still apply.
    pub fn load() -> AttachmentResult<Self> {
        Self::load_from("config.toml")
    }

    /// Load configuration from a specific file and the environment
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use acton_files::config::FilesConfig;
    ///
    /// # fn example() -> anyhow::Result<()> {
    /// let config = FilesConfig::load_from("./config/production.toml")?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn load_from(path: impl AsRef<Path>) -> AttachmentResult<Self> {
        let file = Figment::from(Toml::file(path.as_ref())).focus("files");

        let config: Self = Figment::from(Serialized::defaults(Self::default()))
            .merge(file)
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(Box::new)?;

        tracing::debug!(path = %path.as_ref().display(), "Loaded file attachment configuration");
        Ok(config)
    }

    /// Adds or replaces a disk
    #[must_use]
    pub fn with_disk(mut self, name: impl Into<String>, disk: DiskSettings) -> Self {
        self.disks.insert(name.into(), disk);
        self
    }

    /// Adds or replaces the fallback URL of a table
    #[must_use]
    pub fn with_fallback(mut self, table: impl Into<String>, url: impl Into<String>) -> Self {
        self.fallbacks.insert(table.into(), url.into());
        self
    }

    /// Settings of the named disk
    pub fn disk(&self, name: &str) -> AttachmentResult<&DiskSettings> {
        self.disks
            .get(name)
            .ok_or_else(|| AttachmentError::UnknownDisk(name.to_string()))
    }

    /// Filesystem root of the named disk
    pub fn disk_root(&self, name: &str) -> AttachmentResult<&Path> {
        self.disk(name)?
            .root
            .as_deref()
            .ok_or_else(|| AttachmentError::MissingDiskRoot(name.to_string()))
    }

    /// Fallback URL configured for a table
    pub fn fallback(&self, table: &str) -> AttachmentResult<&str> {
        self.fallbacks
            .get(table)
            .map(String::as_str)
            .ok_or_else(|| AttachmentError::MissingFallback(table.to_string()))
    }

    /// Public URL the root of the named disk is served under
    ///
    /// An explicit disk `url` is used as is. Otherwise the disk root, made
    /// relative to `base_path`, is appended to `app_url`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use acton_files::config::{DiskSettings, FilesConfig};
    ///
    /// let mut config = FilesConfig::default()
    ///     .with_disk("uploads", DiskSettings::local("/srv/shop/public/uploads"));
    /// config.app_url = "http://localhost/shop/public".to_string();
    /// config.base_path = "/srv/shop".into();
    ///
    /// assert_eq!(
    ///     config.root_link("uploads").unwrap(),
    ///     "http://localhost/shop/public/uploads"
    /// );
    /// ```
    pub fn root_link(&self, disk: &str) -> AttachmentResult<String> {
        let settings = self.disk(disk)?;
        if let Some(url) = &settings.url {
            return Ok(url.trim_end_matches('/').to_string());
        }

        let root = self.disk_root(disk)?;
        let relative = root.strip_prefix(&self.base_path).unwrap_or(root);
        let path = relative.to_string_lossy().replace('\\', "/");

        let mut url = format!(
            "{}/{}",
            self.app_url.trim_end_matches('/'),
            path.trim_matches('/')
        );
        url = url.replace("public/public/", "public/");

        if self.remove_public_from_url && !self.app_url.contains("public") {
            url = url.replace("public/", "");
        }

        Ok(url.trim_end_matches('/').to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_default_config() {
        let config = FilesConfig::default();
        assert_eq!(config.default_disk, "local");
        assert_eq!(config.disk_root("local").unwrap(), Path::new("./storage/app"));
        assert!(config.disks.contains_key("public"));
        assert!(config.fallbacks.is_empty());
        assert!(!config.remove_public_from_url);
    }

    #[test]
    fn test_missing_entries_are_explicit_errors() {
        let config = FilesConfig::default().with_disk(
            "s3",
            DiskSettings {
                driver: "s3".to_string(),
                ..DiskSettings::default()
            },
        );

        assert!(matches!(config.disk("ftp"), Err(AttachmentError::UnknownDisk(_))));
        assert!(matches!(config.disk_root("s3"), Err(AttachmentError::MissingDiskRoot(_))));
        assert!(matches!(config.fallback("products"), Err(AttachmentError::MissingFallback(_))));
        assert!(matches!(config.root_link("s3"), Err(AttachmentError::MissingDiskRoot(_))));
    }

    #[test]
    fn test_root_link_prefers_explicit_url() {
        let config = FilesConfig::default().with_disk(
            "cdn",
            DiskSettings::local("/srv/cdn").with_url("https://cdn.example.com/"),
        );
        assert_eq!(config.root_link("cdn").unwrap(), "https://cdn.example.com");
    }

    #[test]
    fn test_root_link_relative_to_base_path() {
        let config = FilesConfig::default();
        assert_eq!(config.root_link("local").unwrap(), "http://localhost:3000/storage/app");
    }

    #[test]
    fn test_root_link_collapses_double_public() {
        let mut config = FilesConfig::default()
            .with_disk("uploads", DiskSettings::local("/srv/shop/public/uploads"));
        config.base_path = PathBuf::from("/srv/shop");
        config.app_url = "http://localhost/shop/public".to_string();

        assert_eq!(
            config.root_link("uploads").unwrap(),
            "http://localhost/shop/public/uploads"
        );
    }

    #[test]
    fn test_root_link_strips_public_for_dev_server() {
        let mut config = FilesConfig::default()
            .with_disk("uploads", DiskSettings::local("/srv/shop/public/uploads"));
        config.base_path = PathBuf::from("/srv/shop");
        config.app_url = "http://localhost:8000".to_string();
        config.remove_public_from_url = true;

        assert_eq!(config.root_link("uploads").unwrap(), "http://localhost:8000/uploads");

        // Served from the public directory itself: keep the segment
        config.app_url = "http://localhost/shop/public".to_string();
        assert_eq!(
            config.root_link("uploads").unwrap(),
            "http://localhost/shop/public/uploads"
        );
    }

    #[test]
    fn test_load_from_file_and_env() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                [files]
                app_url = "https://shop.example.com"

                [files.disks.media]
                root = "/srv/media"

                [files.fallbacks]
                products = "https://shop.example.com/img/none.png"
                users = "https://shop.example.com/img/avatar.png"
                "#,
            )?;
            jail.set_env("ACTON_FILES_DEFAULT_DISK", "media");
            jail.set_env("ACTON_FILES_FALLBACKS__USERS", "/img/anonymous.png");

            let config = FilesConfig::load().map_err(|e| e.to_string())?;

            assert_eq!(config.app_url, "https://shop.example.com");
            assert_eq!(config.default_disk, "media");
            assert_eq!(config.disk_root("media").unwrap(), Path::new("/srv/media"));
            assert_eq!(config.disk("media").unwrap().driver, "local");
            // Defaults survive alongside file-provided disks
            assert!(config.disks.contains_key("local"));
            assert_eq!(
                config.fallback("products").unwrap(),
                "https://shop.example.com/img/none.png"
            );
            assert_eq!(config.fallback("users").unwrap(), "/img/anonymous.png");
            Ok(())
        });
    }

    #[test]
    fn test_load_without_file_uses_defaults() {
        Jail::expect_with(|_jail| {
            let config = FilesConfig::load_from("missing.toml").map_err(|e| e.to_string())?;
            assert_eq!(config.default_disk, "local");
            Ok(())
        });
    }
}
