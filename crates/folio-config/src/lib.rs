//! Configuration management for folio.
//!
//! Parses `folio.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `content.root`
//! - `site.title`

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override content root directory.
    pub content_dir: Option<PathBuf>,
    /// Override site environment.
    pub environment: Option<Environment>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "folio.toml";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Content layout (paths are relative strings from TOML).
    content: ContentConfigRaw,
    /// Site-wide settings.
    pub site: SiteConfig,
    /// Locale handling.
    pub locales: LocalesConfig,

    /// Resolved content configuration (set after loading).
    #[serde(skip)]
    pub content_resolved: ContentConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Raw content configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ContentConfigRaw {
    root: Option<String>,
    pages_dir: Option<String>,
    menu_file: Option<String>,
}

/// Resolved content layout.
///
/// Documents live under [`ContentConfig::pages_dir`]; the menu index file
/// lives directly under the content root.
#[derive(Debug, Clone)]
pub struct ContentConfig {
    /// Content root directory.
    pub root: PathBuf,
    /// Pages directory name, relative to `root`.
    pub pages: String,
    /// Menu index filename, relative to `root`.
    pub menu: String,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("content"),
            pages: "pages".to_owned(),
            menu: "menu.txt".to_owned(),
        }
    }
}

impl ContentConfig {
    /// Directory holding page documents.
    #[must_use]
    pub fn pages_dir(&self) -> PathBuf {
        self.root.join(&self.pages)
    }

    /// Path of the menu index file.
    #[must_use]
    pub fn menu_file(&self) -> PathBuf {
        self.root.join(&self.menu)
    }
}

/// Deployment environment. Draft pages are hidden in production.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

/// Site-wide settings.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Site title, used as the title fallback for pages.
    pub title: String,
    /// Deployment environment.
    pub environment: Environment,
}

/// Locale handling configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LocalesConfig {
    /// Locale assigned to documents that carry no locale tagging.
    pub default: String,
    /// Locale used when no active locale is supplied.
    ///
    /// When unset, the first locale seen in loaded documents is used.
    pub fallback: Option<String>,
    /// Metadata key that opens a per-locale block.
    pub language_key: String,
}

impl Default for LocalesConfig {
    fn default() -> Self {
        Self {
            default: "en".to_owned(),
            fallback: None,
            language_key: "language".to_owned(),
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`content.root`").
        field: String,
        /// Error message (e.g., "${`FOLIO_ROOT`} not set").
        message: String,
    },
}

/// Require a locale-like field to be a single non-empty token.
fn require_token(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    if value.contains(|c: char| c.is_whitespace() || c == ':') {
        return Err(ConfigError::Validation(format!(
            "{field} cannot contain whitespace or ':'"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `folio.toml` in current directory and parents.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(content_dir) = &settings.content_dir {
            self.content_resolved.root.clone_from(content_dir);
        }
        if let Some(environment) = settings.environment {
            self.site.environment = environment;
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            content: ContentConfigRaw::default(),
            site: SiteConfig::default(),
            locales: LocalesConfig::default(),
            content_resolved: ContentConfig {
                root: base.join("content"),
                ..ContentConfig::default()
            },
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_token(&self.locales.default, "locales.default")?;
        require_token(&self.locales.language_key, "locales.language_key")?;
        if let Some(fallback) = &self.locales.fallback {
            require_token(fallback, "locales.fallback")?;
        }
        if self.content_resolved.pages.is_empty() {
            return Err(ConfigError::Validation(
                "content.pages_dir cannot be empty".to_owned(),
            ));
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(ref root) = self.content.root {
            self.content.root = Some(expand::expand_env(root, "content.root")?);
        }
        self.site.title = expand::expand_env(&self.site.title, "site.title")?;
        Ok(())
    }

    /// Resolve relative paths against the config file directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let defaults = ContentConfig::default();
        self.content_resolved = ContentConfig {
            root: config_dir.join(self.content.root.as_deref().unwrap_or("content")),
            pages: self.content.pages_dir.clone().unwrap_or(defaults.pages),
            menu: self.content.menu_file.clone().unwrap_or(defaults.menu),
        };
    }
}
