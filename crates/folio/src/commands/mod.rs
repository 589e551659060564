//! CLI command implementations.

pub(crate) mod articles;
pub(crate) mod list;
pub(crate) mod menu;
pub(crate) mod pages;
pub(crate) mod show;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use folio_config::{CliSettings, Config, Environment};
use folio_content::{
    ContentStore, FixedLocale, LocaleSource, LocalizationResolver, NoActiveLocale, TextBlockParser,
};
use folio_site::{Page, Site, SiteSettings};

use crate::error::CliError;

pub(crate) use articles::ArticlesArgs;
pub(crate) use menu::MenuArgs;
pub(crate) use pages::PagesArgs;
pub(crate) use show::ShowArgs;

/// Options shared by every command.
#[derive(Args)]
pub(crate) struct GlobalArgs {
    /// Path to configuration file (default: auto-discover folio.toml).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Content root directory (overrides config).
    #[arg(long, global = true, env = "FOLIO_CONTENT_DIR")]
    content_dir: Option<PathBuf>,

    /// Active locale (default: the configured or first-seen fallback).
    #[arg(short, long, global = true)]
    locale: Option<String>,

    /// Hide draft pages, as a production site would.
    #[arg(long, global = true)]
    production: bool,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl GlobalArgs {
    /// Load configuration and open the site it describes.
    pub(crate) fn open_site(&self) -> Result<Site, CliError> {
        let cli_settings = CliSettings {
            content_dir: self.content_dir.clone(),
            environment: self.production.then_some(Environment::Production),
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        Ok(site_from_config(&config, self.locale.clone()))
    }
}

/// Build a site from loaded configuration.
pub(crate) fn site_from_config(config: &Config, active_locale: Option<String>) -> Site {
    let source: Arc<dyn LocaleSource> = match active_locale {
        Some(locale) => Arc::new(FixedLocale(locale)),
        None => Arc::new(NoActiveLocale),
    };
    let mut resolver = LocalizationResolver::new(source);
    if let Some(fallback) = &config.locales.fallback {
        resolver = resolver.with_fallback(fallback.as_str());
    }

    let parser = TextBlockParser::new(&config.locales.default, &config.locales.language_key);
    let pages_dir = config.content_resolved.pages_dir();
    tracing::info!(
        pages = %pages_dir.display(),
        default_locale = %config.locales.default,
        "Opening content root"
    );
    let store = ContentStore::new(pages_dir, parser, Arc::new(resolver));

    let settings = SiteSettings {
        title: config.site.title.clone(),
        production: config.site.environment == Environment::Production,
        menu_file: Some(config.content_resolved.menu_file()),
    };
    Site::new(store, settings)
}

/// Short label for a page: its heading, else its path.
pub(crate) fn label(site: &Site, page: &Page) -> String {
    page.heading(site.locale().as_deref())
        .unwrap_or_else(|| page.href(None))
}

/// Load a page or fail with a not-found error.
pub(crate) fn require_page(site: &Site, path: &str) -> Result<Arc<Page>, CliError> {
    site.find_by_path(path)?
        .ok_or_else(|| CliError::NotFound(path.trim_matches('/').to_owned()))
}
