//! Site configuration.
//!
//! The engine treats configuration as an externally supplied, read-only
//! object: app identity, navigation items, supported languages, theme
//! colors, and the page-id → source-file mapping. It is deserialized from
//! `site.toml` with sparse overrides on top of defaults; unknown keys are
//! rejected to catch typos early.
//!
//! ```toml
//! app_name = "Pixel Pulse"
//! site_version = "1.4.0"
//! seed_color = "#006E2C"        # omit to defer to platform dynamic theming
//! store_link = "https://play.example/pixel-pulse"
//! support_email = "support@example.com"
//!
//! [[carousel_images]]
//! kind = "phone"
//! src = "art/phone-1.png"
//! alt = "Main screen"
//!
//! [[supported_languages]]
//! code = "en"
//! name = "English"
//!
//! [[theme_colors]]
//! name = "Default"
//! value = "#6750A4"
//!
//! [[nav_items]]
//! id = "index"
//! icon = "home"
//! mobile_show = true
//!
//! [pages.index]
//! file = "index.md"
//! kind = "hero"
//! fab = "store"
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Language every site must ultimately fall back to.
pub const DEFAULT_LANG: &str = "en";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Layout variant for a page, fixed at configuration time.
///
/// Selecting the variant here (rather than re-checking page-id strings
/// throughout the pipeline) is what lets the transformer dispatch once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum PageKind {
    /// Landing page: hero region + image gallery, then body.
    Hero,
    /// First two-column table becomes a grid of feature cards.
    FeatureGrid,
    /// Version history: collapsible sections with platform filters.
    Changelog,
    /// Markdown rendered with no structural transform.
    #[default]
    Plain,
}

/// Floating action a page may request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FabKind {
    /// Opens the store listing.
    Store,
    /// Opens a support mail draft.
    Support,
}

/// One gallery image descriptor for the hero layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarouselImage {
    /// Device class, used as a CSS class on the thumbnail (`phone`, `watch`, ...).
    #[serde(default = "default_image_kind")]
    pub kind: String,
    pub src: String,
    pub alt: String,
}

fn default_image_kind() -> String {
    "phone".to_string()
}

/// A supported UI language.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Language {
    pub code: String,
    pub name: String,
}

/// A selectable theme seed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThemeColor {
    pub name: String,
    pub value: String,
}

/// One navigation entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavItem {
    /// Page id this entry navigates to.
    pub id: String,
    /// Icon name rendered in rail/drawer/mobile bar.
    pub icon: String,
    /// Shown directly on the mobile bar; `false` goes to the overflow sheet.
    #[serde(default)]
    pub mobile_show: bool,
}

/// Source file and layout for one logical page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PageDescriptor {
    /// Source file name, resolved under `md/{lang}/`.
    pub file: String,
    #[serde(default)]
    pub kind: PageKind,
    /// Floating action shown while this page is active.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fab: Option<FabKind>,
    /// Whether the side panel is shown while this page is active.
    /// Legal/utility pages opt out.
    #[serde(default = "default_panel")]
    pub panel: bool,
}

fn default_panel() -> bool {
    true
}

/// The whole externally supplied configuration object.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    pub app_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_version: Option<String>,
    /// Default theme seed. Absent means platform dynamic theming owns the
    /// palette and the engine must not override it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed_color: Option<String>,
    pub store_link: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo_link: Option<String>,
    pub support_email: String,
    pub carousel_images: Vec<CarouselImage>,
    pub supported_languages: Vec<Language>,
    pub theme_colors: Vec<ThemeColor>,
    pub nav_items: Vec<NavItem>,
    /// Ordered page-id → descriptor mapping.
    pub pages: BTreeMap<String, PageDescriptor>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            app_name: "App".to_string(),
            site_version: None,
            seed_color: None,
            store_link: String::new(),
            repo_link: None,
            support_email: String::new(),
            carousel_images: Vec::new(),
            supported_languages: vec![Language {
                code: DEFAULT_LANG.to_string(),
                name: "English".to_string(),
            }],
            theme_colors: Vec::new(),
            nav_items: Vec::new(),
            pages: BTreeMap::new(),
        }
    }
}

impl SiteConfig {
    /// Load and validate a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field consistency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.app_name.trim().is_empty() {
            return Err(ConfigError::Validation("app_name must not be empty".into()));
        }
        if self.pages.is_empty() {
            return Err(ConfigError::Validation(
                "at least one page must be configured".into(),
            ));
        }
        for item in &self.nav_items {
            if !self.pages.contains_key(&item.id) {
                return Err(ConfigError::Validation(format!(
                    "nav item '{}' has no matching page entry",
                    item.id
                )));
            }
        }
        if self.supported_languages.is_empty() {
            return Err(ConfigError::Validation(
                "supported_languages must not be empty".into(),
            ));
        }
        if !self
            .supported_languages
            .iter()
            .any(|l| l.code == DEFAULT_LANG)
        {
            return Err(ConfigError::Validation(format!(
                "supported_languages must include the fallback language '{DEFAULT_LANG}'"
            )));
        }
        Ok(())
    }

    /// Descriptor for a page id, if configured.
    pub fn page(&self, page_id: &str) -> Option<&PageDescriptor> {
        self.pages.get(page_id)
    }

    /// App name normalized for storage namespacing: lowercased, whitespace
    /// runs collapsed to `-`.
    pub fn normalized_app_name(&self) -> String {
        self.app_name
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("-")
            .to_lowercase()
    }
}

// =========================================================================
// Query parameters
// =========================================================================

/// The query parameters the engine consumes: `page`, `lang`, `theme`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pub page: Option<String>,
    pub lang: Option<String>,
    /// Seed color override, hex digits without the leading `#`.
    pub theme: Option<String>,
}

impl QueryParams {
    /// Parse a raw query string (with or without the leading `?`).
    pub fn parse(query: &str) -> Self {
        let mut params = Self::default();
        for pair in query.trim_start_matches('?').split('&') {
            let Some((key, value)) = pair.split_once('=') else {
                continue;
            };
            if value.is_empty() {
                continue;
            }
            match key {
                "page" => params.page = Some(value.to_string()),
                "lang" => params.lang = Some(value.to_string()),
                "theme" => params.theme = Some(value.to_string()),
                _ => {}
            }
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_toml() -> &'static str {
        r#"
            app_name = "Pixel Pulse"
            store_link = "https://play.example/pp"
            support_email = "support@example.com"

            [[supported_languages]]
            code = "en"
            name = "English"

            [[nav_items]]
            id = "index"
            icon = "home"
            mobile_show = true

            [pages.index]
            file = "index.md"
            kind = "hero"
            fab = "store"

            [pages.changelog]
            file = "changelog.md"
            kind = "changelog"
        "#
    }

    #[test]
    fn parses_minimal_config() {
        let config: SiteConfig = toml::from_str(minimal_toml()).unwrap();
        config.validate().unwrap();

        assert_eq!(config.app_name, "Pixel Pulse");
        let index = config.page("index").unwrap();
        assert_eq!(index.kind, PageKind::Hero);
        assert_eq!(index.fab, Some(FabKind::Store));
        assert_eq!(config.page("changelog").unwrap().kind, PageKind::Changelog);
        assert!(config.page("missing").is_none());
    }

    #[test]
    fn page_kind_defaults_to_plain() {
        let config: SiteConfig = toml::from_str(
            r#"
                app_name = "X"
                store_link = ""
                support_email = ""
                [[supported_languages]]
                code = "en"
                name = "English"
                [pages.privacy]
                file = "PRIVACY.md"
            "#,
        )
        .unwrap();
        assert_eq!(config.page("privacy").unwrap().kind, PageKind::Plain);
    }

    #[test]
    fn panel_defaults_shown_and_can_opt_out() {
        let config: SiteConfig = toml::from_str(
            r#"
                app_name = "X"
                store_link = ""
                support_email = ""
                [[supported_languages]]
                code = "en"
                name = "English"
                [pages.index]
                file = "index.md"
                [pages.privacy]
                file = "PRIVACY.md"
                panel = false
            "#,
        )
        .unwrap();
        assert!(config.page("index").unwrap().panel);
        assert!(!config.page("privacy").unwrap().panel);
    }

    #[test]
    fn unknown_keys_rejected() {
        let result: Result<SiteConfig, _> = toml::from_str(
            r#"
                app_name = "X"
                typo_key = true
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn nav_item_without_page_fails_validation() {
        let mut config: SiteConfig = toml::from_str(minimal_toml()).unwrap();
        config.nav_items.push(NavItem {
            id: "ghost".to_string(),
            icon: "help".to_string(),
            mobile_show: false,
        });
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn fallback_language_required() {
        let mut config: SiteConfig = toml::from_str(minimal_toml()).unwrap();
        config.supported_languages = vec![Language {
            code: "pt".to_string(),
            name: "Português".to_string(),
        }];
        assert!(config.validate().is_err());
    }

    #[test]
    fn normalized_app_name_collapses_whitespace() {
        let config = SiteConfig {
            app_name: "Pixel  Pulse Pro".to_string(),
            ..SiteConfig::default()
        };
        assert_eq!(config.normalized_app_name(), "pixel-pulse-pro");
    }

    #[test]
    fn query_params_parse_known_keys() {
        let params = QueryParams::parse("?page=changelog&lang=pt&theme=3F51B5&utm=x");
        assert_eq!(params.page.as_deref(), Some("changelog"));
        assert_eq!(params.lang.as_deref(), Some("pt"));
        assert_eq!(params.theme.as_deref(), Some("3F51B5"));
    }

    #[test]
    fn query_params_empty_values_ignored() {
        let params = QueryParams::parse("page=&lang=pt");
        assert_eq!(params.page, None);
        assert_eq!(params.lang.as_deref(), Some("pt"));
    }
}
