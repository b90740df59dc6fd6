//! Localized string resolution.
//!
//! String tables are JSON documents at `strings/strings.{lang}.json`,
//! loaded lazily through the [`ContentSource`] seam and cached per
//! language. Lookups use dotted keys (`panel.cardTitleCTA`) walked through
//! the nested table; any miss repeats the walk against the default-language
//! table, and a key missing from both degrades to a visibly marked
//! `[key]` placeholder instead of failing. Missing translations are meant
//! to be seen, not crashed on.
//!
//! The default-language table load is always attempted, even when the
//! requested language also failed, so the UI never runs without strings
//! entirely.

use std::collections::HashMap;

use log::{error, warn};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::{DEFAULT_LANG, QueryParams};
use crate::host::{ContentSource, KeyValueStore};

/// Storage key for the persisted language choice.
pub const USER_LANG_KEY: &str = "user-lang";

fn table_path(lang: &str) -> String {
    format!("strings/strings.{lang}.json")
}

/// Decide the active language: query parameter > persisted choice >
/// system-reported language (primary subtag) > built-in default.
pub fn resolve_language(
    query: &QueryParams,
    store: &dyn KeyValueStore,
    system_langs: &[String],
) -> String {
    if let Some(lang) = &query.lang {
        return lang.clone();
    }
    if let Some(lang) = store.get(USER_LANG_KEY) {
        return lang;
    }
    if let Some(first) = system_langs.first() {
        let primary = first.split('-').next().unwrap_or(first);
        if !primary.is_empty() {
            return primary.to_lowercase();
        }
    }
    DEFAULT_LANG.to_string()
}

/// Per-language string table cache with fallback lookup.
pub struct StringResolver {
    tables: HashMap<String, Value>,
    lang: String,
}

impl StringResolver {
    /// Create a resolver and load tables for `lang` (plus the default).
    pub fn load(lang: &str, source: &dyn ContentSource) -> Self {
        let mut resolver = Self {
            tables: HashMap::new(),
            lang: lang.to_string(),
        };
        resolver.load_table(lang, source);
        resolver.ensure_default(source);
        resolver
    }

    /// Switch the active language, loading its table on demand.
    pub fn set_language(&mut self, lang: &str, source: &dyn ContentSource) {
        self.lang = lang.to_string();
        if !self.tables.contains_key(lang) {
            self.load_table(lang, source);
        }
        self.ensure_default(source);
    }

    pub fn language(&self) -> &str {
        &self.lang
    }

    fn load_table(&mut self, lang: &str, source: &dyn ContentSource) {
        match source.fetch(&table_path(lang)) {
            Ok(raw) => match serde_json::from_str::<Value>(&raw) {
                Ok(table) if table.is_object() => {
                    self.tables.insert(lang.to_string(), table);
                }
                Ok(_) => warn!("string table for '{lang}' is not an object, ignoring"),
                Err(err) => warn!("string table for '{lang}' is malformed: {err}"),
            },
            Err(err) => {
                warn!("strings for language '{lang}' not found, falling back to {DEFAULT_LANG}: {err}");
            }
        }
    }

    /// Guarantee a default-language table exists, even if empty.
    fn ensure_default(&mut self, source: &dyn ContentSource) {
        if self.tables.contains_key(DEFAULT_LANG) {
            return;
        }
        self.load_table(DEFAULT_LANG, source);
        if !self.tables.contains_key(DEFAULT_LANG) {
            error!("default-language strings could not be loaded; lookups will degrade to placeholders");
            self.tables
                .insert(DEFAULT_LANG.to_string(), Value::Object(Default::default()));
        }
    }

    fn walk<'a>(&'a self, lang: &str, key: &str) -> Option<&'a Value> {
        let mut node = self.tables.get(lang)?;
        for segment in key.split('.') {
            node = node.get(segment)?;
        }
        Some(node)
    }

    fn resolve(&self, key: &str) -> Option<&Value> {
        self.walk(&self.lang, key)
            .or_else(|| self.walk(DEFAULT_LANG, key))
    }

    /// Resolve a string, or `None` when absent from both tables.
    pub fn lookup_opt(&self, key: &str) -> Option<String> {
        self.resolve(key)
            .and_then(Value::as_str)
            .map(str::to_string)
    }

    /// Resolve a string, degrading to the `[key]` placeholder.
    pub fn lookup(&self, key: &str) -> String {
        self.lookup_opt(key).unwrap_or_else(|| format!("[{key}]"))
    }

    /// Resolve a list of structured entries (testimonials, tips).
    /// Missing or malformed lists are empty, never an error.
    pub fn lookup_list<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        let Some(value) = self.resolve(key) else {
            return Vec::new();
        };
        match serde_json::from_value(value.clone()) {
            Ok(list) => list,
            Err(err) => {
                warn!("string list '{key}' is malformed: {err}");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{MemorySource, MemoryStore};
    use serde::Deserialize;

    fn source_with(lang: &str, json: &str) -> MemorySource {
        let mut source = MemorySource::new();
        source.insert(&table_path(lang), json);
        source
    }

    fn en_table() -> &'static str {
        r#"{
            "backToTop": "Back to top",
            "nav": { "index": { "label": "Home", "drawerLabel": "Home" } },
            "pages": { "index": { "title": "Main Feature" } },
            "panel": {
                "testimonials": [
                    { "stars": 5, "quote": "Fantastic!", "author": "A Happy User" }
                ]
            }
        }"#
    }

    #[test]
    fn lookup_walks_nested_keys() {
        let source = source_with("en", en_table());
        let resolver = StringResolver::load("en", &source);
        assert_eq!(resolver.lookup("nav.index.label"), "Home");
        assert_eq!(resolver.lookup("backToTop"), "Back to top");
    }

    #[test]
    fn missing_key_yields_bracketed_placeholder() {
        let source = source_with("en", en_table());
        let resolver = StringResolver::load("en", &source);
        assert_eq!(resolver.lookup("pages.ghost.title"), "[pages.ghost.title]");
        assert_eq!(resolver.lookup_opt("pages.ghost.title"), None);
    }

    #[test]
    fn missing_language_falls_back_to_default() {
        // Only the English table exists; asking for Portuguese still works.
        let source = source_with("en", en_table());
        let resolver = StringResolver::load("pt", &source);
        assert_eq!(resolver.language(), "pt");
        assert_eq!(resolver.lookup("nav.index.label"), "Home");
    }

    #[test]
    fn partial_translation_falls_through_per_key() {
        let mut source = source_with("en", en_table());
        source.insert(
            &table_path("pt"),
            r#"{ "nav": { "index": { "label": "Início" } } }"#,
        );
        let resolver = StringResolver::load("pt", &source);
        assert_eq!(resolver.lookup("nav.index.label"), "Início");
        // Key absent from pt resolves from en.
        assert_eq!(resolver.lookup("pages.index.title"), "Main Feature");
    }

    #[test]
    fn malformed_table_is_skipped() {
        let mut source = source_with("en", en_table());
        source.insert(&table_path("pt"), "{ not json ]");
        let resolver = StringResolver::load("pt", &source);
        assert_eq!(resolver.lookup("backToTop"), "Back to top");
    }

    #[test]
    fn no_tables_at_all_still_resolves_placeholders() {
        let source = MemorySource::new();
        let resolver = StringResolver::load("en", &source);
        assert_eq!(resolver.lookup("anything"), "[anything]");
    }

    #[test]
    fn lookup_list_deserializes_entries() {
        #[derive(Deserialize)]
        struct Testimonial {
            stars: u8,
            quote: String,
            author: String,
        }
        let source = source_with("en", en_table());
        let resolver = StringResolver::load("en", &source);
        let list: Vec<Testimonial> = resolver.lookup_list("panel.testimonials");
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].stars, 5);
        assert_eq!(list[0].quote, "Fantastic!");
        assert_eq!(list[0].author, "A Happy User");
    }

    #[test]
    fn lookup_list_missing_is_empty() {
        let source = source_with("en", en_table());
        let resolver = StringResolver::load("en", &source);
        let list: Vec<String> = resolver.lookup_list("panel.proTips");
        assert!(list.is_empty());
    }

    #[test]
    fn language_priority_query_then_store_then_system() {
        let mut store = MemoryStore::new();
        let system = vec!["pt-BR".to_string()];

        let query = QueryParams {
            lang: Some("de".to_string()),
            ..QueryParams::default()
        };
        assert_eq!(resolve_language(&query, &store, &system), "de");

        store.set(USER_LANG_KEY, "fr");
        assert_eq!(
            resolve_language(&QueryParams::default(), &store, &system),
            "fr"
        );

        let empty_store = MemoryStore::new();
        assert_eq!(
            resolve_language(&QueryParams::default(), &empty_store, &system),
            "pt"
        );

        assert_eq!(
            resolve_language(&QueryParams::default(), &empty_store, &[]),
            DEFAULT_LANG
        );
    }
}
