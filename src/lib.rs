//! # Appsite
//!
//! Presentation engine for single-page app showcase sites: localized
//! markdown in, themed Material-style HTML out. The content is a tree of
//! markdown documents and JSON string tables; configuration is a single
//! `site.toml` describing the app's identity, navigation, languages, and
//! pages.
//!
//! # Architecture: One Pipeline, Swappable Hosts
//!
//! A page load runs the same pipeline wherever it executes:
//!
//! ```text
//! page id → descriptor → localized document → transform → shell swap
//!            (config)     (existence probe,    (PageKind    (fades, height
//!                          en fallback)         dispatch)    pinning, TOC)
//! ```
//!
//! The environment is abstracted behind three trait seams in [`host`] —
//! content fetching, key-value persistence, and the mutable page surface —
//! so the identical pipeline runs against a filesystem (the CLI), an
//! in-memory fixture (the tests), or a real embedding.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`config`] | `site.toml` deserialization, validation, query parameters |
//! | [`strings`] | Localized string tables with per-key default-language fallback |
//! | [`theme`] | Seed color resolution, tonal palette derivation, scheme CSS |
//! | [`render`] | Markdown → page HTML with per-kind structural transforms |
//! | [`loader`] | Two-phase page load state machine with supersession tokens |
//! | [`panel`] | Navigation chrome, footer, selectors, side panel cards |
//! | [`app`] | Orchestration: startup order, navigation, preference changes |
//! | [`host`] | Environment seams plus filesystem and in-memory backends |
//!
//! # Design Decisions
//!
//! ## Page Kinds Over Page-Id Checks
//!
//! Which structural transform a page gets is declared once in the config
//! (`kind = "hero"`) instead of inferred from the page id at render time.
//! The transformer dispatches on a closed enum and new pages opt into a
//! layout by declaration.
//!
//! ## Cancel-and-Replace Loading
//!
//! Rapid navigation is resolved by a monotonically increasing token: every
//! [`loader::PageLoader::begin`] supersedes the previous ticket, and a
//! stale completion is dropped without touching the page. The newest
//! request always wins; a slow response can never overwrite newer content.
//!
//! ## Failures Degrade, Never Propagate
//!
//! Missing translations fall back per key, a missing string is a visible
//! `[key]` placeholder, an unparseable theme seed gets the neutral
//! fallback palette, and a failed fetch renders a message block. The only
//! hard errors are configuration problems, surfaced at load time.

pub mod app;
pub mod config;
pub mod host;
pub mod loader;
pub mod panel;
pub mod render;
pub mod strings;
pub mod theme;
