//! Host environment seams.
//!
//! The engine never talks to a browser directly. Everything the runtime
//! environment provides — content fetching, persistent key-value storage,
//! and the page surface being mutated — sits behind a trait here, so the
//! whole pipeline runs identically against a filesystem, an in-memory
//! fixture, or a real embedding.
//!
//! ## The three seams
//!
//! - [`ContentSource`]: markdown documents and string tables, addressed by
//!   relative path. `exists` is the cheap existence probe used to decide
//!   between a localized file and its default-language fallback before
//!   paying for a full fetch.
//! - [`KeyValueStore`]: one string per key. Holds the persisted theme seed
//!   and the user's language choice.
//! - [`PageShell`]: the mutable page surface the loader drives — document
//!   title, history entries, navigation highlight, the height-pinning and
//!   fade choreography, and content swaps.
//!
//! [`RecordingShell`] logs every shell call in order; the loader's
//! transition-ordering tests assert against that log.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use thiserror::Error;

/// Failure fetching a content document.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("document not found: {0}")]
    NotFound(String),
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
}

/// Read-only source of markdown documents and string tables.
pub trait ContentSource {
    /// Lightweight existence probe, cheaper than a full fetch.
    fn exists(&self, path: &str) -> bool;

    /// Fetch a document as UTF-8 text.
    fn fetch(&self, path: &str) -> Result<String, FetchError>;
}

/// Persistent string-per-key storage for user preferences.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
}

/// Placeholder skeleton variants — hero pages get the two-column skeleton.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShimmerKind {
    Hero,
    Default,
}

/// The page surface the loader mutates.
///
/// One method per observable effect, so a recording implementation can
/// reconstruct the exact choreography of a load cycle. `delay` stands in
/// for the timed suspensions that sequence the fade animations.
pub trait PageShell {
    fn set_document_title(&mut self, title: &str);
    fn push_history(&mut self, page_id: &str);
    fn set_active_nav(&mut self, page_id: &str);

    /// Current rendered height of the content container, if it has one.
    fn content_height(&self) -> Option<u32>;
    fn pin_height(&mut self, px: u32);
    fn release_height(&mut self);

    fn fade_out(&mut self);
    fn fade_in(&mut self);
    fn delay(&mut self, ms: u64);
    fn scroll_to_top(&mut self);

    /// Replace the content wrapper's HTML.
    fn swap_content(&mut self, html: &str);

    /// Render `html` off-screen and report its height, for pre-measuring
    /// the final content before the swap.
    fn measure(&mut self, html: &str) -> u32;

    /// Bind a CSS custom-property block to the document scope.
    fn apply_css(&mut self, css: &str);
}

// =========================================================================
// Filesystem source (used by the CLI)
// =========================================================================

/// Content source backed by a directory tree.
pub struct FsContentSource {
    root: PathBuf,
}

impl FsContentSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ContentSource for FsContentSource {
    fn exists(&self, path: &str) -> bool {
        self.root.join(path).is_file()
    }

    fn fetch(&self, path: &str) -> Result<String, FetchError> {
        let full = self.root.join(path);
        if !full.is_file() {
            return Err(FetchError::NotFound(path.to_string()));
        }
        fs::read_to_string(&full).map_err(|source| FetchError::Io {
            path: path.to_string(),
            source,
        })
    }
}

// =========================================================================
// In-memory implementations
// =========================================================================

/// In-memory content source. Doubles as the test fixture.
#[derive(Default)]
pub struct MemorySource {
    docs: HashMap<String, String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: &str, body: &str) -> &mut Self {
        self.docs.insert(path.to_string(), body.to_string());
        self
    }
}

impl ContentSource for MemorySource {
    fn exists(&self, path: &str) -> bool {
        self.docs.contains_key(path)
    }

    fn fetch(&self, path: &str) -> Result<String, FetchError> {
        self.docs
            .get(path)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(path.to_string()))
    }
}

/// In-memory key-value store.
#[derive(Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }
}

/// One observable shell effect, as recorded by [`RecordingShell`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellEvent {
    Title(String),
    History(String),
    ActiveNav(String),
    PinHeight(u32),
    ReleaseHeight,
    FadeOut,
    FadeIn,
    Delay(u64),
    ScrollTop,
    Swap(String),
    Measure,
    Css(String),
}

/// Shell that records every call in order. The content swapped in last is
/// kept separately so tests can assert against the final page state.
#[derive(Default)]
pub struct RecordingShell {
    pub events: RefCell<Vec<ShellEvent>>,
    pub content: String,
    /// Height reported by `content_height` / `measure`.
    pub fixed_height: u32,
}

impl RecordingShell {
    pub fn new() -> Self {
        Self {
            events: RefCell::new(Vec::new()),
            content: String::new(),
            fixed_height: 480,
        }
    }

    fn record(&self, event: ShellEvent) {
        self.events.borrow_mut().push(event);
    }

    /// The recorded event sequence, cloned out for assertions.
    pub fn log(&self) -> Vec<ShellEvent> {
        self.events.borrow().clone()
    }
}

impl PageShell for RecordingShell {
    fn set_document_title(&mut self, title: &str) {
        self.record(ShellEvent::Title(title.to_string()));
    }

    fn push_history(&mut self, page_id: &str) {
        self.record(ShellEvent::History(page_id.to_string()));
    }

    fn set_active_nav(&mut self, page_id: &str) {
        self.record(ShellEvent::ActiveNav(page_id.to_string()));
    }

    fn content_height(&self) -> Option<u32> {
        Some(self.fixed_height)
    }

    fn pin_height(&mut self, px: u32) {
        self.record(ShellEvent::PinHeight(px));
    }

    fn release_height(&mut self) {
        self.record(ShellEvent::ReleaseHeight);
    }

    fn fade_out(&mut self) {
        self.record(ShellEvent::FadeOut);
    }

    fn fade_in(&mut self) {
        self.record(ShellEvent::FadeIn);
    }

    fn delay(&mut self, ms: u64) {
        self.record(ShellEvent::Delay(ms));
    }

    fn scroll_to_top(&mut self) {
        self.record(ShellEvent::ScrollTop);
    }

    fn swap_content(&mut self, html: &str) {
        self.record(ShellEvent::Swap(html.to_string()));
        self.content = html.to_string();
    }

    fn measure(&mut self, _html: &str) -> u32 {
        self.record(ShellEvent::Measure);
        self.fixed_height
    }

    fn apply_css(&mut self, css: &str) {
        self.record(ShellEvent::Css(css.to_string()));
    }
}
