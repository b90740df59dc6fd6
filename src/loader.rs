//! Page loading state machine.
//!
//! A load cycle is split into two phases around the single fallible fetch:
//!
//! 1. [`PageLoader::begin`] resolves the page descriptor, updates title,
//!    navigation highlight and history, probes which localized document
//!    exists, and runs the transition-out choreography (pin the current
//!    height, fade, shimmer placeholder). It hands back a [`LoadTicket`]
//!    naming the document to fetch.
//! 2. [`PageLoader::complete`] takes the ticket and the fetch result and
//!    either settles the page (transition-in choreography, table of
//!    contents) or swaps in a visible error block.
//!
//! Every `begin` bumps a monotonically increasing token; a ticket whose
//! token is no longer current is *superseded* and `complete` returns
//! without touching the shell at all. Rapid navigation therefore cancels
//! and replaces: the newest request always wins, and a stale response can
//! never overwrite newer content.

use log::{debug, warn};
use thiserror::Error;

use crate::config::{DEFAULT_LANG, PageKind, SiteConfig};
use crate::host::{ContentSource, FetchError, PageShell, ShimmerKind};
use crate::render::{self, Heading, RenderContext};
use crate::strings::StringResolver;

/// Timed suspensions sequencing the fade animations, in milliseconds.
const FADE_OUT_MS: u64 = 200;
const SWAP_MS: u64 = 150;
const SETTLE_MS: u64 = 300;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("unknown page id '{0}'")]
    UnknownPage(String),
}

/// Where a load cycle currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadPhase {
    #[default]
    Idle,
    Resolving,
    TransitioningOut,
    Fetching,
    TransitioningIn,
    Settled,
    Error,
}

/// Claim on an in-flight load. Only the ticket from the most recent
/// [`PageLoader::begin`] is still current.
#[derive(Debug, Clone)]
pub struct LoadTicket {
    token: u64,
    page_id: String,
    kind: PageKind,
    path: String,
    show_panel: bool,
}

impl LoadTicket {
    /// Content path to fetch and hand to [`PageLoader::complete`].
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn page_id(&self) -> &str {
        &self.page_id
    }

    pub fn kind(&self) -> PageKind {
        self.kind
    }
}

/// How a load cycle ended.
pub enum LoadOutcome {
    /// Content is on the page. Carries what page-specific wiring needs.
    Settled {
        kind: PageKind,
        headings: Vec<Heading>,
        toc: Option<maud::Markup>,
        /// Whether the settled page wants the side panel shown.
        show_panel: bool,
    },
    /// A newer `begin` took over; the shell was left untouched.
    Superseded,
    /// Fetch failed; a visible error block replaced the content.
    Failed,
}

/// Drives the transition choreography for one content container.
#[derive(Default)]
pub struct PageLoader {
    token: u64,
    phase: LoadPhase,
}

impl PageLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> LoadPhase {
        self.phase
    }

    /// Start a load cycle for `page_id`, superseding any in-flight ticket.
    ///
    /// On return the shell shows the shimmer placeholder and the caller
    /// owes a `fetch(ticket.path())` followed by [`Self::complete`]. The
    /// initial load skips the history entry so the landing page does not
    /// appear twice in the back stack.
    pub fn begin(
        &mut self,
        page_id: &str,
        initial: bool,
        config: &SiteConfig,
        strings: &StringResolver,
        source: &dyn ContentSource,
        shell: &mut dyn PageShell,
    ) -> Result<LoadTicket, LoadError> {
        self.token += 1;
        self.phase = LoadPhase::Resolving;

        let Some(descriptor) = config.page(page_id) else {
            self.phase = LoadPhase::Error;
            return Err(LoadError::UnknownPage(page_id.to_string()));
        };

        let title = strings.lookup(&format!("pages.{page_id}.title"));
        shell.set_document_title(&format!("{} - {}", config.app_name, title));
        shell.set_active_nav(page_id);
        if !initial {
            shell.push_history(page_id);
        }

        // Prefer the active language's document; fall back to the default
        // language when the translation does not exist yet.
        let localized = format!("md/{}/{}", strings.language(), descriptor.file);
        let path = if source.exists(&localized) {
            localized
        } else {
            debug!(
                "no '{}' translation for {}, using {DEFAULT_LANG}",
                strings.language(),
                descriptor.file
            );
            format!("md/{DEFAULT_LANG}/{}", descriptor.file)
        };

        self.phase = LoadPhase::TransitioningOut;
        if let Some(height) = shell.content_height() {
            shell.pin_height(height);
        }
        shell.fade_out();
        shell.delay(FADE_OUT_MS);
        let shimmer_kind = match descriptor.kind {
            PageKind::Hero => ShimmerKind::Hero,
            _ => ShimmerKind::Default,
        };
        shell.swap_content(&render::shimmer(shimmer_kind).into_string());
        shell.scroll_to_top();
        shell.fade_in();

        self.phase = LoadPhase::Fetching;
        Ok(LoadTicket {
            token: self.token,
            page_id: page_id.to_string(),
            kind: descriptor.kind,
            path,
            show_panel: descriptor.panel,
        })
    }

    /// Finish the cycle the ticket belongs to.
    ///
    /// A stale ticket is reported as [`LoadOutcome::Superseded`] and the
    /// shell is left exactly as the superseding cycle arranged it.
    pub fn complete(
        &mut self,
        ticket: &LoadTicket,
        fetch_result: Result<String, FetchError>,
        config: &SiteConfig,
        strings: &StringResolver,
        shell: &mut dyn PageShell,
    ) -> LoadOutcome {
        if ticket.token != self.token {
            debug!("load of '{}' superseded, dropping result", ticket.page_id);
            return LoadOutcome::Superseded;
        }

        let markdown = match fetch_result {
            Ok(markdown) => markdown,
            Err(err) => {
                warn!("failed to load '{}': {err}", ticket.path);
                self.phase = LoadPhase::Error;
                let message = strings.lookup("content.loadError");
                shell.swap_content(&render::message_block(&message).into_string());
                shell.fade_in();
                shell.release_height();
                return LoadOutcome::Failed;
            }
        };

        self.phase = LoadPhase::TransitioningIn;
        let ctx = RenderContext { config, strings };
        let page = render::render_page(ticket.kind, &markdown, &ctx);
        let html = page.html.into_string();

        // Pre-measure the final content off-DOM so the container animates
        // from the old height straight to the new one.
        let height = shell.measure(&html);
        shell.pin_height(height);
        shell.fade_out();
        shell.delay(SWAP_MS);
        shell.swap_content(&html);
        shell.fade_in();
        shell.delay(SETTLE_MS);
        shell.release_height();

        self.phase = LoadPhase::Settled;
        let toc = render::table_of_contents(&page.headings, &strings.lookup("toc.title"));
        LoadOutcome::Settled {
            kind: ticket.kind,
            headings: page.headings,
            toc,
            show_panel: ticket.show_panel,
        }
    }
}
