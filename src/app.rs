//! Application orchestration.
//!
//! [`App`] wires the pieces together in the order the startup sequence
//! demands: resolve the language, load string tables, apply the theme,
//! build the chrome, then load the initial page (from the `page` query
//! parameter, default `index`) without polluting history. Afterwards it
//! reacts to navigation, history pops, language and theme selection, and
//! scheme-preference flips.
//!
//! Nothing escapes this layer as a panic or an unhandled error: unknown
//! pages and failed fetches become visible message blocks, everything
//! else degrades per module (placeholder strings, fallback palette) and
//! is logged.

use log::warn;
use maud::Markup;

use crate::config::{QueryParams, SiteConfig};
use crate::host::{ContentSource, KeyValueStore, PageShell};
use crate::loader::{LoadError, LoadOutcome, PageLoader};
use crate::panel::{self, PanelRotors};
use crate::render;
use crate::strings::{StringResolver, USER_LANG_KEY, resolve_language};
use crate::theme::ThemeEngine;

const DEFAULT_PAGE: &str = "index";

/// Everything the embedding mounts outside the content container.
pub struct Chrome {
    pub navigation: Markup,
    pub footer: Markup,
    pub theme_selector: Markup,
    pub language_selector: Markup,
    pub panel: Markup,
    pub fabs: Markup,
    /// Whether the side panel is shown for the active page.
    pub show_panel: bool,
}

/// Page-dependent fragments rebuilt on every navigation: the fab slot and
/// the side panel (fresh changelog summary, fresh rotation state).
pub struct PageRefresh {
    pub fabs: Markup,
    pub panel: Markup,
    pub show_panel: bool,
}

pub struct App {
    config: SiteConfig,
    query: QueryParams,
    source: Box<dyn ContentSource>,
    store: Box<dyn KeyValueStore>,
    strings: StringResolver,
    theme: ThemeEngine,
    loader: PageLoader,
    rotors: PanelRotors,
    dark: bool,
    current_page: String,
    panel_visible: bool,
}

impl App {
    /// Resolve language and theme state up front; nothing touches the
    /// shell until [`Self::start`].
    pub fn new(
        config: SiteConfig,
        query: QueryParams,
        source: Box<dyn ContentSource>,
        store: Box<dyn KeyValueStore>,
        system_langs: &[String],
        dark: bool,
    ) -> Self {
        let lang = resolve_language(&query, store.as_ref(), system_langs);
        let strings = StringResolver::load(&lang, source.as_ref());
        let theme = ThemeEngine::new(&config, &query);
        let rotors = PanelRotors::new(&strings);
        Self {
            config,
            query,
            source,
            store,
            strings,
            theme,
            loader: PageLoader::new(),
            rotors,
            dark,
            current_page: DEFAULT_PAGE.to_string(),
            panel_visible: true,
        }
    }

    pub fn language(&self) -> &str {
        self.strings.language()
    }

    pub fn current_page(&self) -> &str {
        &self.current_page
    }

    /// Apply the theme, build the chrome, and load the initial page.
    pub fn start(&mut self, shell: &mut dyn PageShell) -> Chrome {
        self.theme.apply(self.store.as_ref(), self.dark, shell);
        let initial_page = self
            .query
            .page
            .clone()
            .unwrap_or_else(|| DEFAULT_PAGE.to_string());
        self.load_page(&initial_page, true, shell);
        self.build_chrome()
    }

    /// Full navigation: load the page, then rebuild the page-dependent
    /// chrome (fab slot and side panel).
    pub fn navigate(&mut self, page_id: &str, shell: &mut dyn PageShell) -> PageRefresh {
        self.load_page(page_id, false, shell);
        self.refresh_panel()
    }

    /// Replay a history entry: same pipeline, no new history push.
    pub fn pop_state(&mut self, page_id: &str, shell: &mut dyn PageShell) -> PageRefresh {
        self.load_page(page_id, true, shell);
        self.refresh_panel()
    }

    /// Persist a language choice, reload strings, rebuild everything, and
    /// reload the current page in the new language.
    pub fn select_language(&mut self, code: &str, shell: &mut dyn PageShell) -> Chrome {
        self.store.set(USER_LANG_KEY, code);
        self.strings.set_language(code, self.source.as_ref());
        self.rotors = PanelRotors::new(&self.strings);
        let page = self.current_page.clone();
        self.load_page(&page, true, shell);
        self.build_chrome()
    }

    /// Persist a theme seed and re-apply it immediately.
    pub fn select_theme(&mut self, color: &str, shell: &mut dyn PageShell) {
        self.theme
            .set_seed(color, self.store.as_mut(), self.dark, shell);
    }

    /// Light/dark preference flipped; re-derive for the new scheme.
    pub fn on_scheme_change(&mut self, dark: bool, shell: &mut dyn PageShell) {
        self.dark = dark;
        self.theme.apply(self.store.as_ref(), self.dark, shell);
    }

    /// Step the testimonial card to its next face.
    pub fn advance_testimonial(&mut self) -> Option<Markup> {
        self.rotors
            .testimonials
            .advance()
            .map(panel::testimonial_card)
    }

    /// Step the tip card to its next face.
    pub fn advance_tip(&mut self) -> Option<Markup> {
        let tip = self.rotors.tips.advance()?;
        Some(panel::tip_card(tip, &self.strings))
    }

    fn build_chrome(&self) -> Chrome {
        let active_seed = self.theme.seed_color(self.store.as_ref());
        Chrome {
            navigation: panel::build_navigation(&self.config, &self.strings),
            footer: panel::build_footer(&self.config, &self.strings),
            theme_selector: panel::build_theme_selector(
                &self.theme.theme_options(&self.config.theme_colors),
                active_seed.as_deref(),
                &self.strings,
            ),
            language_selector: panel::build_language_selector(
                &self.config,
                self.strings.language(),
                &self.strings,
            ),
            panel: self.build_panel(),
            fabs: panel::page_fabs(&self.current_page, &self.config, &self.strings),
            show_panel: self.panel_visible,
        }
    }

    fn build_panel(&self) -> Markup {
        let summary =
            panel::latest_changelog_summary(self.strings.language(), self.source.as_ref());
        let roadmap = panel::roadmap_summary(self.strings.language(), self.source.as_ref());
        panel::build_panel(
            &self.config,
            &self.strings,
            summary.as_ref(),
            &roadmap,
            &self.rotors,
        )
    }

    /// Rebuild the page-dependent chrome: summaries are refetched and the
    /// rotating cards restart from a fresh rotation state.
    fn refresh_panel(&mut self) -> PageRefresh {
        self.rotors = PanelRotors::new(&self.strings);
        PageRefresh {
            fabs: panel::page_fabs(&self.current_page, &self.config, &self.strings),
            panel: self.build_panel(),
            show_panel: self.panel_visible,
        }
    }

    fn load_page(&mut self, page_id: &str, skip_history: bool, shell: &mut dyn PageShell) {
        let ticket = match self.loader.begin(
            page_id,
            skip_history,
            &self.config,
            &self.strings,
            self.source.as_ref(),
            shell,
        ) {
            Ok(ticket) => ticket,
            Err(LoadError::UnknownPage(id)) => {
                warn!("navigation to unknown page '{id}'");
                let message = self.strings.lookup("content.notFound");
                shell.swap_content(&render::message_block(&message).into_string());
                return;
            }
        };
        let fetched = self.source.fetch(ticket.path());
        match self
            .loader
            .complete(&ticket, fetched, &self.config, &self.strings, shell)
        {
            LoadOutcome::Settled { show_panel, .. } => {
                self.current_page = page_id.to_string();
                self.panel_visible = show_panel;
            }
            LoadOutcome::Failed => {
                self.current_page = page_id.to_string();
            }
            LoadOutcome::Superseded => {}
        }
    }
}
