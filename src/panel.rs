//! Navigation chrome and side panel.
//!
//! Everything here is pure rendering: config + string resolver + theme
//! state in, maud markup out. The app decides when to rebuild (language
//! switches rebuild everything, page loads rebuild the fab slot and the
//! panel's page-dependent pieces).
//!
//! The side panel's changelog card is the one piece with its own content
//! dependency: [`latest_changelog_summary`] reads the changelog document
//! and condenses the newest version into a version line, a release date,
//! and up to three highlight leaders. Any failure along that path renders
//! the static unavailable message instead of an empty card.

use std::sync::LazyLock;

use log::warn;
use maud::{Markup, html};
use regex::Regex;
use serde::Deserialize;

use crate::config::{DEFAULT_LANG, FabKind, SiteConfig};
use crate::host::{ContentSource, FetchError};
use crate::render;
use crate::strings::StringResolver;
use crate::theme::ThemeOption;

/// `*(September 2025)*` or `*(Released September 2025)*`.
static SUMMARY_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\*\((?:Released\s+)?(.*?)\)\*$").expect("date regex"));

/// Bold leader of a list item: `- **Faster sync:** details...`.
static HIGHLIGHT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*[-*]\s+\*\*(.+?)\*\*").expect("highlight regex"));

const SUMMARY_HIGHLIGHTS: usize = 3;

// =========================================================================
// Navigation
// =========================================================================

fn nav_label(strings: &StringResolver, id: &str) -> String {
    strings.lookup(&format!("nav.{id}.label"))
}

fn drawer_label(strings: &StringResolver, id: &str) -> String {
    strings
        .lookup_opt(&format!("nav.{id}.drawerLabel"))
        .unwrap_or_else(|| nav_label(strings, id))
}

fn nav_link(id: &str) -> String {
    format!("?page={id}")
}

/// Rail, drawer, and mobile bar. Mobile items are partitioned by
/// `mobile_show`; anything else goes behind the overflow sheet, whose
/// "more" button only renders when the sheet has entries.
pub fn build_navigation(config: &SiteConfig, strings: &StringResolver) -> Markup {
    let (bar_items, overflow_items): (Vec<_>, Vec<_>) =
        config.nav_items.iter().partition(|item| item.mobile_show);

    html! {
        nav.nav-rail {
            @for item in &config.nav_items {
                a.nav-item href=(nav_link(&item.id)) data-page=(item.id) {
                    md-icon { (item.icon) }
                    span.nav-label { (nav_label(strings, &item.id)) }
                }
            }
        }
        nav.nav-drawer {
            @for item in &config.nav_items {
                a.nav-item href=(nav_link(&item.id)) data-page=(item.id) {
                    md-icon { (item.icon) }
                    span.nav-label { (drawer_label(strings, &item.id)) }
                }
            }
        }
        nav.nav-bar-mobile {
            @for item in &bar_items {
                a.nav-item href=(nav_link(&item.id)) data-page=(item.id) {
                    md-icon { (item.icon) }
                    span.nav-label { (nav_label(strings, &item.id)) }
                }
            }
            @if !overflow_items.is_empty() {
                button.nav-item id="nav-more-button" type="button" {
                    md-icon { "more_horiz" }
                    span.nav-label { (strings.lookup("nav.more")) }
                }
                div.nav-overflow-sheet id="nav-overflow-sheet" {
                    @for item in &overflow_items {
                        a.nav-item href=(nav_link(&item.id)) data-page=(item.id) {
                            md-icon { (item.icon) }
                            span.nav-label { (drawer_label(strings, &item.id)) }
                        }
                    }
                }
            }
        }
    }
}

/// Site footer: description, link list, support mail, copyright line with
/// the `{appName}` placeholder substituted, version when configured.
pub fn build_footer(config: &SiteConfig, strings: &StringResolver) -> Markup {
    let copyright = strings
        .lookup("footer.copyright")
        .replace("{appName}", &config.app_name);

    html! {
        footer.site-footer {
            p.footer-description { (strings.lookup("footer.description")) }
            div.footer-links {
                h4 { (strings.lookup("footer.linksTitle")) }
                a href=(config.store_link) { (strings.lookup("footer.storeLink")) }
                @if let Some(repo) = &config.repo_link {
                    a href=(repo) { (strings.lookup("footer.repoLink")) }
                }
                a href={ "mailto:" (config.support_email) } {
                    (strings.lookup("footer.support"))
                }
            }
            p.footer-copyright {
                (copyright)
                @if let Some(version) = &config.site_version {
                    span.footer-version { " · v" (version) }
                }
            }
        }
    }
}

// =========================================================================
// Selectors
// =========================================================================

/// Theme choice grid. Each option previews its derived palette as three
/// color dots; the active option is marked.
pub fn build_theme_selector(
    options: &[ThemeOption],
    active: Option<&str>,
    strings: &StringResolver,
) -> Markup {
    html! {
        div.theme-selector {
            h4 { (strings.lookup("selector.themeTitle")) }
            div.theme-options {
                @for option in options {
                    @let is_active = active == Some(option.value.as_str());
                    button.theme-option.active[is_active]
                        type="button"
                        data-color=(option.value)
                        title=(option.name)
                    {
                        span.palette-dot style={ "background:" (option.palette.primary.to_hex()) } {}
                        span.palette-dot style={ "background:" (option.palette.secondary.to_hex()) } {}
                        span.palette-dot style={ "background:" (option.palette.tertiary.to_hex()) } {}
                    }
                }
            }
        }
    }
}

/// Language list with the active entry checked.
pub fn build_language_selector(
    config: &SiteConfig,
    active: &str,
    strings: &StringResolver,
) -> Markup {
    html! {
        div.language-selector {
            h4 { (strings.lookup("selector.languageTitle")) }
            ul.language-options {
                @for language in &config.supported_languages {
                    li {
                        button.language-option.active[language.code == active]
                            type="button"
                            data-lang=(language.code)
                        {
                            span { (language.name) }
                            @if language.code == active {
                                md-icon { "check_circle" }
                            }
                        }
                    }
                }
            }
        }
    }
}

// =========================================================================
// Changelog summary
// =========================================================================

/// Condensed newest changelog entry for the side panel card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangelogSummary {
    pub version: String,
    pub date: Option<String>,
    pub highlights: Vec<String>,
}

/// Fetch the changelog for `lang` (default-language fallback) and extract
/// the newest version's summary. Any failure is `None`; the card then
/// shows its static unavailable message.
pub fn latest_changelog_summary(
    lang: &str,
    source: &dyn ContentSource,
) -> Option<ChangelogSummary> {
    let localized = format!("md/{lang}/changelog.md");
    let path = if source.exists(&localized) {
        localized
    } else {
        format!("md/{DEFAULT_LANG}/changelog.md")
    };
    let markdown = match source.fetch(&path) {
        Ok(markdown) => markdown,
        Err(err) => {
            warn!("changelog summary unavailable: {err}");
            return None;
        }
    };
    parse_changelog_summary(&markdown)
}

fn parse_changelog_summary(markdown: &str) -> Option<ChangelogSummary> {
    // Newest version = first `## ` section.
    let start = markdown
        .split_inclusive('\n')
        .scan(0, |offset, line| {
            let at = *offset;
            *offset += line.len();
            Some((at, line))
        })
        .find(|(_, line)| line.starts_with("## "))
        .map(|(at, _)| at)?;
    let section = &markdown[start..];
    let end = section[3..]
        .find("\n## ")
        .map_or(section.len(), |p| p + 4);
    let section = &section[..end];

    let version = section
        .lines()
        .next()?
        .trim_start_matches("## ")
        .trim()
        .to_string();
    let date = SUMMARY_DATE_RE
        .captures(section)
        .map(|c| c[1].trim().to_string());
    let highlights = HIGHLIGHT_RE
        .captures_iter(section)
        .take(SUMMARY_HIGHLIGHTS)
        .map(|c| c[1].trim().trim_end_matches(':').to_string())
        .collect();

    Some(ChangelogSummary {
        version,
        date,
        highlights,
    })
}

fn changelog_card(summary: Option<&ChangelogSummary>, strings: &StringResolver) -> Markup {
    html! {
        div.panel-card.changelog-card {
            h4 { (strings.lookup("panel.changelogTitle")) }
            @match summary {
                Some(summary) => {
                    p.changelog-version { (summary.version) }
                    @if let Some(date) = &summary.date {
                        time.changelog-date { (date) }
                    }
                    @if !summary.highlights.is_empty() {
                        ul.changelog-highlights {
                            @for highlight in &summary.highlights {
                                li { (highlight) }
                            }
                        }
                    }
                    a.changelog-link href="?page=changelog" {
                        (strings.lookup("panel.viewAll"))
                    }
                }
                None => {
                    p.changelog-unavailable { (strings.lookup("panel.changelogError")) }
                }
            }
        }
    }
}

// =========================================================================
// Roadmap summary
// =========================================================================

/// `## 🎯 Next Up` opens the upcoming-work section of the roadmap.
static ROADMAP_NEXT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"##\s*🎯\s*Next Up").expect("roadmap regex"));

/// `## 🧭` opens the long-term section, ending the next-up region.
static ROADMAP_END_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"##\s*🧭").expect("roadmap regex"));

/// Upcoming-work excerpt for the side panel card.
///
/// The three non-content variants each render their own static message;
/// a site without a roadmap stays presentable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoadmapSummary {
    /// Markdown of the next-up section.
    NextUp(String),
    /// No roadmap document published.
    ComingSoon,
    /// A roadmap exists but has no recognizable next-up section.
    Planned,
    /// The document could not be read.
    Unavailable,
}

/// Fetch the roadmap for `lang` (default-language fallback) and cut out
/// the section between the next-up and long-term markers.
pub fn roadmap_summary(lang: &str, source: &dyn ContentSource) -> RoadmapSummary {
    let localized = format!("md/{lang}/roadmap.md");
    let path = if source.exists(&localized) {
        localized
    } else {
        format!("md/{DEFAULT_LANG}/roadmap.md")
    };
    let markdown = match source.fetch(&path) {
        Ok(markdown) => markdown,
        Err(FetchError::NotFound(_)) => return RoadmapSummary::ComingSoon,
        Err(err) => {
            warn!("roadmap summary unavailable: {err}");
            return RoadmapSummary::Unavailable;
        }
    };
    let Some(start) = ROADMAP_NEXT_RE.find(&markdown) else {
        return RoadmapSummary::Planned;
    };
    let rest = &markdown[start.end()..];
    let Some(end) = ROADMAP_END_RE.find(rest) else {
        return RoadmapSummary::Planned;
    };
    RoadmapSummary::NextUp(rest[..end.start()].trim().to_string())
}

fn roadmap_card(summary: &RoadmapSummary, strings: &StringResolver) -> Markup {
    html! {
        div.panel-card.roadmap-card {
            h4 { (strings.lookup("panel.roadmapTitle")) }
            @match summary {
                RoadmapSummary::NextUp(markdown) => {
                    div.roadmap-summary { (render::fragment(markdown)) }
                }
                RoadmapSummary::ComingSoon => {
                    p { "Roadmap coming soon!" }
                }
                RoadmapSummary::Planned => {
                    p { "Planning future updates. Stay tuned!" }
                }
                RoadmapSummary::Unavailable => {
                    p { "Could not load roadmap summary." }
                }
            }
        }
    }
}

// =========================================================================
// Rotating cards
// =========================================================================

/// One user quote rotated through the testimonial card.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Testimonial {
    pub stars: u8,
    pub quote: String,
    pub author: String,
}

/// Cycles through a fixed list, one entry visible at a time.
#[derive(Debug)]
pub struct Rotor<T> {
    items: Vec<T>,
    index: usize,
}

impl<T> Rotor<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self { items, index: 0 }
    }

    pub fn current(&self) -> Option<&T> {
        self.items.get(self.index)
    }

    /// Step to the next entry, wrapping around.
    pub fn advance(&mut self) -> Option<&T> {
        if self.items.is_empty() {
            return None;
        }
        self.index = (self.index + 1) % self.items.len();
        self.current()
    }
}

/// Rotation state for the panel's testimonial and tip cards.
///
/// Constructed fresh on every panel rebuild, so the previous generation's
/// rotation is dropped and exactly one rotation exists per card at a time.
pub struct PanelRotors {
    pub testimonials: Rotor<Testimonial>,
    pub tips: Rotor<String>,
}

impl PanelRotors {
    pub fn new(strings: &StringResolver) -> Self {
        Self {
            testimonials: Rotor::new(strings.lookup_list("panel.testimonials")),
            tips: Rotor::new(strings.lookup_list("panel.proTips")),
        }
    }
}

pub fn testimonial_card(testimonial: &Testimonial) -> Markup {
    html! {
        div.panel-card.testimonial-card {
            div.testimonial-stars aria-label={ (testimonial.stars) " stars" } {
                @for _ in 0..testimonial.stars {
                    md-icon { "star" }
                }
            }
            blockquote { (testimonial.quote) }
            cite { (testimonial.author) }
        }
    }
}

pub fn tip_card(tip: &str, strings: &StringResolver) -> Markup {
    html! {
        div.panel-card.tip-card {
            h4 { (strings.lookup("panel.tipsTitle")) }
            p { (tip) }
        }
    }
}

// =========================================================================
// Panel assembly and fabs
// =========================================================================

/// The whole side panel: CTA card, changelog summary, roadmap excerpt,
/// and the initial face of each rotating card.
pub fn build_panel(
    config: &SiteConfig,
    strings: &StringResolver,
    summary: Option<&ChangelogSummary>,
    roadmap: &RoadmapSummary,
    rotors: &PanelRotors,
) -> Markup {
    html! {
        aside.side-panel {
            div.panel-card.cta-card {
                h4 { (strings.lookup("panel.ctaTitle")) }
                p { (strings.lookup("panel.ctaBody")) }
                a.cta-button href=(config.store_link) {
                    md-icon { "shopping_bag" }
                    (strings.lookup("panel.ctaButton"))
                }
            }
            (changelog_card(summary, strings))
            (roadmap_card(roadmap, strings))
            @if let Some(testimonial) = rotors.testimonials.current() {
                (testimonial_card(testimonial))
            }
            @if let Some(tip) = rotors.tips.current() {
                (tip_card(tip, strings))
            }
        }
    }
}

/// Floating actions for the active page: the descriptor's requested fab
/// (only when its label string resolves) plus the back-to-top button.
pub fn page_fabs(page_id: &str, config: &SiteConfig, strings: &StringResolver) -> Markup {
    let action = config.page(page_id).and_then(|descriptor| {
        let fab = descriptor.fab?;
        let (key, icon, href) = match fab {
            FabKind::Store => ("fab.store", "shopping_bag", config.store_link.clone()),
            FabKind::Support => (
                "fab.support",
                "mail",
                format!("mailto:{}", config.support_email),
            ),
        };
        let label = strings.lookup_opt(key)?;
        Some((label, icon, href))
    });

    html! {
        div.fab-container {
            @if let Some((label, icon, href)) = &action {
                a.page-fab href=(href) {
                    md-fab label=(label) {
                        md-icon slot="icon" { (icon) }
                    }
                }
            }
            button.back-to-top id="back-to-top" type="button"
                aria-label=(strings.lookup("backToTop"))
            {
                md-icon { "arrow_upward" }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MemorySource;

    fn en_table() -> &'static str {
        r#"{
            "backToTop": "Back to top",
            "nav": {
                "index": { "label": "Home", "drawerLabel": "Home & News" },
                "plus": { "label": "Plus" },
                "changelog": { "label": "Updates" },
                "more": "More"
            },
            "footer": {
                "description": "A little app with big ideas.",
                "linksTitle": "Links",
                "storeLink": "Get it",
                "repoLink": "Source",
                "support": "Support",
                "copyright": "© 2026 {appName}. All rights reserved."
            },
            "selector": { "themeTitle": "Theme", "languageTitle": "Language" },
            "panel": {
                "ctaTitle": "Get the app",
                "ctaBody": "Free on your favorite store.",
                "ctaButton": "Download",
                "changelogTitle": "Latest update",
                "changelogError": "Update info unavailable.",
                "viewAll": "See all updates",
                "tipsTitle": "Pro tip",
                "testimonials": [
                    { "stars": 5, "quote": "Fantastic!", "author": "A." },
                    { "stars": 4, "quote": "Very good.", "author": "B." }
                ],
                "proTips": [ "Swipe left to archive.", "Long-press to pin." ]
            },
            "fab": { "store": "Get the app", "support": "Contact us" }
        }"#
    }

    fn fixture() -> (SiteConfig, MemorySource, StringResolver) {
        let config: SiteConfig = toml::from_str(
            r#"
                app_name = "Pixel Pulse"
                site_version = "1.4.0"
                store_link = "https://play.example/pp"
                repo_link = "https://github.example/pp"
                support_email = "support@example.com"

                [[supported_languages]]
                code = "en"
                name = "English"
                [[supported_languages]]
                code = "pt"
                name = "Português"

                [[nav_items]]
                id = "index"
                icon = "home"
                mobile_show = true
                [[nav_items]]
                id = "plus"
                icon = "star"
                mobile_show = true
                [[nav_items]]
                id = "changelog"
                icon = "history"

                [pages.index]
                file = "index.md"
                kind = "hero"
                fab = "store"
                [pages.plus]
                file = "plus.md"
                [pages.changelog]
                file = "changelog.md"
                kind = "changelog"
            "#,
        )
        .unwrap();
        let mut source = MemorySource::new();
        source.insert("strings/strings.en.json", en_table());
        let strings = StringResolver::load("en", &source);
        (config, source, strings)
    }

    fn changelog_md() -> &'static str {
        "\
# History

## v2.1.0
*(Released September 2025)*

#### Phone & Tablet
- **Faster sync:** background refresh is twice as quick
- **New widgets:** three new home-screen sizes
- Small fixes
- **Wear tiles:** glanceable complications
- **Too many:** should be cut off

## v2.0.0
*(June 2025)*
- **Old stuff:** not summarized
"
    }

    #[test]
    fn navigation_partitions_mobile_items() {
        let (config, _, strings) = fixture();
        let html = build_navigation(&config, &strings).into_string();

        // changelog is not mobile_show, so the more button and sheet exist.
        assert!(html.contains("nav-more-button"));
        assert!(html.contains("nav-overflow-sheet"));
        assert!(html.contains("data-page=\"changelog\""));
        // Drawer label used where present.
        assert!(html.contains("Home &amp; News"));
        assert!(html.contains(">More<"));
    }

    #[test]
    fn navigation_hides_overflow_when_everything_fits() {
        let (mut config, _, strings) = fixture();
        for item in &mut config.nav_items {
            item.mobile_show = true;
        }
        let html = build_navigation(&config, &strings).into_string();
        assert!(!html.contains("nav-more-button"));
    }

    #[test]
    fn footer_substitutes_app_name_and_version() {
        let (config, _, strings) = fixture();
        let html = build_footer(&config, &strings).into_string();
        assert!(html.contains("© 2026 Pixel Pulse. All rights reserved."));
        assert!(html.contains("v1.4.0"));
        assert!(html.contains("mailto:support@example.com"));
        assert!(html.contains("https://github.example/pp"));
    }

    #[test]
    fn theme_selector_marks_active_and_previews_palette() {
        let (_, _, strings) = fixture();
        let options = vec![
            ThemeOption {
                name: "Indigo".to_string(),
                value: "#3F51B5".to_string(),
                palette: crate::theme::derive_palette("#3F51B5"),
            },
            ThemeOption {
                name: "Green".to_string(),
                value: "#006E2C".to_string(),
                palette: crate::theme::derive_palette("#006E2C"),
            },
        ];
        let html = build_theme_selector(&options, Some("#006E2C"), &strings).into_string();
        // Count whole buttons, not the "theme-option" substring (the
        // container class "theme-options" contains it too).
        assert_eq!(html.matches("<button class=\"theme-option").count(), 2);
        assert_eq!(html.matches("theme-option active").count(), 1);
        assert_eq!(html.matches("palette-dot").count(), 6);
    }

    #[test]
    fn language_selector_checks_active_entry() {
        let (config, _, strings) = fixture();
        let html = build_language_selector(&config, "pt", &strings).into_string();
        assert!(html.contains("Português"));
        assert_eq!(html.matches("check_circle").count(), 1);
        assert!(html.contains("language-option active\" type=\"button\" data-lang=\"pt\""));
    }

    #[test]
    fn changelog_summary_extracts_version_date_and_highlights() {
        let mut source = MemorySource::new();
        source.insert("md/en/changelog.md", changelog_md());

        let summary = latest_changelog_summary("en", &source).unwrap();
        assert_eq!(summary.version, "v2.1.0");
        // "Released" prefix dropped.
        assert_eq!(summary.date.as_deref(), Some("September 2025"));
        // Only bold leaders count, capped at three, colon trimmed.
        assert_eq!(
            summary.highlights,
            vec!["Faster sync", "New widgets", "Wear tiles"]
        );
    }

    #[test]
    fn changelog_summary_falls_back_to_default_language() {
        let mut source = MemorySource::new();
        source.insert("md/en/changelog.md", changelog_md());
        let summary = latest_changelog_summary("pt", &source).unwrap();
        assert_eq!(summary.version, "v2.1.0");
    }

    #[test]
    fn changelog_summary_missing_document_is_none() {
        let source = MemorySource::new();
        assert!(latest_changelog_summary("en", &source).is_none());
    }

    #[test]
    fn changelog_summary_without_versions_is_none() {
        assert!(parse_changelog_summary("# History\n\nNothing yet.\n").is_none());
    }

    #[test]
    fn panel_renders_unavailable_message_without_summary() {
        let (config, _, strings) = fixture();
        let rotors = PanelRotors::new(&strings);
        let html = build_panel(
            &config,
            &strings,
            None,
            &RoadmapSummary::ComingSoon,
            &rotors,
        )
        .into_string();
        assert!(html.contains("Update info unavailable."));
        assert!(html.contains("Roadmap coming soon!"));
        assert!(html.contains("Get the app"));
    }

    #[test]
    fn panel_shows_first_rotor_faces() {
        let (config, _, strings) = fixture();
        let rotors = PanelRotors::new(&strings);
        let html = build_panel(
            &config,
            &strings,
            None,
            &RoadmapSummary::ComingSoon,
            &rotors,
        )
        .into_string();
        assert!(html.contains("Fantastic!"));
        assert!(html.contains("Swipe left to archive."));
    }

    fn roadmap_md() -> &'static str {
        "\
# Roadmap

## 🎯 Next Up

- Offline mode
- **Shared lists**

## 🧭 Long Term

- World domination
"
    }

    #[test]
    fn roadmap_summary_extracts_next_up_section() {
        let mut source = MemorySource::new();
        source.insert("md/en/roadmap.md", roadmap_md());

        let summary = roadmap_summary("en", &source);
        let RoadmapSummary::NextUp(markdown) = &summary else {
            panic!("expected next-up summary, got {summary:?}");
        };
        assert!(markdown.contains("Offline mode"));
        assert!(!markdown.contains("Long Term"));
        assert!(!markdown.contains("World domination"));

        let (_, _, strings) = fixture();
        let card = roadmap_card(&summary, &strings).into_string();
        assert!(card.contains("<li>Offline mode</li>"));
        assert!(card.contains("<strong>Shared lists</strong>"));
    }

    #[test]
    fn roadmap_summary_falls_back_to_default_language() {
        let mut source = MemorySource::new();
        source.insert("md/en/roadmap.md", roadmap_md());
        assert!(matches!(
            roadmap_summary("pt", &source),
            RoadmapSummary::NextUp(_)
        ));
    }

    #[test]
    fn roadmap_without_document_is_coming_soon() {
        let source = MemorySource::new();
        assert_eq!(roadmap_summary("en", &source), RoadmapSummary::ComingSoon);
    }

    #[test]
    fn roadmap_without_next_up_section_is_planned() {
        let mut source = MemorySource::new();
        source.insert("md/en/roadmap.md", "# Roadmap\n\nIdeas welcome.\n");
        assert_eq!(roadmap_summary("en", &source), RoadmapSummary::Planned);

        // The end marker is required too; an unterminated section does not
        // count as a next-up excerpt.
        source.insert("md/en/roadmap.md", "## 🎯 Next Up\n\n- Everything\n");
        assert_eq!(roadmap_summary("en", &source), RoadmapSummary::Planned);
    }

    #[test]
    fn rotor_advances_and_wraps() {
        let mut rotor = Rotor::new(vec!["a", "b", "c"]);
        assert_eq!(rotor.current(), Some(&"a"));
        assert_eq!(rotor.advance(), Some(&"b"));
        rotor.advance();
        assert_eq!(rotor.advance(), Some(&"a"));
    }

    #[test]
    fn empty_rotor_never_yields() {
        let mut rotor: Rotor<String> = Rotor::new(Vec::new());
        assert_eq!(rotor.current(), None);
        assert_eq!(rotor.advance(), None);
    }

    #[test]
    fn fresh_rotors_reset_rotation() {
        let (_, _, strings) = fixture();
        let mut rotors = PanelRotors::new(&strings);
        rotors.testimonials.advance();
        assert_eq!(rotors.testimonials.current().unwrap().author, "B.");

        let rebuilt = PanelRotors::new(&strings);
        assert_eq!(rebuilt.testimonials.current().unwrap().author, "A.");
    }

    #[test]
    fn store_fab_rendered_when_requested_and_labeled() {
        let (config, _, strings) = fixture();
        let html = page_fabs("index", &config, &strings).into_string();
        assert!(html.contains("md-fab"));
        assert!(html.contains("https://play.example/pp"));
        assert!(html.contains("shopping_bag"));
    }

    #[test]
    fn no_action_fab_without_descriptor_request() {
        let (config, _, strings) = fixture();
        let html = page_fabs("plus", &config, &strings).into_string();
        assert!(!html.contains("md-fab"));
        // Back-to-top is always present.
        assert!(html.contains("back-to-top"));
    }

    #[test]
    fn fab_suppressed_when_label_missing() {
        let (config, source, _) = fixture();
        let _ = source;
        let empty_source = MemorySource::new();
        let strings = StringResolver::load("en", &empty_source);
        let html = page_fabs("index", &config, &strings).into_string();
        assert!(!html.contains("md-fab"));
    }
}
