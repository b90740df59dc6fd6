//! Content transformation: markdown → page-specific HTML.
//!
//! Each logical page carries a [`PageKind`] fixed at configuration time,
//! and [`render_page`] dispatches on it once:
//!
//! - **Hero**: the leading `# heading` through the section before the
//!   second `## heading` becomes the hero region, the remainder the body;
//!   a fixed image gallery from the configured carousel descriptors is
//!   attached next to the hero text.
//! - **FeatureGrid**: the first table whose rows have exactly two columns
//!   is replaced by a grid of feature cards (icon cell, text cell); any
//!   other table passes through unchanged.
//! - **Changelog**: split on `## ` version sections into collapsible
//!   blocks (first expanded), each with its title and `*(date)*` line
//!   lifted into the summary and its body partitioned into platform
//!   sub-sections behind a filter chip row.
//! - **Plain**: markdown rendered with no structural transform.
//!
//! Rendering is event-based on top of pulldown-cmark (GFM options), so the
//! structural transforms never re-parse emitted HTML. Every rendered `h2`
//! gets a slug id — lowercased, non-alphanumeric runs collapsed to `-`,
//! collisions disambiguated with a numeric suffix — and the collected
//! headings feed the table of contents, which stays hidden below two
//! entries.

use std::collections::HashSet;
use std::sync::LazyLock;

use maud::{Markup, PreEscaped, html};
use pulldown_cmark::{
    Event, HeadingLevel, Options, Parser, Tag, TagEnd, html as md_html,
};
use regex::Regex;

use crate::config::{CarouselImage, PageKind, SiteConfig};
use crate::host::ShimmerKind;
use crate::strings::StringResolver;

/// A second-level heading opening a line; the second occurrence ends the
/// hero region of a hero page.
static H2_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^## ").expect("heading regex"));

/// A parenthesized, emphasized date line: `*(September 2025)*`.
static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\*\((.*)\)\*$").expect("date regex"));

/// One rendered second-level heading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    pub text: String,
    pub slug: String,
}

/// Result of transforming one page.
pub struct RenderedPage {
    pub html: Markup,
    /// H2 headings of the body region, in document order.
    pub headings: Vec<Heading>,
}

/// Everything the transformer reads besides the markdown itself.
pub struct RenderContext<'a> {
    pub config: &'a SiteConfig,
    pub strings: &'a StringResolver,
}

fn gfm_options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_HEADING_ATTRIBUTES
}

/// Lowercase, non-alphanumeric runs collapsed to `-`, trimmed.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;
    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}

/// Page-scoped slug registry; repeated titles get `-2`, `-3`, …
#[derive(Default)]
struct SlugSet {
    seen: HashSet<String>,
}

impl SlugSet {
    fn unique(&mut self, base: &str) -> String {
        let base = if base.is_empty() { "section" } else { base };
        if self.seen.insert(base.to_string()) {
            return base.to_string();
        }
        for n in 2.. {
            let candidate = format!("{base}-{n}");
            if self.seen.insert(candidate.clone()) {
                return candidate;
            }
        }
        unreachable!()
    }
}

fn plain_text(events: &[Event]) -> String {
    let mut text = String::new();
    for event in events {
        match event {
            Event::Text(t) | Event::Code(t) => text.push_str(t),
            Event::SoftBreak | Event::HardBreak => text.push(' '),
            _ => {}
        }
    }
    text
}

/// Render markdown to HTML, assigning ids to every `h2` and collecting
/// them. Explicit `{#id}` attributes win over generated slugs.
fn render_markdown(markdown: &str, slugs: &mut SlugSet, headings: &mut Vec<Heading>) -> String {
    let events: Vec<Event> = Parser::new_ext(markdown, gfm_options()).collect();
    render_events(events, slugs, headings)
}

fn render_events<'a>(
    events: Vec<Event<'a>>,
    slugs: &mut SlugSet,
    headings: &mut Vec<Heading>,
) -> String {
    let mut out: Vec<Event<'a>> = Vec::with_capacity(events.len());
    let mut i = 0;
    while i < events.len() {
        if let Event::Start(Tag::Heading { level: HeadingLevel::H2, id, .. }) = &events[i] {
            let end = events[i + 1..]
                .iter()
                .position(|e| matches!(e, Event::End(TagEnd::Heading(HeadingLevel::H2))))
                .map(|p| p + i + 1)
                .unwrap_or(events.len());
            let text = plain_text(&events[i + 1..end]);
            let slug = match id {
                Some(explicit) => slugs.unique(explicit),
                None => slugs.unique(&slugify(&text)),
            };
            out.push(Event::Html(format!("<h2 id=\"{slug}\">").into()));
            out.extend(events[i + 1..end].iter().cloned());
            out.push(Event::Html("</h2>".into()));
            headings.push(Heading { text, slug });
            i = end + 1;
        } else {
            out.push(events[i].clone());
            i += 1;
        }
    }
    let mut html = String::new();
    md_html::push_html(&mut html, out.into_iter());
    html
}

// =========================================================================
// Page layouts
// =========================================================================

/// Transform markdown into the HTML fragment for a page of `kind`.
pub fn render_page(kind: PageKind, markdown: &str, ctx: &RenderContext) -> RenderedPage {
    match kind {
        PageKind::Hero => render_hero(markdown, ctx),
        PageKind::FeatureGrid => render_feature_grid(markdown),
        PageKind::Changelog => render_changelog(markdown, ctx),
        PageKind::Plain => render_plain(markdown),
    }
}

fn render_plain(markdown: &str) -> RenderedPage {
    let mut slugs = SlugSet::default();
    let mut headings = Vec::new();
    let body = render_markdown(markdown, &mut slugs, &mut headings);
    RenderedPage {
        html: html! { div.markdown-body { (PreEscaped(body)) } },
        headings,
    }
}

/// Split a hero page: the leading `# heading` through the first `## `
/// section stays in the hero; the body starts at the second `## ` heading.
/// Inputs without that shape keep everything in the hero.
fn split_hero(markdown: &str) -> (&str, &str) {
    if !markdown.starts_with("# ") {
        return (markdown, "");
    }
    let mut sections = H2_RE.find_iter(markdown);
    match (sections.next(), sections.next()) {
        (Some(_), Some(second)) => markdown.split_at(second.start()),
        _ => (markdown, ""),
    }
}

fn render_hero(markdown: &str, ctx: &RenderContext) -> RenderedPage {
    let (hero_md, body_md) = split_hero(markdown);

    let mut slugs = SlugSet::default();
    let mut hero_headings = Vec::new();
    let mut body_headings = Vec::new();
    let hero_html = render_markdown(hero_md, &mut slugs, &mut hero_headings);
    let body_html = render_markdown(body_md, &mut slugs, &mut body_headings);

    let html = html! {
        section.hero {
            div.hero-text.markdown-body { (PreEscaped(hero_html)) }
            div.hero-gallery { (gallery(&ctx.config.carousel_images)) }
        }
        div.markdown-body id="main-content" { (PreEscaped(body_html)) }
    };
    RenderedPage {
        html,
        headings: body_headings,
    }
}

/// Fixed image gallery: first image active, the rest thumbnails.
fn gallery(images: &[CarouselImage]) -> Markup {
    let Some(first) = images.first() else {
        return html! {};
    };
    html! {
        div.gallery-main-image {
            img src=(first.src) alt=(first.alt) id="main-gallery-image";
        }
        div.gallery-thumbnails {
            @for (idx, image) in images.iter().enumerate() {
                @let classes = if idx == 0 {
                    format!("thumbnail active {}", image.kind)
                } else {
                    format!("thumbnail {}", image.kind)
                };
                img class=(classes) src=(image.src) alt=(image.alt) data-index=(idx);
            }
        }
    }
}

// =========================================================================
// Feature grid
// =========================================================================

fn render_feature_grid(markdown: &str) -> RenderedPage {
    let mut slugs = SlugSet::default();
    let mut headings = Vec::new();
    let events: Vec<Event> = Parser::new_ext(markdown, gfm_options()).collect();
    let events = replace_feature_table(events);
    let body = render_events(events, &mut slugs, &mut headings);
    RenderedPage {
        html: html! { div.markdown-body { (PreEscaped(body)) } },
        headings,
    }
}

/// Replace the first two-column table with feature cards. Tables of any
/// other width, and all later tables, pass through untouched.
fn replace_feature_table(events: Vec<Event<'_>>) -> Vec<Event<'_>> {
    let mut out: Vec<Event> = Vec::with_capacity(events.len());
    let mut replaced = false;
    let mut i = 0;
    while i < events.len() {
        let two_cols = matches!(
            &events[i],
            Event::Start(Tag::Table(aligns)) if aligns.len() == 2
        );
        if two_cols && !replaced {
            let end = events[i + 1..]
                .iter()
                .position(|e| matches!(e, Event::End(TagEnd::Table)))
                .map(|p| p + i + 1)
                .unwrap_or(events.len());
            out.push(Event::Html(
                feature_grid(&events[i + 1..end]).into_string().into(),
            ));
            replaced = true;
            i = end + 1;
        } else {
            out.push(events[i].clone());
            i += 1;
        }
    }
    out
}

/// Render the inner events of a two-column table as feature cards. The
/// header row is dropped; only data rows become cards.
fn feature_grid(table_events: &[Event]) -> Markup {
    let mut cards: Vec<(String, String)> = Vec::new();
    let mut i = 0;
    if matches!(table_events.first(), Some(Event::Start(Tag::TableHead))) {
        i = table_events
            .iter()
            .position(|e| matches!(e, Event::End(TagEnd::TableHead)))
            .map_or(table_events.len(), |p| p + 1);
    }
    while i < table_events.len() {
        if matches!(table_events[i], Event::Start(Tag::TableRow)) {
            let row_end = table_events[i + 1..]
                .iter()
                .position(|e| matches!(e, Event::End(TagEnd::TableRow)))
                .map(|p| p + i + 1)
                .unwrap_or(table_events.len());
            let cells = collect_cells(&table_events[i + 1..row_end]);
            if let [icon, text] = cells.as_slice() {
                cards.push((icon.clone(), text.clone()));
            }
            i = row_end + 1;
        } else {
            i += 1;
        }
    }
    html! {
        div.feature-grid {
            @for (icon, text) in &cards {
                div.feature-card {
                    div.feature-icon { (PreEscaped(icon)) }
                    div.feature-text { (PreEscaped(text)) }
                }
            }
        }
    }
}

fn collect_cells(row_events: &[Event]) -> Vec<String> {
    let mut cells = Vec::new();
    let mut i = 0;
    while i < row_events.len() {
        if matches!(row_events[i], Event::Start(Tag::TableCell)) {
            let end = row_events[i + 1..]
                .iter()
                .position(|e| matches!(e, Event::End(TagEnd::TableCell)))
                .map(|p| p + i + 1)
                .unwrap_or(row_events.len());
            let mut cell_html = String::new();
            md_html::push_html(&mut cell_html, row_events[i + 1..end].iter().cloned());
            cells.push(cell_html.trim().to_string());
            i = end + 1;
        } else {
            i += 1;
        }
    }
    cells
}

// =========================================================================
// Changelog
// =========================================================================

/// Split `markdown` into segments opening at lines with `prefix`.
/// The text before the first delimiter is segment 0.
fn split_on_line_prefix<'a>(markdown: &'a str, prefix: &str) -> Vec<&'a str> {
    let mut cuts = vec![0];
    let mut offset = 0;
    for line in markdown.split_inclusive('\n') {
        if offset > 0 && line.starts_with(prefix) {
            cuts.push(offset);
        }
        offset += line.len();
    }
    cuts.push(markdown.len());
    cuts.windows(2)
        .map(|w| &markdown[w[0]..w[1]])
        .filter(|s| !s.is_empty())
        .collect()
}

/// Coarse platform category inferred from a `#### ` heading.
fn platform_id(header: &str) -> &'static str {
    let lower = header.to_lowercase();
    if lower.contains("phone") {
        "phone"
    } else if lower.contains("wear os") {
        "wear-os"
    } else if lower.contains("website") {
        "website"
    } else {
        "other"
    }
}

fn render_changelog(markdown: &str, ctx: &RenderContext) -> RenderedPage {
    let mut slugs = SlugSet::default();
    let mut headings = Vec::new();

    let segments = split_on_line_prefix(markdown, "## ");
    let (header_md, versions): (&str, &[&str]) = match segments.split_first() {
        Some((first, rest)) if !first.starts_with("## ") => (*first, rest),
        _ => ("", &segments[..]),
    };
    let header_html = render_markdown(header_md, &mut slugs, &mut headings);

    let mut blocks: Vec<Markup> = Vec::new();
    for (idx, version_md) in versions.iter().enumerate() {
        let title_line = version_md.lines().next().unwrap_or("").trim_end();
        let title_html = render_markdown(title_line, &mut slugs, &mut headings);

        let date = DATE_RE
            .captures(version_md)
            .map(|c| c[1].trim().to_string());
        let mut content = version_md
            .strip_prefix(title_line)
            .unwrap_or(version_md)
            .to_string();
        if let Some(range) = DATE_RE.find(&content).map(|m| m.range()) {
            content.replace_range(range, "");
        }
        let content = content.trim();

        let mut platforms: Vec<Markup> = Vec::new();
        for chunk in split_on_line_prefix(content, "#### ") {
            if chunk.trim().is_empty() {
                continue;
            }
            let id = if chunk.starts_with("#### ") {
                platform_id(chunk.lines().next().unwrap_or(""))
            } else {
                "other"
            };
            let chunk_html = render_markdown(chunk, &mut slugs, &mut Vec::new());
            platforms.push(html! {
                div.platform-section data-platform=(id) { (PreEscaped(chunk_html)) }
            });
        }

        blocks.push(html! {
            details.version-details open[idx == 0] {
                summary.version-summary {
                    div.version-title-wrapper {
                        (PreEscaped(title_html.clone()))
                        @if let Some(date) = &date {
                            time.version-date { (date) }
                        }
                    }
                    md-icon.expand-icon { "expand_more" }
                }
                div.version-content {
                    @for platform in &platforms { (platform) }
                }
            }
        });
    }

    let html = html! {
        div.markdown-body {
            (PreEscaped(header_html))
            (changelog_filter(ctx.strings))
            @for block in &blocks { (block) }
        }
    };
    RenderedPage { html, headings }
}

/// Filter chip row driving platform visibility.
fn changelog_filter(strings: &StringResolver) -> Markup {
    html! {
        div id="changelog-filter-container" {
            md-chip-set type="filter" id="changelog-filter-chips" {
                md-filter-chip label=(strings.lookup("filters.all")) data-platform="all" selected {}
                md-filter-chip label=(strings.lookup("filters.website")) data-platform="website" {}
                md-filter-chip label=(strings.lookup("filters.wear_os")) data-platform="wear-os" {}
                md-filter-chip label=(strings.lookup("filters.phone")) data-platform="phone" {}
            }
        }
    }
}

// =========================================================================
// Table of contents, shimmer, failure blocks
// =========================================================================

/// Build the table of contents, or `None` when fewer than two headings
/// exist (the container stays hidden rather than showing empty).
pub fn table_of_contents(headings: &[Heading], title: &str) -> Option<Markup> {
    if headings.len() < 2 {
        return None;
    }
    Some(html! {
        h3.md-typescale-title-medium { (title) }
        ul {
            @for heading in headings {
                li { a href={ "#" (heading.slug) } { (heading.text) } }
            }
        }
    })
}

/// Skeleton placeholder shown while content loads.
pub fn shimmer(kind: ShimmerKind) -> Markup {
    match kind {
        ShimmerKind::Hero => html! {
            div.shimmer-wrapper aria-hidden="true" {
                div.shimmer-hero-wrapper {
                    div.shimmer-hero-text {
                        div.shimmer-placeholder.shimmer-title {}
                        div.shimmer-placeholder.shimmer-line.medium {}
                        div.shimmer-placeholder.shimmer-line {}
                        div.shimmer-placeholder.shimmer-line.short {}
                    }
                    div.shimmer-hero-image.shimmer-placeholder {}
                }
            }
        },
        ShimmerKind::Default => html! {
            div.shimmer-wrapper aria-hidden="true" {
                div.shimmer-placeholder.shimmer-title {}
                div.shimmer-placeholder.shimmer-line {}
                div.shimmer-placeholder.shimmer-line.short {}
            }
        },
    }
}

/// Replacement content block for a failed or unknown page. Failures are
/// always a visible block, never a blank page.
pub fn message_block(message: &str) -> Markup {
    html! { p { (message) } }
}

/// Render a standalone markdown snippet with no structural transform and
/// no heading registration (panel cards, excerpts).
pub fn fragment(markdown: &str) -> Markup {
    let mut html = String::new();
    md_html::push_html(&mut html, Parser::new_ext(markdown, gfm_options()));
    PreEscaped(html)
}
