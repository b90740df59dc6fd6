use clap::{Parser, Subcommand};
use std::path::PathBuf;

use appsite::config::{DEFAULT_LANG, SiteConfig};
use appsite::host::{ContentSource, FsContentSource};
use appsite::render::{self, RenderContext, table_of_contents};
use appsite::strings::StringResolver;
use appsite::theme;

#[derive(Parser)]
#[command(name = "appsite")]
#[command(about = "Presentation engine for single-page app showcase sites")]
#[command(long_about = "\
Presentation engine for single-page app showcase sites

Content is a tree of localized markdown documents plus JSON string tables;
site.toml describes the app identity, navigation, languages, and pages.

Content structure:

  content/
  ├── site.toml                    # App identity, nav, languages, pages
  ├── strings/
  │   ├── strings.en.json          # Default-language string table (required)
  │   └── strings.pt.json          # Per-language tables (sparse is fine)
  └── md/
      ├── en/
      │   ├── index.md             # Default-language documents (required)
      │   └── changelog.md
      └── pt/
          └── index.md             # Translations fall back to en per file

Missing translations degrade per file and per string key; only the
default-language content is required to exist.")]
#[command(version)]
struct Cli {
    /// Content directory
    #[arg(long, default_value = "content", global = true)]
    source: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render one page's HTML to stdout
    Render {
        /// Page id from site.toml
        page: String,
        /// Language to render in
        #[arg(long, default_value = DEFAULT_LANG)]
        lang: String,
        /// Also print the table of contents fragment
        #[arg(long)]
        toc: bool,
    },
    /// Validate config, string tables, and default-language content
    Check,
    /// Print the palette and scheme CSS derived from a seed color
    Palette {
        /// Seed color, e.g. '#006E2C'
        seed: String,
        /// Derive the dark scheme instead of light
        #[arg(long)]
        dark: bool,
    },
}

fn load_config(source: &PathBuf) -> Result<SiteConfig, Box<dyn std::error::Error>> {
    Ok(SiteConfig::load(&source.join("site.toml"))?)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Render { page, lang, toc } => {
            let config = load_config(&cli.source)?;
            let source = FsContentSource::new(&cli.source);
            let strings = StringResolver::load(&lang, &source);

            let descriptor = config
                .page(&page)
                .ok_or_else(|| format!("unknown page id '{page}'"))?;
            let localized = format!("md/{lang}/{}", descriptor.file);
            let path = if source.exists(&localized) {
                localized
            } else {
                format!("md/{DEFAULT_LANG}/{}", descriptor.file)
            };
            let markdown = source.fetch(&path)?;

            let ctx = RenderContext {
                config: &config,
                strings: &strings,
            };
            let rendered = render::render_page(descriptor.kind, &markdown, &ctx);
            println!("{}", rendered.html.into_string());
            if toc {
                if let Some(fragment) =
                    table_of_contents(&rendered.headings, &strings.lookup("toc.title"))
                {
                    println!("{}", fragment.into_string());
                }
            }
        }
        Command::Check => {
            let config = load_config(&cli.source)?;
            let source = FsContentSource::new(&cli.source);
            let mut problems = 0usize;

            if !source.exists(&format!("strings/strings.{DEFAULT_LANG}.json")) {
                println!("missing default string table strings/strings.{DEFAULT_LANG}.json");
                problems += 1;
            }
            for language in &config.supported_languages {
                let table = format!("strings/strings.{}.json", language.code);
                if !source.exists(&table) {
                    println!("note: no string table for '{}' ({table})", language.code);
                }
            }
            for (id, descriptor) in &config.pages {
                let default_doc = format!("md/{DEFAULT_LANG}/{}", descriptor.file);
                if !source.exists(&default_doc) {
                    println!("page '{id}': missing {default_doc}");
                    problems += 1;
                }
                for language in &config.supported_languages {
                    let doc = format!("md/{}/{}", language.code, descriptor.file);
                    if language.code != DEFAULT_LANG && !source.exists(&doc) {
                        println!("note: page '{id}' untranslated for '{}'", language.code);
                    }
                }
            }

            if problems > 0 {
                return Err(format!("{problems} problem(s) found").into());
            }
            println!(
                "ok: {} page(s), {} language(s)",
                config.pages.len(),
                config.supported_languages.len()
            );
        }
        Command::Palette { seed, dark } => {
            let palette = theme::derive_palette(&seed);
            println!("primary:   {}", palette.primary.to_hex());
            println!("secondary: {}", palette.secondary.to_hex());
            println!("tertiary:  {}", palette.tertiary.to_hex());
            if let Some(css) = theme::scheme_css(&seed, dark) {
                println!("\n{css}");
            }
        }
    }

    Ok(())
}
