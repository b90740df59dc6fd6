//! Theme engine: seed color resolution and palette derivation.
//!
//! A single seed color drives the whole design-system theme. The seed is
//! resolved by priority — query parameter override, then the user's
//! persisted choice, then the configured default — and expanded into tonal
//! palettes from which fixed tones are extracted. The same seed always
//! yields the same palette; derivation is a pure function.
//!
//! When no seed is resolvable at all (the config omits one), platform-level
//! dynamic theming owns the palette and [`ThemeEngine::apply`] is a no-op.
//!
//! Derivation model: the seed's hue and saturation seed four tonal ramps
//! (primary at full chroma, secondary at a third, tertiary hue-rotated 60°
//! at half chroma, neutral nearly achromatic), and scheme roles are read
//! off those ramps at fixed tones — tone 40 for the light accent roles,
//! tone 80 for dark, containers at 90/30, and so on.

use std::fmt::Write as _;

use log::{debug, error};

use crate::config::{QueryParams, SiteConfig, ThemeColor};
use crate::host::{KeyValueStore, PageShell};

const THEME_KEY_PREFIX: &str = "app-site-theme-color-";

/// Neutral palette used whenever a seed fails to parse.
pub const FALLBACK_PALETTE: Palette = Palette {
    primary: Rgb::new(0xbd, 0xbd, 0xbd),
    secondary: Rgb::new(0xe0, 0xe0, 0xe0),
    tertiary: Rgb::new(0xee, 0xee, 0xee),
};

/// An sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// The three accent colors extracted at the preview tone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub primary: Rgb,
    pub secondary: Rgb,
    pub tertiary: Rgb,
}

/// A configured theme choice paired with its derived preview palette.
#[derive(Debug, Clone)]
pub struct ThemeOption {
    pub name: String,
    pub value: String,
    pub palette: Palette,
}

/// Parse `#RGB` or `#RRGGBB`, case-insensitive.
pub fn parse_hex(color: &str) -> Option<Rgb> {
    let digits = color.strip_prefix('#')?;
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    match digits.len() {
        3 => {
            let expand = |c: u8| {
                let v = (c as char).to_digit(16).unwrap() as u8;
                v << 4 | v
            };
            let b = digits.as_bytes();
            Some(Rgb::new(expand(b[0]), expand(b[1]), expand(b[2])))
        }
        6 => {
            let channel = |range| u8::from_str_radix(&digits[range], 16).ok();
            Some(Rgb::new(
                channel(0..2)?,
                channel(2..4)?,
                channel(4..6)?,
            ))
        }
        _ => None,
    }
}

/// Hex digits without the leading `#`, as the `theme` query param carries.
fn is_bare_hex(value: &str) -> bool {
    (value.len() == 3 || value.len() == 6) && value.bytes().all(|b| b.is_ascii_hexdigit())
}

// =========================================================================
// Tonal palettes
// =========================================================================

/// A ramp of shades at a fixed hue/chroma; tones index lightness 0..100.
#[derive(Debug, Clone, Copy)]
struct TonalPalette {
    hue: f64,
    sat: f64,
}

impl TonalPalette {
    fn tone(self, tone: u8) -> Rgb {
        hsl_to_rgb(self.hue, self.sat, f64::from(tone) / 100.0)
    }
}

/// The four ramps a seed expands into.
struct CorePalettes {
    primary: TonalPalette,
    secondary: TonalPalette,
    tertiary: TonalPalette,
    neutral: TonalPalette,
}

impl CorePalettes {
    fn from_seed(seed: Rgb) -> Self {
        let (hue, sat, _) = rgb_to_hsl(seed);
        // Accent ramps keep enough chroma to read as colored even for
        // washed-out seeds.
        let sat = sat.max(0.24);
        Self {
            primary: TonalPalette { hue, sat },
            secondary: TonalPalette { hue, sat: sat / 3.0 },
            tertiary: TonalPalette {
                hue: (hue + 60.0) % 360.0,
                sat: sat / 2.0,
            },
            neutral: TonalPalette {
                hue,
                sat: (sat * 0.08).min(0.04),
            },
        }
    }
}

fn rgb_to_hsl(color: Rgb) -> (f64, f64, f64) {
    let r = f64::from(color.r) / 255.0;
    let g = f64::from(color.g) / 255.0;
    let b = f64::from(color.b) / 255.0;
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;
    if (max - min).abs() < f64::EPSILON {
        return (0.0, 0.0, l);
    }
    let d = max - min;
    let s = if l > 0.5 {
        d / (2.0 - max - min)
    } else {
        d / (max + min)
    };
    let h = if (max - r).abs() < f64::EPSILON {
        ((g - b) / d).rem_euclid(6.0)
    } else if (max - g).abs() < f64::EPSILON {
        (b - r) / d + 2.0
    } else {
        (r - g) / d + 4.0
    };
    (h * 60.0, s, l)
}

fn hsl_to_rgb(h: f64, s: f64, l: f64) -> Rgb {
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let hp = h.rem_euclid(360.0) / 60.0;
    let x = c * (1.0 - (hp.rem_euclid(2.0) - 1.0).abs());
    let (r1, g1, b1) = match hp as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = l - c / 2.0;
    let to_byte = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    Rgb::new(to_byte(r1), to_byte(g1), to_byte(b1))
}

/// Derive the three-color preview palette from a seed.
///
/// Pure and total: an unparseable seed falls back to the fixed neutral
/// palette (logged), never an error.
pub fn derive_palette(seed: &str) -> Palette {
    let Some(rgb) = parse_hex(seed) else {
        error!("could not derive theme palette for color \"{seed}\"");
        return FALLBACK_PALETTE;
    };
    let core = CorePalettes::from_seed(rgb);
    Palette {
        primary: core.primary.tone(40),
        secondary: core.secondary.tone(40),
        tertiary: core.tertiary.tone(40),
    }
}

/// Render the full scheme for a seed as a CSS custom-property block.
///
/// Returns `None` when the seed does not parse; the caller keeps whatever
/// theme is already bound.
pub fn scheme_css(seed: &str, dark: bool) -> Option<String> {
    let rgb = parse_hex(seed)?;
    let core = CorePalettes::from_seed(rgb);

    // (accent tone, on-accent, container, on-container)
    let (accent, on_accent, container, on_container) =
        if dark { (80, 20, 30, 90) } else { (40, 100, 90, 10) };
    let (surface, on_surface, variant, outline) =
        if dark { (6, 90, 30, 60) } else { (98, 10, 90, 50) };

    let mut css = String::from(":root {\n");
    let mut role = |name: &str, color: Rgb| {
        let _ = writeln!(css, "  --md-sys-color-{name}: {};", color.to_hex());
    };
    for (prefix, palette) in [
        ("primary", core.primary),
        ("secondary", core.secondary),
        ("tertiary", core.tertiary),
    ] {
        role(prefix, palette.tone(accent));
        role(&format!("on-{prefix}"), palette.tone(on_accent));
        role(&format!("{prefix}-container"), palette.tone(container));
        role(&format!("on-{prefix}-container"), palette.tone(on_container));
    }
    role("background", core.neutral.tone(surface));
    role("on-background", core.neutral.tone(on_surface));
    role("surface", core.neutral.tone(surface));
    role("on-surface", core.neutral.tone(on_surface));
    role("surface-variant", core.neutral.tone(variant));
    role("outline", core.neutral.tone(outline));
    css.push_str("}\n");
    Some(css)
}

// =========================================================================
// Engine
// =========================================================================

/// Resolves, persists, and applies the theme seed.
pub struct ThemeEngine {
    storage_key: String,
    default_seed: Option<String>,
    query_override: Option<String>,
}

impl ThemeEngine {
    pub fn new(config: &SiteConfig, query: &QueryParams) -> Self {
        let query_override = query
            .theme
            .as_deref()
            .filter(|v| is_bare_hex(v))
            .map(|v| format!("#{v}"));
        Self {
            storage_key: format!("{THEME_KEY_PREFIX}{}", config.normalized_app_name()),
            default_seed: config.seed_color.clone(),
            query_override,
        }
    }

    /// The seed in effect: query override > persisted choice > config
    /// default. `None` defers to platform dynamic theming.
    pub fn seed_color(&self, store: &dyn KeyValueStore) -> Option<String> {
        if let Some(seed) = &self.query_override {
            return Some(seed.clone());
        }
        if let Some(seed) = store.get(&self.storage_key) {
            return Some(seed);
        }
        self.default_seed.clone()
    }

    /// Derive and bind the theme for the current seed. Returns `false`
    /// when nothing was applied (no seed, or an unparseable one).
    pub fn apply(
        &self,
        store: &dyn KeyValueStore,
        dark: bool,
        shell: &mut dyn PageShell,
    ) -> bool {
        let Some(seed) = self.seed_color(store) else {
            debug!("no theme seed resolvable; platform dynamic theme stays in charge");
            return false;
        };
        match scheme_css(&seed, dark) {
            Some(css) => {
                debug!("applying theme from seed {seed} (dark: {dark})");
                shell.apply_css(&css);
                true
            }
            None => {
                error!("error applying theme from seed color {seed}");
                false
            }
        }
    }

    /// Persist a user-selected seed and re-apply immediately.
    pub fn set_seed(
        &self,
        color: &str,
        store: &mut dyn KeyValueStore,
        dark: bool,
        shell: &mut dyn PageShell,
    ) {
        store.set(&self.storage_key, color);
        self.apply(store, dark, shell);
    }

    /// Configured theme choices with their derived preview palettes.
    pub fn theme_options(&self, choices: &[ThemeColor]) -> Vec<ThemeOption> {
        choices
            .iter()
            .map(|choice| ThemeOption {
                name: choice.name.clone(),
                value: choice.value.clone(),
                palette: derive_palette(&choice.value),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{MemoryStore, RecordingShell, ShellEvent};

    #[test]
    fn parse_hex_accepts_triplet_and_sextuplet() {
        assert_eq!(parse_hex("#3F51B5"), Some(Rgb::new(0x3f, 0x51, 0xb5)));
        assert_eq!(parse_hex("#fff"), Some(Rgb::new(0xff, 0xff, 0xff)));
        assert_eq!(parse_hex("#ABC"), Some(Rgb::new(0xaa, 0xbb, 0xcc)));
        assert_eq!(parse_hex("not-a-color"), None);
        assert_eq!(parse_hex("#12345"), None);
        assert_eq!(parse_hex("#GGGGGG"), None);
    }

    #[test]
    fn derive_palette_is_pure() {
        let a = derive_palette("#6750A4");
        let b = derive_palette("#6750A4");
        assert_eq!(a, b);
    }

    #[test]
    fn derive_palette_distinct_roles() {
        let palette = derive_palette("#2196F3");
        assert_ne!(palette.primary, palette.secondary);
        assert_ne!(palette.primary, palette.tertiary);
    }

    #[test]
    fn invalid_seed_returns_fallback_without_panicking() {
        assert_eq!(derive_palette("not-a-color"), FALLBACK_PALETTE);
        assert_eq!(derive_palette(""), FALLBACK_PALETTE);
        assert_eq!(FALLBACK_PALETTE.primary.to_hex(), "#bdbdbd");
    }

    #[test]
    fn scheme_css_has_light_and_dark_variants() {
        let light = scheme_css("#6750A4", false).unwrap();
        let dark = scheme_css("#6750A4", true).unwrap();
        assert!(light.contains("--md-sys-color-primary:"));
        assert!(light.contains("--md-sys-color-on-tertiary-container:"));
        assert_ne!(light, dark);
        assert!(scheme_css("nope", false).is_none());
    }

    fn engine_with_seed(seed: Option<&str>, query_theme: Option<&str>) -> ThemeEngine {
        let config = SiteConfig {
            app_name: "Pixel Pulse".to_string(),
            seed_color: seed.map(str::to_string),
            ..SiteConfig::default()
        };
        let query = QueryParams {
            theme: query_theme.map(str::to_string),
            ..QueryParams::default()
        };
        ThemeEngine::new(&config, &query)
    }

    #[test]
    fn seed_priority_query_then_store_then_config() {
        let mut store = MemoryStore::new();

        let engine = engine_with_seed(Some("#006E2C"), Some("3F51B5"));
        assert_eq!(engine.seed_color(&store).as_deref(), Some("#3F51B5"));

        // Malformed query values are ignored.
        let engine = engine_with_seed(Some("#006E2C"), Some("zzz"));
        assert_eq!(engine.seed_color(&store).as_deref(), Some("#006E2C"));

        store.set("app-site-theme-color-pixel-pulse", "#F44336");
        assert_eq!(engine.seed_color(&store).as_deref(), Some("#F44336"));
    }

    #[test]
    fn set_seed_round_trips_through_store() {
        let mut store = MemoryStore::new();
        let mut shell = RecordingShell::new();
        let engine = engine_with_seed(Some("#006E2C"), None);

        engine.set_seed("#9C27B0", &mut store, false, &mut shell);
        assert_eq!(engine.seed_color(&store).as_deref(), Some("#9C27B0"));
        // Re-application happened.
        assert!(shell
            .log()
            .iter()
            .any(|e| matches!(e, ShellEvent::Css(_))));
    }

    #[test]
    fn apply_is_noop_without_any_seed() {
        let store = MemoryStore::new();
        let mut shell = RecordingShell::new();
        let engine = engine_with_seed(None, None);

        assert!(!engine.apply(&store, false, &mut shell));
        assert!(shell.log().is_empty());
    }

    #[test]
    fn theme_options_carry_preview_palettes() {
        let engine = engine_with_seed(Some("#006E2C"), None);
        let options = engine.theme_options(&[
            ThemeColor {
                name: "Indigo".to_string(),
                value: "#3F51B5".to_string(),
            },
            ThemeColor {
                name: "Broken".to_string(),
                value: "oops".to_string(),
            },
        ]);
        assert_eq!(options.len(), 2);
        assert_eq!(options[0].palette, derive_palette("#3F51B5"));
        assert_eq!(options[1].palette, FALLBACK_PALETTE);
    }
}
