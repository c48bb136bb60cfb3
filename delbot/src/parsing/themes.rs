//! Theme scraping from the subject page's deletion-notice template.
//!
//! The subject of a PDC carries a `{{cancellazione}}` banner whose
//! `arg`/`argomento` arguments tag the discussion with themes, e.g.
//! `{{cancellazione|9|arg=musica|argomento2=LGBT}}`.

use once_cell::sync::Lazy;
use regex::Regex;

/// First `{{cancellazione|...}}` (or `{{cancella|...}}`) invocation of the
/// page. Whitespace may pad the braces and the template name; the argument
/// list must sit on a single line.
static TEMPLATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{[ \t\n]*(?:[Cc]ancellazione|[Cc]ancella)[ \t\n]*\|(.+?)\}\}")
        .expect("deletion template regex is valid")
});

/// Argument-name stems that carry a theme, bare or suffixed 1 through 4.
const THEME_ARG_STEMS: [&str; 2] = ["arg", "argomento"];

const ARG_TRIM: &[char] = &[' ', '\t', '\n'];

/// Collect the theme tags declared by the subject's deletion template.
///
/// Only the first template occurrence is considered. Arguments are scanned
/// in source order; positional arguments are ignored, duplicates are kept.
pub fn scrape_subject_themes(wikitext: &str) -> Vec<String> {
    let mut themes = Vec::new();

    let caps = match TEMPLATE_RE.captures(wikitext) {
        Some(caps) => caps,
        None => return themes,
    };

    for argument in caps[1].split('|') {
        let (key, value) = match argument.split_once('=') {
            Some(pair) => pair,
            None => continue,
        };
        let key = key.trim_matches(ARG_TRIM);
        let value = value.trim_matches(ARG_TRIM);
        if is_theme_key(key) {
            themes.push(value.to_string());
        }
    }

    themes
}

fn is_theme_key(key: &str) -> bool {
    for stem in THEME_ARG_STEMS {
        if key == stem {
            return true;
        }
        if let Some(suffix) = key.strip_prefix(stem) {
            if matches!(suffix, "1" | "2" | "3" | "4") {
                return true;
            }
        }
    }
    false
}
