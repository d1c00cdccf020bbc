// Syntax highlighting of code blocks into colored tokens

use std::sync::OnceLock;

use log::warn;
use syntect::easy::HighlightLines;
use syntect::highlighting::{Color as SyntectColor, ThemeSet};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

use super::resolved::CodeToken;
use super::types::RenderColor;

/// Bundled syntect theme used unless the config names another
pub const DEFAULT_SYNTAX_THEME: &str = "base16-eighties.dark";

fn syntaxes() -> &'static SyntaxSet {
    static SYNTAXES: OnceLock<SyntaxSet> = OnceLock::new();
    SYNTAXES.get_or_init(SyntaxSet::load_defaults_newlines)
}

fn themes() -> &'static ThemeSet {
    static THEMES: OnceLock<ThemeSet> = OnceLock::new();
    THEMES.get_or_init(ThemeSet::load_defaults)
}

/// Names of the bundled themes
pub fn theme_names() -> impl Iterator<Item = &'static str> {
    themes().themes.keys().map(String::as_str)
}

// The bundled syntaxes have no Kotlin; Java's grammar covers most of it
fn syntax_for(lang: &str) -> Option<&'static SyntaxReference> {
    let token = match lang.to_lowercase().as_str() {
        "kotlin" | "kt" => "java".to_string(),
        "shell" | "sh" | "console" => "bash".to_string(),
        other => other.to_string(),
    };
    syntaxes().find_syntax_by_token(&token)
}

fn color_of(color: SyntectColor) -> RenderColor {
    RenderColor::new(
        color.r as f32 / 255.0,
        color.g as f32 / 255.0,
        color.b as f32 / 255.0,
        color.a as f32 / 255.0,
    )
}

fn token(text: &str, color: RenderColor) -> Option<CodeToken> {
    let text = text.trim_end_matches(['\n', '\r']);
    (!text.is_empty()).then(|| CodeToken {
        text: text.to_string(),
        color,
    })
}

/// Every line in `plain`, one token per line
pub fn plain(code: &str, color: RenderColor) -> Vec<Vec<CodeToken>> {
    code.lines()
        .map(|line| token(line, color).into_iter().collect())
        .collect()
}

/// Split `code` into colored tokens per line.
///
/// Unknown languages, a missing tag or an unknown theme fall back to
/// `fallback` for the whole block. Token text joined per line is always the
/// original line.
pub fn highlight(
    code: &str,
    lang: Option<&str>,
    theme_name: &str,
    fallback: RenderColor,
) -> Vec<Vec<CodeToken>> {
    let Some(syntax) = lang.and_then(syntax_for) else {
        return plain(code, fallback);
    };
    let Some(theme) = themes().themes.get(theme_name) else {
        warn!("Unknown syntax theme {:?}, code is not highlighted", theme_name);
        return plain(code, fallback);
    };

    let mut highlighter = HighlightLines::new(syntax, theme);
    let mut lines = Vec::new();
    for line in LinesWithEndings::from(code) {
        match highlighter.highlight_line(line, syntaxes()) {
            Ok(ranges) => lines.push(
                ranges
                    .into_iter()
                    .filter_map(|(style, text)| token(text, color_of(style.foreground)))
                    .collect(),
            ),
            Err(e) => {
                warn!("Highlighting failed: {}", e);
                return plain(code, fallback);
            }
        }
    }
    lines
}
