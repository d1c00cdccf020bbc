// Logic to resolve a leaf slide at a reveal step into a ResolvedFrame

use std::path::{Path, PathBuf};

use log::warn;

use super::highlight::highlight;
use super::resolved::{ResolvedBlock, ResolvedDeck, ResolvedFrame, TextSpan};
use super::types::{
    parse_color, FontStyle, FontWeight, RenderColor, RenderDimensions, TextAlign,
    TextPosition, Theme,
};
use crate::config::Config;
use crate::content::{ContentNode, Deck, HeadingLevel, LeafSlide, Proportion};
use crate::error::Result;
use crate::nav::Position;

/// Configuration for frame resolution
#[derive(Debug, Clone)]
pub struct ResolveConfig {
    pub dimensions: RenderDimensions,
    pub theme: Theme,
    pub base_font_size: f32,
    pub code_scale: f32,
    pub asset_dir: PathBuf,
}

impl Default for ResolveConfig {
    fn default() -> Self {
        Self {
            dimensions: RenderDimensions::default(),
            theme: Theme::default(),
            base_font_size: 32.0,
            code_scale: 0.55,
            asset_dir: PathBuf::from("assets"),
        }
    }
}

impl ResolveConfig {
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            dimensions: config.dimensions(),
            theme: config.theme()?,
            base_font_size: config.text.base_font_size,
            code_scale: config.text.code_scale,
            asset_dir: config.asset_dir()?,
        })
    }
}

/// Which frames `resolve_deck` produces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameSelection {
    /// Each leaf slide once, fully revealed
    FullyRevealed,
    /// Each leaf slide once per reveal step
    EachStep,
}

/// Resolve every leaf slide of a deck, in navigation order
pub fn resolve_deck(deck: &Deck, config: &ResolveConfig, selection: FrameSelection) -> ResolvedDeck {
    let mut frames = Vec::new();
    for (h, v, leaf) in deck.leaves() {
        let total = leaf.fragment_count();
        let steps = match selection {
            FrameSelection::FullyRevealed => total..=total,
            FrameSelection::EachStep => 0..=total,
        };
        for step in steps {
            let options = deck.effective_options(h, v);
            frames.push(resolve_slide(leaf, Position { h, v, step }, &options, config));
        }
    }
    ResolvedDeck { frames }
}

/// Resolve the leaf at `position`, or `None` if the deck has no such leaf
pub fn resolve_frame(deck: &Deck, position: Position, config: &ResolveConfig) -> Option<ResolvedFrame> {
    let leaf = deck.leaf(position.h, position.v)?;
    let options = deck.effective_options(position.h, position.v);
    Some(resolve_slide(leaf, position, &options, config))
}

/// Resolve a single slide with its effective options
pub fn resolve_slide(
    slide: &LeafSlide,
    position: Position,
    options: &[String],
    config: &ResolveConfig,
) -> ResolvedFrame {
    let fragment_total = slide.fragment_count();
    let visible = slide.visible(position.step.min(fragment_total));

    let mut blocks = Vec::new();
    resolve_nodes(&visible, 0, config, &mut blocks);

    ResolvedFrame {
        position,
        fragment_total,
        background: get_background_color(options).unwrap_or(config.theme.background),
        text_position: get_text_position(options),
        text_align: get_text_align(options),
        dimensions: config.dimensions,
        blocks,
    }
}

fn resolve_nodes(nodes: &[ContentNode], indent: usize, config: &ResolveConfig, out: &mut Vec<ResolvedBlock>) {
    let theme = &config.theme;
    for node in nodes {
        match node {
            ContentNode::Heading { level, text } => {
                let mut span = TextSpan::new(text);
                span.font_size = config.base_font_size * heading_scale(*level);
                span.weight = FontWeight::Bold;
                span.color = theme.heading;
                out.push(ResolvedBlock::Text {
                    spans: vec![span],
                    indent,
                });
            }
            ContentNode::Paragraph(text) => {
                out.push(ResolvedBlock::Text {
                    spans: vec![body_span(text, config)],
                    indent,
                });
            }
            ContentNode::BlockQuote(text) => {
                let mut span = body_span(format!("\u{201c}{}\u{201d}", text), config);
                span.style = FontStyle::Italic;
                out.push(ResolvedBlock::Text {
                    spans: vec![span],
                    indent: indent + 1,
                });
            }
            ContentNode::List(items) => resolve_nodes(items, indent, config, out),
            ContentNode::ListItem { text, children } => {
                let mut bullet = body_span("\u{2022} ", config);
                bullet.color = theme.accent;
                out.push(ResolvedBlock::Text {
                    spans: vec![bullet, body_span(text, config)],
                    indent,
                });
                resolve_nodes(children, indent + 1, config, out);
            }
            ContentNode::CodeBlock { lang, code } => {
                let lines = highlight(code, lang.as_deref(), &theme.syntax, theme.code_foreground);
                out.push(ResolvedBlock::Code {
                    lang: lang.clone(),
                    font_size: code_font_size(lines.len(), config),
                    lines,
                    background: theme.code_background,
                });
            }
            ContentNode::Image { src, width } => {
                let path = resolve_asset(&config.asset_dir, src);
                let exists = path.exists();
                if !exists {
                    warn!("Image {} not found at {}", src, path.display());
                }
                out.push(ResolvedBlock::Image {
                    src: src.clone(),
                    path,
                    width: image_width(*width, &config.dimensions),
                    proportion: width.map(Proportion::fraction),
                    exists,
                });
            }
            // Already unwrapped or dropped by `LeafSlide::visible`
            ContentNode::Fragment(children) => resolve_nodes(children, indent, config, out),
            ContentNode::Note(_) => {}
        }
    }
}

fn body_span(text: impl Into<String>, config: &ResolveConfig) -> TextSpan {
    let mut span = TextSpan::new(text);
    span.font_size = config.base_font_size;
    span.color = config.theme.foreground;
    span
}

/// Heading size relative to body text
pub fn heading_scale(level: HeadingLevel) -> f32 {
    match level.get() {
        1 => 2.5,
        2 => 2.0,
        3 => 1.6,
        4 => 1.3,
        5 => 1.1,
        _ => 1.0,
    }
}

/// Code shrinks so long listings still fit the content height
fn code_font_size(line_count: usize, config: &ResolveConfig) -> f32 {
    let preferred = config.base_font_size * config.code_scale;
    let fitting = config.dimensions.content_height() * 0.8 / (line_count.max(1) as f32 * 1.2);
    preferred.min(fitting).max(6.0)
}

/// Width in pixels for an image; a proportion is taken of the content width
/// and never depends on the image's own pixel size
pub fn image_width(width: Option<Proportion>, dimensions: &RenderDimensions) -> Option<f32> {
    width.map(|p| p.of(dimensions.content_width()))
}

pub fn resolve_asset(asset_dir: &Path, src: &str) -> PathBuf {
    asset_dir.join(src)
}

/// Get the background color from options (e.g., [black], [white], [red])
pub fn get_background_color(options: &[String]) -> Option<RenderColor> {
    options.iter().find_map(|option| parse_color(option))
}

/// Get the text position from options
pub fn get_text_position(options: &[String]) -> TextPosition {
    for option in options {
        match option.as_str() {
            "center" => return TextPosition::Center,
            "top" => return TextPosition::Top,
            "bottom" => return TextPosition::Bottom,
            _ => continue,
        }
    }
    TextPosition::Center
}

/// Get the text alignment from options
pub fn get_text_align(options: &[String]) -> TextAlign {
    for option in options {
        if let Some(value) = option.strip_prefix("text-align=") {
            return match value {
                "left" => TextAlign::Left,
                "center" => TextAlign::Center,
                "right" => TextAlign::Right,
                _ => TextAlign::Left,
            };
        }
    }
    TextAlign::Left
}
