// Resolved slide structures - fully processed and ready for rendering

use std::path::PathBuf;

use super::types::{
    FontStyle, FontWeight, RenderColor, RenderDimensions, TextAlign, TextPosition,
};
use crate::nav::Position;

/// A span of text with styling information
#[derive(Debug, Clone, PartialEq)]
pub struct TextSpan {
    pub text: String,
    pub font_size: f32,
    pub weight: FontWeight,
    pub style: FontStyle,
    pub color: RenderColor,
}

impl TextSpan {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            font_size: 32.0,
            weight: FontWeight::Normal,
            style: FontStyle::Normal,
            color: RenderColor::white(),
        }
    }
}

/// A run of code in one highlight color
#[derive(Debug, Clone, PartialEq)]
pub struct CodeToken {
    pub text: String,
    pub color: RenderColor,
}

/// One laid-out piece of audience-visible content
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedBlock {
    /// Headings, paragraphs, list items and quotes
    Text {
        spans: Vec<TextSpan>,
        /// Nesting depth, used for list indentation
        indent: usize,
    },
    Code {
        lang: Option<String>,
        /// Highlighted tokens, one list per source line
        lines: Vec<Vec<CodeToken>>,
        font_size: f32,
        background: RenderColor,
    },
    Image {
        src: String,
        path: PathBuf,
        /// Rendered width in pixels, `None` for the asset's own size
        width: Option<f32>,
        /// Share of the content width, when the deck gave one
        proportion: Option<f32>,
        exists: bool,
    },
}

impl ResolvedBlock {
    /// Plain text of a text block, for tests and the terminal outline
    pub fn text(&self) -> Option<String> {
        match self {
            ResolvedBlock::Text { spans, .. } => {
                Some(spans.iter().map(|s| s.text.as_str()).collect())
            }
            _ => None,
        }
    }

    /// Source lines of a code block
    pub fn code_lines(&self) -> Option<Vec<String>> {
        match self {
            ResolvedBlock::Code { lines, .. } => Some(
                lines
                    .iter()
                    .map(|tokens| tokens.iter().map(|t| t.text.as_str()).collect())
                    .collect(),
            ),
            _ => None,
        }
    }
}

/// A leaf slide at one reveal step, ready for rendering
#[derive(Debug, Clone)]
pub struct ResolvedFrame {
    pub position: Position,
    pub fragment_total: usize,
    pub background: RenderColor,
    pub text_position: TextPosition,
    pub text_align: TextAlign,
    pub dimensions: RenderDimensions,
    pub blocks: Vec<ResolvedBlock>,
}

impl Default for ResolvedFrame {
    fn default() -> Self {
        Self {
            position: Position::default(),
            fragment_total: 0,
            background: RenderColor::black(),
            text_position: TextPosition::Center,
            text_align: TextAlign::Left,
            dimensions: RenderDimensions::default(),
            blocks: Vec::new(),
        }
    }
}

/// Frames of a whole deck, in navigation order
#[derive(Debug, Clone)]
pub struct ResolvedDeck {
    pub frames: Vec<ResolvedFrame>,
}
