// Error types for building, loading and exporting decks

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Deck source text did not match the grammar
    #[error("parse error on line {line}: {message}")]
    Parse { line: usize, message: String },

    /// A top-level slide has both body content and `---` sub-slides
    #[error("line {line}: a slide with sub-slides cannot have content of its own")]
    MixedSlide { line: usize },

    #[error("line {line}: sub-slide `---` appears before any top-level slide")]
    OrphanSubSlide { line: usize },

    #[error("line {line}: unclosed {kind}")]
    Unclosed { kind: &'static str, line: usize },

    #[error("heading level {0} is outside 1..=6")]
    InvalidHeadingLevel(u8),

    #[error("invalid image width {0:?}, expected a percentage such as \"50%\"")]
    InvalidWidth(String),

    #[error("invalid color {0:?}")]
    InvalidColor(String),

    #[error("deck has no slides")]
    EmptyDeck,

    #[error("group slide {index} has no sub-slides")]
    EmptyGroup { index: usize },

    #[error("IO error at {path:?}: {source}")]
    Io {
        source: std::io::Error,
        path: PathBuf,
    },

    #[error("configuration error in {path:?}: {source}")]
    Config {
        source: toml::de::Error,
        path: PathBuf,
    },

    #[error("PDF error: {0}")]
    Pdf(String),
}

impl Error {
    pub fn io(source: std::io::Error, path: impl Into<PathBuf>) -> Self {
        Error::Io {
            source,
            path: path.into(),
        }
    }

    /// Line the error points at, for errors that come from deck source text
    pub fn line(&self) -> Option<usize> {
        match self {
            Error::Parse { line, .. }
            | Error::MixedSlide { line }
            | Error::OrphanSubSlide { line }
            | Error::Unclosed { line, .. } => Some(*line),
            _ => None,
        }
    }
}
