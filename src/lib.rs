//! Slide deck for the talk "Using Rust for Android Development".
//!
//! The deck is written in a small pinpoint-style text format (see
//! [`parser`]), navigated reveal.js style (see [`nav`]) and rendered either
//! in a Bevy window or to PDF (see [`render`]).

pub mod config;
pub mod content;
pub mod error;
pub mod nav;
pub mod parser;
pub mod render;
pub mod talk;

pub use config::Config;
pub use content::{ContentNode, Deck, Group, LeafSlide, Slide};
pub use error::{Error, Result};
pub use nav::{Move, Navigator, Position};
pub use parser::parse_deck;
