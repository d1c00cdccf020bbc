// The "Using Rust for Android Development" deck, compiled into the binary

use crate::content::Deck;
use crate::error::Result;
use crate::parser::parse_deck;

pub const SOURCE: &str = include_str!("../decks/rust_android.deck");

/// Image assets referenced by the deck, resolved against the asset directory
pub const ASSETS: &[&str] = &[
    "jni.svg",
    "rust_plugin.png",
    "new_project.png",
    "docx_app.jpg",
    "docx_preview.jpg",
    "floui.png",
    "opengl_droidcon.jpg",
];

pub fn deck() -> Result<Deck> {
    parse_deck(SOURCE)
}
