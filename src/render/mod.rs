// Render module - abstraction layer for multiple rendering backends

pub mod types;
pub mod resolved;
pub mod highlight;
pub mod resolver;
pub mod presenter;
pub mod bevy;
pub mod pdf;

// Re-export commonly used types
pub use presenter::PresenterView;
pub use resolved::{CodeToken, ResolvedBlock, ResolvedDeck, ResolvedFrame};
pub use resolver::{resolve_deck, resolve_frame, FrameSelection, ResolveConfig};
