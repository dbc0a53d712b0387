//! Utils Module
pub mod text;

pub use text::{preview, truncate_chars, wrap_text};
