//! keycombo: the textual key-combo grammar used for global hotkey registration.
//!
//! - `Modifier`: the four modifier tokens `CTRL`, `ALT`, `SHIFT`, `CMD`.
//! - `Key`: a validated, canonical non-modifier key token.
//! - `Combo`: modifiers plus a single key, parsed from `ALT+X` style strings.
//! - `display_glyphs`: presentation-only rendering with symbolic glyphs.
//!
//! The canonical string form (`Combo::to_string`) is what gets stored and
//! registered with the host. Glyph strings are never fed back into parsing.

mod combo;
mod error;
mod glyph;
mod key;
mod modifier;

pub use combo::Combo;
pub use error::{Error, Result};
pub use glyph::{display_glyphs, glyph_for_token};
pub use key::Key;
pub use modifier::Modifier;
