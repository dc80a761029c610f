//! Fixed note colour palette.
//!
//! The palette is a closed set of 13 named colours mapped to `rgb(r,g,b)`
//! strings. Names resolve case-insensitively; anything outside the set is
//! rejected with [`Error::InvalidColour`] at the call site.

use crate::error::{Error, Result};

/// Colour a note carries until explicitly recoloured.
pub const DEFAULT_COLOUR: &str = "rgb(255,255,255)";

/// The closed name → RGB mapping.
pub const PALETTE: [(&str, &str); 13] = [
    ("green", "rgb(0,255,0)"),
    ("red", "rgb(255,0,0)"),
    ("blue", "rgb(0,0,255)"),
    ("yellow", "rgb(255,255,0)"),
    ("grey", "rgb(128,128,128)"),
    ("purple", "rgb(128,0,128)"),
    ("brown", "rgb(165,42,42)"),
    ("orange", "rgb(255,165,0)"),
    ("pink", "rgb(255,192,203)"),
    ("black", "rgb(0,0,0)"),
    ("silver", "rgb(192,192,192)"),
    ("teal", "rgb(0,128,128)"),
    ("white", "rgb(255,255,255)"),
];

/// Resolve a colour name to its stored RGB value.
pub fn resolve_colour(name: &str) -> Result<&'static str> {
    let wanted = name.trim().to_lowercase();
    PALETTE
        .iter()
        .find(|(n, _)| *n == wanted)
        .map(|(_, rgb)| *rgb)
        .ok_or_else(|| Error::InvalidColour(name.to_string()))
}

/// All valid colour names, in palette order.
pub fn colour_names() -> impl Iterator<Item = &'static str> {
    PALETTE.iter().map(|(n, _)| *n)
}
