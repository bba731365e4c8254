//! Presentation-only rendering of combos with symbolic glyphs.

/// Map a single combo token to its display glyph.
///
/// Modifier and arrow tokens map to symbols; anything else is returned as-is.
pub fn glyph_for_token(token: &str) -> &str {
    match token {
        "SHIFT" => "⇧",
        "CTRL" => "⌃",
        "ALT" => "⌥",
        "CMD" => "⌘",
        "UP" => "↑",
        "DOWN" => "↓",
        "LEFT" => "←",
        "RIGHT" => "→",
        other => other,
    }
}

/// Render a combo string for display, e.g. `ALT+X` becomes `⌥X`.
///
/// Tokens are matched after upper-casing and trimming; the input is not
/// validated, so stored combos from older files still render.
pub fn display_glyphs(combo: &str) -> String {
    combo
        .split('+')
        .map(|t| t.trim().to_ascii_uppercase())
        .filter(|t| !t.is_empty())
        .map(|t| glyph_for_token(&t).to_string())
        .collect()
}
