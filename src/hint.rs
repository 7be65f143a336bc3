//! Context hint derivation from image filenames.
//!
//! Stock photo exports tend to carry their subject in the filename
//! (`beach_sunset_042.jpg`), so the tokens that are not serial numbers or
//! separator filler make a useful hint for the annotation service.

/// Token inserted by some export tools between filename parts; carries no
/// descriptive content.
const FILLER_TOKEN: &str = "g";

/// Derives a natural-language hint from a filename.
///
/// The extension (everything after the first `.`) is stripped, the stem is
/// split on `_`, and tokens that are purely numeric or equal to the filler
/// token are dropped. Surviving tokens are joined with single spaces. An
/// empty result is valid and is passed through as empty context.
pub fn derive_hint(filename: &str) -> String {
    let stem = filename.split('.').next().unwrap_or(filename);
    stem.split('_')
        .filter(|token| *token != FILLER_TOKEN && !is_numeric(token))
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_numeric(token: &str) -> bool {
    !token.is_empty() && token.chars().all(|c| c.is_numeric())
}
