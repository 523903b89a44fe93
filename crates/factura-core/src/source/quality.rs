//! Plausibility check for embedded page text.

/// Punctuation that shows up in legitimate invoice text.
const INVOICE_PUNCTUATION: &str = ".:,-/$%()";

/// Share of characters that are alphanumeric, whitespace or invoice punctuation.
pub fn plausible_ratio(text: &str) -> f32 {
    let total = text.chars().count();
    if total == 0 {
        return 0.0;
    }

    let plausible = text
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || INVOICE_PUNCTUATION.contains(*c))
        .count();

    plausible as f32 / total as f32
}

/// True when at least `min_ratio` of the text looks like real characters.
///
/// Broken font encodings in scanned or flattened PDFs produce strings of
/// symbols and control characters; those fail here and go to OCR instead.
pub fn is_text_valid(text: &str, min_ratio: f32) -> bool {
    !text.is_empty() && plausible_ratio(text) >= min_ratio
}
