//! Canonical comparison keys for place names.
//!
//! A key is lowercase ASCII letters and digits only, so spelling variants
//! that differ in case, diacritics, whitespace, or punctuation collapse to
//! the same key.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Letters that survive canonical decomposition without an ASCII base.
const TRANSLITERATIONS: &[(char, &str)] = &[
    ('ß', "ss"),
    ('æ', "ae"),
    ('œ', "oe"),
    ('ø', "o"),
    ('đ', "d"),
    ('ð', "d"),
    ('þ', "th"),
    ('ł', "l"),
    ('ı', "i"),
    ('ħ', "h"),
    ('ŧ', "t"),
    ('ŀ', "l"),
    ('ĸ', "k"),
    ('ŋ', "n"),
];

/// Maps an arbitrary place name to its canonical comparison key.
///
/// Trims, lowercases with full Unicode case mapping, strips diacritics, and
/// keeps only `[a-z0-9]`. Characters with no ASCII transliteration are
/// dropped. The result may be empty, which is still a valid key.
///
/// ```
/// use ibgematch::normalize::normalize;
///
/// assert_eq!(normalize("São Paulo"), "saopaulo");
/// assert_eq!(normalize("  Rio de Janeiro "), "riodejaneiro");
/// assert_eq!(normalize("Santa Bárbara d'Oeste"), "santabarbaradoeste");
/// ```
pub fn normalize(s: &str) -> String {
    let lowered = s.trim().to_lowercase();
    transliterate(&lowered)
        .chars()
        .map(|c| c.to_ascii_lowercase())
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .collect()
}

/// Rewrites `s` into a diacritic-free form.
///
/// Compatibility decomposition splits accented letters into a base letter
/// plus combining marks; the marks are dropped. Remaining non-ASCII letters
/// go through a small table, and anything else is passed through for the
/// caller's filter to discard.
fn transliterate(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.nfkd() {
        if c.is_ascii() {
            out.push(c);
        } else if is_combining_mark(c) {
            continue;
        } else if let Some((_, ascii)) = TRANSLITERATIONS.iter().find(|(from, _)| *from == c) {
            out.push_str(ascii);
        } else {
            out.push(c);
        }
    }
    out
}
