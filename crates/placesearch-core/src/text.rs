// crates/placesearch-core/src/text.rs

/// Convert a string into a folded key suitable for indexing and comparison.
///
/// This performs:
/// 1\) Transliterate Unicode → ASCII (e.g. `Åland` -> `Aland`)
/// 2\) Collapse surrounding and repeated whitespace
/// 3\) Normalize to lowercase
///
/// # Examples
///
/// ```rust
/// use placesearch_core::text::fold_key;
///
/// assert_eq!(fold_key("  Côte d'Ivoire "), "cote d'ivoire");
/// assert_eq!(fold_key("TÜRKIYE"), "turkiye");
/// ```
pub fn fold_key(s: &str) -> String {
    let ascii = deunicode::deunicode(s.trim());
    ascii
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
