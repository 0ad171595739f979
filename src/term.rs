use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // 초 / 중 / 고 = elementary / middle / high school, then grade and half-year.
    static ref TERM_REGEX: Regex = Regex::new(r"(초|중|고)\d-\d").unwrap();
}

/// Derive the term label from a free-text unit name
///
/// Returns the first `<level><grade>-<half>` match verbatim, e.g. `"초5-2"` for
/// `"초5-2 분수의 곱셈"`. A unit name without the pattern yields an empty string.
pub fn extract_term(unit_name: &str) -> String {
    TERM_REGEX
        .find(unit_name)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}
