//! City name validation and normalization for the search surface

/// Collapse runs of whitespace to single spaces and trim the ends.
pub fn normalize_city(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Accept letters (ASCII plus the U+00C0..=U+00FF accented range),
/// whitespace, hyphens, periods, and apostrophes.
fn is_allowed_char(c: char) -> bool {
    c.is_ascii_alphabetic()
        || ('\u{00C0}'..='\u{00FF}').contains(&c)
        || c.is_whitespace()
        || matches!(c, '-' | '.' | '\'')
}

/// Whether a submitted city name passes the permissive place-name check.
///
/// This intentionally does no place resolution; the upstream API decides
/// whether the name exists.
pub fn is_valid_city_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(is_allowed_char)
}
