//! Small string helpers shared across the resolution modules (spec §4.2, §4.5).

/// Uppercases the first ASCII character, leaves the rest untouched.
pub fn init_cap(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

/// The last dot-separated segment of a dotted path.
pub fn last_dot_segment(path: &str) -> &str {
    path.rsplit('.').next().unwrap_or(path)
}

/// Strips the trailing `[x]` from the last dot-segment of an `id`, yielding
/// the FSH "base name" used to infer narrowed choice-element names (spec §4.3
/// step 3, §4.5 `__name` computation).
pub fn base_name_of(id: &str) -> &str {
    let last = last_dot_segment(id);
    last.strip_suffix("[x]").unwrap_or(last)
}
