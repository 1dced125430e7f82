//! FSH path tokenization (spec §4.1).

use std::sync::OnceLock;

use regex::Regex;

/// One raw path segment: a base name and an optional bracketed slice token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSegment {
    pub base: String,
    pub slice: Option<String>,
}

/// Splits a dotted FSH path into segments, treating `.` as a boundary only
/// outside bracket nesting. `"."` (the sentinel for "root, no segments")
/// yields an empty list.
pub fn split_fsh_path(path: &str) -> Vec<String> {
    if path == "." {
        return Vec::new();
    }

    let mut segments = Vec::new();
    let mut current = String::new();
    let mut depth = 0i32;

    for ch in path.chars() {
        match ch {
            '[' => {
                depth += 1;
                current.push(ch);
            }
            ']' => {
                depth -= 1;
                current.push(ch);
            }
            '.' if depth == 0 => {
                segments.push(std::mem::take(&mut current));
            }
            _ => current.push(ch),
        }
    }

    if !current.is_empty() {
        segments.push(current);
    }

    segments
}

fn segment_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([^\[\]:]+)(?:\[(.+?)\])?$").expect("static regex is valid"))
}

/// Parses one raw segment into its base name and optional slice token.
pub fn parse_segment(raw: &str) -> PathSegment {
    match segment_re().captures(raw) {
        Some(caps) => PathSegment {
            base: caps.get(1).map(|m| m.as_str().to_string()).unwrap_or_default(),
            slice: caps.get(2).map(|m| m.as_str().to_string()),
        },
        None => PathSegment {
            base: raw.to_string(),
            slice: None,
        },
    }
}
