//! Polymorphic (choice-type) matching (spec §4.2).

use std::sync::OnceLock;

use regex::Regex;

use zunder_models::{ElementDefinition, ElementDefinitionType};

use crate::util::init_cap;

/// The outcome of matching a search path against a snapshot's element list.
#[derive(Debug, Clone)]
pub struct MatchResult<'a> {
    pub element: &'a ElementDefinition,
    pub narrowed_type: Option<&'a ElementDefinitionType>,
}

fn bracket_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(.+)\[([^\]]+)\]$").expect("static regex is valid"))
}

/// Locates the element matching `search_path`, narrowing a polymorphic
/// element's type when a canonical-suffix or bracket form is used. Pure; no
/// I/O. Matching rules apply in order, first match wins (spec §4.2, and the
/// tie-break note in §9: a direct match at step 1 always wins because the
/// element list is scanned once, in order).
pub fn match_path<'a>(elements: &'a [ElementDefinition], search_path: &str) -> Option<MatchResult<'a>> {
    let choice_path = format!("{search_path}[x]");
    if let Some(element) = elements
        .iter()
        .find(|e| e.id == search_path || e.id == choice_path)
    {
        return Some(MatchResult {
            element,
            narrowed_type: None,
        });
    }

    for element in elements.iter().filter(|e| e.is_choice_type()) {
        let base = &element.id[..element.id.len() - "[x]".len()];
        if let Some(t) = element
            .types()
            .iter()
            .find(|t| format!("{base}{}", init_cap(&t.code)) == search_path)
        {
            return Some(MatchResult {
                element,
                narrowed_type: Some(t),
            });
        }
    }

    if let Some(caps) = bracket_re().captures(search_path) {
        let outer = &caps[1];
        let inner = &caps[2];
        let choice_id = format!("{outer}[x]");
        if let Some(element) = elements.iter().find(|e| e.id == choice_id) {
            if inner == "x" {
                return Some(MatchResult {
                    element,
                    narrowed_type: None,
                });
            }
            if let Some(t) = element.types().iter().find(|t| {
                inner == init_cap(&t.code) || inner == format!("{outer}{}", init_cap(&t.code))
            }) {
                return Some(MatchResult {
                    element,
                    narrowed_type: Some(t),
                });
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn elem(json: serde_json::Value) -> ElementDefinition {
        serde_json::from_value(json).unwrap()
    }

    fn fixture() -> Vec<ElementDefinition> {
        vec![
            elem(json!({"id": "Extension", "path": "Extension"})),
            elem(json!({
                "id": "Extension.value[x]",
                "path": "Extension.value[x]",
                "type": [
                    {"code": "string"},
                    {"code": "CodeableConcept"},
                    {"code": "canonical"}
                ]
            })),
        ]
    }

    #[test]
    fn direct_match_wins_when_present() {
        let elements = fixture();
        let result = match_path(&elements, "Extension").unwrap();
        assert_eq!(result.element.id, "Extension");
        assert!(result.narrowed_type.is_none());
    }

    #[test]
    fn canonical_suffix_narrows_to_concrete_type() {
        let elements = fixture();
        let result = match_path(&elements, "Extension.valueString").unwrap();
        assert_eq!(result.element.id, "Extension.value[x]");
        assert_eq!(result.narrowed_type.unwrap().code, "string");
    }

    #[test]
    fn bracket_narrowing_matches_capitalized_type_name() {
        let elements = fixture();
        let result = match_path(&elements, "Extension.value[CodeableConcept]").unwrap();
        assert_eq!(result.narrowed_type.unwrap().code, "CodeableConcept");
    }

    #[test]
    fn bracket_x_returns_choice_head_unnarrowed() {
        let elements = fixture();
        let result = match_path(&elements, "Extension.value[x]").unwrap();
        assert!(result.narrowed_type.is_none());
    }

    #[test]
    fn no_match_returns_none() {
        let elements = fixture();
        assert!(match_path(&elements, "Extension.valueBoolean").is_none());
    }
}
