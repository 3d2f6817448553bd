//! Best-effort recovery of a JSON object from a free-form reply.
//!
//! Models without a strict JSON mode routinely wrap their object in
//! explanatory prose or fenced code markers. The recovery strategy is
//! deliberately short: direct parse, then the first ```json fenced
//! block, then a loud failure carrying the raw text. No brace-matching
//! or other guessing - silently accepting a corrupted secret-bearing
//! payload is worse than failing.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Map, Value as JsonValue};

use super::ProviderError;

lazy_static! {
    static ref JSON_FENCE: Regex =
        Regex::new(r"(?s)```json\s*(?P<body>.*?)```").expect("valid fence regex");
}

/// Recover a JSON object from raw completion text.
///
/// Returns [`ProviderError::Parse`] carrying the original text when
/// neither the text itself nor the interior of its first ```json fence
/// parses as a JSON object.
pub fn recover_json(raw: &str) -> Result<Map<String, JsonValue>, ProviderError> {
    if let Some(object) = parse_object(raw.trim()) {
        return Ok(object);
    }

    if let Some(captures) = JSON_FENCE.captures(raw) {
        if let Some(object) = parse_object(captures["body"].trim()) {
            return Ok(object);
        }
    }

    Err(ProviderError::Parse {
        raw: raw.to_string(),
    })
}

/// Parse text as JSON, accepting only top-level objects.
fn parse_object(text: &str) -> Option<Map<String, JsonValue>> {
    match serde_json::from_str::<JsonValue>(text) {
        Ok(JsonValue::Object(map)) => Some(map),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_json_passes_through_unchanged() {
        let raw = r#"{"enigma": "un hombre muerto", "solucion": "era un pez"}"#;
        let object = recover_json(raw).unwrap();
        assert_eq!(object["enigma"], "un hombre muerto");
        assert_eq!(object["solucion"], "era un pez");
    }

    #[test]
    fn leading_and_trailing_whitespace_is_tolerated() {
        let object = recover_json("  \n {\"a\": 1} \n").unwrap();
        assert_eq!(object["a"], 1);
    }

    #[test]
    fn fenced_object_is_extracted() {
        let raw = "Aquí tienes el misterio:\n```json\n{\"enigma\": \"x\", \"solucion\": \"y\"}\n```\nEspero que te guste.";
        let object = recover_json(raw).unwrap();
        assert_eq!(object["enigma"], "x");
    }

    #[test]
    fn only_the_first_fence_is_considered() {
        let raw = "```json\n{\"first\": true}\n```\n```json\n{\"second\": true}\n```";
        let object = recover_json(raw).unwrap();
        assert_eq!(object["first"], true);
    }

    #[test]
    fn prose_without_json_fails_with_the_raw_text() {
        let raw = "Lo siento, no puedo generar un misterio ahora mismo.";
        match recover_json(raw) {
            Err(ProviderError::Parse { raw: carried }) => assert_eq!(carried, raw),
            other => panic!("expected Parse error, got {other:?}"),
        }
    }

    #[test]
    fn top_level_non_objects_are_rejected() {
        assert!(recover_json("[1, 2, 3]").is_err());
        assert!(recover_json("\"just a string\"").is_err());
        assert!(recover_json("42").is_err());
    }

    #[test]
    fn malformed_fence_interior_fails_loudly() {
        let raw = "```json\n{\"enigma\": \n```";
        assert!(matches!(
            recover_json(raw),
            Err(ProviderError::Parse { .. })
        ));
    }
}
