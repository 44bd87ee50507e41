//! Best-effort extraction of a JSON object from free-form model output.
//!
//! Tried in order: a fenced `json` code block, the widest `{...}` span, then
//! the first balanced object that parses. Failure is a value, not an error.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

/// Outcome of an extraction attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    /// A JSON object was recovered.
    Found(Value),
    /// The text carries no parseable object.
    NotFound,
}

impl Extraction {
    /// The recovered object, if any.
    #[must_use]
    pub const fn value(&self) -> Option<&Value> {
        match self {
            Self::Found(value) => Some(value),
            Self::NotFound => None,
        }
    }
}

#[allow(clippy::expect_used)] // Patterns are compile-time constants
fn fenced_block() -> &'static Regex {
    static FENCED: OnceLock<Regex> = OnceLock::new();
    FENCED.get_or_init(|| {
        Regex::new(r"(?is)```json\s*(.*?)```").expect("fenced block pattern is valid")
    })
}

#[allow(clippy::expect_used)] // Patterns are compile-time constants
fn greedy_object() -> &'static Regex {
    static GREEDY: OnceLock<Regex> = OnceLock::new();
    GREEDY.get_or_init(|| Regex::new(r"(?s)\{.*\}").expect("object span pattern is valid"))
}

/// Recover the first JSON object embedded in `text`.
#[must_use]
pub fn extract_json(text: &str) -> Extraction {
    let fenced = fenced_block()
        .captures_iter(text)
        .filter_map(|c| c.get(1))
        .find_map(|m| parse_object(m.as_str()));

    fenced
        .or_else(|| {
            greedy_object()
                .find(text)
                .and_then(|m| parse_object(m.as_str()))
        })
        .or_else(|| first_balanced_object(text))
        .map_or(Extraction::NotFound, Extraction::Found)
}

fn parse_object(candidate: &str) -> Option<Value> {
    serde_json::from_str::<Value>(candidate.trim())
        .ok()
        .filter(Value::is_object)
}

/// Single pass over `text` keeping the offsets of unclosed braces.
///
/// Each span is tried when its `}` arrives. Among spans that parse, the one
/// opened earliest wins, so an enclosing object beats the objects nested in
/// it. Quotes only count inside an open brace.
fn first_balanced_object(text: &str) -> Option<Value> {
    let mut open: Vec<usize> = Vec::new();
    let mut best: Option<(usize, Value)> = None;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' if !open.is_empty() => in_string = true,
            '{' => open.push(i),
            '}' => {
                let Some(start) = open.pop() else {
                    continue;
                };
                let earlier = best.as_ref().is_none_or(|(found, _)| start < *found);
                if let Some(value) = earlier.then(|| parse_object(&text[start..=i])).flatten() {
                    best = Some((start, value));
                }
                if open.is_empty() && best.is_some() {
                    break;
                }
            }
            _ => {}
        }
    }
    best.map(|(_, value)| value)
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;
    use serde_json::json;

    #[test]
    fn fenced_block_wins() {
        let text = "Voici {pas du json}\n```json\n{\"score\": 7}\n```\nFin {\"score\": 1}";
        assert_eq!(extract_json(text), Extraction::Found(json!({"score": 7})));
    }

    #[test]
    fn greedy_span_without_fence() {
        let text = "Analyse : {\"risk\": \"low\", \"tags\": [\"tech\"]} merci";
        assert_eq!(
            extract_json(text),
            Extraction::Found(json!({"risk": "low", "tags": ["tech"]}))
        );
    }

    #[test]
    fn first_balanced_object_when_greedy_span_is_invalid() {
        let text = "{\"a\": 1} puis {\"b\": \"}\"} et {cassé";
        assert_eq!(extract_json(text), Extraction::Found(json!({"a": 1})));
    }

    #[test]
    fn braces_inside_strings_are_ignored() {
        let text = "x {\"note\": \"{not a brace}\", \"n\": 2} et }";
        assert_eq!(
            extract_json(text),
            Extraction::Found(json!({"note": "{not a brace}", "n": 2}))
        );
    }

    #[test]
    fn object_after_unclosed_brace() {
        let text = "Note {brouillon {\"score\": 3} fin";
        assert_eq!(extract_json(text), Extraction::Found(json!({"score": 3})));
    }

    #[test]
    fn enclosing_object_beats_nested_one() {
        let text = "{\"outer\": {\"inner\": 1}} puis }{";
        assert_eq!(
            extract_json(text),
            Extraction::Found(json!({"outer": {"inner": 1}}))
        );
    }

    #[test]
    fn long_run_of_unclosed_braces_stays_linear() {
        let started = Instant::now();
        assert_eq!(extract_json(&"{".repeat(200_000)), Extraction::NotFound);

        let trailing = format!("{}{{\"ok\": true}}", "{".repeat(200_000));
        assert_eq!(extract_json(&trailing), Extraction::Found(json!({"ok": true})));

        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[test]
    fn plain_text_is_not_found() {
        let extraction = extract_json("Aucune donnée structurée ici.");
        assert_eq!(extraction, Extraction::NotFound);
        assert!(extraction.value().is_none());
    }

    #[test]
    fn arrays_are_not_objects() {
        assert_eq!(extract_json("```json\n[1, 2]\n```"), Extraction::NotFound);
    }
}
