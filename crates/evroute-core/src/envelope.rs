//! Unwrapping of pathologically wrapped response bodies.
//!
//! The webhook has returned JSON inside triple quotes, inside a JSON string
//! literal, and with log noise around the top-level array. Each unwrapping
//! yields a new candidate text that the structural decoders are re-run on.

use serde::Serialize;

/// Maximum number of nested unwrappings applied to one body.
pub const MAX_UNWRAP_DEPTH: usize = 3;

const TRIPLE_QUOTE: &str = "\"\"\"";

/// How a candidate text was obtained from the raw body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Envelope {
    Raw,
    TripleQuoted,
    StringLiteral,
    Bracketed,
}

impl Envelope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Envelope::Raw => "raw",
            Envelope::TripleQuoted => "triple_quoted",
            Envelope::StringLiteral => "string_literal",
            Envelope::Bracketed => "bracketed",
        }
    }
}

impl std::fmt::Display for Envelope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One text to attempt decoding on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// The last unwrapping applied to reach this text.
    pub envelope: Envelope,
    pub text: String,
    pub depth: usize,
}

/// True for an empty or whitespace-only body.
pub fn is_blank(raw: &[u8]) -> bool {
    raw.iter().all(u8::is_ascii_whitespace)
}

/// All candidate texts for a body, the raw body first.
///
/// Unwrapping proceeds breadth-first, so every depth-1 candidate precedes any
/// depth-2 candidate. A text already seen is not queued again.
pub fn unwrap_candidates(raw: &[u8]) -> Vec<Candidate> {
    let mut candidates = vec![Candidate {
        envelope: Envelope::Raw,
        text: String::from_utf8_lossy(raw).into_owned(),
        depth: 0,
    }];

    let mut cursor = 0;
    while cursor < candidates.len() {
        let depth = candidates[cursor].depth;
        if depth < MAX_UNWRAP_DEPTH {
            for (envelope, text) in unwrap_once(&candidates[cursor].text) {
                if candidates.iter().any(|seen| seen.text == text) {
                    continue;
                }
                tracing::debug!(%envelope, depth = depth + 1, "unwrapped response body");
                candidates.push(Candidate {
                    envelope,
                    text,
                    depth: depth + 1,
                });
            }
        }
        cursor += 1;
    }

    candidates
}

fn unwrap_once(text: &str) -> Vec<(Envelope, String)> {
    let trimmed = text.trim();
    let mut unwrapped = Vec::new();

    if let Some(inner) = triple_quoted(trimmed) {
        unwrapped.push((Envelope::TripleQuoted, inner.to_string()));
    }
    if let Some(inner) = string_literal(trimmed) {
        unwrapped.push((Envelope::StringLiteral, inner));
    }
    if let Some(inner) = bracketed(trimmed) {
        unwrapped.push((Envelope::Bracketed, inner.to_string()));
    }

    unwrapped
}

fn triple_quoted(trimmed: &str) -> Option<&str> {
    trimmed
        .strip_prefix(TRIPLE_QUOTE)?
        .strip_suffix(TRIPLE_QUOTE)
}

/// Contents of a `"..."` literal: JSON-unescaped when valid, else the quotes are stripped.
fn string_literal(trimmed: &str) -> Option<String> {
    if trimmed.len() < 2 || !trimmed.starts_with('"') || !trimmed.ends_with('"') {
        return None;
    }
    if let Ok(decoded) = serde_json::from_str::<String>(trimmed) {
        return Some(decoded);
    }
    Some(trimmed[1..trimmed.len() - 1].to_string())
}

/// Text between the first `[` and the last `]`, when that differs from the whole.
fn bracketed(trimmed: &str) -> Option<&str> {
    let start = trimmed.find('[')?;
    let end = trimmed.rfind(']')?;
    if start >= end {
        return None;
    }
    let inner = &trimmed[start..=end];
    (inner != trimmed).then_some(inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(raw: &str) -> Vec<(Envelope, String)> {
        unwrap_candidates(raw.as_bytes())
            .into_iter()
            .map(|c| (c.envelope, c.text))
            .collect()
    }

    #[test]
    fn plain_json_has_only_raw_candidate() {
        let candidates = texts(r#"[{"route":{}}]"#);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].0, Envelope::Raw);
    }

    #[test]
    fn triple_quotes_are_stripped() {
        let candidates = texts(r#""""[{"a":1}]""""#);
        assert!(candidates.contains(&(Envelope::TripleQuoted, r#"[{"a":1}]"#.to_string())));
    }

    #[test]
    fn string_literal_is_unescaped() {
        let candidates = texts(r#""{\"route\":{\"distance_km\":1}}""#);
        assert_eq!(
            candidates[1],
            (
                Envelope::StringLiteral,
                r#"{"route":{"distance_km":1}}"#.to_string()
            )
        );
    }

    #[test]
    fn invalid_literal_falls_back_to_stripping_quotes() {
        let candidates = texts("\"{\"a\": 1}\"");
        assert!(candidates.contains(&(Envelope::StringLiteral, "{\"a\": 1}".to_string())));
    }

    #[test]
    fn brackets_are_extracted_from_noise() {
        let candidates = texts(r#"result: [{"a":1}] (ok)"#);
        assert_eq!(
            candidates[1],
            (Envelope::Bracketed, r#"[{"a":1}]"#.to_string())
        );
    }

    #[test]
    fn nested_wrappers_unwrap_in_steps() {
        let candidates = unwrap_candidates(br#""noise [1] noise""#);
        let bracketed = candidates
            .iter()
            .find(|c| c.text == "[1]")
            .unwrap();
        assert_eq!(bracketed.envelope, Envelope::Bracketed);
        assert_eq!(bracketed.depth, 1);

        // The literal's contents are themselves bracket-extracted at depth 2,
        // but the result equals the text above and is not queued again.
        assert_eq!(candidates.iter().filter(|c| c.text == "[1]").count(), 1);
    }

    #[test]
    fn depth_is_bounded() {
        let body = format!("{}[]{}", "\"".repeat(10), "\"".repeat(10));
        let candidates = unwrap_candidates(body.as_bytes());
        assert!(candidates.iter().all(|c| c.depth <= MAX_UNWRAP_DEPTH));
    }

    #[test]
    fn blank_bodies() {
        assert!(is_blank(b""));
        assert!(is_blank(b"  \n\t "));
        assert!(!is_blank(b" [] "));
    }
}
