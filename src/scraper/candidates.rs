//! Syntactic pre-extraction of endpoint and authentication hints.
//!
//! Everything here is over-inclusive and never fails; the signals only feed
//! the analysis prompt and are never returned as results.

use crate::models::{AuthSignal, CandidateSignals, EndpointSignal, HttpMethod, RawDocument};
use crate::scraper::text::{context_window, truncate_chars};
use lazy_static::lazy_static;
use regex::Regex;

/// Authentication vocabulary searched for in page text.
pub const AUTH_TERMS: [&str; 8] = [
    "authentication",
    "authorization",
    "api key",
    "bearer token",
    "oauth",
    "basic auth",
    "jwt",
    "access token",
];

const ENDPOINT_CONTEXT_CHARS: usize = 100;
const AUTH_CONTEXT_BEFORE: usize = 100;
const AUTH_CONTEXT_AFTER: usize = 200;
const TABLE_MARKUP_CHARS: usize = 1000;

lazy_static! {
    /// `<VERB> <PATH>` where PATH is made of word chars, slashes and `{param}` braces.
    pub static ref VERB_PATH: Regex =
        Regex::new(r"\b(GET|POST|PUT|DELETE|PATCH)\s+(/[\w/{}]+)").unwrap();

    static ref AUTH_PATTERNS: Vec<(&'static str, Regex)> = AUTH_TERMS
        .iter()
        .map(|term| {
            let pattern = format!(r"(?i)\b{}\b", regex::escape(term));
            (*term, Regex::new(&pattern).unwrap())
        })
        .collect();
}

/// Scan a document for every endpoint and authentication hint.
pub fn extract_candidates(doc: &RawDocument) -> CandidateSignals {
    let mut endpoints = inline_endpoint_signals(&doc.full_text);
    endpoints.extend(table_endpoint_signals(doc));
    let auth = auth_signals(&doc.full_text);

    tracing::debug!(
        endpoints = endpoints.len(),
        auth = auth.len(),
        "extracted candidate signals"
    );
    CandidateSignals { endpoints, auth }
}

pub fn inline_endpoint_signals(text: &str) -> Vec<EndpointSignal> {
    VERB_PATH
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let method: HttpMethod = caps[1].parse().ok()?;
            Some(EndpointSignal::Inline {
                method,
                path: caps[2].to_string(),
                raw_context: context_window(
                    text,
                    whole.start(),
                    whole.end(),
                    ENDPOINT_CONTEXT_CHARS,
                    ENDPOINT_CONTEXT_CHARS,
                )
                .to_string(),
            })
        })
        .collect()
}

/// One signal per table row (with at least two cells) whose joined cell
/// text reads like `<VERB> <PATH>`.
pub fn table_endpoint_signals(doc: &RawDocument) -> Vec<EndpointSignal> {
    doc.html_fragments
        .iter()
        .flat_map(|table| &table.rows)
        .filter(|row| row.cells.len() >= 2 && VERB_PATH.is_match(&row.cells.join(" ")))
        .map(|row| EndpointSignal::Table {
            raw_context: truncate_chars(&row.markup, TABLE_MARKUP_CHARS).to_string(),
        })
        .collect()
}

/// Every occurrence of every auth term, ordered by position in the text.
pub fn auth_signals(text: &str) -> Vec<AuthSignal> {
    let mut hits: Vec<(usize, AuthSignal)> = AUTH_PATTERNS
        .iter()
        .flat_map(|(term, pattern)| {
            pattern.find_iter(text).map(move |m| {
                let context = context_window(
                    text,
                    m.start(),
                    m.end(),
                    AUTH_CONTEXT_BEFORE,
                    AUTH_CONTEXT_AFTER,
                );
                (
                    m.start(),
                    AuthSignal {
                        term: term.to_string(),
                        context: context.to_string(),
                    },
                )
            })
        })
        .collect();
    hits.sort_by_key(|(position, _)| *position);
    hits.into_iter().map(|(_, signal)| signal).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{HtmlTable, TableRow};

    fn doc(text: &str, tables: Vec<HtmlTable>) -> RawDocument {
        RawDocument {
            url: "https://docs.example.com".to_string(),
            full_text: text.to_string(),
            html_fragments: tables,
            fetched_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_user_lookup_sentence() {
        let signals = extract_candidates(&doc(
            "Use GET /users/{id} to fetch a user. Authentication: Bearer Token required.",
            vec![],
        ));

        assert_eq!(signals.endpoints.len(), 1);
        match &signals.endpoints[0] {
            EndpointSignal::Inline { method, path, .. } => {
                assert_eq!(*method, HttpMethod::Get);
                assert_eq!(path, "/users/{id}");
            }
            other => panic!("unexpected signal: {other:?}"),
        }

        let bearer: Vec<_> = signals
            .auth
            .iter()
            .filter(|s| s.term == "bearer token")
            .collect();
        assert_eq!(bearer.len(), 1);
        assert!(bearer[0].context.contains("Bearer Token required"));
    }

    #[test]
    fn test_endpoint_context_is_bounded() {
        let text = format!("{} POST /orders {}", "x".repeat(300), "y".repeat(300));
        let signals = inline_endpoint_signals(&text);
        let EndpointSignal::Inline { raw_context, .. } = &signals[0] else {
            panic!("expected inline signal");
        };
        assert_eq!(raw_context.len(), 100 + "POST /orders".len() + 100);
    }

    #[test]
    fn test_verb_must_be_a_word() {
        assert!(inline_endpoint_signals("FORGET /this").is_empty());
        assert!(inline_endpoint_signals("get /lowercase").is_empty());
    }

    #[test]
    fn test_repeated_terms_are_not_deduplicated() {
        let signals = auth_signals("Send your API key. Rotate the api KEY yearly.");
        let api_key: Vec<_> = signals.iter().filter(|s| s.term == "api key").collect();
        assert_eq!(api_key.len(), 2);
    }

    #[test]
    fn test_auth_signals_follow_text_order() {
        let signals = auth_signals("JWT first, then OAuth, then authorization.");
        let terms: Vec<_> = signals.iter().map(|s| s.term.as_str()).collect();
        assert_eq!(terms, vec!["jwt", "oauth", "authorization"]);
    }

    #[test]
    fn test_table_rows() {
        let long_markup = format!("<tr><td>DELETE</td><td>/items/{{id}}</td>{}</tr>", "z".repeat(2000));
        let tables = vec![HtmlTable {
            rows: vec![
                TableRow {
                    cells: vec!["Method".into(), "Path".into()],
                    markup: "<tr><th>Method</th><th>Path</th></tr>".into(),
                },
                TableRow {
                    cells: vec!["GET".into(), "/items".into()],
                    markup: "<tr><td>GET</td><td>/items</td></tr>".into(),
                },
                TableRow {
                    cells: vec!["GET /single-cell".into()],
                    markup: "<tr><td>GET /single-cell</td></tr>".into(),
                },
                TableRow {
                    cells: vec!["DELETE".into(), "/items/{id}".into()],
                    markup: long_markup,
                },
            ],
        }];
        let signals = table_endpoint_signals(&doc("", tables));
        assert_eq!(signals.len(), 2);
        assert_eq!(
            signals[0],
            EndpointSignal::Table {
                raw_context: "<tr><td>GET</td><td>/items</td></tr>".into()
            }
        );
        let EndpointSignal::Table { raw_context } = &signals[1] else {
            panic!("expected table signal");
        };
        assert_eq!(raw_context.chars().count(), 1000);
    }

    #[test]
    fn test_empty_document_yields_nothing() {
        assert_eq!(extract_candidates(&doc("", vec![])), CandidateSignals::default());
    }
}
