//! Turns the model's free-form analysis text back into endpoint and
//! authentication records.
//!
//! A fenced ```json block is the primary shape and, when it decodes, wins
//! outright. Otherwise the text is read as prose: `<VERB> <PATH>` lines
//! become endpoints and dash items under an "Authentication Methods:"
//! heading become auth methods. Nothing in here fails; the worst case is an
//! empty result.

use crate::models::{AnalysisResult, AuthMethod, Endpoint, HttpMethod, ParseSource, Parameters};
use crate::scraper::candidates::VERB_PATH;
use crate::scraper::text::truncate_chars;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

lazy_static! {
    static ref JSON_FENCE: Regex = Regex::new(r"(?s)```json\s*(.*?)\s*```").unwrap();
    static ref AUTH_SECTION: Regex =
        Regex::new(r"(?is)Authentication Methods?:\s*(.*?)(?:##|\n[ \t]*\n|\z)").unwrap();
    static ref AUTH_ITEM: Regex = Regex::new(r"(?m)^[ \t]*-[ \t]*([^:\n]+):[ \t]*(.+)$").unwrap();
}

/// Shape of a model response, resolved before any decoding happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape<'a> {
    /// Contents of the first ```json fence.
    Fenced(&'a str),
    /// No fence; only prose heuristics apply.
    Prose,
}

impl<'a> ResponseShape<'a> {
    pub fn classify(text: &'a str) -> Self {
        JSON_FENCE
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map_or(ResponseShape::Prose, |body| ResponseShape::Fenced(body.as_str()))
    }
}

#[derive(Debug, Deserialize)]
struct FencedAnalysis {
    #[serde(default)]
    endpoints: Option<Vec<Value>>,
    #[serde(default)]
    auth_methods: Option<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
struct EndpointRecord {
    path: Option<String>,
    method: Option<String>,
    description: Option<String>,
    parameters: Option<Value>,
    response_example: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct AuthRecord {
    #[serde(rename = "type")]
    kind: Option<String>,
    description: Option<String>,
}

/// Parse an analysis completion. Never fails.
pub fn parse_analysis(text: &str) -> AnalysisResult {
    if let ResponseShape::Fenced(body) = ResponseShape::classify(text) {
        match serde_json::from_str::<FencedAnalysis>(body) {
            Ok(decoded) => {
                let endpoints = decoded
                    .endpoints
                    .unwrap_or_default()
                    .into_iter()
                    .filter_map(endpoint_from_value)
                    .collect();
                let auth_methods = decoded
                    .auth_methods
                    .unwrap_or_default()
                    .into_iter()
                    .filter_map(auth_from_value)
                    .collect();
                return AnalysisResult {
                    raw_model_text: text.to_string(),
                    endpoints,
                    auth_methods,
                    source: ParseSource::FencedBlock,
                };
            }
            Err(err) => {
                tracing::debug!(
                    error = %err,
                    snippet = truncate_chars(body, 100),
                    "fenced block did not decode, falling back to text heuristics"
                );
            }
        }
    } else {
        tracing::debug!("no fenced block in model response, using text heuristics");
    }

    AnalysisResult {
        raw_model_text: text.to_string(),
        endpoints: heuristic_endpoints(text),
        auth_methods: heuristic_auth_methods(text),
        source: ParseSource::Heuristic,
    }
}

fn endpoint_from_value(value: Value) -> Option<Endpoint> {
    let record: EndpointRecord = match serde_json::from_value(value) {
        Ok(record) => record,
        Err(err) => {
            tracing::debug!(error = %err, "dropping malformed endpoint record");
            return None;
        }
    };
    let raw_method = record.method.unwrap_or_default();
    let method: HttpMethod = match raw_method.parse() {
        Ok(method) => method,
        Err(err) => {
            tracing::debug!(error = %err, "dropping endpoint record");
            return None;
        }
    };
    Some(Endpoint {
        path: record.path.unwrap_or_default(),
        method,
        description: record.description.unwrap_or_default(),
        parameters: record
            .parameters
            .map(Parameters::from_value)
            .unwrap_or_default(),
        response_example: record.response_example,
    })
}

fn auth_from_value(value: Value) -> Option<AuthMethod> {
    match serde_json::from_value::<AuthRecord>(value) {
        Ok(record) => Some(AuthMethod {
            kind: record.kind.unwrap_or_default(),
            description: record.description.unwrap_or_default(),
        }),
        Err(err) => {
            tracing::debug!(error = %err, "dropping malformed auth record");
            None
        }
    }
}

fn clean_fragment(raw: &str) -> &str {
    raw.trim_start_matches(|c: char| {
        c.is_whitespace() || matches!(c, '-' | ':' | '*' | '`' | '\u{2013}' | '\u{2014}')
    })
    .trim_end_matches(|c: char| c.is_whitespace() || matches!(c, '*' | '`'))
}

/// One endpoint per `<VERB> <PATH>` occurrence. The description is the rest
/// of the line, or the next non-blank line when the rest is empty.
pub fn heuristic_endpoints(text: &str) -> Vec<Endpoint> {
    let lines: Vec<&str> = text.lines().collect();
    let mut endpoints = Vec::new();

    for (idx, line) in lines.iter().enumerate() {
        let matches: Vec<_> = VERB_PATH.captures_iter(line).collect();
        for (n, caps) in matches.iter().enumerate() {
            let (Some(whole), Ok(method)) = (caps.get(0), caps[1].parse::<HttpMethod>()) else {
                continue;
            };
            let tail_end = matches
                .get(n + 1)
                .and_then(|next| next.get(0))
                .map_or(line.len(), |m| m.start());

            let mut description = clean_fragment(&line[whole.end()..tail_end]);
            if description.is_empty() && n + 1 == matches.len() {
                description = lines[idx + 1..]
                    .iter()
                    .find(|l| !l.trim().is_empty())
                    .filter(|l| !VERB_PATH.is_match(l))
                    .map_or("", |l| clean_fragment(l));
            }

            endpoints.push(Endpoint {
                path: caps[2].to_string(),
                method,
                description: description.to_string(),
                parameters: Parameters::default(),
                response_example: None,
            });
        }
    }
    endpoints
}

/// Dash items under the first "Authentication Method(s):" heading.
pub fn heuristic_auth_methods(text: &str) -> Vec<AuthMethod> {
    let Some(section) = AUTH_SECTION.captures(text).and_then(|caps| caps.get(1)) else {
        tracing::debug!("no authentication section in model response");
        return Vec::new();
    };

    AUTH_ITEM
        .captures_iter(section.as_str())
        .filter_map(|caps| {
            let kind = clean_fragment(&caps[1]);
            if kind.is_empty() {
                return None;
            }
            Some(AuthMethod {
                kind: kind.to_string(),
                description: clean_fragment(&caps[2]).to_string(),
            })
        })
        .collect()
}
