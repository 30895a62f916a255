use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Free-form parameter metadata (type, required, description, ...), keyed
/// by everything except the parameter's own name.
pub type ParamInfo = Map<String, Value>;

/// Canonical parameter shape: parameter name -> metadata. Values are
/// normally [`ParamInfo`] objects; a mapping reported by the model is kept
/// as-is, whatever its values look like.
pub type ParamMap = Map<String, Value>;

/// The five HTTP verbs an extracted endpoint may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl HttpMethod {
    pub const ALL: [HttpMethod; 5] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Delete,
        HttpMethod::Patch,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported HTTP method: {0}")]
pub struct UnsupportedMethod(pub String);

impl FromStr for HttpMethod {
    type Err = UnsupportedMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        HttpMethod::ALL
            .into_iter()
            .find(|m| m.as_str() == upper)
            .ok_or_else(|| UnsupportedMethod(s.to_string()))
    }
}

/// Parameters as the model reported them.
///
/// Models answer with either a list of `{name, ...}` records or a mapping
/// keyed by parameter name. After normalization only `Map` remains.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Parameters {
    Map(ParamMap),
    List(Vec<Value>),
}

impl Default for Parameters {
    fn default() -> Self {
        Parameters::Map(ParamMap::new())
    }
}

impl Parameters {
    /// Resolve an arbitrary JSON value into one of the two known shapes.
    /// Anything that is neither an object nor an array becomes an empty map.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Array(items) => Parameters::List(items),
            Value::Object(entries) => Parameters::Map(entries),
            Value::Null => Parameters::default(),
            other => {
                tracing::debug!(value = %other, "ignoring parameters that are neither a list nor a mapping");
                Parameters::default()
            }
        }
    }

    pub fn as_map(&self) -> Option<&ParamMap> {
        match self {
            Parameters::Map(map) => Some(map),
            Parameters::List(_) => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Parameters::Map(map) => map.is_empty(),
            Parameters::List(items) => items.is_empty(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Endpoint {
    pub path: String,
    pub method: HttpMethod,
    pub description: String,
    #[serde(default)]
    pub parameters: Parameters,
    #[serde(default)]
    pub response_example: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthMethod {
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
}

/// Which decode path produced an [`AnalysisResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseSource {
    /// Decoded from a fenced `json` block.
    FencedBlock,
    /// Recovered line by line from prose.
    Heuristic,
}

/// Parsed output of the documentation analysis call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub raw_model_text: String,
    pub endpoints: Vec<Endpoint>,
    pub auth_methods: Vec<AuthMethod>,
    pub source: ParseSource,
}

/// One row of an HTML table: the text of each cell and the row's markup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableRow {
    pub cells: Vec<String>,
    pub markup: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HtmlTable {
    pub rows: Vec<TableRow>,
}

/// Documentation page reduced to what the extractor needs.
#[derive(Debug, Clone, Serialize)]
pub struct RawDocument {
    pub url: String,
    pub full_text: String,
    pub html_fragments: Vec<HtmlTable>,
    pub fetched_at: chrono::DateTime<chrono::Utc>,
}

/// Syntactic hint that an endpoint is documented somewhere on the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "context_type", rename_all = "snake_case")]
pub enum EndpointSignal {
    Inline {
        method: HttpMethod,
        path: String,
        raw_context: String,
    },
    Table {
        raw_context: String,
    },
}

/// Mention of an authentication keyword with its surrounding text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthSignal {
    pub term: String,
    pub context: String,
}

/// Everything the candidate extractor found; prompt material only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CandidateSignals {
    pub endpoints: Vec<EndpointSignal>,
    pub auth: Vec<AuthSignal>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiRequest {
    pub documentation_url: String,
    pub use_case: String,
    pub preferred_language: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse {
    pub endpoints: Vec<Endpoint>,
    pub auth_methods: Vec<AuthMethod>,
    pub suggested_integration: String,
    pub wrapper_code: String,
    pub env_template: String,
}
