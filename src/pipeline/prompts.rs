use crate::models::{AuthMethod, CandidateSignals, Endpoint, RawDocument};
use crate::scraper::text::truncate_chars;
use serde::Serialize;

/// Documentation excerpt included in the analysis prompt.
pub const MAX_PROMPT_TEXT_CHARS: usize = 10_000;

/// Endpoints listed in the integration-suggestion prompt.
pub const MAX_SUGGESTION_ENDPOINTS: usize = 5;

fn to_json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "[]".to_string())
}

/// Ask the model to pick out endpoints and authentication for a use case.
pub fn analysis_prompt(doc: &RawDocument, signals: &CandidateSignals, use_case: &str) -> String {
    format!(
        "I need you to analyze this API documentation and extract important information.\n\n\
        USE CASE: {use_case}\n\n\
        Based on the following extracted text from the API documentation at {url}, please:\n\
        1. Identify the key API endpoints that would be most relevant for the use case\n\
        2. Determine the authentication method(s) used by this API\n\
        3. Return your findings in a structured format\n\n\
        Here's the extracted documentation:\n{text}\n\n\
        Potential endpoints found:\n{endpoints}\n\n\
        Potential authentication methods found:\n{auth}\n\n\
        Respond with a single ```json fenced block containing an object with:\n\
        - endpoints: list of objects with path, method, description, parameters\n\
        - auth_methods: list of objects with type and description",
        url = doc.url,
        text = truncate_chars(&doc.full_text, MAX_PROMPT_TEXT_CHARS),
        endpoints = to_json(&signals.endpoints),
        auth = to_json(&signals.auth),
    )
}

/// Ask the model for a wrapper class in `language`.
pub fn wrapper_prompt(
    endpoints: &[Endpoint],
    auth_methods: &[AuthMethod],
    language: &str,
    use_case: &str,
) -> String {
    format!(
        "Generate a complete, production-ready API wrapper class in {language} based on the following API details:\n\n\
        USE CASE: {use_case}\n\n\
        ENDPOINTS:\n{endpoints}\n\n\
        AUTHENTICATION METHODS:\n{auth}\n\n\
        Requirements for the wrapper:\n\
        1. Should handle authentication automatically\n\
        2. Should have proper error handling\n\
        3. Should be well-documented with comments\n\
        4. Should follow best practices for {language}\n\
        5. Should be designed for the specific use case provided\n\n\
        Please generate only the code, no explanations needed.",
        endpoints = to_json(endpoints),
        auth = to_json(auth_methods),
    )
}

/// Ask the model for a short integration-approach recommendation.
pub fn integration_prompt(
    endpoints: &[Endpoint],
    auth_methods: &[AuthMethod],
    use_case: &str,
    language: &str,
) -> String {
    let endpoint_lines = endpoints
        .iter()
        .take(MAX_SUGGESTION_ENDPOINTS)
        .map(|e| format!("- {} {}: {}", e.method, e.path, e.description))
        .collect::<Vec<_>>()
        .join("\n");
    let auth_lines = auth_methods
        .iter()
        .map(|a| format!("- {}: {}", a.kind, a.description))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Based on the following API details and use case, suggest the best integration approach \
        (REST client, SDK, etc.) for a {language} application:\n\n\
        USE CASE: {use_case}\n\n\
        ENDPOINTS:\n{endpoint_lines}\n\n\
        AUTHENTICATION:\n{auth_lines}\n\n\
        Provide a brief, practical recommendation that considers:\n\
        1. Ease of implementation\n\
        2. Maintainability\n\
        3. Performance\n\
        4. Error handling\n\
        5. Any existing libraries that might help"
    )
}
