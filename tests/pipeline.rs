//! End-to-end pipeline tests: documentation served by wiremock, model stubbed

use api_devtool::error::{FetchError, ModelError, PipelineError};
use api_devtool::llm::{GenerationConfig, ModelGateway, SafetySetting};
use api_devtool::models::{ApiRequest, HttpMethod};
use api_devtool::pipeline::{DEFAULT_INTEGRATION_SUGGESTION, Stage};
use api_devtool::scraper::HttpFetcher;
use api_devtool::{Config, Orchestrator};
use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const DOCS_HTML: &str = r#"<!DOCTYPE html>
<html>
<head><title>Pets API</title><style>body { color: red; }</style></head>
<body>
  <main>
    <h1>Pets API</h1>
    <p>Authenticate every call with an API key in the X-Api-Key header.</p>
    <table>
      <tr><th>Method</th><th>Path</th><th>Description</th></tr>
      <tr><td>GET</td><td>/pets</td><td>List pets</td></tr>
      <tr><td>POST</td><td>/pets</td><td>Create a pet</td></tr>
    </table>
    <p>Use GET /pets/{petId} to fetch one pet.</p>
  </main>
</body>
</html>"#;

const ANALYSIS: &str = r#"Sure! Here is what I found.

```json
{
  "endpoints": [
    {"path": "/pets", "method": "GET", "description": "List pets",
     "parameters": [{"name": "limit", "type": "integer", "required": false}]},
    {"path": "/pets/{petId}", "method": "get", "description": "Fetch one pet",
     "parameters": {"petId": {"type": "string", "required": true}}}
  ],
  "auth_methods": [{"type": "API Key", "description": "X-Api-Key header"}]
}
```"#;

/// Answers by prompt kind; optionally fails the suggestion call.
struct PetsGateway {
    calls: AtomicUsize,
    fail_suggestion: bool,
}

impl PetsGateway {
    fn new(fail_suggestion: bool) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail_suggestion,
        }
    }
}

#[async_trait]
impl ModelGateway for PetsGateway {
    async fn complete(
        &self,
        prompt: &str,
        _generation: &GenerationConfig,
        _safety_settings: &[SafetySetting],
    ) -> Result<String, ModelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if prompt.starts_with("I need you to analyze") {
            assert!(prompt.contains("/pets/{petId}"));
            assert!(prompt.contains("\"context_type\": \"table\""));
            assert!(!prompt.contains("color: red"));
            Ok(ANALYSIS.to_string())
        } else if prompt.starts_with("Based on the following API details") {
            if self.fail_suggestion {
                Err(ModelError::Api {
                    status: 500,
                    body: "internal".to_string(),
                })
            } else {
                Ok("Use a thin REST client.".to_string())
            }
        } else {
            Ok("class PetsClient:\n    pass".to_string())
        }
    }
}

fn orchestrator(gateway: Arc<PetsGateway>, timeout: Duration) -> Orchestrator {
    let mut config = Config::new("test-key");
    config.fetch_timeout = timeout;
    Orchestrator::new(
        Arc::new(config),
        Arc::new(HttpFetcher::new(timeout).unwrap()),
        gateway,
    )
}

fn request(url: String) -> ApiRequest {
    ApiRequest {
        documentation_url: url,
        use_case: "adopt a pet".to_string(),
        preferred_language: "Python".to_string(),
    }
}

#[tokio::test]
async fn test_analyze_documentation_page() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/docs"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(DOCS_HTML, "text/html"))
        .mount(&mock_server)
        .await;

    let gateway = Arc::new(PetsGateway::new(false));
    let result = orchestrator(gateway.clone(), Duration::from_secs(5))
        .analyze(&request(format!("{}/docs", mock_server.uri())))
        .await
        .unwrap();

    assert_eq!(gateway.calls.load(Ordering::SeqCst), 3);
    assert_eq!(result.endpoints.len(), 2);
    assert_eq!(result.endpoints[1].method, HttpMethod::Get);

    let limit = &result.endpoints[0].parameters.as_map().unwrap()["limit"];
    assert_eq!(limit["type"], "integer");
    let pet_id = &result.endpoints[1].parameters.as_map().unwrap()["petId"];
    assert_eq!(pet_id["required"], true);

    assert_eq!(result.suggested_integration, "Use a thin REST client.");
    assert!(result.wrapper_code.starts_with("class PetsClient"));
    assert!(result.env_template.contains("API_KEY=your_api_key_here"));
    assert!(result.env_template.ends_with("API_BASE_URL=https://api.example.com"));

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["auth_methods"][0]["type"], "API Key");
    assert_eq!(json["endpoints"][0]["method"], "GET");
}

#[tokio::test]
async fn test_suggestion_failure_keeps_results() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/docs"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(DOCS_HTML, "text/html"))
        .mount(&mock_server)
        .await;

    let gateway = Arc::new(PetsGateway::new(true));
    let result = orchestrator(gateway, Duration::from_secs(5))
        .analyze(&request(format!("{}/docs", mock_server.uri())))
        .await
        .unwrap();

    assert_eq!(result.suggested_integration, DEFAULT_INTEGRATION_SUGGESTION);
    assert!(!result.endpoints.is_empty());
    assert!(!result.auth_methods.is_empty());
    assert!(!result.wrapper_code.is_empty());
}

#[tokio::test]
async fn test_fetch_timeout_aborts_before_model() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(DOCS_HTML, "text/html")
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&mock_server)
        .await;

    let gateway = Arc::new(PetsGateway::new(false));
    let err = orchestrator(gateway.clone(), Duration::from_millis(200))
        .analyze(&request(format!("{}/slow", mock_server.uri())))
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::Fetch(FetchError::Timeout)));
    assert_eq!(err.stage(), Stage::Fetching);
    assert_eq!(gateway.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_error_status_is_fetch_error() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let gateway = Arc::new(PetsGateway::new(false));
    let err = orchestrator(gateway.clone(), Duration::from_secs(5))
        .analyze(&request(format!("{}/missing", mock_server.uri())))
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::Fetch(FetchError::Status(404))));
    assert_eq!(gateway.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_invalid_url_is_fetch_error() {
    let gateway = Arc::new(PetsGateway::new(false));
    let err = orchestrator(gateway, Duration::from_secs(5))
        .analyze(&request("file:///etc/passwd".to_string()))
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::Fetch(FetchError::InvalidUrl(_))));
}
