use crate::models::{ApiRequest, HttpMethod};
use crate::pipeline::Orchestrator;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::time::{Duration, Instant};
use thiserror::Error;
use warp::http::StatusCode;
use warp::{Filter, Rejection, Reply};

const PROXY_TIMEOUT: Duration = Duration::from_secs(30);

/// Request forwarded by the test playground.
#[derive(Debug, Deserialize)]
pub struct ProxyRequest {
    pub url: String,
    pub method: String,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    #[serde(default)]
    pub params: HashMap<String, String>,
    #[serde(default)]
    pub body: Value,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProxyResponse {
    pub status_code: u16,
    pub headers: HashMap<String, String>,
    pub response: String,
    pub time_ms: f64,
}

#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("Unsupported method: {0}")]
    UnsupportedMethod(String),

    #[error("Failed to test endpoint: {0}")]
    Request(#[from] reqwest::Error),
}

/// Send a playground request and report what came back.
pub async fn proxy_request(
    client: &reqwest::Client,
    request: ProxyRequest,
) -> Result<ProxyResponse, ProxyError> {
    let method: HttpMethod = request
        .method
        .parse()
        .map_err(|_| ProxyError::UnsupportedMethod(request.method.clone()))?;

    let mut builder = client
        .request(to_reqwest_method(method), &request.url)
        .query(&request.params);
    for (name, value) in &request.headers {
        builder = builder.header(name, value);
    }
    if matches!(method, HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch) {
        builder = builder.json(&request.body);
    }

    let started = Instant::now();
    let response = builder.send().await?;
    let status_code = response.status().as_u16();
    let headers = response
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.to_string(), v.to_string()))
        })
        .collect();
    let body = response.text().await?;
    let time_ms = started.elapsed().as_secs_f64() * 1000.0;

    Ok(ProxyResponse {
        status_code,
        headers,
        response: body,
        time_ms,
    })
}

fn to_reqwest_method(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Put => reqwest::Method::PUT,
        HttpMethod::Delete => reqwest::Method::DELETE,
        HttpMethod::Patch => reqwest::Method::PATCH,
    }
}

fn detail(status: StatusCode, message: String) -> warp::reply::Response {
    warp::reply::with_status(warp::reply::json(&json!({ "detail": message })), status)
        .into_response()
}

async fn handle_analyze(
    orchestrator: Orchestrator,
    request: ApiRequest,
) -> Result<warp::reply::Response, Infallible> {
    tracing::info!(
        url = %request.documentation_url,
        language = %request.preferred_language,
        "analyze request"
    );
    match orchestrator.analyze(&request).await {
        Ok(result) => Ok(warp::reply::json(&result).into_response()),
        Err(e) => {
            tracing::error!(error = %e, stage = %e.stage(), "error processing API request");
            Ok(detail(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to process API: {e}"),
            ))
        }
    }
}

async fn handle_test_endpoint(
    client: reqwest::Client,
    request: ProxyRequest,
) -> Result<warp::reply::Response, Infallible> {
    match proxy_request(&client, request).await {
        Ok(result) => Ok(warp::reply::json(&result).into_response()),
        Err(e @ ProxyError::UnsupportedMethod(_)) => {
            Ok(detail(StatusCode::BAD_REQUEST, e.to_string()))
        }
        Err(e) => {
            tracing::error!(error = %e, "error testing endpoint");
            Ok(detail(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
    }
}

/// All `/api` routes.
pub fn routes(
    orchestrator: Orchestrator,
    client: reqwest::Client,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let with_orchestrator = warp::any().map(move || orchestrator.clone());
    let with_client = warp::any().map(move || client.clone());

    let analyze_route = warp::path!("api" / "analyze")
        .and(warp::post())
        .and(with_orchestrator)
        .and(warp::body::json())
        .and_then(handle_analyze);

    let health_route = warp::path!("api" / "health")
        .and(warp::get())
        .map(|| warp::reply::json(&json!({"status": "ok"})));

    let test_endpoint_route = warp::path!("api" / "test-endpoint")
        .and(warp::post())
        .and(with_client)
        .and(warp::body::json())
        .and_then(handle_test_endpoint);

    analyze_route
        .or(health_route)
        .or(test_endpoint_route)
        .with(
            warp::cors()
                .allow_any_origin()
                .allow_headers(vec!["content-type"])
                .allow_methods(vec!["GET", "POST"]),
        )
}

pub async fn run_server(port: u16, orchestrator: Orchestrator) -> anyhow::Result<()> {
    let client = reqwest::Client::builder().timeout(PROXY_TIMEOUT).build()?;
    let addr = SocketAddr::from(([127, 0, 0, 1], port));

    tracing::info!(%addr, "server running");
    warp::serve(routes(orchestrator, client)).run(addr).await;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::error::{FetchError, ModelError};
    use crate::llm::{GenerationConfig, ModelGateway, SafetySetting};
    use crate::scraper::{DocumentFetcher, FetchedPage};
    use async_trait::async_trait;
    use std::sync::Arc;

    struct UnreachableFetcher;

    #[async_trait]
    impl DocumentFetcher for UnreachableFetcher {
        async fn fetch(&self, _url: &str) -> Result<FetchedPage, FetchError> {
            Err(FetchError::Status(404))
        }
    }

    struct SilentGateway;

    #[async_trait]
    impl ModelGateway for SilentGateway {
        async fn complete(
            &self,
            _prompt: &str,
            _generation: &GenerationConfig,
            _safety_settings: &[SafetySetting],
        ) -> Result<String, ModelError> {
            Err(ModelError::EmptyCompletion)
        }
    }

    fn test_routes() -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
        let orchestrator = Orchestrator::new(
            Arc::new(Config::new("test-key")),
            Arc::new(UnreachableFetcher),
            Arc::new(SilentGateway),
        );
        routes(orchestrator, reqwest::Client::new())
    }

    #[tokio::test]
    async fn test_health() {
        let resp = warp::test::request()
            .method("GET")
            .path("/api/health")
            .reply(&test_routes())
            .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = serde_json::from_slice(resp.body()).unwrap();
        assert_eq!(body, json!({"status": "ok"}));
    }

    #[tokio::test]
    async fn test_analyze_failure_reports_detail() {
        let resp = warp::test::request()
            .method("POST")
            .path("/api/analyze")
            .json(&json!({
                "documentation_url": "https://docs.example.com",
                "use_case": "anything",
                "preferred_language": "Go"
            }))
            .reply(&test_routes())
            .await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = serde_json::from_slice(resp.body()).unwrap();
        assert_eq!(
            body["detail"],
            json!("Failed to process API: Failed to fetch documentation: Documentation server returned status 404")
        );
    }

    #[tokio::test]
    async fn test_proxy_rejects_unknown_method() {
        let resp = warp::test::request()
            .method("POST")
            .path("/api/test-endpoint")
            .json(&json!({"url": "http://localhost:1/", "method": "TRACE"}))
            .reply(&test_routes())
            .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = serde_json::from_slice(resp.body()).unwrap();
        assert_eq!(body["detail"], json!("Unsupported method: TRACE"));
    }
}
