//! Bearer-authenticated JSON client bound to one base URL

use apicheck_report::TestReporter;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

use super::method::HttpMethod;
use super::transport::{Transport, TransportRequest};
use crate::error::{E2eError, E2eResult};

/// Response returned to resource clients and tests.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub method: HttpMethod,
    pub endpoint: String,
    pub url: String,
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
    pub duration_ms: u64,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Decode the body into `T`.
    pub fn json<T: DeserializeOwned>(&self) -> E2eResult<T> {
        serde_json::from_str(&self.body).map_err(|source| E2eError::Decode {
            endpoint: self.endpoint.clone(),
            source,
        })
    }
}

/// HTTP client for the API under test.
///
/// Holds only immutable configuration; clone it freely. A clone bound to a
/// test with [`ApiClient::for_test`] additionally mirrors every request and
/// response into that test's report log.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    base_url: String,
    token: String,
    reporter: Option<TestReporter>,
}

impl ApiClient {
    pub fn new(transport: Arc<dyn Transport>, base_url: &str, token: &str) -> E2eResult<Self> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(E2eError::Config("base URL cannot be empty".to_string()));
        }
        let token = token.trim().to_string();
        if token.is_empty() {
            return Err(E2eError::Config("auth token cannot be empty".to_string()));
        }

        Ok(Self {
            transport,
            base_url,
            token,
            reporter: None,
        })
    }

    /// A copy of this client that logs into `reporter`.
    pub fn for_test(&self, reporter: TestReporter) -> Self {
        Self {
            reporter: Some(reporter),
            ..self.clone()
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url_for(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    pub async fn get(&self, path: &str) -> E2eResult<ApiResponse> {
        self.request::<()>(HttpMethod::Get, path, None).await
    }

    pub async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> E2eResult<ApiResponse> {
        self.request(HttpMethod::Post, path, Some(body)).await
    }

    pub async fn put<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> E2eResult<ApiResponse> {
        self.request(HttpMethod::Put, path, Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> E2eResult<ApiResponse> {
        self.request::<()>(HttpMethod::Delete, path, None).await
    }

    /// Send one request. No retries: a failed call is a single failure.
    pub async fn request<B: Serialize + ?Sized>(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<&B>,
    ) -> E2eResult<ApiResponse> {
        let url = self.url_for(path);

        let body = match body.filter(|_| method.has_body()) {
            Some(body) => match serde_json::to_string(body) {
                Ok(json) => Some(json),
                Err(e) => return Err(self.transport_error(method, path, Box::new(e))),
            },
            None => None,
        };

        let mut headers = vec![
            ("Authorization".to_string(), format!("Bearer {}", self.token)),
            ("Accept".to_string(), "application/json".to_string()),
        ];
        if body.is_some() {
            headers.push(("Content-Type".to_string(), "application/json".to_string()));
        }

        info!(
            "Request: {} {} | Body: {}",
            method,
            url,
            body.as_deref().unwrap_or("null")
        );
        if let Some(reporter) = &self.reporter {
            reporter.request(method.as_str(), &url, body.as_deref());
        }

        let started = Instant::now();
        let result = self
            .transport
            .send(TransportRequest {
                method,
                url: url.clone(),
                headers,
                body,
            })
            .await;
        let duration_ms = started.elapsed().as_millis() as u64;

        let response = match result {
            Ok(response) => response,
            Err(e) => return Err(self.transport_error(method, path, e)),
        };

        info!(
            "Response Status: {} | {} {} ({} ms)",
            response.status, method, path, duration_ms
        );
        debug!("Response Body: {}", response.body);
        if let Some(reporter) = &self.reporter {
            reporter.response(response.status, &response.body);
        }

        Ok(ApiResponse {
            method,
            endpoint: path.to_string(),
            url,
            status: response.status,
            headers: response.headers,
            body: response.body,
            duration_ms,
        })
    }

    fn transport_error(&self, method: HttpMethod, path: &str, source: crate::error::BoxError) -> E2eError {
        error!("Error: {} {} failed: {}", method, path, source);
        if let Some(reporter) = &self.reporter {
            reporter.error(&format!("{} request failed for {}: {}", method, path, source));
        }
        E2eError::Transport {
            method,
            endpoint: path.to_string(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BoxError;
    use crate::http::transport::TransportResponse;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recording {
        seen: Mutex<Vec<TransportRequest>>,
    }

    #[async_trait]
    impl Transport for Recording {
        async fn send(&self, request: TransportRequest) -> Result<TransportResponse, BoxError> {
            let body = request.body.clone().unwrap_or_else(|| "{}".to_string());
            self.seen.lock().unwrap().push(request);
            Ok(TransportResponse {
                status: 200,
                headers: vec![("content-type".into(), "application/json".into())],
                body,
            })
        }
    }

    #[test]
    fn test_new_rejects_missing_config() {
        let transport: Arc<dyn Transport> = Arc::new(Recording::default());
        assert!(matches!(
            ApiClient::new(transport.clone(), " ", "token"),
            Err(E2eError::Config(_))
        ));
        assert!(matches!(
            ApiClient::new(transport, "http://api.test", ""),
            Err(E2eError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_post_sets_json_and_bearer_headers() {
        let transport = Arc::new(Recording::default());
        let client = ApiClient::new(transport.clone(), "http://api.test/", "secret").unwrap();

        let response = client
            .post("/posts", &serde_json::json!({"title": "foo"}))
            .await
            .unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.header("Content-Type"), Some("application/json"));

        let seen = transport.seen.lock().unwrap();
        let request = &seen[0];
        assert_eq!(request.url, "http://api.test/posts");
        assert_eq!(request.body.as_deref(), Some(r#"{"title":"foo"}"#));
        assert!(request
            .headers
            .contains(&("Authorization".to_string(), "Bearer secret".to_string())));
        assert!(request
            .headers
            .contains(&("Content-Type".to_string(), "application/json".to_string())));
    }

    #[tokio::test]
    async fn test_get_sends_no_body() {
        let transport = Arc::new(Recording::default());
        let client = ApiClient::new(transport.clone(), "http://api.test", "secret").unwrap();
        client.get("/posts/1").await.unwrap();

        let seen = transport.seen.lock().unwrap();
        assert!(seen[0].body.is_none());
        assert!(!seen[0].headers.iter().any(|(k, _)| k == "Content-Type"));
        assert!(seen[0]
            .headers
            .contains(&("Authorization".to_string(), "Bearer secret".to_string())));
    }

    #[tokio::test]
    async fn test_decode_error_names_endpoint() {
        let transport = Arc::new(Recording::default());
        let client = ApiClient::new(transport, "http://api.test", "secret").unwrap();
        let response = client.get("/posts/1").await.unwrap();
        let err = response.json::<Vec<u32>>().unwrap_err();
        assert!(matches!(err, E2eError::Decode { ref endpoint, .. } if endpoint == "/posts/1"));
    }
}
