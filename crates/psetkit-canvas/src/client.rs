//! Canvas REST API client.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::Method;
use serde::Deserialize;
use tracing::instrument;

use psetkit_core::config::CanvasConfig;
use psetkit_core::Assignment;

use crate::assignment::AssignmentRef;
use crate::error::CanvasError;
use crate::traits::AssignmentStore;

const MAX_RETRY_DELAY: Duration = Duration::from_secs(60);
const DEFAULT_RETRY_AFTER_SECS: u64 = 5;

/// Canvas assignments API, authenticated with a personal access token.
pub struct CanvasClient {
    token: String,
    client: reqwest::Client,
    timeout_secs: u64,
    max_retries: u32,
    retry_delay: Duration,
}

impl CanvasClient {
    pub fn new(token: &str, config: &CanvasConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            token: token.to_string(),
            client,
            timeout_secs: config.timeout_secs,
            max_retries: config.max_retries,
            retry_delay: Duration::from_millis(config.retry_delay_ms),
        })
    }

    /// Build a client from configuration, failing when no token is set.
    pub fn from_config(config: &CanvasConfig) -> Result<Self> {
        Self::new(config.require_token()?, config)
    }

    /// Send a request, retrying transient failures with exponential backoff.
    async fn send(
        &self,
        method: Method,
        url: &str,
        form: Option<&[(&str, &str)]>,
    ) -> Result<Assignment, CanvasError> {
        let mut delay = self.retry_delay;
        let mut attempt = 0;
        loop {
            match self.send_once(method.clone(), url, form).await {
                Ok(assignment) => return Ok(assignment),
                Err(e) if e.is_transient() && attempt < self.max_retries => {
                    attempt += 1;
                    let wait = retry_wait(&e, delay);
                    tracing::warn!(
                        "{method} {url} failed ({e}); retry {attempt}/{} in {}ms",
                        self.max_retries,
                        wait.as_millis()
                    );
                    tokio::time::sleep(wait).await;
                    delay = (delay * 2).min(MAX_RETRY_DELAY);
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn send_once(
        &self,
        method: Method,
        url: &str,
        form: Option<&[(&str, &str)]>,
    ) -> Result<Assignment, CanvasError> {
        let mut request = self
            .client
            .request(method, url)
            .bearer_auth(&self.token)
            .header(ACCEPT, "application/json");
        if let Some(form) = form {
            request = request.form(form);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                CanvasError::Timeout(self.timeout_secs)
            } else {
                CanvasError::Network(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        if status == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok())
                .unwrap_or(DEFAULT_RETRY_AFTER_SECS)
                .saturating_mul(1000);
            return Err(CanvasError::RateLimited {
                retry_after_ms: retry_after,
            });
        }
        if status == 401 {
            let body = response.text().await.unwrap_or_default();
            return Err(CanvasError::Unauthorized(error_message(&body)));
        }
        if status == 404 {
            return Err(CanvasError::NotFound(url.to_string()));
        }
        if status >= 400 {
            let body = response.text().await.unwrap_or_default();
            return Err(CanvasError::Api {
                status,
                message: error_message(&body),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| CanvasError::Network(e.to_string()))?;
        if body.trim().is_empty() {
            return Ok(Assignment::default());
        }
        serde_json::from_str(&body).map_err(|e| CanvasError::Decode(e.to_string()))
    }
}

/// How long to wait before retrying `error`: the server's hint when it gives
/// one, else `delay`, never more than [`MAX_RETRY_DELAY`].
fn retry_wait(error: &CanvasError, delay: Duration) -> Duration {
    error
        .retry_after_ms()
        .map_or(delay, Duration::from_millis)
        .min(MAX_RETRY_DELAY)
}

#[derive(Deserialize)]
struct CanvasErrorBody {
    #[serde(default)]
    errors: Vec<CanvasErrorMessage>,
}

#[derive(Deserialize)]
struct CanvasErrorMessage {
    message: String,
}

/// Canvas reports errors as `{"errors": [{"message": ...}]}`; fall back to
/// the raw body otherwise.
fn error_message(body: &str) -> String {
    serde_json::from_str::<CanvasErrorBody>(body)
        .ok()
        .map(|b| {
            b.errors
                .into_iter()
                .map(|e| e.message)
                .collect::<Vec<_>>()
                .join("; ")
        })
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| body.trim().to_string())
}

#[async_trait]
impl AssignmentStore for CanvasClient {
    fn name(&self) -> &str {
        "canvas"
    }

    #[instrument(skip(self, target), fields(target = %target))]
    async fn fetch_assignment(&self, target: &AssignmentRef) -> Result<Assignment> {
        Ok(self.send(Method::GET, &target.api_url(), None).await?)
    }

    #[instrument(skip(self, target, html), fields(target = %target, bytes = html.len()))]
    async fn update_description(&self, target: &AssignmentRef, html: &str) -> Result<Assignment> {
        let form = [("assignment[description]", html)];
        Ok(self
            .send(Method::PUT, &target.api_url(), Some(&form[..]))
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const ASSIGNMENT_PATH: &str = "/api/v1/courses/7/assignments/42";

    fn test_config() -> CanvasConfig {
        CanvasConfig {
            access_token: "test-token".into(),
            timeout_secs: 5,
            max_retries: 2,
            retry_delay_ms: 1,
        }
    }

    fn target(server: &MockServer) -> AssignmentRef {
        AssignmentRef::parse(&format!("{}/courses/7/assignments/42", server.uri())).unwrap()
    }

    #[tokio::test]
    async fn fetches_assignment() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(ASSIGNMENT_PATH))
            .and(header("authorization", "Bearer test-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": 42,
                "name": "Homework 1",
                "description": "<p>old</p>",
                "points_possible": 10
            })))
            .mount(&server)
            .await;

        let client = CanvasClient::from_config(&test_config()).unwrap();
        let assignment = client.fetch_assignment(&target(&server)).await.unwrap();
        assert_eq!(assignment.id, Some(42));
        assert_eq!(assignment.display_name(), "Homework 1");
    }

    #[tokio::test]
    async fn updates_description_as_form() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path(ASSIGNMENT_PATH))
            .and(header(
                "content-type",
                "application/x-www-form-urlencoded",
            ))
            .and(body_string_contains("assignment%5Bdescription%5D=%3Cp%3Enew%3C%2Fp%3E"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": 42,
                "description": "<p>new</p>"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = CanvasClient::from_config(&test_config()).unwrap();
        let updated = client
            .update_description(&target(&server), "<p>new</p>")
            .await
            .unwrap();
        assert_eq!(updated.description.as_deref(), Some("<p>new</p>"));
    }

    #[tokio::test]
    async fn empty_body_is_empty_assignment() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(ASSIGNMENT_PATH))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let client = CanvasClient::from_config(&test_config()).unwrap();
        let assignment = client.fetch_assignment(&target(&server)).await.unwrap();
        assert_eq!(assignment, Assignment::default());
    }

    #[tokio::test]
    async fn authentication_failure_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(ASSIGNMENT_PATH))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "errors": [{"message": "Invalid access token."}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = CanvasClient::from_config(&test_config()).unwrap();
        let err = client.fetch_assignment(&target(&server)).await.unwrap_err();
        assert!(err.to_string().contains("Invalid access token."));
        assert!(matches!(
            err.downcast_ref::<CanvasError>(),
            Some(CanvasError::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = CanvasClient::from_config(&test_config()).unwrap();
        let err = client.fetch_assignment(&target(&server)).await.unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[tokio::test]
    async fn server_error_is_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(ASSIGNMENT_PATH))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(ASSIGNMENT_PATH))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"name": "Later"})),
            )
            .mount(&server)
            .await;

        let client = CanvasClient::from_config(&test_config()).unwrap();
        let assignment = client.fetch_assignment(&target(&server)).await.unwrap();
        assert_eq!(assignment.display_name(), "Later");
    }

    #[tokio::test]
    async fn retries_are_bounded() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .expect(3)
            .mount(&server)
            .await;

        let client = CanvasClient::from_config(&test_config()).unwrap();
        let err = client.fetch_assignment(&target(&server)).await.unwrap_err();
        assert!(err.to_string().contains("HTTP 500"));
        assert!(err.to_string().contains("boom"));
    }

    #[tokio::test]
    async fn rate_limiting() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "3"))
            .mount(&server)
            .await;

        let config = CanvasConfig {
            max_retries: 0,
            ..test_config()
        };
        let client = CanvasClient::from_config(&config).unwrap();
        let err = client.fetch_assignment(&target(&server)).await.unwrap_err();
        assert!(err.to_string().contains("rate limited, retry after 3000ms"));
    }

    #[tokio::test]
    async fn huge_retry_after_saturates() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(429).insert_header("retry-after", "18446744073709551615"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let config = CanvasConfig {
            max_retries: 0,
            ..test_config()
        };
        let client = CanvasClient::from_config(&config).unwrap();
        let err = client.fetch_assignment(&target(&server)).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CanvasError>(),
            Some(CanvasError::RateLimited {
                retry_after_ms: u64::MAX
            })
        ));
    }

    #[test]
    fn retry_wait_is_capped() {
        let delay = Duration::from_millis(250);
        let day = CanvasError::RateLimited {
            retry_after_ms: 86_400_000,
        };
        assert_eq!(retry_wait(&day, delay), MAX_RETRY_DELAY);

        let short = CanvasError::RateLimited {
            retry_after_ms: 3000,
        };
        assert_eq!(retry_wait(&short, delay), Duration::from_secs(3));

        let network = CanvasError::Network("reset".into());
        assert_eq!(retry_wait(&network, delay), delay);
        assert_eq!(
            retry_wait(&network, Duration::from_secs(600)),
            MAX_RETRY_DELAY
        );
    }

    #[tokio::test]
    async fn invalid_json_is_a_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
            .mount(&server)
            .await;

        let client = CanvasClient::from_config(&test_config()).unwrap();
        let err = client.fetch_assignment(&target(&server)).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CanvasError>(),
            Some(CanvasError::Decode(_))
        ));
    }

    #[test]
    fn missing_token_is_an_error() {
        let config = CanvasConfig {
            access_token: String::new(),
            ..test_config()
        };
        assert!(CanvasClient::from_config(&config).is_err());
    }

    #[test]
    fn error_message_fallbacks() {
        assert_eq!(
            error_message(r#"{"errors":[{"message":"a"},{"message":"b"}]}"#),
            "a; b"
        );
        assert_eq!(error_message(" plain text "), "plain text");
        assert_eq!(error_message(r#"{"errors":[]}"#), r#"{"errors":[]}"#);
    }
}
