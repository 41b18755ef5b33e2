//! reqwest client wrapped in `RetryTransientMiddleware`.

use log::debug;
use reqwest::header::HeaderMap;
use reqwest::{Client, Method, Response, StatusCode, Url};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::RetryTransientMiddleware;
use serde_json::Value;

use super::retry::RetryPolicy;

/// HTTP client that retries transient failures for the methods the policy allows.
#[derive(Clone)]
pub struct HttpClient {
    retrying: ClientWithMiddleware,
    direct: ClientWithMiddleware,
    policy: RetryPolicy,
}

impl HttpClient {
    pub fn new(client: Client, policy: RetryPolicy) -> Self {
        let retry = RetryTransientMiddleware::new_with_policy_and_strategy(
            policy.exponential_backoff(),
            policy.strategy(),
        );
        let retrying = ClientBuilder::new(client.clone()).with(retry).build();
        let direct = ClientBuilder::new(client).build();

        Self {
            retrying,
            direct,
            policy,
        }
    }

    /// Sends a request. Once retries are exhausted the last response is
    /// returned; see [`HttpClient::gave_up_on`].
    #[tracing::instrument(skip(self, headers, body))]
    pub async fn send(
        &self,
        method: Method,
        url: Url,
        headers: HeaderMap,
        body: Option<&Value>,
    ) -> Result<Response, reqwest_middleware::Error> {
        let client = if self.policy.total > 0 && self.policy.is_method_retryable(&method) {
            &self.retrying
        } else {
            debug!("{} {} is sent without retries", method, url);
            &self.direct
        };

        let mut request = client.request(method, url).headers(headers);
        if let Some(body) = body {
            request = request.json(body);
        }
        request.send().await
    }

    /// True when `status` is what remained after every allowed retry of `method`.
    pub fn gave_up_on(&self, method: &Method, status: StatusCode) -> bool {
        self.policy.is_status_retryable(method, status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;
    use std::time::Duration;

    fn fast_policy(total: usize) -> RetryPolicy {
        RetryPolicy {
            total,
            min_retry_interval: Duration::from_millis(1),
            max_retry_interval: Duration::from_millis(5),
            ..RetryPolicy::default()
        }
    }

    fn url(server: &mockito::ServerGuard, path: &str) -> Url {
        Url::parse(&format!("{}{}", server.url(), path)).unwrap()
    }

    #[tokio::test]
    async fn test_send_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/test")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"name": "test"}"#)
            .create_async()
            .await;

        let client = HttpClient::new(Client::new(), fast_policy(3));
        let response = client
            .send(Method::GET, url(&server, "/test"), HeaderMap::new(), None)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(response.status(), 200);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["name"], "test");
    }

    #[tokio::test]
    async fn test_send_posts_json_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/echo")
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(json!({"hello": "world"})))
            .with_status(201)
            .create_async()
            .await;

        let client = HttpClient::new(Client::new(), fast_policy(0));
        let body = json!({"hello": "world"});
        let response = client
            .send(Method::POST, url(&server, "/echo"), HeaderMap::new(), Some(&body))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(response.status(), 201);
    }

    #[tokio::test]
    async fn test_transient_status_retried_until_exhausted() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/flaky")
            .with_status(503)
            .with_body("unavailable")
            .expect(3)
            .create_async()
            .await;

        let client = HttpClient::new(Client::new(), fast_policy(2));
        let response = client
            .send(Method::GET, url(&server, "/flaky"), HeaderMap::new(), None)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(response.status(), 503);
        assert!(client.gave_up_on(&Method::GET, response.status()));
    }

    #[tokio::test]
    async fn test_post_body_resent_on_retry() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/transfer")
            .match_body(Matcher::Json(json!({"amount": 1.5})))
            .with_status(429)
            .expect(2)
            .create_async()
            .await;

        let client = HttpClient::new(Client::new(), fast_policy(1));
        let body = json!({"amount": 1.5});
        let response = client
            .send(Method::POST, url(&server, "/transfer"), HeaderMap::new(), Some(&body))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(response.status(), 429);
    }

    #[tokio::test]
    async fn test_client_error_not_retried() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/missing")
            .with_status(404)
            .expect(1)
            .create_async()
            .await;

        let client = HttpClient::new(Client::new(), fast_policy(3));
        let response = client
            .send(Method::GET, url(&server, "/missing"), HeaderMap::new(), None)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(response.status(), 404);
        assert!(!client.gave_up_on(&Method::GET, response.status()));
    }

    #[tokio::test]
    async fn test_disallowed_method_not_retried() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("DELETE", "/thing")
            .with_status(500)
            .expect(1)
            .create_async()
            .await;

        let client = HttpClient::new(Client::new(), fast_policy(3));
        let response = client
            .send(Method::DELETE, url(&server, "/thing"), HeaderMap::new(), None)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(response.status(), 500);
        assert!(!client.gave_up_on(&Method::DELETE, response.status()));
    }

    #[tokio::test]
    async fn test_connection_refused_is_error() {
        let addr = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap()
        };

        let client = HttpClient::new(Client::new(), fast_policy(1));
        let url = Url::parse(&format!("http://{}/test", addr)).unwrap();
        let result = client.send(Method::GET, url, HeaderMap::new(), None).await;

        assert!(result.is_err());
    }
}
