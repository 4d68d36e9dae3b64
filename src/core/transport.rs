use crate::config::ConnectionConfig;
use crate::domain::model::ErrorPolicy;
use crate::utils::error::{NgwError, Result};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

/// HTTP plumbing shared by every operation: base URL, basic auth and status
/// checks.
#[derive(Debug, Clone)]
pub struct Transport {
    base_url: String,
    login: String,
    password: String,
    client: Client,
}

impl Transport {
    pub fn new(config: &ConnectionConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(timeout));
        }

        Ok(Self {
            base_url: config.url.clone(),
            login: config.login.clone(),
            password: config.password.clone(),
            client: builder.build()?,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Request against a path relative to the base URL.
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.request_url(method, &self.url(path))
    }

    /// Request against an absolute URL, e.g. a `Location` handed out by the
    /// service.
    pub fn request_url(&self, method: Method, url: &str) -> RequestBuilder {
        self.client
            .request(method, url)
            .basic_auth(&self.login, Some(&self.password))
    }

    /// Sends the request and fails with `UnexpectedStatus` on a non-2xx reply.
    pub async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let request = request.build()?;
        let method = request.method().to_string();
        let url = request.url().to_string();

        tracing::debug!("➡️  {} {}", method, url);
        let response = self.client.execute(request).await?;
        let status = response.status();
        tracing::debug!("⬅️  {} {} -> {}", method, url, status);

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(NgwError::UnexpectedStatus {
            method,
            url,
            status: status.as_u16(),
            body,
        })
    }

    /// Like `send`, but a non-2xx reply is only logged under `BestEffort`.
    pub async fn send_with_policy(&self, request: RequestBuilder, policy: ErrorPolicy) -> Result<()> {
        match self.send(request).await {
            Ok(_) => Ok(()),
            Err(err @ NgwError::UnexpectedStatus { .. }) if policy == ErrorPolicy::BestEffort => {
                tracing::warn!("⚠️  Ignoring failed request: {}", err);
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.send(self.request(Method::GET, path)).await?;
        Ok(response.json().await?)
    }

    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.send(self.request(Method::POST, path).json(body)).await?;
        Ok(response.json().await?)
    }

    pub async fn put_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.send(self.request(Method::PUT, path).json(body)).await?;
        Ok(response.json().await?)
    }
}

/// Reads the `id` every creation endpoint answers with.
pub fn id_from_response(value: &serde_json::Value) -> Result<u64> {
    value
        .get("id")
        .and_then(serde_json::Value::as_u64)
        .ok_or_else(|| NgwError::missing_field("id"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn transport(server: &MockServer) -> Transport {
        let config = ConnectionConfig::new(server.base_url(), "admin", "secret");
        Transport::new(&config).unwrap()
    }

    #[test]
    fn test_id_from_response() {
        assert_eq!(id_from_response(&json!({"id": 42, "parent": {"id": 0}})).unwrap(), 42);
        assert!(matches!(
            id_from_response(&json!({"ok": true})),
            Err(NgwError::MissingField { .. })
        ));
    }

    #[tokio::test]
    async fn test_requests_carry_basic_auth() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/api/resource/1")
                .header("authorization", "Basic YWRtaW46c2VjcmV0");
            then.status(200).json_body(json!({"ok": true}));
        });

        let value: serde_json::Value = transport(&server).get_json("/api/resource/1").await.unwrap();

        api_mock.assert();
        assert_eq!(value["ok"], true);
    }

    #[tokio::test]
    async fn test_non_success_status_is_reported() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/resource/1");
            then.status(404).body("{\"message\": \"Resource 1 not found\"}");
        });

        let err = transport(&server)
            .get_json::<serde_json::Value>("/api/resource/1")
            .await
            .unwrap_err();

        match err {
            NgwError::UnexpectedStatus { method, status, body, .. } => {
                assert_eq!(method, "GET");
                assert_eq!(status, 404);
                assert!(body.contains("not found"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_best_effort_swallows_failed_status() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(PUT).path("/api/resource/1");
            then.status(500);
        });
        let transport = transport(&server);

        let best_effort = transport
            .send_with_policy(
                transport.request(reqwest::Method::PUT, "/api/resource/1").json(&json!({})),
                ErrorPolicy::BestEffort,
            )
            .await;
        assert!(best_effort.is_ok());

        let strict = transport
            .send_with_policy(
                transport.request(reqwest::Method::PUT, "/api/resource/1").json(&json!({})),
                ErrorPolicy::Strict,
            )
            .await;
        assert!(matches!(strict, Err(NgwError::UnexpectedStatus { status: 500, .. })));
    }
}
