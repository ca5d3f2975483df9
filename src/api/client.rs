use reqwest::header::{HeaderMap, HeaderValue, COOKIE};
use reqwest::{multipart, Client, Method, RequestBuilder};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

use crate::api::wire::message_of;
use crate::config::Config;
use crate::error::{AdminError, AdminResult};

/// HTTP client for the marketplace admin API. One instance per backend;
/// cheap to clone.
#[derive(Clone)]
pub struct AdminClient {
    client: Client,
    base_url: String,
}

impl AdminClient {
    /// Creates a client with the default 30 second timeout and no
    /// credentials.
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();

        AdminClient {
            client,
            base_url: base_url.into(),
        }
    }

    /// Creates a client from configuration. The session cookie, if any, is
    /// sent with every request.
    pub fn from_config(config: &Config) -> AdminResult<Self> {
        let mut headers = HeaderMap::new();
        if let Some(cookie) = &config.cookie {
            let value = HeaderValue::from_str(cookie).map_err(|_| {
                AdminError::Validation(crate::validation::ValidationError::new(
                    "cookie",
                    "contains characters not allowed in a header",
                ))
            })?;
            headers.insert(COOKIE, value);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()?;

        Ok(AdminClient {
            client,
            base_url: config.api_url.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub(crate) async fn get_json(&self, path: &str) -> AdminResult<Value> {
        self.execute(self.client.get(self.url(path))).await
    }

    pub(crate) async fn get_query(&self, path: &str, query: &[(&str, &str)]) -> AdminResult<Value> {
        self.execute(self.client.get(self.url(path)).query(query)).await
    }

    pub(crate) async fn send_json<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> AdminResult<Value> {
        self.execute(self.client.request(method, self.url(path)).json(body))
            .await
    }

    pub(crate) async fn send_empty(&self, method: Method, path: &str) -> AdminResult<Value> {
        self.execute(self.client.request(method, self.url(path))).await
    }

    pub(crate) async fn send_multipart(
        &self,
        method: Method,
        path: &str,
        form: multipart::Form,
    ) -> AdminResult<Value> {
        self.execute(self.client.request(method, self.url(path)).multipart(form))
            .await
    }

    /// Posts a JSON body and returns the raw response bytes, for endpoints
    /// that answer with a file.
    pub(crate) async fn post_for_bytes<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> AdminResult<Vec<u8>> {
        let url = self.url(path);
        tracing::debug!("POST {} (file download)", url);
        let response = self.client.post(&url).json(body).send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        if !status.is_success() {
            let body: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
            return Err(AdminError::Server {
                status,
                message: message_of(&body),
            });
        }

        Ok(bytes.to_vec())
    }

    async fn execute(&self, request: RequestBuilder) -> AdminResult<Value> {
        let request = request.build()?;
        tracing::debug!("{} {}", request.method(), request.url());

        let response = self.client.execute(request).await?;
        let status = response.status();
        let text = response.text().await?;

        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            match serde_json::from_str::<Value>(&text) {
                Ok(body) => body,
                Err(e) if status.is_success() => return Err(AdminError::Decode(e.to_string())),
                Err(_) => Value::Null,
            }
        };

        if status.is_success() {
            Ok(body)
        } else {
            Err(AdminError::Server {
                status,
                message: message_of(&body),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_client_creation() {
        let client = AdminClient::new("https://grokart-2.onrender.com/api/v1");
        assert_eq!(client.base_url(), "https://grokart-2.onrender.com/api/v1");
    }

    #[test]
    fn test_url_joining() {
        let client = AdminClient::new("http://localhost:4000/api/v1/");
        assert_eq!(
            client.url("/order/placed"),
            "http://localhost:4000/api/v1/order/placed"
        );
        assert_eq!(
            client.url("fee"),
            "http://localhost:4000/api/v1/fee"
        );
    }

    #[test]
    fn test_rejects_invalid_cookie() {
        let mut config = Config::with_api_url("http://localhost:4000/api/v1").unwrap();
        config.cookie = Some("token=abc\nbad".to_string());
        assert!(matches!(
            AdminClient::from_config(&config),
            Err(AdminError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_server_error_carries_message() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/fee")
            .with_status(400)
            .with_header("content-type", "application/json")
            .with_body(r#"{"message":"Fee config missing"}"#)
            .create_async()
            .await;

        let client = AdminClient::new(server.url());
        let result = client.get_json("/fee").await;

        match result {
            Err(AdminError::Server { status, message }) => {
                assert_eq!(status.as_u16(), 400);
                assert_eq!(message.as_deref(), Some("Fee config missing"));
            }
            other => panic!("unexpected result: {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_empty_success_body_is_null() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("DELETE", "/banner/B1")
            .with_status(204)
            .create_async()
            .await;

        let client = AdminClient::new(server.url());
        let body = client.send_empty(Method::DELETE, "/banner/B1").await.unwrap();
        assert!(body.is_null());
    }

    #[tokio::test]
    async fn test_sends_session_cookie() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/setting/")
            .match_header("cookie", "token=abc")
            .with_status(200)
            .with_body(r#"{"codEnabled":true}"#)
            .create_async()
            .await;

        let mut config = Config::with_api_url(server.url()).unwrap();
        config.cookie = Some("token=abc".to_string());
        let client = AdminClient::from_config(&config).unwrap();
        client.get_json("/setting/").await.unwrap();
        mock.assert_async().await;
    }
}
