//! Turbonomic REST client
//!
//! One instance per invocation. Holds the HTTP client, the base URL and the
//! credential pair; `/vmturbo/rest` calls use basic auth, `/api/v3` calls use
//! the token returned by [`TurboClient::login`].

use std::fmt;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;

use super::models::LoginResponse;
use crate::config::{ConnectionConfig, Credentials};
use crate::error::{TurboError, TurboResult};

/// Longest response excerpt carried into error messages
const ERROR_BODY_LIMIT: usize = 300;

/// Token from `POST /api/v3/login`, valid for this process only
#[derive(Clone)]
pub struct AuthToken(String);

impl AuthToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(***)")
    }
}

pub struct TurboClient {
    http_client: Client,
    base_url: String,
    credentials: Credentials,
}

impl TurboClient {
    pub fn new(config: &ConnectionConfig) -> TurboResult<Self> {
        if config.accept_invalid_certs {
            tracing::warn!(
                "[Turbo] TLS certificate validation disabled for {}",
                config.base_url
            );
        }

        let http_client = Client::builder()
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            http_client,
            base_url: config.base_url.clone(),
            credentials: config.credentials.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Log in to the v3 API and return the session token
    pub async fn login(&self) -> TurboResult<AuthToken> {
        tracing::debug!("[Turbo] Logging in to {} as {}", self.base_url, self.credentials.username);

        let resp = self
            .http_client
            .post(self.url("/api/v3/login"))
            .form(&[
                ("username", self.credentials.username.as_str()),
                ("password", self.credentials.password.as_str()),
            ])
            .send()
            .await?;

        let login: LoginResponse = decode_json(resp, TurboError::Auth, "Login").await?;

        let token = login
            .auth_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| TurboError::Auth("No authToken in login response".to_string()))?;

        tracing::info!("[Turbo] Authenticated to {}", self.base_url);
        Ok(AuthToken(token))
    }

    /// GET against the v3 API with the session token attached
    pub(crate) fn v3_get(&self, token: &AuthToken, path: &str) -> RequestBuilder {
        self.http_client
            .get(self.url(path))
            .header(CONTENT_TYPE, "application/json")
            .header(AUTHORIZATION, token.as_str())
    }

    /// GET against the classic REST API with basic auth
    pub(crate) fn classic_get(&self, path: &str) -> RequestBuilder {
        self.http_client
            .get(self.url(path))
            .header(CONTENT_TYPE, "application/json")
            .basic_auth(&self.credentials.username, Some(&self.credentials.password))
    }

    /// PUT against the classic REST API with basic auth
    pub(crate) fn classic_put(&self, path: &str) -> RequestBuilder {
        self.http_client
            .put(self.url(path))
            .header(CONTENT_TYPE, "application/json")
            .basic_auth(&self.credentials.username, Some(&self.credentials.password))
    }
}

/// Check the status and decode the body, wrapping failures with `wrap`.
///
/// Failing to read the body at all is a transport problem and stays one.
pub(crate) async fn decode_json<T, F>(resp: Response, wrap: F, what: &str) -> TurboResult<T>
where
    T: DeserializeOwned,
    F: FnOnce(String) -> TurboError,
{
    let status = resp.status();
    let body = resp.text().await?;

    if !status.is_success() {
        return Err(wrap(format!(
            "{} returned {}: {}",
            what,
            status,
            excerpt(&body)
        )));
    }

    serde_json::from_str(&body).map_err(|e| wrap(format!("{} parse failed: {}", what, e)))
}

fn excerpt(body: &str) -> &str {
    let body = body.trim();
    if body.len() <= ERROR_BODY_LIMIT {
        return body;
    }
    let mut end = ERROR_BODY_LIMIT;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const BASIC_AUTH: &str = "Basic YWRtaW5pc3RyYXRvcjpzZWNyZXQ=";

    pub(crate) fn test_client(base_url: &str) -> TurboClient {
        let config = ConnectionConfig::new(
            base_url,
            Credentials {
                username: "administrator".to_string(),
                password: "secret".to_string(),
            },
        )
        .unwrap();
        TurboClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn test_login_returns_token() {
        let mut server = mockito::Server::new_async().await;
        let login = server
            .mock("POST", "/api/v3/login")
            .match_body(mockito::Matcher::AllOf(vec![
                mockito::Matcher::Regex("username=administrator".to_string()),
                mockito::Matcher::Regex("password=secret".to_string()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"authToken":"tok-123","username":"administrator"}"#)
            .create_async()
            .await;

        let client = test_client(&server.url());
        let token = client.login().await.unwrap();

        assert_eq!(token.as_str(), "tok-123");
        login.assert_async().await;
    }

    #[tokio::test]
    async fn test_login_rejected() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/v3/login")
            .with_status(401)
            .with_body("Unauthorized")
            .create_async()
            .await;

        let client = test_client(&server.url());
        let err = client.login().await.unwrap_err();

        assert!(matches!(err, TurboError::Auth(msg) if msg.contains("401")));
    }

    #[tokio::test]
    async fn test_login_without_token() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/v3/login")
            .with_status(200)
            .with_body(r#"{"username":"administrator"}"#)
            .create_async()
            .await;

        let client = test_client(&server.url());
        let err = client.login().await.unwrap_err();

        assert!(matches!(err, TurboError::Auth(_)));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_transport_error() {
        // Nothing listens on port 9 locally
        let client = test_client("http://127.0.0.1:9");
        let err = client.login().await.unwrap_err();

        assert!(matches!(err, TurboError::Transport(_)));
    }

    #[test]
    fn test_token_debug_redacted() {
        let token = AuthToken("tok-123".to_string());
        assert_eq!(format!("{:?}", token), "AuthToken(***)");
    }

    #[test]
    fn test_excerpt_truncates() {
        let long = "x".repeat(1000);
        assert_eq!(excerpt(&long).len(), ERROR_BODY_LIMIT);
        assert_eq!(excerpt("  short  "), "short");
    }
}
