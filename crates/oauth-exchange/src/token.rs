//! Token endpoint client for the authorization-code grant

use credential_core::{CredentialError, Result, SecretString};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error};

/// Fields of the token endpoint's JSON response that the flow reads
#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<u64>,
    #[serde(default)]
    scope: Option<String>,
}

/// Tokens issued for an authorization code
#[derive(Debug)]
pub struct TokenGrant {
    pub access_token: Option<SecretString>,
    pub refresh_token: SecretString,
    pub expires_in: Option<u64>,
    pub scope: Option<String>,
}

/// Form body of the code exchange
#[derive(Debug)]
pub struct CodeExchange<'a> {
    pub client_id: &'a str,
    pub client_secret: &'a str,
    pub code: &'a str,
    pub redirect_uri: &'a str,
}

/// Blocking client for one token endpoint
#[derive(Debug, Clone)]
pub struct TokenClient {
    http: Client,
    token_url: String,
}

impl TokenClient {
    pub fn new(token_url: impl Into<String>) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| CredentialError::NetworkError(format!("cannot build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            token_url: token_url.into(),
        })
    }

    pub fn token_url(&self) -> &str {
        &self.token_url
    }

    /// Send exactly one exchange request; no retries.
    ///
    /// Succeeds only for HTTP 200 with a non-empty `refresh_token`. Any other
    /// status comes back as `TokenEndpointError` with the body verbatim.
    pub fn exchange_code(&self, exchange: &CodeExchange<'_>) -> Result<TokenGrant> {
        let form = [
            ("client_id", exchange.client_id),
            ("client_secret", exchange.client_secret),
            ("code", exchange.code),
            ("grant_type", "authorization_code"),
            ("redirect_uri", exchange.redirect_uri),
        ];

        debug!("Posting authorization code to {}", self.token_url);
        let response = self
            .http
            .post(&self.token_url)
            .form(&form)
            .send()
            .map_err(|e| CredentialError::NetworkError(format!("{}: {}", self.token_url, e)))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| CredentialError::NetworkError(format!("reading response body: {}", e)))?;

        if status != StatusCode::OK {
            error!("Token exchange failed with status {}: {}", status, body);
            return Err(CredentialError::TokenEndpointError {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: TokenResponse = serde_json::from_str(&body).map_err(|e| {
            CredentialError::ParseError(format!("token response ({}): {}", e, body))
        })?;

        match parsed.refresh_token.filter(|token| !token.is_empty()) {
            Some(refresh_token) => Ok(TokenGrant {
                access_token: parsed.access_token.map(SecretString::new),
                refresh_token: SecretString::new(refresh_token),
                expires_in: parsed.expires_in,
                scope: parsed.scope,
            }),
            None => Err(CredentialError::MissingRefreshToken {
                body: redact_tokens(&body),
            }),
        }
    }
}

/// The response body with bearer tokens blanked out; everything else kept
fn redact_tokens(body: &str) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(mut object)) => {
            for field in ["access_token", "id_token", "refresh_token"] {
                if let Some(value) = object.get_mut(field) {
                    *value = Value::String("[REDACTED]".to_string());
                }
            }
            Value::Object(object).to_string()
        }
        _ => body.to_string(),
    }
}
