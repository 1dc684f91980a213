//! OAuth2 authorization-code login against the OIDC provider.
//!
//! The app opens [`OidcClient::authorization_url`] in the browser, receives
//! the `code` on its redirect URI and calls [`OidcClient::exchange_code`].
//! Redirects can be delivered more than once, so every code is remembered and
//! a repeated code is refused before it reaches the token endpoint.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{Duration, Utc};
use serde::Deserialize;
use signdesk_core::session::{AuthTokens, SessionContext, UserProfile};

use crate::config::ClientConfig;

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Token-endpoint failures, classified for distinct user messages.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("authorization code is invalid")]
    InvalidCode,

    #[error("authorization code has expired")]
    ExpiredCode,

    #[error("authorization code was already exchanged")]
    DuplicateCode,

    #[error("session can no longer be refreshed")]
    SessionExpired,

    #[error("identity provider error ({status}): {error}")]
    Provider {
        status: u16,
        error: String,
        description: Option<String>,
    },

    #[error("invalid issuer URL: {0}")]
    InvalidIssuer(String),

    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
}

impl AuthError {
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidCode => "The sign-in link is no longer valid. Please sign in again.",
            Self::ExpiredCode => "The sign-in took too long and expired. Please try again.",
            Self::DuplicateCode => "This sign-in was already processed.",
            Self::SessionExpired => "Your session has expired. Please sign in again.",
            Self::Provider { .. } | Self::InvalidIssuer(_) => {
                "The identity provider could not complete the sign-in. Try again later."
            }
            Self::Request(_) => "Could not reach the identity provider. Check your connection.",
        }
        .to_string()
    }
}

#[derive(Debug, Default, Deserialize)]
struct ProviderErrorBody {
    #[serde(default)]
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// Classify a token-endpoint error response.
///
/// `invalid_grant` means the code (or refresh token) was rejected; its
/// description tells expired codes apart from otherwise invalid ones.
pub fn classify_token_error(status: u16, body: &str) -> AuthError {
    let parsed: ProviderErrorBody = serde_json::from_str(body).unwrap_or_default();
    if parsed.error == "invalid_grant" {
        let expired = parsed
            .error_description
            .as_deref()
            .is_some_and(|d| d.to_lowercase().contains("expired"));
        return if expired {
            AuthError::ExpiredCode
        } else {
            AuthError::InvalidCode
        };
    }
    AuthError::Provider {
        status,
        error: if parsed.error.is_empty() {
            "unknown_error".to_string()
        } else {
            parsed.error
        },
        description: parsed.error_description,
    }
}

// ---------------------------------------------------------------------------
// Token payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    id_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
}

impl TokenResponse {
    fn into_tokens(self) -> AuthTokens {
        AuthTokens {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            id_token: self.id_token,
            expires_at: self.expires_in.map(|secs| Utc::now() + Duration::seconds(secs)),
        }
    }
}

#[derive(Debug, Deserialize)]
struct IdTokenClaims {
    sub: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    preferred_username: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    cpf: Option<String>,
}

/// Read the profile claims of an ID token. The signature is not checked;
/// the token came straight from the token endpoint over TLS.
pub fn profile_from_id_token(id_token: &str) -> Option<UserProfile> {
    let payload = id_token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    let claims: IdTokenClaims = serde_json::from_slice(&bytes).ok()?;
    Some(UserProfile {
        name: claims
            .name
            .or(claims.preferred_username)
            .unwrap_or_default(),
        email: claims.email.unwrap_or_default(),
        cpf: claims.cpf,
        id: claims.sub,
    })
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

pub struct OidcClient {
    client: reqwest::Client,
    issuer: String,
    client_id: String,
    redirect_uri: String,
    session: SessionContext,
    seen_codes: Mutex<HashSet<String>>,
}

impl OidcClient {
    pub fn new(client: reqwest::Client, config: &ClientConfig, session: SessionContext) -> Self {
        Self {
            client,
            issuer: config.auth_issuer.trim_end_matches('/').to_string(),
            client_id: config.auth_client_id.clone(),
            redirect_uri: config.auth_redirect_uri.clone(),
            session,
            seen_codes: Mutex::new(HashSet::new()),
        }
    }

    fn endpoint(&self, name: &str) -> String {
        format!("{}/protocol/openid-connect/{name}", self.issuer)
    }

    /// URL of the provider's login page for this app.
    pub fn authorization_url(&self, state: &str) -> Result<reqwest::Url, AuthError> {
        reqwest::Url::parse_with_params(
            &self.endpoint("auth"),
            &[
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("response_type", "code"),
                ("scope", "openid"),
                ("state", state),
            ],
        )
        .map_err(|e| AuthError::InvalidIssuer(e.to_string()))
    }

    /// Record a code; `false` when it was seen before.
    fn remember_code(&self, code: &str) -> bool {
        self.seen_codes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(code.to_string())
    }

    /// Exchange an authorization code and start the session.
    pub async fn exchange_code(&self, code: &str) -> Result<AuthTokens, AuthError> {
        let code = code.trim();
        if code.is_empty() {
            return Err(AuthError::InvalidCode);
        }
        if !self.remember_code(code) {
            tracing::warn!("Ignoring an authorization code that was already exchanged");
            return Err(AuthError::DuplicateCode);
        }

        let form = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("client_id", self.client_id.as_str()),
            ("redirect_uri", self.redirect_uri.as_str()),
        ];
        let tokens = self.request_tokens(&form).await?;

        let profile = tokens.id_token.as_deref().and_then(profile_from_id_token);
        self.session.login(tokens.clone(), profile);
        tracing::info!("Authorization code exchanged");
        Ok(tokens)
    }

    /// Refresh the session's tokens.
    pub async fn refresh(&self) -> Result<AuthTokens, AuthError> {
        let refresh_token = self.session.refresh_token().ok_or(AuthError::SessionExpired)?;
        let form = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token.as_str()),
            ("client_id", self.client_id.as_str()),
        ];
        let mut tokens = match self.request_tokens(&form).await {
            Ok(tokens) => tokens,
            Err(AuthError::InvalidCode | AuthError::ExpiredCode) => {
                self.session.logout();
                return Err(AuthError::SessionExpired);
            }
            Err(other) => return Err(other),
        };
        // Providers without rotation omit the refresh token.
        if tokens.refresh_token.is_none() {
            tokens.refresh_token = Some(refresh_token);
        }
        self.session.update_tokens(tokens.clone());
        Ok(tokens)
    }

    /// Clear the local session and end it at the provider.
    ///
    /// The local session is cleared even if the provider call fails.
    pub async fn logout(&self) -> Result<(), AuthError> {
        let Some(refresh_token) = self.session.logout().and_then(|t| t.refresh_token) else {
            return Ok(());
        };
        let form = [
            ("client_id", self.client_id.as_str()),
            ("refresh_token", refresh_token.as_str()),
        ];
        let response = self
            .client
            .post(self.endpoint("logout"))
            .form(&form)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "Provider rejected logout");
            return Err(classify_token_error(status.as_u16(), &body));
        }
        Ok(())
    }

    async fn request_tokens(&self, form: &[(&str, &str)]) -> Result<AuthTokens, AuthError> {
        let response = self
            .client
            .post(self.endpoint("token"))
            .form(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = classify_token_error(status.as_u16(), &body);
            tracing::error!(status = status.as_u16(), error = %err, "Token request failed");
            return Err(err);
        }

        let body: TokenResponse = response.json().await?;
        Ok(body.into_tokens())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn invalid_grant_with_expiry_is_expired_code() {
        let err = classify_token_error(
            400,
            r#"{"error":"invalid_grant","error_description":"Code Expired"}"#,
        );
        assert_matches!(err, AuthError::ExpiredCode);
    }

    #[test]
    fn invalid_grant_otherwise_is_invalid_code() {
        let err = classify_token_error(
            400,
            r#"{"error":"invalid_grant","error_description":"Code not valid"}"#,
        );
        assert_matches!(err, AuthError::InvalidCode);
    }

    #[test]
    fn other_errors_are_provider_errors() {
        let err = classify_token_error(401, r#"{"error":"unauthorized_client"}"#);
        assert_matches!(err, AuthError::Provider { status: 401, ref error, .. } if error == "unauthorized_client");
    }

    #[test]
    fn unparseable_body_is_provider_error() {
        let err = classify_token_error(502, "<html>bad gateway</html>");
        assert_matches!(err, AuthError::Provider { status: 502, .. });
    }

    #[test]
    fn each_reason_has_a_distinct_message() {
        let messages: HashSet<String> = [
            AuthError::InvalidCode,
            AuthError::ExpiredCode,
            AuthError::DuplicateCode,
            AuthError::SessionExpired,
            AuthError::Provider {
                status: 500,
                error: "x".into(),
                description: None,
            },
        ]
        .iter()
        .map(AuthError::user_message)
        .collect();
        assert_eq!(messages.len(), 5);
    }

    #[test]
    fn reads_profile_from_id_token() {
        let claims = serde_json::json!({
            "sub": "user-1",
            "preferred_username": "ana",
            "email": "ana@example.com"
        });
        let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims).unwrap());
        let token = format!("e30.{payload}.sig");

        let profile = profile_from_id_token(&token).unwrap();
        assert_eq!(profile.id, "user-1");
        assert_eq!(profile.name, "ana");
        assert_eq!(profile.email, "ana@example.com");
    }

    #[test]
    fn malformed_id_token_has_no_profile() {
        assert!(profile_from_id_token("not-a-jwt").is_none());
        assert!(profile_from_id_token("a.!!!.c").is_none());
    }

    #[test]
    fn authorization_url_carries_client_and_redirect() {
        let config = ClientConfig::single_host("https://sso.example.com/realms/app", "mobile");
        let client = OidcClient::new(reqwest::Client::new(), &config, SessionContext::new());
        let url = client.authorization_url("xyz").unwrap();
        assert_eq!(url.path(), "/realms/app/protocol/openid-connect/auth");
        let query = url.query().unwrap();
        assert!(query.contains("client_id=mobile"));
        assert!(query.contains("response_type=code"));
        assert!(query.contains("state=xyz"));
    }
}
