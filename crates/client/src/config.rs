use std::time::Duration;

/// Errors raised while loading [`ClientConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{var} is invalid: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Endpoints and HTTP settings for every backend the app talks to.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// OIDC issuer, e.g. `https://sso.example.com/realms/app`.
    pub auth_issuer: String,
    pub auth_client_id: String,
    pub auth_redirect_uri: String,
    pub bpms_url: String,
    pub signature_url: String,
    pub cloud_url: String,
    pub notifications_url: String,
    /// Per-request timeout (default: 30 s).
    pub request_timeout: Duration,
}

/// Default redirect URI registered for the mobile app.
pub const DEFAULT_REDIRECT_URI: &str = "signdesk://auth/callback";

/// Default HTTP request timeout in seconds.
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var                         | Required | Default                    |
    /// |---------------------------------|----------|----------------------------|
    /// | `SIGNDESK_AUTH_ISSUER`          | **yes**  | --                         |
    /// | `SIGNDESK_AUTH_CLIENT_ID`       | **yes**  | --                         |
    /// | `SIGNDESK_AUTH_REDIRECT_URI`    | no       | `signdesk://auth/callback` |
    /// | `SIGNDESK_BPMS_URL`             | **yes**  | --                         |
    /// | `SIGNDESK_SIGNATURE_URL`        | **yes**  | --                         |
    /// | `SIGNDESK_CLOUD_URL`            | **yes**  | --                         |
    /// | `SIGNDESK_NOTIFICATIONS_URL`    | **yes**  | --                         |
    /// | `SIGNDESK_REQUEST_TIMEOUT_SECS` | no       | `30`                       |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |var: &'static str| -> Result<String, ConfigError> {
            lookup(var)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::Missing(var))
        };
        let base_url = |var: &'static str| -> Result<String, ConfigError> {
            let url = required(var)?;
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::Invalid {
                    var,
                    reason: format!("expected an http(s) URL, got '{url}'"),
                });
            }
            Ok(url.trim_end_matches('/').to_string())
        };

        let request_timeout_secs = match lookup("SIGNDESK_REQUEST_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|e| ConfigError::Invalid {
                var: "SIGNDESK_REQUEST_TIMEOUT_SECS",
                reason: e.to_string(),
            })?,
            None => DEFAULT_REQUEST_TIMEOUT_SECS,
        };

        Ok(Self {
            auth_issuer: base_url("SIGNDESK_AUTH_ISSUER")?,
            auth_client_id: required("SIGNDESK_AUTH_CLIENT_ID")?,
            auth_redirect_uri: lookup("SIGNDESK_AUTH_REDIRECT_URI")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_REDIRECT_URI.to_string()),
            bpms_url: base_url("SIGNDESK_BPMS_URL")?,
            signature_url: base_url("SIGNDESK_SIGNATURE_URL")?,
            cloud_url: base_url("SIGNDESK_CLOUD_URL")?,
            notifications_url: base_url("SIGNDESK_NOTIFICATIONS_URL")?,
            request_timeout: Duration::from_secs(request_timeout_secs),
        })
    }

    /// Point every backend at one base URL. Used by tests and local stacks.
    pub fn single_host(base_url: &str, client_id: &str) -> Self {
        let base = base_url.trim_end_matches('/').to_string();
        Self {
            auth_issuer: base.clone(),
            auth_client_id: client_id.to_string(),
            auth_redirect_uri: DEFAULT_REDIRECT_URI.to_string(),
            bpms_url: base.clone(),
            signature_url: base.clone(),
            cloud_url: base.clone(),
            notifications_url: base,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}
