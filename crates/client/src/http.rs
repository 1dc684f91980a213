//! Authenticated HTTP plumbing shared by every service client.

use reqwest::{IntoUrl, Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use signdesk_core::session::SessionContext;

use crate::error::{ApiError, ApiResult};
use crate::response::{ApiResponse, PaginatedResponse};

/// Base URL + bearer-token request builder for one backend.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    base_url: String,
    session: SessionContext,
}

impl HttpClient {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>, session: SessionContext) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Base URL with `segments` appended as percent-encoded path segments.
    pub fn segment_url(&self, segments: &[&str]) -> ApiResult<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|err| ApiError::InvalidUrl(format!("{}: {err}", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Start a request on a fixed path carrying `Authorization: Bearer <accessToken>`.
    pub fn request(&self, method: Method, path: &str) -> ApiResult<RequestBuilder> {
        self.authorized(method, self.url(path))
    }

    /// Like [`request`](Self::request), with caller-supplied ids escaped so
    /// they cannot change the route.
    pub fn request_at(&self, method: Method, segments: &[&str]) -> ApiResult<RequestBuilder> {
        let url = self.segment_url(segments)?;
        self.authorized(method, url)
    }

    fn authorized(&self, method: Method, url: impl IntoUrl) -> ApiResult<RequestBuilder> {
        let token = self
            .session
            .access_token()
            .map_err(|_| ApiError::Unauthenticated)?;
        Ok(self.client.request(method, url).bearer_auth(token))
    }

    /// Send and unwrap an `ApiResponse<T>` body.
    pub async fn send_content<T: DeserializeOwned>(&self, request: RequestBuilder) -> ApiResult<T> {
        let envelope: ApiResponse<T> = self.send_json(request).await?;
        Ok(envelope.content)
    }

    /// Send and decode a paginated body.
    pub async fn send_page<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> ApiResult<PaginatedResponse<T>> {
        self.send_json(request).await
    }

    /// Send and decode the raw JSON body.
    pub async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> ApiResult<T> {
        let bytes = self.send_bytes(request).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Send, check the status and return the raw body.
    pub async fn send_bytes(&self, request: RequestBuilder) -> ApiResult<Vec<u8>> {
        let response = Self::ensure_success(request.send().await?).await?;
        Ok(response.bytes().await?.to_vec())
    }

    /// Send and discard the body.
    pub async fn send_empty(&self, request: RequestBuilder) -> ApiResult<()> {
        Self::ensure_success(request.send().await?).await?;
        Ok(())
    }

    /// Map non-2xx responses to [`ApiError`]. 401 becomes
    /// [`ApiError::Unauthenticated`] and 404 [`ApiError::NotFound`].
    async fn ensure_success(response: Response) -> ApiResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let path = response.url().path().to_string();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        tracing::error!(status = status.as_u16(), path = %path, "Backend request failed");

        Err(match status {
            StatusCode::UNAUTHORIZED => ApiError::Unauthenticated,
            StatusCode::NOT_FOUND => ApiError::NotFound(path),
            _ => ApiError::Api {
                status: status.as_u16(),
                body,
            },
        })
    }
}
