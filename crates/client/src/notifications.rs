//! Notifications backend.

use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::error::ApiResult;
use crate::http::HttpClient;
use crate::response::{PageRequest, PaginatedResponse};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub read: bool,
    #[serde(default)]
    pub created_at: Option<String>,
}

pub struct NotificationClient {
    http: HttpClient,
}

impl NotificationClient {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    pub async fn search(&self, page: PageRequest) -> ApiResult<PaginatedResponse<Notification>> {
        let request = self
            .http
            .request(Method::GET, "/notifications/search")?
            .query(&page);
        self.http.send_page(request).await
    }

    pub async fn mark_as_read(&self, id: &str) -> ApiResult<()> {
        let request = self
            .http
            .request_at(Method::PATCH, &["notifications", id, "mark-as-read"])?;
        self.http.send_empty(request).await
    }

    pub async fn mark_all_as_read(&self) -> ApiResult<()> {
        let request = self
            .http
            .request(Method::PATCH, "/notifications/mark-all-as-read")?;
        self.http.send_empty(request).await?;
        tracing::info!("All notifications marked as read");
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> ApiResult<()> {
        let request = self
            .http
            .request_at(Method::DELETE, &["notifications", id])?;
        self.http.send_empty(request).await?;
        tracing::info!(notification_id = id, "Notification deleted");
        Ok(())
    }
}
