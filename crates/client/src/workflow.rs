//! Workflow (BPMS) backend: flows, their form fields, and task creation.

use reqwest::multipart::{Form, Part};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use signdesk_core::form::{SubmissionBundle, TaskFormField};

use crate::error::ApiResult;
use crate::http::HttpClient;
use crate::response::{PageRequest, PaginatedResponse};

/// A workflow the current user may open tasks on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flow {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub released_at: Option<String>,
}

impl Flow {
    /// Drafts come back without a release date and cannot receive tasks.
    pub fn is_released(&self) -> bool {
        self.released_at
            .as_deref()
            .is_some_and(|at| !at.trim().is_empty())
    }
}

/// Identifier the backend returns for a created task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedTask {
    pub id: String,
}

pub struct WorkflowClient {
    http: HttpClient,
}

impl WorkflowClient {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    /// One page of flows the user can open, drafts removed.
    ///
    /// Pagination metadata is the backend's; `content` may be shorter than
    /// `page_size` after filtering.
    pub async fn list_released_flows(&self, page: PageRequest) -> ApiResult<PaginatedResponse<Flow>> {
        let request = self
            .http
            .request(Method::GET, "/flows-me/opened-by")?
            .query(&page);
        let mut flows: PaginatedResponse<Flow> = self.http.send_page(request).await?;
        let before = flows.content.len();
        flows.content.retain(Flow::is_released);
        tracing::debug!(
            page = page.page_number,
            kept = flows.content.len(),
            dropped = before - flows.content.len(),
            "Listed flows"
        );
        Ok(flows)
    }

    /// Form schema declared by a flow.
    pub async fn flow_fields(&self, flow_id: &str) -> ApiResult<Vec<TaskFormField>> {
        let request = self
            .http
            .request_at(Method::GET, &["flows", flow_id, "fields"])?;
        self.http.send_content(request).await
    }

    /// Create a task: a JSON `request` part plus one `files` part per attachment.
    pub async fn create_task(&self, bundle: &SubmissionBundle) -> ApiResult<CreatedTask> {
        let json = serde_json::to_vec(&bundle.request)?;
        let mut form = Form::new().part(
            "request",
            Part::bytes(json).mime_str("application/json")?,
        );
        for item in &bundle.attachments {
            let file = &item.attachment;
            let part = Part::bytes(file.bytes.clone())
                .file_name(file.file_name.clone())
                .mime_str(&file.content_type)?;
            form = form.part("files", part);
        }

        let request = self.http.request(Method::POST, "/tasks")?.multipart(form);
        let task: CreatedTask = self.http.send_content(request).await?;
        tracing::info!(
            task_id = %task.id,
            flow_id = %bundle.request.flow_id,
            files = bundle.attachments.len(),
            "Task created"
        );
        Ok(task)
    }
}
