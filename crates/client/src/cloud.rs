//! Cloud storage backend: folders and files.

use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::error::ApiResult;
use crate::http::HttpClient;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub parent_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloudFile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub folder_id: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateFolder<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parent_id: Option<&'a str>,
}

/// Body shared by the folder and file `change-parent` endpoints.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeParent<'a> {
    pub ids_to_change: [&'a str; 1],
    pub new_folder_id: &'a str,
}

#[derive(Serialize)]
struct Rename<'a> {
    name: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FolderQuery<'a> {
    parent_id: &'a str,
}

pub struct CloudClient {
    http: HttpClient,
}

impl CloudClient {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    pub async fn create_folder(&self, name: &str, parent_id: Option<&str>) -> ApiResult<Folder> {
        let request = self
            .http
            .request(Method::POST, "/folders")?
            .json(&CreateFolder { name, parent_id });
        let folder: Folder = self.http.send_content(request).await?;
        tracing::info!(folder_id = %folder.id, "Folder created");
        Ok(folder)
    }

    /// Folders under `parent_id`, or the root folders when `None`.
    pub async fn list_folders(&self, parent_id: Option<&str>) -> ApiResult<Vec<Folder>> {
        let mut request = self.http.request(Method::GET, "/folders")?;
        if let Some(parent_id) = parent_id {
            request = request.query(&FolderQuery { parent_id });
        }
        self.http.send_content(request).await
    }

    pub async fn rename_folder(&self, id: &str, name: &str) -> ApiResult<()> {
        let request = self
            .http
            .request_at(Method::PATCH, &["folders", id, "rename"])?
            .query(&[("nameFolder", name)]);
        self.http.send_empty(request).await
    }

    pub async fn move_folder(&self, id: &str, new_folder_id: &str) -> ApiResult<()> {
        self.change_parent("/folders/change-parent", id, new_folder_id)
            .await
    }

    pub async fn rename_file(&self, id: &str, name: &str) -> ApiResult<()> {
        let request = self
            .http
            .request_at(Method::PATCH, &["files", id, "rename"])?
            .json(&Rename { name });
        self.http.send_empty(request).await
    }

    pub async fn move_file(&self, id: &str, new_folder_id: &str) -> ApiResult<()> {
        self.change_parent("/files/change-parent", id, new_folder_id)
            .await
    }

    async fn change_parent(&self, path: &str, id: &str, new_folder_id: &str) -> ApiResult<()> {
        let request = self
            .http
            .request(Method::PUT, path)?
            .json(&ChangeParent {
                ids_to_change: [id],
                new_folder_id,
            });
        self.http.send_empty(request).await?;
        tracing::info!(id, new_folder_id, path, "Moved item");
        Ok(())
    }
}
