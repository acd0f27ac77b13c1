//! Minimal Google Drive v3 REST client.
//!
//! Every call is authorized with the caller's own access token; the client
//! holds no credentials of its own.

use bytes::Bytes;
use futures::{StreamExt, stream};
use reqwest::{Body, Client, Response, StatusCode, header};
use serde::{Deserialize, de::DeserializeOwned};
use std::io;

use crate::services::provider::{ByteStream, ProviderError, ProviderResult};

pub const DRIVE_API_BASE: &str = "https://www.googleapis.com/drive/v3";
pub const DRIVE_UPLOAD_BASE: &str = "https://www.googleapis.com/upload/drive/v3";

const FOLDER_MIME: &str = "application/vnd.google-apps.folder";
const FILE_FIELDS: &str = "id,name,mimeType,webViewLink,webContentLink";
const MULTIPART_BOUNDARY: &str = "storage_gateway_boundary";

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub mime_type: String,
    #[serde(default)]
    pub web_view_link: Option<String>,
    #[serde(default)]
    pub web_content_link: Option<String>,
}

impl DriveFile {
    /// The `root` alias Drive accepts for the user's top-level folder.
    pub fn root() -> Self {
        Self {
            id: "root".into(),
            name: String::new(),
            mime_type: FOLDER_MIME.into(),
            web_view_link: None,
            web_content_link: None,
        }
    }

    pub fn is_folder(&self) -> bool {
        self.mime_type == FOLDER_MIME
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileList {
    #[serde(default)]
    files: Vec<DriveFile>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

#[derive(Clone)]
pub struct DriveClient {
    http: Client,
    api_base: String,
    upload_base: String,
}

impl DriveClient {
    pub fn new(http: Client) -> Self {
        Self::with_base_urls(http, DRIVE_API_BASE, DRIVE_UPLOAD_BASE)
    }

    pub fn with_base_urls(
        http: Client,
        api_base: impl Into<String>,
        upload_base: impl Into<String>,
    ) -> Self {
        Self {
            http,
            api_base: api_base.into(),
            upload_base: upload_base.into(),
        }
    }

    /// Resolve a `/`-separated path to its Drive file by walking from `root`.
    ///
    /// Empty segments are ignored, so `""`, `"/"` and `"a//b/"` are valid.
    pub async fn resolve(&self, token: &str, path: &str) -> ProviderResult<DriveFile> {
        let mut current = DriveFile::root();
        for segment in split_path(path) {
            current = self
                .find_child(token, &current.id, segment)
                .await?
                .ok_or_else(|| ProviderError::NotFound(display_path(path)))?;
        }
        Ok(current)
    }

    /// Look up a non-trashed child of `parent_id` by exact name.
    pub async fn find_child(
        &self,
        token: &str,
        parent_id: &str,
        name: &str,
    ) -> ProviderResult<Option<DriveFile>> {
        let query = format!(
            "name = '{}' and '{}' in parents and trashed = false",
            escape_query(name),
            escape_query(parent_id)
        );
        let fields = format!("files({})", FILE_FIELDS);

        let response = self
            .http
            .get(format!("{}/files", self.api_base))
            .bearer_auth(token)
            .query(&[
                ("q", query.as_str()),
                ("fields", fields.as_str()),
                ("pageSize", "1"),
            ])
            .send()
            .await?;

        let list: FileList = handle_response(response).await?;
        Ok(list.files.into_iter().next())
    }

    /// All non-trashed children of `folder_id`, following pagination.
    pub async fn list_children(
        &self,
        token: &str,
        folder_id: &str,
    ) -> ProviderResult<Vec<DriveFile>> {
        let query = format!("'{}' in parents and trashed = false", escape_query(folder_id));
        let fields = format!("files({}),nextPageToken", FILE_FIELDS);
        let mut files = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .http
                .get(format!("{}/files", self.api_base))
                .bearer_auth(token)
                .query(&[
                    ("q", query.as_str()),
                    ("fields", fields.as_str()),
                    ("pageSize", "1000"),
                    ("orderBy", "folder,name"),
                ]);
            if let Some(page) = &page_token {
                request = request.query(&[("pageToken", page.as_str())]);
            }

            let list: FileList = handle_response(request.send().await?).await?;
            files.extend(list.files);

            match list.next_page_token {
                Some(next) => page_token = Some(next),
                None => break,
            }
        }

        Ok(files)
    }

    pub async fn get_file(&self, token: &str, file_id: &str) -> ProviderResult<DriveFile> {
        let response = self
            .http
            .get(format!("{}/files/{}", self.api_base, file_id))
            .bearer_auth(token)
            .query(&[("fields", FILE_FIELDS)])
            .send()
            .await?;
        handle_response(response).await
    }

    /// Create `name` under `parent_id` with a multipart upload whose media part
    /// is streamed straight from `body`.
    pub async fn create_file(
        &self,
        token: &str,
        parent_id: &str,
        name: &str,
        body: ByteStream,
    ) -> ProviderResult<DriveFile> {
        let metadata = serde_json::json!({ "name": name, "parents": [parent_id] });
        let head = format!(
            "--{b}\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n{meta}\r\n\
             --{b}\r\nContent-Type: application/octet-stream\r\n\r\n",
            b = MULTIPART_BOUNDARY,
            meta = metadata
        );
        let tail = format!("\r\n--{}--", MULTIPART_BOUNDARY);

        let multipart = stream::iter([Ok::<_, io::Error>(Bytes::from(head))])
            .chain(body)
            .chain(stream::iter([Ok(Bytes::from(tail))]));

        let response = self
            .http
            .post(format!("{}/files", self.upload_base))
            .bearer_auth(token)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/related; boundary={}", MULTIPART_BOUNDARY),
            )
            .query(&[("uploadType", "multipart"), ("fields", FILE_FIELDS)])
            .body(Body::wrap_stream(multipart))
            .send()
            .await?;
        handle_response(response).await
    }

    /// Replace the content of an existing file.
    pub async fn update_content(
        &self,
        token: &str,
        file_id: &str,
        body: ByteStream,
    ) -> ProviderResult<DriveFile> {
        let response = self
            .http
            .patch(format!("{}/files/{}", self.upload_base, file_id))
            .bearer_auth(token)
            .header(header::CONTENT_TYPE, "application/octet-stream")
            .query(&[("uploadType", "media"), ("fields", FILE_FIELDS)])
            .body(Body::wrap_stream(body))
            .send()
            .await?;
        handle_response(response).await
    }

    pub async fn delete(&self, token: &str, file_id: &str) -> ProviderResult<()> {
        let response = self
            .http
            .delete(format!("{}/files/{}", self.api_base, file_id))
            .bearer_auth(token)
            .send()
            .await?;
        check_status(response).await.map(drop)
    }

    /// Grant read access to anyone holding the link.
    pub async fn share_with_anyone(&self, token: &str, file_id: &str) -> ProviderResult<()> {
        let response = self
            .http
            .post(format!("{}/files/{}/permissions", self.api_base, file_id))
            .bearer_auth(token)
            .json(&serde_json::json!({ "role": "reader", "type": "anyone" }))
            .send()
            .await?;
        check_status(response).await.map(drop)
    }

    /// Stream the content of a file.
    pub async fn download(&self, token: &str, file_id: &str) -> ProviderResult<ByteStream> {
        let response = self
            .http
            .get(format!("{}/files/{}", self.api_base, file_id))
            .bearer_auth(token)
            .query(&[("alt", "media")])
            .send()
            .await?;
        let response = check_status(response).await?;

        let stream = response.bytes_stream().map(|chunk| chunk.map_err(io::Error::other));
        Ok(Box::pin(stream))
    }
}

fn split_path(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|segment| !segment.is_empty())
}

fn display_path(path: &str) -> String {
    split_path(path).collect::<Vec<_>>().join("/")
}

/// Escape a value for use inside a single-quoted Drive query literal.
fn escape_query(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

async fn handle_response<T: DeserializeOwned>(response: Response) -> ProviderResult<T> {
    let response = check_status(response).await?;
    Ok(response.json().await?)
}

async fn check_status(response: Response) -> ProviderResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    match status {
        StatusCode::UNAUTHORIZED => Err(ProviderError::Unauthorized),
        StatusCode::FORBIDDEN => Err(ProviderError::Forbidden),
        StatusCode::NOT_FOUND => Err(ProviderError::NotFound("file".into())),
        _ => {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorEnvelope>(&body)
                .map(|envelope| envelope.error.message)
                .unwrap_or(body);
            Err(ProviderError::Api(format!("drive API error {}: {}", status, message)))
        }
    }
}
