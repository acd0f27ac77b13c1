//! Google Drive as a [`StorageProvider`].

use async_trait::async_trait;

use super::{
    auth::{GoogleAuth, OAuthConfig},
    client::DriveClient,
};
use crate::services::provider::{
    ByteStream, Credential, ProviderError, ProviderResult, StorageProvider,
};

pub const PROVIDER_NAME: &str = "google";

pub struct GoogleDriveProvider {
    auth: GoogleAuth,
    drive: DriveClient,
}

impl GoogleDriveProvider {
    pub fn new(config: &OAuthConfig) -> ProviderResult<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("storage-gateway/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_client(GoogleAuth::new(config)?, DriveClient::new(http)))
    }

    pub fn with_client(auth: GoogleAuth, drive: DriveClient) -> Self {
        Self { auth, drive }
    }
}

/// Split `path` into its parent path and final segment.
fn split_parent(path: &str) -> Option<(&str, &str)> {
    let trimmed = path.trim_end_matches('/');
    match trimmed.rsplit_once('/') {
        Some((parent, name)) if !name.is_empty() => Some((parent, name)),
        None if !trimmed.is_empty() => Some(("", trimmed)),
        _ => None,
    }
}

#[async_trait]
impl StorageProvider for GoogleDriveProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn auth_url(&self, state: &str) -> String {
        self.auth.authorize_url(state)
    }

    async fn validate(&self, code: &str) -> ProviderResult<Credential> {
        self.auth.exchange_code(code).await
    }

    async fn add(&self, token: &str, path: &str, body: ByteStream) -> ProviderResult<()> {
        let (parent_path, name) =
            split_parent(path).ok_or_else(|| ProviderError::IsADirectory("/".into()))?;

        let parent = self.drive.resolve(token, parent_path).await?;
        if !parent.is_folder() {
            return Err(ProviderError::NotADirectory(parent_path.to_string()));
        }

        match self.drive.find_child(token, &parent.id, name).await? {
            Some(existing) if existing.is_folder() => {
                Err(ProviderError::IsADirectory(path.to_string()))
            }
            Some(existing) => {
                tracing::debug!("replacing content of drive file {}", existing.id);
                self.drive.update_content(token, &existing.id, body).await?;
                Ok(())
            }
            None => {
                let created = self.drive.create_file(token, &parent.id, name, body).await?;
                tracing::debug!("created drive file {} for {}", created.id, path);
                Ok(())
            }
        }
    }

    async fn browse(&self, token: &str, path: &str) -> ProviderResult<Vec<String>> {
        let folder = self.drive.resolve(token, path).await?;
        if !folder.is_folder() {
            return Err(ProviderError::NotADirectory(path.to_string()));
        }
        let children = self.drive.list_children(token, &folder.id).await?;
        Ok(children.into_iter().map(|file| file.name).collect())
    }

    async fn delete(&self, token: &str, path: &str) -> ProviderResult<()> {
        let file = self.drive.resolve(token, path).await?;
        if file.id == "root" {
            return Err(ProviderError::Forbidden);
        }
        self.drive.delete(token, &file.id).await
    }

    async fn publish(&self, token: &str, path: &str) -> ProviderResult<String> {
        let file = self.drive.resolve(token, path).await?;
        if file.id == "root" {
            return Err(ProviderError::Forbidden);
        }
        self.drive.share_with_anyone(token, &file.id).await?;

        let shared = self.drive.get_file(token, &file.id).await?;
        shared
            .web_view_link
            .or(shared.web_content_link)
            .ok_or_else(|| ProviderError::Api(format!("no sharing link for {}", path)))
    }

    async fn read(&self, token: &str, path: &str) -> ProviderResult<Option<ByteStream>> {
        let file = self.drive.resolve(token, path).await?;
        if file.is_folder() {
            return Ok(None);
        }
        self.drive.download(token, &file.id).await.map(Some)
    }
}
