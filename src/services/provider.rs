//! The storage-provider seam.
//!
//! Every handler talks to a backend exclusively through [`StorageProvider`].
//! Implementations own authentication against their backend, path semantics
//! and transport; the HTTP layer only forwards the session token and the
//! path it was given.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::Stream;
use std::{io, pin::Pin};
use thiserror::Error;

/// Streamed file content flowing in (upload) or out (read) of a provider.
pub type ByteStream = Pin<Box<dyn Stream<Item = io::Result<Bytes>> + Send>>;

/// Credential obtained by exchanging an OAuth2 authorization code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub access_token: String,
    pub expiry: Option<DateTime<Utc>>,
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("{0} is not a directory")]
    NotADirectory(String),
    #[error("{0} is a directory")]
    IsADirectory(String),
    #[error("invalid or expired token")]
    Unauthorized,
    #[error("access denied")]
    Forbidden,
    #[error("authorization code rejected: {0}")]
    CodeExchange(String),
    /// Error reported by the backend, surfaced verbatim.
    #[error("{0}")]
    Api(String),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type ProviderResult<T> = Result<T, ProviderError>;

/// A named storage backend reachable through OAuth2.
///
/// `token` is the opaque session credential taken from the caller's cookie and
/// `path` an opaque `/`-separated location; an empty path is the root.
#[async_trait]
pub trait StorageProvider: Send + Sync {
    /// Registry key, e.g. `"google"`.
    fn name(&self) -> &str;

    /// Authorization URL the user is sent to, carrying `state` for the callback.
    fn auth_url(&self, state: &str) -> String;

    /// Exchange an authorization code for an access token.
    async fn validate(&self, code: &str) -> ProviderResult<Credential>;

    /// Write `body` to `path`, creating or replacing the file.
    async fn add(&self, token: &str, path: &str, body: ByteStream) -> ProviderResult<()>;

    /// Names of the entries directly below `path`.
    async fn browse(&self, token: &str, path: &str) -> ProviderResult<Vec<String>>;

    async fn delete(&self, token: &str, path: &str) -> ProviderResult<()>;

    /// Make `path` publicly readable and return its sharing URL.
    async fn publish(&self, token: &str, path: &str) -> ProviderResult<String>;

    /// Content of `path`, or `None` when there is nothing to stream (e.g. a folder).
    async fn read(&self, token: &str, path: &str) -> ProviderResult<Option<ByteStream>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_errors_are_surfaced_verbatim() {
        let err = ProviderError::Api("not found".into());
        assert_eq!(err.to_string(), "not found");
    }

    #[test]
    fn path_errors_name_the_path() {
        assert_eq!(
            ProviderError::NotFound("docs/a.txt".into()).to_string(),
            "docs/a.txt not found"
        );
        assert_eq!(
            ProviderError::NotADirectory("a.txt".into()).to_string(),
            "a.txt is not a directory"
        );
    }
}
