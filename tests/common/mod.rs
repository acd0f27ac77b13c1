#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, Bytes, to_bytes},
    http::{HeaderMap, Method, Request, StatusCode, header},
};
use chrono::{Duration, Utc};
use futures::{TryStreamExt, stream};
use std::{
    collections::{BTreeMap, BTreeSet},
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration as StdDuration,
};
use storage_gateway::{
    services::{
        provider::{ByteStream, Credential, ProviderError, ProviderResult, StorageProvider},
        registry::ProviderRegistry,
    },
    state::AppState,
};
use tower::ServiceExt;

pub const VALID_TOKEN: &str = "access-xyz";
pub const VALID_CODE: &str = "good-code";

/// In-memory provider: files keyed by normalized path, directories implied.
pub struct FakeProvider {
    name: &'static str,
    files: Mutex<BTreeMap<String, Vec<u8>>>,
    validate_calls: AtomicUsize,
}

impl FakeProvider {
    pub fn named(name: &'static str) -> Arc<Self> {
        Arc::new(Self {
            name,
            files: Mutex::new(BTreeMap::new()),
            validate_calls: AtomicUsize::new(0),
        })
    }

    pub fn with_file(self: Arc<Self>, path: &str, content: &[u8]) -> Arc<Self> {
        self.files
            .lock()
            .unwrap()
            .insert(normalize(path), content.to_vec());
        self
    }

    pub fn file(&self, path: &str) -> Option<Vec<u8>> {
        self.files.lock().unwrap().get(&normalize(path)).cloned()
    }

    pub fn validate_calls(&self) -> usize {
        self.validate_calls.load(Ordering::SeqCst)
    }

    fn check(&self, token: &str) -> ProviderResult<()> {
        if token == VALID_TOKEN {
            Ok(())
        } else {
            Err(ProviderError::Unauthorized)
        }
    }

    fn is_dir(&self, path: &str) -> bool {
        if path.is_empty() {
            return true;
        }
        let prefix = format!("{}/", path);
        self.files.lock().unwrap().keys().any(|k| k.starts_with(&prefix))
    }
}

fn normalize(path: &str) -> String {
    path.split('/')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

#[async_trait]
impl StorageProvider for FakeProvider {
    fn name(&self) -> &str {
        self.name
    }

    fn auth_url(&self, state: &str) -> String {
        format!("https://{}.example/oauth?client_id=test&state={}", self.name, state)
    }

    async fn validate(&self, code: &str) -> ProviderResult<Credential> {
        self.validate_calls.fetch_add(1, Ordering::SeqCst);
        if code != VALID_CODE {
            return Err(ProviderError::CodeExchange("invalid_grant".into()));
        }
        Ok(Credential {
            access_token: VALID_TOKEN.into(),
            expiry: Some(Utc::now() + Duration::hours(1)),
        })
    }

    async fn add(&self, token: &str, path: &str, body: ByteStream) -> ProviderResult<()> {
        self.check(token)?;
        let chunks: Vec<Bytes> = body.try_collect().await?;
        self.files
            .lock()
            .unwrap()
            .insert(normalize(path), chunks.concat());
        Ok(())
    }

    async fn browse(&self, token: &str, path: &str) -> ProviderResult<Vec<String>> {
        self.check(token)?;
        let path = normalize(path);
        if self.file(&path).is_some() {
            return Err(ProviderError::NotADirectory(path));
        }
        if !self.is_dir(&path) {
            return Err(ProviderError::NotFound(path));
        }
        let prefix = if path.is_empty() {
            String::new()
        } else {
            format!("{}/", path)
        };
        let names: BTreeSet<String> = self
            .files
            .lock()
            .unwrap()
            .keys()
            .filter_map(|k| k.strip_prefix(&prefix))
            .filter_map(|rest| rest.split('/').next())
            .map(str::to_string)
            .collect();
        Ok(names.into_iter().collect())
    }

    async fn delete(&self, token: &str, path: &str) -> ProviderResult<()> {
        self.check(token)?;
        self.files
            .lock()
            .unwrap()
            .remove(&normalize(path))
            .map(drop)
            .ok_or_else(|| ProviderError::Api("not found".into()))
    }

    async fn publish(&self, token: &str, path: &str) -> ProviderResult<String> {
        self.check(token)?;
        let path = normalize(path);
        if self.file(&path).is_none() {
            return Err(ProviderError::NotFound(path));
        }
        Ok(format!("https://share.example/{}", path))
    }

    async fn read(&self, token: &str, path: &str) -> ProviderResult<Option<ByteStream>> {
        self.check(token)?;
        let path = normalize(path);
        if let Some(content) = self.file(&path) {
            let (head, tail) = content.split_at(content.len() / 2);
            let chunks: Vec<std::io::Result<Bytes>> = vec![
                Ok(Bytes::copy_from_slice(head)),
                Ok(Bytes::copy_from_slice(tail)),
            ];
            return Ok(Some(Box::pin(stream::iter(chunks))));
        }
        if self.is_dir(&path) {
            return Ok(None);
        }
        Err(ProviderError::NotFound(path))
    }
}

pub fn app_with(providers: &[Arc<FakeProvider>]) -> Router {
    let mut registry = ProviderRegistry::new();
    for provider in providers {
        registry.register(provider.clone()).unwrap();
    }
    storage_gateway::app(AppState::new(registry, "google", StdDuration::from_secs(600)))
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    pub fn text(&self) -> &str {
        std::str::from_utf8(&self.body).unwrap()
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap()
    }

    pub fn set_cookies(&self) -> Vec<String> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect()
    }
}

pub async fn send(app: &Router, request: Request<Body>) -> TestResponse {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    TestResponse {
        status,
        headers,
        body,
    }
}

pub fn request(
    method: Method,
    uri: &str,
    cookie: Option<&str>,
    body: impl Into<Body>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(body.into()).unwrap()
}

pub fn session() -> Option<&'static str> {
    Some("token=access-xyz")
}
