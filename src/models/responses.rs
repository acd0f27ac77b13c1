//! JSON bodies returned by the handlers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::services::provider::Credential;

/// Body of `GET /auth/{provider}/url`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AuthUrlResponse {
    pub url: String,
}

/// Body of `GET /browse/{*filepath}`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct BrowseResponse {
    pub file_list: Vec<String>,
}

/// Body of `POST /publish/{*filepath}`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PublishResponse {
    pub url: String,
}

/// Body of a successful `/auth/validate`.
///
/// `expiry` is omitted when the provider did not report a lifetime.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ValidateResponse {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<DateTime<Utc>>,
}

impl From<Credential> for ValidateResponse {
    fn from(credential: Credential) -> Self {
        Self {
            access_token: credential.access_token,
            expiry: credential.expiry,
        }
    }
}
