//! Google Drive backend: OAuth2 code flow plus a thin Drive v3 client.

pub mod auth;
pub mod client;
pub mod provider;

pub use auth::{GoogleAuth, OAuthConfig};
pub use client::DriveClient;
pub use provider::{GoogleDriveProvider, PROVIDER_NAME};
