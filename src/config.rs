use anyhow::{Context, Result};
use clap::Parser;
use std::{env, time::Duration};

use crate::services::gdrive::OAuthConfig;

const ENV_PREFIX: &str = "STORAGE_GATEWAY_";

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub default_provider: String,
    pub state_ttl: Duration,
    pub google_client_id: Option<String>,
    pub google_client_secret: Option<String>,
    pub google_redirect_url: String,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug, Default)]
#[command(author, version, about = "HTTP gateway to cloud storage providers")]
pub struct Args {
    /// Host to bind to (overrides STORAGE_GATEWAY_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides STORAGE_GATEWAY_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Provider used when a session has no `provider` cookie
    /// (overrides STORAGE_GATEWAY_DEFAULT_PROVIDER)
    #[arg(long)]
    pub default_provider: Option<String>,

    /// Lifetime of issued OAuth state tokens in seconds (overrides STORAGE_GATEWAY_STATE_TTL_SECS)
    #[arg(long)]
    pub state_ttl_secs: Option<u64>,

    /// Google OAuth2 client id (overrides STORAGE_GATEWAY_GOOGLE_CLIENT_ID)
    #[arg(long)]
    pub google_client_id: Option<String>,

    /// Google OAuth2 redirect URL (overrides STORAGE_GATEWAY_GOOGLE_REDIRECT_URL)
    #[arg(long)]
    pub google_redirect_url: Option<String>,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig.
    pub fn from_env_and_args() -> Result<Self> {
        Self::from_sources(Args::parse(), |key| env::var(key).ok())
    }

    /// Merge CLI args over values found through `lookup`, which receives the
    /// full environment variable name.
    ///
    /// The client secret is deliberately environment-only so it never shows
    /// up in process listings.
    pub fn from_sources(args: Args, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |name: &str| lookup(&format!("{}{}", ENV_PREFIX, name));

        let env_port = match var("PORT") {
            Some(value) => value
                .parse::<u16>()
                .with_context(|| format!("parsing {}PORT value `{}`", ENV_PREFIX, value))?,
            None => 3000,
        };
        let env_ttl = match var("STATE_TTL_SECS") {
            Some(value) => value.parse::<u64>().with_context(|| {
                format!("parsing {}STATE_TTL_SECS value `{}`", ENV_PREFIX, value)
            })?,
            None => 600,
        };
        let port = args.port.unwrap_or(env_port);

        let cfg = Self {
            host: args
                .host
                .or_else(|| var("HOST"))
                .unwrap_or_else(|| "0.0.0.0".into()),
            port,
            default_provider: args
                .default_provider
                .or_else(|| var("DEFAULT_PROVIDER"))
                .unwrap_or_else(|| "google".into()),
            state_ttl: Duration::from_secs(args.state_ttl_secs.unwrap_or(env_ttl)),
            google_client_id: args
                .google_client_id
                .or_else(|| var("GOOGLE_CLIENT_ID"))
                .filter(|v| !v.is_empty()),
            google_client_secret: var("GOOGLE_CLIENT_SECRET").filter(|v| !v.is_empty()),
            google_redirect_url: args
                .google_redirect_url
                .or_else(|| var("GOOGLE_REDIRECT_URL"))
                .unwrap_or_else(|| format!("http://localhost:{}/auth/validate", port)),
        };

        Ok(cfg)
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Google OAuth2 client settings, if both id and secret are configured.
    pub fn google_oauth(&self) -> Option<OAuthConfig> {
        Some(OAuthConfig {
            client_id: self.google_client_id.clone()?,
            client_secret: self.google_client_secret.clone()?,
            redirect_url: self.google_redirect_url.clone(),
            token_url: None,
        })
    }
}
