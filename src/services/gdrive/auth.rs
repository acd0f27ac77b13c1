//! OAuth2 authorization-code flow against Google's endpoints.

use chrono::{Duration, Utc};
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, EndpointNotSet, EndpointSet,
    RedirectUrl, Scope, TokenResponse, TokenUrl, basic::BasicClient,
};

use crate::services::provider::{Credential, ProviderError, ProviderResult};

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const DRIVE_SCOPE: &str = "https://www.googleapis.com/auth/drive";

type GoogleClient =
    BasicClient<EndpointSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

/// Client credentials registered with Google.
#[derive(Debug, Clone)]
pub struct OAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_url: String,
    /// Overrides Google's token endpoint (tests).
    pub token_url: Option<String>,
}

pub struct GoogleAuth {
    client: GoogleClient,
    http: oauth2::reqwest::Client,
}

impl GoogleAuth {
    pub fn new(config: &OAuthConfig) -> ProviderResult<Self> {
        let token_url = config.token_url.as_deref().unwrap_or(GOOGLE_TOKEN_URL);
        let client = BasicClient::new(ClientId::new(config.client_id.clone()))
            .set_client_secret(ClientSecret::new(config.client_secret.clone()))
            .set_auth_uri(
                AuthUrl::new(GOOGLE_AUTH_URL.to_string())
                    .map_err(|e| ProviderError::Api(format!("invalid auth URL: {}", e)))?,
            )
            .set_token_uri(
                TokenUrl::new(token_url.to_string())
                    .map_err(|e| ProviderError::Api(format!("invalid token URL: {}", e)))?,
            )
            .set_redirect_uri(
                RedirectUrl::new(config.redirect_url.clone())
                    .map_err(|e| ProviderError::Api(format!("invalid redirect URL: {}", e)))?,
            );

        // Token endpoints must not be followed through redirects.
        let http = oauth2::reqwest::ClientBuilder::new()
            .redirect(oauth2::reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self { client, http })
    }

    /// Authorization URL carrying the caller-issued `state`.
    pub fn authorize_url(&self, state: &str) -> String {
        let state = state.to_string();
        let (url, _) = self
            .client
            .authorize_url(move || CsrfToken::new(state))
            .add_scope(Scope::new(DRIVE_SCOPE.to_string()))
            .add_extra_param("access_type", "online")
            .url();
        url.to_string()
    }

    pub async fn exchange_code(&self, code: &str) -> ProviderResult<Credential> {
        let token = self
            .client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .request_async(&self.http)
            .await
            .map_err(|e| ProviderError::CodeExchange(e.to_string()))?;

        let expiry = token
            .expires_in()
            .and_then(|d| Duration::from_std(d).ok())
            .map(|d| Utc::now() + d);

        Ok(Credential {
            access_token: token.access_token().secret().clone(),
            expiry,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn config(token_url: Option<String>) -> OAuthConfig {
        OAuthConfig {
            client_id: "client-123".into(),
            client_secret: "secret".into(),
            redirect_url: "http://localhost:3000/auth/validate".into(),
            token_url,
        }
    }

    #[test]
    fn authorize_url_carries_state_and_client() {
        let auth = GoogleAuth::new(&config(None)).unwrap();
        let url = Url::parse(&auth.authorize_url("abc123")).unwrap();

        assert_eq!(url.host_str(), Some("accounts.google.com"));
        let query: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        let get = |key: &str| {
            query
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
        };
        assert_eq!(get("state"), Some("abc123"));
        assert_eq!(get("client_id"), Some("client-123"));
        assert_eq!(get("response_type"), Some("code"));
        assert_eq!(get("scope"), Some(DRIVE_SCOPE));
        assert_eq!(
            get("redirect_uri"),
            Some("http://localhost:3000/auth/validate")
        );
    }

    #[test]
    fn invalid_redirect_url_is_rejected() {
        let mut cfg = config(None);
        cfg.redirect_url = "not a url".into();
        assert!(GoogleAuth::new(&cfg).is_err());
    }

    #[tokio::test]
    async fn exchange_code_returns_access_token_and_expiry() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/token")
            .match_body(mockito::Matcher::UrlEncoded("code".into(), "good-code".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token":"ya29.token","token_type":"Bearer","expires_in":3599}"#)
            .create_async()
            .await;

        let auth = GoogleAuth::new(&config(Some(format!("{}/token", server.url())))).unwrap();
        let credential = auth.exchange_code("good-code").await.unwrap();

        mock.assert_async().await;
        assert_eq!(credential.access_token, "ya29.token");
        let expiry = credential.expiry.expect("expiry reported");
        assert!(expiry > Utc::now() + Duration::minutes(55));
    }

    #[tokio::test]
    async fn rejected_code_maps_to_code_exchange_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/token")
            .with_status(400)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error":"invalid_grant","error_description":"Bad Request"}"#)
            .create_async()
            .await;

        let auth = GoogleAuth::new(&config(Some(format!("{}/token", server.url())))).unwrap();
        let err = auth.exchange_code("bad-code").await.unwrap_err();
        assert!(matches!(err, ProviderError::CodeExchange(_)));
    }
}
