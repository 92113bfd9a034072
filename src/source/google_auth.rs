use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;
use chrono::{DateTime, Utc};
use crate::storage::config::GoogleConfig;

const TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
const REDIRECT_URI: &str = "http://localhost:8080";
const CALENDAR_SCOPE: &str = "https://www.googleapis.com/auth/calendar";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Failed to read token file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Failed to parse token: {0}")]
    ParseError(#[from] serde_json::Error),
    #[error("Token has expired")]
    TokenExpired,
    #[error("No refresh token available")]
    NoRefreshToken,
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("OAuth error: {0}")]
    OAuthError(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TokenInfo {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub token_type: String,
}

impl TokenInfo {
    pub fn new(access_token: String, expires_in_seconds: i64) -> Self {
        Self {
            access_token,
            refresh_token: None,
            expires_at: Utc::now() + chrono::Duration::seconds(expires_in_seconds),
            token_type: "Bearer".to_string(),
        }
    }

    pub fn with_refresh_token(mut self, refresh_token: String) -> Self {
        self.refresh_token = Some(refresh_token);
        self
    }

    pub fn is_valid(&self) -> bool {
        self.expires_at > Utc::now()
    }
}

pub struct TokenStorage {
    path: PathBuf,
}

impl TokenStorage {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn save_token(&self, token: &TokenInfo) -> Result<(), AuthError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(token)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }

    pub fn load_token(&self) -> Result<TokenInfo, AuthError> {
        let content = std::fs::read_to_string(&self.path)?;
        let token: TokenInfo = serde_json::from_str(&content)?;
        Ok(token)
    }

    /// Five minute margin so a token never expires mid-request.
    pub fn needs_refresh(&self, token: &TokenInfo) -> bool {
        let buffer = chrono::Duration::minutes(5);
        token.expires_at <= Utc::now() + buffer
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
    refresh_token: Option<String>,
}

pub struct GoogleAuthenticator {
    config: GoogleConfig,
    storage: TokenStorage,
    token_endpoint: String,
    client: reqwest::Client,
}

impl GoogleAuthenticator {
    pub fn new(config: GoogleConfig) -> Self {
        let storage = TokenStorage::new(config.token_cache.clone());

        Self {
            config,
            storage,
            token_endpoint: TOKEN_ENDPOINT.to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn with_token_endpoint(mut self, endpoint: String) -> Self {
        self.token_endpoint = endpoint;
        self
    }

    /// Cached token, refreshed first when it is inside the expiry margin.
    pub async fn get_valid_token(&self) -> Result<TokenInfo, AuthError> {
        let token = self.storage.load_token()?;

        if self.storage.needs_refresh(&token) {
            if token.refresh_token.is_some() {
                return self.refresh_token(&token).await;
            }
            if !token.is_valid() {
                return Err(AuthError::TokenExpired);
            }
        }

        Ok(token)
    }

    pub async fn refresh_token(&self, token: &TokenInfo) -> Result<TokenInfo, AuthError> {
        let refresh_token = token.refresh_token.as_ref()
            .ok_or(AuthError::NoRefreshToken)?;

        tracing::info!("Refreshing calendar access token");

        let params = [
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("refresh_token", refresh_token.as_str()),
            ("grant_type", "refresh_token"),
        ];

        let token_response = self.request_token(&params).await?;

        let new_token = TokenInfo::new(token_response.access_token, token_response.expires_in)
            .with_refresh_token(refresh_token.clone());

        self.storage.save_token(&new_token)?;

        Ok(new_token)
    }

    pub fn get_auth_url(&self) -> String {
        format!(
            "https://accounts.google.com/o/oauth2/v2/auth?client_id={}&redirect_uri={}&response_type=code&scope={}&access_type=offline&prompt=consent",
            urlencoding::encode(&self.config.client_id),
            urlencoding::encode(REDIRECT_URI),
            urlencoding::encode(CALENDAR_SCOPE)
        )
    }

    pub async fn exchange_code_for_token(&self, code: &str) -> Result<TokenInfo, AuthError> {
        let params = [
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("code", code),
            ("redirect_uri", REDIRECT_URI),
            ("grant_type", "authorization_code"),
        ];

        let token_response = self.request_token(&params).await?;

        let new_token = TokenInfo::new(token_response.access_token, token_response.expires_in)
            .with_refresh_token(
                token_response.refresh_token
                    .ok_or(AuthError::NoRefreshToken)?
            );

        self.storage.save_token(&new_token)?;

        Ok(new_token)
    }

    async fn request_token(&self, params: &[(&str, &str)]) -> Result<TokenResponse, AuthError> {
        let response = self.client
            .post(&self.token_endpoint)
            .form(params)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await?;
            tracing::error!("Token endpoint rejected request: {}", error_text);
            return Err(AuthError::OAuthError(error_text));
        }

        Ok(response.json().await?)
    }

    pub fn print_auth_instructions(&self) {
        println!("\n=== Venue Calendar Authentication ===\n");
        println!("To let the booking calendar read and write venue events:");
        println!("1. Visit this URL in your browser:\n");
        println!("{}\n", self.get_auth_url());
        println!("2. Sign in with the venue account and authorize the application");
        println!("3. After authorizing, you'll be redirected to localhost:8080");
        println!("4. Copy the 'code' parameter from the URL");
        println!("5. Paste it when prompted\n");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;
    use wiremock::matchers::{body_string_contains, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn create_test_token() -> TokenInfo {
        TokenInfo::new("test_access_token".to_string(), 3600)
    }

    fn create_expired_token() -> TokenInfo {
        TokenInfo {
            access_token: "expired_token".to_string(),
            refresh_token: Some("refresh_token".to_string()),
            expires_at: Utc::now() - chrono::Duration::hours(1),
            token_type: "Bearer".to_string(),
        }
    }

    fn config_with_cache(temp_dir: &TempDir) -> GoogleConfig {
        GoogleConfig {
            client_id: "client".to_string(),
            client_secret: "secret".to_string(),
            token_cache: temp_dir.path().join("token.json"),
            ..GoogleConfig::default()
        }
    }

    #[test]
    fn new_token_is_valid() {
        assert!(create_test_token().is_valid());
    }

    #[test]
    fn expired_token_is_not_valid() {
        assert!(!create_expired_token().is_valid());
    }

    #[test]
    fn load_token_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let storage = TokenStorage::new(temp_dir.path().join("token.json"));
        let original_token = create_test_token()
            .with_refresh_token("refresh".to_string());

        storage.save_token(&original_token).unwrap();
        let loaded_token = storage.load_token().unwrap();

        assert_eq!(loaded_token, original_token);
    }

    #[test]
    fn load_nonexistent_token_returns_error() {
        let temp_dir = TempDir::new().unwrap();
        let storage = TokenStorage::new(temp_dir.path().join("nonexistent.json"));

        assert!(matches!(storage.load_token(), Err(AuthError::ReadError(_))));
    }

    #[test]
    fn needs_refresh_detects_soon_to_expire_token() {
        let storage = TokenStorage::new(PathBuf::from("/tmp/token.json"));
        let token = TokenInfo {
            access_token: "token".to_string(),
            refresh_token: Some("refresh".to_string()),
            expires_at: Utc::now() + chrono::Duration::minutes(3),
            token_type: "Bearer".to_string(),
        };

        assert!(storage.needs_refresh(&token));
        assert!(!storage.needs_refresh(&create_test_token()));
    }

    #[test]
    fn auth_url_requests_offline_calendar_access() {
        let temp_dir = TempDir::new().unwrap();
        let auth = GoogleAuthenticator::new(config_with_cache(&temp_dir));

        let url = auth.get_auth_url();

        assert!(url.contains("client_id=client"));
        assert!(url.contains("access_type=offline"));
        assert!(url.contains(&*urlencoding::encode(CALENDAR_SCOPE)));
    }

    #[tokio::test]
    async fn fresh_cached_token_is_returned_without_refresh() {
        let temp_dir = TempDir::new().unwrap();
        let config = config_with_cache(&temp_dir);
        TokenStorage::new(config.token_cache.clone())
            .save_token(&create_test_token())
            .unwrap();

        let token = GoogleAuthenticator::new(config)
            .with_token_endpoint("http://127.0.0.1:9/unused".to_string())
            .get_valid_token()
            .await
            .unwrap();

        assert_eq!(token.access_token, "test_access_token");
    }

    #[tokio::test]
    async fn expired_token_is_refreshed_and_cached() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string_contains("grant_type=refresh_token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "renewed",
                "expires_in": 3600,
                "token_type": "Bearer"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let temp_dir = TempDir::new().unwrap();
        let config = config_with_cache(&temp_dir);
        let storage = TokenStorage::new(config.token_cache.clone());
        storage.save_token(&create_expired_token()).unwrap();

        let token = GoogleAuthenticator::new(config)
            .with_token_endpoint(format!("{}/token", server.uri()))
            .get_valid_token()
            .await
            .unwrap();

        assert_eq!(token.access_token, "renewed");
        assert_eq!(token.refresh_token.as_deref(), Some("refresh_token"));
        assert_eq!(storage.load_token().unwrap().access_token, "renewed");
    }

    #[tokio::test]
    async fn expired_token_without_refresh_token_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let config = config_with_cache(&temp_dir);
        let mut token = create_expired_token();
        token.refresh_token = None;
        TokenStorage::new(config.token_cache.clone()).save_token(&token).unwrap();

        let result = GoogleAuthenticator::new(config).get_valid_token().await;

        assert!(matches!(result, Err(AuthError::TokenExpired)));
    }

    #[tokio::test]
    async fn rejected_refresh_surfaces_oauth_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_string("invalid_grant"))
            .mount(&server)
            .await;

        let temp_dir = TempDir::new().unwrap();
        let auth = GoogleAuthenticator::new(config_with_cache(&temp_dir))
            .with_token_endpoint(server.uri());

        let result = auth.refresh_token(&create_expired_token()).await;

        assert!(matches!(result, Err(AuthError::OAuthError(msg)) if msg == "invalid_grant"));
    }
}
