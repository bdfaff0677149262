use crate::config::Config;
use crate::error::{google_calendar_error, AssistantResult};
use chrono::Utc;
use reqwest::Client;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Google OAuth token endpoint
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

#[derive(Clone)]
pub struct TokenManager {
    config: Arc<RwLock<Config>>,
    token_url: String,
    client: Client,
}

impl TokenManager {
    pub fn new(config: Arc<RwLock<Config>>) -> Self {
        Self {
            config,
            token_url: GOOGLE_TOKEN_URL.to_string(),
            client: Client::new(),
        }
    }

    /// Override the token endpoint, used by tests
    pub fn with_token_url(mut self, url: &str) -> Self {
        self.token_url = url.to_string();
        self
    }

    /// Get OAuth token, either from the token file or by refreshing an expired one
    pub async fn get_token(&self) -> AssistantResult<Value> {
        let token_path = {
            let config_read = self.config.read().await;
            config_read.google_token_path.clone()
        };

        let token_str = fs::read_to_string(&token_path).map_err(|_| {
            google_calendar_error(&format!(
                "No token file at '{}'. Run the get_google_token binary first.",
                token_path
            ))
        })?;

        let token: Value = serde_json::from_str(&token_str)
            .map_err(|e| google_calendar_error(&format!("Failed to parse token JSON: {}", e)))?;

        // Check if token is expired
        if let Some(expiry) = token.get("expires_at").and_then(|v| v.as_i64()) {
            let now = Utc::now().timestamp();
            if expiry > now {
                return Ok(token);
            }
            // Token is expired, refresh it
            return self.refresh_token(&token, &token_path).await;
        }

        Err(google_calendar_error(
            "Token file has no expiry. Run the get_google_token binary again.",
        ))
    }

    /// Refresh an expired token and persist the result
    async fn refresh_token(&self, token: &Value, token_path: &str) -> AssistantResult<Value> {
        let refresh_token = token
            .get("refresh_token")
            .and_then(|v| v.as_str())
            .ok_or_else(|| google_calendar_error("No refresh token in token data"))?;

        let client_id = {
            let config_read = self.config.read().await;
            config_read.google_client_id.clone()
        };

        let client_secret = {
            let config_read = self.config.read().await;
            config_read.google_client_secret.clone()
        };

        let params = [
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("refresh_token", refresh_token.to_string()),
            ("grant_type", "refresh_token".to_string()),
        ];

        let response = self
            .client
            .post(&self.token_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| google_calendar_error(&format!("Failed to refresh token: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(google_calendar_error(&format!(
                "Failed to refresh token: HTTP {} - {}",
                status, error_body
            )));
        }

        let new_token: Value = response
            .json()
            .await
            .map_err(|e| google_calendar_error(&format!("Failed to parse token response: {}", e)))?;

        // Check for required fields
        if new_token.get("access_token").is_none() {
            return Err(google_calendar_error(
                "Token response missing 'access_token' field",
            ));
        }

        // Combine new access token with existing refresh token
        let mut token_data = serde_json::Map::new();
        token_data.insert(
            "access_token".to_string(),
            new_token.get("access_token").cloned().unwrap_or(Value::Null),
        );
        token_data.insert("refresh_token".to_string(), json!(refresh_token));

        // Calculate expiry
        let expires_in = new_token
            .get("expires_in")
            .and_then(|v| v.as_i64())
            .unwrap_or(3600);
        let expires_at = Utc::now().timestamp() + expires_in;
        token_data.insert("expires_at".to_string(), json!(expires_at));

        let token_json = json!(token_data);
        write_token_file(token_path, &token_json)?;

        Ok(token_json)
    }

    /// Persist a token obtained from the authorization flow
    pub async fn set_token(&self, token_json: Value) -> AssistantResult<()> {
        let token_path = {
            let config_read = self.config.read().await;
            config_read.google_token_path.clone()
        };
        write_token_file(&token_path, &token_json)
    }
}

fn write_token_file(token_path: &str, token_json: &Value) -> AssistantResult<()> {
    // Create the parent directory if the path has one
    if let Some(parent) = Path::new(token_path).parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }

    fs::write(token_path, token_json.to_string())
        .map_err(|e| google_calendar_error(&format!("Failed to save token file: {}", e)))?;

    Ok(())
}
