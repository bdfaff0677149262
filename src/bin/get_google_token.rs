use agendita::components::google_calendar::token::TokenManager;
use agendita::config::Config;
use agendita::error::{other_error, AssistantResult};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::RwLock;
use url::Url;

const REDIRECT_URI: &str = "http://localhost:8080";
const AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Scopes for inserting calendar events and sending mail
const SCOPES: &str =
    "https://www.googleapis.com/auth/calendar.events https://www.googleapis.com/auth/gmail.send";

#[tokio::main]
async fn main() -> AssistantResult<()> {
    // Load configuration
    let config = Config::load()?;
    let config = Arc::new(RwLock::new(config));

    // Create token manager
    let token_manager = TokenManager::new(config.clone());

    // Get client ID and secret
    let client_id = config.read().await.google_client_id.clone();
    let client_secret = config.read().await.google_client_secret.clone();

    // Generate random state for security
    let state = uuid::Uuid::new_v4().to_string();

    // Construct authorization URL
    let mut auth_url = Url::parse(AUTH_URL)
        .map_err(|e| other_error(&format!("Invalid authorization URL: {}", e)))?;
    auth_url
        .query_pairs_mut()
        .append_pair("client_id", &client_id)
        .append_pair("redirect_uri", REDIRECT_URI)
        .append_pair("response_type", "code")
        .append_pair("access_type", "offline")
        .append_pair("prompt", "consent")
        .append_pair("scope", SCOPES)
        .append_pair("state", &state);

    // Open browser for authorization
    println!("Autoriza el acceso a Google Calendar y Gmail en tu navegador:");
    println!("{}", auth_url);
    if webbrowser::open(auth_url.as_str()).is_err() {
        println!("No se pudo abrir el navegador, copia el enlace manualmente.");
    }

    // Start local server to receive the callback
    let server = tiny_http::Server::http("0.0.0.0:8080")
        .map_err(|e| other_error(&format!("Failed to start local server: {}", e)))?;
    println!("Esperando la autorización...");

    // Handle the callback
    let request = server.recv()?;
    let url = request.url().to_string();

    // Parse the authorization code from the URL
    let code =
        query_param(&url, "code").ok_or_else(|| other_error("No authorization code in callback"))?;

    // Verify the state parameter matches what we sent
    let returned_state =
        query_param(&url, "state").ok_or_else(|| other_error("No state parameter in callback"))?;
    if returned_state != state {
        return Err(other_error("State mismatch in authorization callback"));
    }

    // Exchange code for tokens
    let client = reqwest::Client::new();
    let response = client
        .post(TOKEN_URL)
        .form(&[
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("code", code),
            ("redirect_uri", REDIRECT_URI.to_string()),
            ("grant_type", "authorization_code".to_string()),
        ])
        .send()
        .await
        .map_err(|e| other_error(&format!("Token request failed: {}", e)))?;

    if !response.status().is_success() {
        let error_text = response
            .text()
            .await
            .map_err(|e| other_error(&format!("Could not read error response: {}", e)))?;
        return Err(other_error(&format!("Failed to get token: {}", error_text)));
    }

    let mut token_data: serde_json::Value = response
        .json()
        .await
        .map_err(|e| other_error(&format!("Failed to parse token response: {}", e)))?;

    // Add expiry timestamp
    let expires_in = token_data
        .get("expires_in")
        .and_then(|v| v.as_i64())
        .unwrap_or(3600);
    let expires_at = chrono::Utc::now().timestamp() + expires_in;

    let token_data = if let Some(obj) = token_data.as_object_mut() {
        obj.insert("expires_at".to_string(), json!(expires_at));
        token_data
    } else {
        return Err(other_error("Token data is not an object"));
    };

    // Save token using TokenManager
    token_manager.set_token(token_data).await?;

    // Send success response to browser
    let response =
        tiny_http::Response::from_string("¡Autorización exitosa! Ya puedes cerrar esta ventana.");
    request.respond(response)?;

    let token_path = config.read().await.google_token_path.clone();
    println!("Token guardado en {}", token_path);

    Ok(())
}

/// Extract a single, percent-decoded query parameter from a callback URL
fn query_param(url: &str, key: &str) -> Option<String> {
    // tiny_http hands over only the path and query of the request
    let url = Url::parse(&format!("http://localhost{}", url)).ok()?;
    url.query_pairs()
        .find(|(name, _)| name == key)
        .map(|(_, value)| value.into_owned())
}

#[cfg(test)]
mod tests {
    use super::query_param;

    #[test]
    fn test_query_param_decodes_values() {
        let callback = "/?state=abc-123&code=4%2F0AfJohXnI&scope=email+profile";

        assert_eq!(query_param(callback, "code").as_deref(), Some("4/0AfJohXnI"));
        assert_eq!(query_param(callback, "state").as_deref(), Some("abc-123"));
        assert_eq!(query_param(callback, "missing"), None);
        assert_eq!(query_param("/", "code"), None);
    }
}
