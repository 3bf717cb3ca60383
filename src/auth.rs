//! Google OAuth 2.0 authorization-code flow.
//!
//! Sign-in is gated on the account email ending with the configured domain;
//! Google is only used to prove ownership of the address.

use serde::{Deserialize, Serialize};

use crate::config::GoogleConfig;
use crate::DynError;

pub const AUTHORIZE_URL: &str = "https://accounts.google.com/o/oauth2/auth";
pub const TOKEN_URL: &str = "https://accounts.google.com/o/oauth2/token";
pub const USERINFO_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";

const SCOPE: &str = "email profile";

/// Token endpoint response; fields we do not use are ignored
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
}

/// Subset of the userinfo endpoint response kept on the session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfo {
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub picture: String,
}

/// Build the authorization URL the browser is redirected to
pub fn build_authorize_url(google: &GoogleConfig, state: &str) -> String {
    format!(
        "{}?response_type=code&client_id={}&redirect_uri={}&scope={}&state={}",
        AUTHORIZE_URL,
        urlencoding::encode(&google.client_id),
        urlencoding::encode(&google.redirect_uri),
        urlencoding::encode(SCOPE),
        urlencoding::encode(state),
    )
}

/// Exchange an authorization code for an access token
pub async fn exchange_code(
    client: &reqwest::Client,
    google: &GoogleConfig,
    code: &str,
) -> Result<TokenResponse, DynError> {
    let params = [
        ("grant_type", "authorization_code"),
        ("code", code),
        ("client_id", google.client_id.as_str()),
        ("client_secret", google.client_secret.as_str()),
        ("redirect_uri", google.redirect_uri.as_str()),
    ];

    let response = client.post(TOKEN_URL).form(&params).send().await?;
    if !response.status().is_success() {
        return Err(format!("Token endpoint returned {}", response.status()).into());
    }

    Ok(response.json().await?)
}

/// Fetch the signed-in account's profile
pub async fn fetch_userinfo(
    client: &reqwest::Client,
    access_token: &str,
) -> Result<UserInfo, DynError> {
    let response = client
        .get(USERINFO_URL)
        .bearer_auth(access_token)
        .send()
        .await?;
    if !response.status().is_success() {
        return Err(format!("Userinfo endpoint returned {}", response.status()).into());
    }

    Ok(response.json().await?)
}

/// Check an account email against the configured domain suffix
pub fn email_allowed(email: &str, email_domain: &str) -> bool {
    email.ends_with(email_domain)
}
