use chrono_tz::Tz;
use serde::Deserialize;
use std::path::Path;

use crate::DynError;

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_submission_cooldown() -> i64 {
    10
}

/// Listener address configuration (maps to [server] section in TOML)
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Address to bind (default: 127.0.0.1)
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on (default: 3000)
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Application settings (maps to [app] section in TOML)
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// SHA-512 hex digest of the admin API token (see the hash-token subcommand)
    pub api_token_sha512: String,
    /// Accounts must end with this domain to sign in (e.g. "@example.edu")
    pub email_domain: String,
    /// IANA timezone used to pick the page color scheme (e.g. "Europe/Vilnius")
    pub timezone: String,
    /// Minimum minutes between song submissions per user (default: 10)
    #[serde(default = "default_submission_cooldown")]
    pub submission_cooldown_minutes: i64,
}

/// Google OAuth client settings (maps to [google] section in TOML)
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleConfig {
    pub client_id: String,
    pub client_secret: String,
    /// Must match the redirect URI registered with the OAuth client,
    /// e.g. "http://localhost:3000/authorize"
    pub redirect_uri: String,
}

/// Top-level configuration file structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    pub app: AppConfig,
    pub google: GoogleConfig,
}

impl Config {
    /// Load and validate a config file (TOML format)
    pub fn load(path: &Path) -> Result<Config, DynError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file '{}': {}", path.display(), e))?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| format!("Failed to parse config file '{}': {}", path.display(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate field contents beyond what deserialization checks
    pub fn validate(&self) -> Result<(), String> {
        if !self.app.email_domain.starts_with('@') {
            return Err(format!(
                "email_domain '{}' must start with '@'",
                self.app.email_domain
            ));
        }

        if self.app.timezone.parse::<Tz>().is_err() {
            return Err(format!("Unknown timezone '{}'", self.app.timezone));
        }

        let digest = &self.app.api_token_sha512;
        if digest.len() != 128 || !digest.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(
                "api_token_sha512 must be a 128-character hex digest (see hash-token)".to_string(),
            );
        }

        if self.app.submission_cooldown_minutes < 0 {
            return Err("submission_cooldown_minutes cannot be negative".to_string());
        }

        url::Url::parse(&self.google.redirect_uri)
            .map_err(|e| format!("Invalid redirect_uri '{}': {}", self.google.redirect_uri, e))?;

        Ok(())
    }

    /// Parsed timezone; validated at load time, falls back to UTC otherwise
    pub fn timezone(&self) -> Tz {
        self.app.timezone.parse().unwrap_or(chrono_tz::UTC)
    }
}
