use campus_jukebox::auth::{build_authorize_url, email_allowed, UserInfo};
use campus_jukebox::config::GoogleConfig;

fn google_config() -> GoogleConfig {
    GoogleConfig {
        client_id: "client id".to_string(),
        client_secret: "secret".to_string(),
        redirect_uri: "http://localhost:3000/authorize".to_string(),
    }
}

#[test]
fn authorize_url_targets_google_with_the_expected_parameters() {
    let url = build_authorize_url(&google_config(), "state123");

    assert!(url.starts_with("https://accounts.google.com/o/oauth2/auth?"));
    assert!(url.contains("response_type=code"));
    assert!(url.contains("state=state123"));
    assert!(url.contains("scope=email%20profile"));
}

#[test]
fn authorize_url_percent_encodes_parameters() {
    let url = build_authorize_url(&google_config(), "a b/c");

    // Spaces and slashes in client id, redirect uri and state are encoded
    assert!(url.contains("client_id=client%20id"));
    assert!(url.contains("redirect_uri=http%3A%2F%2Flocalhost%3A3000%2Fauthorize"));
    assert!(url.contains("state=a%20b%2Fc"));
}

#[test]
fn parsed_authorize_url_is_a_valid_url() {
    let url = build_authorize_url(&google_config(), "state123");
    let parsed = url::Url::parse(&url).expect("Authorize URL should parse");
    assert_eq!(parsed.host_str(), Some("accounts.google.com"));

    let state = parsed
        .query_pairs()
        .find(|(key, _)| key == "state")
        .map(|(_, value)| value.to_string());
    assert_eq!(state.as_deref(), Some("state123"));
}

#[test]
fn only_the_configured_email_domain_is_allowed() {
    assert!(email_allowed("student@example.edu", "@example.edu"));
    assert!(!email_allowed("student@gmail.com", "@example.edu"));
    assert!(!email_allowed("student@example.edu.evil.com", "@example.edu"));
    assert!(!email_allowed("", "@example.edu"));
}

#[test]
fn userinfo_parses_with_missing_optional_fields() {
    let user: UserInfo =
        serde_json::from_str(r#"{"email": "student@example.edu"}"#).expect("Userinfo should parse");
    assert_eq!(user.email, "student@example.edu");
    assert!(user.name.is_empty());
    assert!(user.picture.is_empty());
}
