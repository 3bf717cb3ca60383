use campus_jukebox::config::Config;
use campus_jukebox::hash::{sha256_hex, sha512_hex};
use campus_jukebox::serve::AppState;

/// Write a config file whose admin token digest matches `token`
fn write_config(dir: &std::path::Path, token: &str, email_domain: &str) -> std::path::PathBuf {
    let path = dir.join("config.toml");
    let content = format!(
        r#"
[app]
api_token_sha512 = "{digest}"
email_domain = "{domain}"
timezone = "UTC"

[google]
client_id = "client-id"
client_secret = "client-secret"
redirect_uri = "http://localhost:3000/authorize"
"#,
        digest = sha512_hex(token.as_bytes()),
        domain = email_domain,
    );
    std::fs::write(&path, content).expect("Config should be written");
    path
}

#[test]
fn sha256_matches_known_vectors() {
    assert_eq!(
        sha256_hex(b"abc"),
        "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );
    assert_eq!(
        sha256_hex(b""),
        "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
    );
}

#[test]
fn sha512_matches_known_vectors() {
    assert_eq!(
        sha512_hex(b"abc"),
        "ddaf35a193617abacc417349ae20413112e6fa4e89a97ea20a9eeee64b55d39a\
         2192992a274fc1a836ba3c23a3feebbd454d4423643ce80e2a9ac94fa54ca49f"
    );
}

#[test]
fn token_digest_roundtrip_matches_config_gate() {
    let dir = tempfile::tempdir().expect("Temp dir should be created");
    let path = write_config(dir.path(), "hunter2", "@example.edu");

    let config = Config::load(&path).expect("Config should load");
    assert_eq!(config.app.api_token_sha512, sha512_hex(b"hunter2"));
    assert_ne!(config.app.api_token_sha512, sha512_hex(b"hunter3"));
}

#[test]
fn reload_config_picks_up_edits() {
    let dir = tempfile::tempdir().expect("Temp dir should be created");
    let path = write_config(dir.path(), "hunter2", "@example.edu");

    let config = Config::load(&path).expect("Config should load");
    let state = AppState::new(path.clone(), config);
    assert_eq!(state.config().app.email_domain, "@example.edu");

    write_config(dir.path(), "hunter2", "@other.edu");
    state.reload_config().expect("Reload should succeed");
    assert_eq!(state.config().app.email_domain, "@other.edu");
}

#[test]
fn reload_config_keeps_old_snapshot_on_broken_file() {
    let dir = tempfile::tempdir().expect("Temp dir should be created");
    let path = write_config(dir.path(), "hunter2", "@example.edu");

    let config = Config::load(&path).expect("Config should load");
    let state = AppState::new(path.clone(), config);

    std::fs::write(&path, "not valid toml [").expect("File should be written");
    assert!(state.reload_config().is_err());
    assert_eq!(state.config().app.email_domain, "@example.edu");
}
