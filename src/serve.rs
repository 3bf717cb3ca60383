use axum::{
    extract::{Query, Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use log::{debug, error, warn};
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use tower_http::cors::{Any, CorsLayer};

use crate::auth;
use crate::board::{SongBoard, SubmitError, VoteError};
use crate::config::Config;
use crate::hash::sha512_hex;
use crate::pages;
use crate::scheme::TimeLabel;
use crate::sessions::{Session, SessionStore};
use crate::DynError;

const SESSION_COOKIE: &str = "session";
const FLASH_COOKIE: &str = "flash";

// State shared by all handlers
pub struct AppState {
    pub config_path: PathBuf,
    config: RwLock<Arc<Config>>,
    pub board: SongBoard,
    pub sessions: SessionStore,
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(config_path: PathBuf, config: Config) -> Self {
        AppState {
            config_path,
            config: RwLock::new(Arc::new(config)),
            board: SongBoard::with_demo_songs(),
            sessions: SessionStore::new(),
            http: reqwest::Client::new(),
        }
    }

    /// Current config snapshot; in-flight requests keep the one they grabbed
    pub fn config(&self) -> Arc<Config> {
        match self.config.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Re-read the config file and swap the shared snapshot
    pub fn reload_config(&self) -> Result<(), DynError> {
        let fresh = Config::load(&self.config_path)?;
        let mut guard = match self.config.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = Arc::new(fresh);
        Ok(())
    }

    fn scheme(&self) -> TimeLabel {
        TimeLabel::current(self.config().timezone())
    }

    fn session_for(&self, headers: &HeaderMap) -> Option<Session> {
        cookie_value(headers, SESSION_COOKIE).and_then(|token| self.sessions.get(&token))
    }
}

fn display_name(user: &auth::UserInfo) -> &str {
    if user.name.is_empty() {
        &user.email
    } else {
        &user.name
    }
}

/// Pull a cookie value out of the request headers
fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    for value in headers.get_all(header::COOKIE) {
        let Ok(raw) = value.to_str() else { continue };
        for pair in raw.split(';') {
            if let Some((key, value)) = pair.trim().split_once('=') {
                if key == name {
                    return Some(value.to_string());
                }
            }
        }
    }
    None
}

fn set_cookie(name: &str, value: &str) -> (header::HeaderName, String) {
    (
        header::SET_COOKIE,
        format!("{}={}; Path=/; HttpOnly", name, value),
    )
}

fn clear_cookie(name: &str) -> (header::HeaderName, String) {
    (
        header::SET_COOKIE,
        format!("{}=; Path=/; HttpOnly; Max-Age=0", name),
    )
}

/// Run the web server until shutdown
pub fn run_server(
    config_path: PathBuf,
    config: Config,
    port_override: Option<u16>,
) -> Result<(), DynError> {
    let host = config.server.host.clone();
    let port = port_override.unwrap_or(config.server.port);

    println!("Campus Jukebox");
    println!("Timezone: {}", config.app.timezone);
    println!("Email domain: {}", config.app.email_domain);
    println!("Listening on: http://{}:{}", host, port);
    println!("Endpoints:");
    println!("  GET  /  - Song board (login page when signed out)");
    println!("  GET  /login | /authorize  - Google sign-in");
    println!("  GET  /morning | /day | /evening | /night  - Forced color scheme");
    println!("  GET  /health  - Health check");
    println!("  GET  /api/v1/songs  - Song list");
    println!("  POST /api/v1/vote  - Vote for a song");
    println!("  POST /api/v1/submit_song  - Submit a song");
    println!("  POST /api/v1/admin/reload_config  - Reload config (token)");

    // Create tokio runtime and run server
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let app_state = Arc::new(AppState::new(config_path, config));

        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        let app = Router::new()
            .route("/", get(index_handler))
            .route("/morning", get(morning_handler))
            .route("/day", get(day_handler))
            .route("/evening", get(evening_handler))
            .route("/night", get(night_handler))
            .route("/login", get(login_handler))
            .route("/authorize", get(authorize_handler))
            .route("/favicon.ico", get(favicon_handler))
            .route("/assets/style.css", get(style_handler))
            .route("/health", get(health_handler))
            .route("/api/v1/songs", get(songs_handler))
            .route("/api/v1/vote", post(vote_handler))
            .route("/api/v1/submit_song", post(submit_song_handler))
            .route("/api/v1/logout", get(logout_handler).post(logout_handler))
            .route("/api/v1/admin/reload_config", post(reload_config_handler))
            .route("/api/v1/admin/hide_song", post(hide_song_handler))
            .route("/api/v1/admin/unhide_song", post(unhide_song_handler))
            .layer(middleware::from_fn(log_requests))
            .layer(cors)
            .with_state(app_state);

        let listener = tokio::net::TcpListener::bind(format!("{}:{}", host, port))
            .await
            .map_err(|e| format!("Failed to bind to {}:{}: {}", host, port, e))?;
        axum::serve(listener, app)
            .await
            .map_err(|e| format!("Server error: {}", e))?;

        Ok::<(), DynError>(())
    })
}

// Log every request before it is handled
async fn log_requests(request: Request, next: Next) -> Response {
    debug!("{} {}", request.method(), request.uri());
    next.run(request).await
}

// -------------------------------------------- #
// Pages
// -------------------------------------------- #

async fn index_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let label = state.scheme();

    match state.session_for(&headers) {
        Some(session) => {
            let songs = state.board.list();
            let voted = state.board.voted_songs(&session.user.email);
            axum::response::Html(pages::board_page(
                label,
                display_name(&session.user),
                &songs,
                &voted,
            ))
            .into_response()
        }
        None => {
            // One-shot login message left behind by /authorize
            let message = cookie_value(&headers, FLASH_COOKIE)
                .and_then(|token| state.sessions.take_flash(&token))
                .unwrap_or_default();
            (
                [clear_cookie(FLASH_COOKIE)],
                axum::response::Html(pages::login_page(label, &message)),
            )
                .into_response()
        }
    }
}

// Temporary routes for dev: force a scheme to eyeball the palettes
async fn forced_scheme(state: &AppState, headers: &HeaderMap, label: TimeLabel) -> Response {
    match state.session_for(headers) {
        Some(session) => {
            let songs = state.board.list();
            let voted = state.board.voted_songs(&session.user.email);
            axum::response::Html(pages::board_page(
                label,
                display_name(&session.user),
                &songs,
                &voted,
            ))
            .into_response()
        }
        None => axum::response::Html(pages::login_page(label, "")).into_response(),
    }
}

async fn morning_handler(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    forced_scheme(&state, &headers, TimeLabel::Morning).await
}

async fn day_handler(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    forced_scheme(&state, &headers, TimeLabel::Day).await
}

async fn evening_handler(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    forced_scheme(&state, &headers, TimeLabel::Evening).await
}

async fn night_handler(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    forced_scheme(&state, &headers, TimeLabel::Night).await
}

async fn favicon_handler() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "image/svg+xml")],
        pages::FAVICON_SVG,
    )
}

async fn style_handler() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/css")], pages::STYLE_CSS)
}

// Health check endpoint - returns 200 OK if server is running
async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

// -------------------------------------------- #
// Sign-in
// -------------------------------------------- #

async fn login_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let config = state.config();
    let oauth_state = state.sessions.begin_login();
    let url = auth::build_authorize_url(&config.google, &oauth_state);
    Redirect::to(&url)
}

#[derive(Deserialize)]
struct AuthorizeQuery {
    code: String,
    state: String,
}

async fn authorize_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AuthorizeQuery>,
) -> impl IntoResponse {
    if !state.sessions.take_login_state(&query.state) {
        warn!("Rejected authorization redirect with unknown state");
        return (StatusCode::BAD_REQUEST, "Unknown login state").into_response();
    }

    let config = state.config();

    let token = match auth::exchange_code(&state.http, &config.google, &query.code).await {
        Ok(token) => token,
        Err(e) => {
            error!("Token exchange failed: {}", e);
            return (StatusCode::BAD_GATEWAY, "Token exchange failed").into_response();
        }
    };

    let user = match auth::fetch_userinfo(&state.http, &token.access_token).await {
        Ok(user) => user,
        Err(e) => {
            error!("Userinfo fetch failed: {}", e);
            return (StatusCode::BAD_GATEWAY, "Userinfo fetch failed").into_response();
        }
    };

    if !auth::email_allowed(&user.email, &config.app.email_domain) {
        debug!("Rejected sign-in from {}", user.email);
        let flash_token = state.sessions.set_flash("Bad email.");
        return (
            [set_cookie(FLASH_COOKIE, &flash_token)],
            Redirect::to("/"),
        )
            .into_response();
    }

    let session_token = state.sessions.create(user);
    (
        [set_cookie(SESSION_COOKIE, &session_token)],
        Redirect::to("/"),
    )
        .into_response()
}

async fn logout_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    if let Some(token) = cookie_value(&headers, SESSION_COOKIE) {
        state.sessions.remove(&token);
    }
    (
        [clear_cookie(SESSION_COOKIE)],
        axum::response::Html(pages::login_page(state.scheme(), "")),
    )
}

// -------------------------------------------- #
// API routes
// -------------------------------------------- #

async fn songs_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    if state.session_for(&headers).is_none() {
        return (
            StatusCode::UNAUTHORIZED,
            axum::Json(serde_json::json!({"error": "Not signed in"})),
        )
            .into_response();
    }
    (StatusCode::OK, axum::Json(state.board.list())).into_response()
}

#[derive(Deserialize)]
struct VoteForm {
    song_id: String,
}

async fn vote_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(form): Form<VoteForm>,
) -> impl IntoResponse {
    let Some(session) = state.session_for(&headers) else {
        // Same behavior as the page routes: bounce to the login page
        return Redirect::temporary("/").into_response();
    };

    match state.board.vote(&session.user.email, &form.song_id) {
        Ok(_count) => Redirect::to("/").into_response(),
        Err(VoteError::UnknownSong) => (
            StatusCode::NOT_FOUND,
            axum::Json(serde_json::json!({"error": "Unknown song"})),
        )
            .into_response(),
        Err(VoteError::AlreadyVoted) => (
            StatusCode::CONFLICT,
            axum::Json(serde_json::json!({"error": "Already voted for this song"})),
        )
            .into_response(),
    }
}

#[derive(Deserialize)]
struct SubmitForm {
    song_id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    is_explicit: bool,
}

async fn submit_song_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Form(form): Form<SubmitForm>,
) -> impl IntoResponse {
    let Some(session) = state.session_for(&headers) else {
        return Redirect::temporary("/").into_response();
    };

    let config = state.config();

    match state.board.submit(
        &session.user.email,
        display_name(&session.user),
        &form.song_id,
        &form.title,
        form.is_explicit,
        config.app.submission_cooldown_minutes,
    ) {
        Ok(()) => Redirect::to("/").into_response(),
        Err(SubmitError::DuplicateSong) => (
            StatusCode::CONFLICT,
            axum::Json(serde_json::json!({"error": "Song was already submitted"})),
        )
            .into_response(),
        Err(err @ SubmitError::CooldownActive { .. }) => (
            StatusCode::TOO_MANY_REQUESTS,
            axum::Json(serde_json::json!({"error": err.to_string()})),
        )
            .into_response(),
    }
}

// -------------------------------------------- #
// Admin routes
// -------------------------------------------- #

/// Token gate for admin routes. A mismatch answers 404 so the endpoints
/// look absent to anyone probing without the token.
fn admin_token_matches(state: &AppState, token: &str) -> bool {
    sha512_hex(token.as_bytes()) == state.config().app.api_token_sha512
}

#[derive(Deserialize)]
struct AdminForm {
    token: String,
}

async fn reload_config_handler(
    State(state): State<Arc<AppState>>,
    Form(form): Form<AdminForm>,
) -> impl IntoResponse {
    if !admin_token_matches(&state, &form.token) {
        return StatusCode::NOT_FOUND.into_response();
    }

    match state.reload_config() {
        Ok(()) => (StatusCode::OK, "Config reloaded.").into_response(),
        Err(e) => {
            error!("Config reload failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                axum::Json(serde_json::json!({"error": format!("Config reload failed: {}", e)})),
            )
                .into_response()
        }
    }
}

#[derive(Deserialize)]
struct ModerationForm {
    token: String,
    song_id: String,
}

async fn hide_song_handler(
    State(state): State<Arc<AppState>>,
    Form(form): Form<ModerationForm>,
) -> impl IntoResponse {
    moderate_song(&state, &form, true)
}

async fn unhide_song_handler(
    State(state): State<Arc<AppState>>,
    Form(form): Form<ModerationForm>,
) -> impl IntoResponse {
    moderate_song(&state, &form, false)
}

fn moderate_song(state: &AppState, form: &ModerationForm, hidden: bool) -> Response {
    if !admin_token_matches(state, &form.token) {
        return StatusCode::NOT_FOUND.into_response();
    }

    if state.board.set_hidden(&form.song_id, hidden) {
        (StatusCode::OK, "OK").into_response()
    } else {
        (
            StatusCode::NOT_FOUND,
            axum::Json(serde_json::json!({"error": "Unknown song"})),
        )
            .into_response()
    }
}
