use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use rand::Rng;
use uuid::Uuid;

use crate::auth::UserInfo;

/// Login states older than this are dropped when a new login starts
const LOGIN_STATE_MAX_AGE_MINUTES: i64 = 10;

/// A signed-in user's server-side session record
#[derive(Debug, Clone)]
pub struct Session {
    pub user: UserInfo,
    pub logged_in_at: DateTime<Utc>,
}

/// In-memory session store keyed by opaque cookie tokens.
///
/// Also tracks the random `state` values handed out to in-flight OAuth
/// logins and one-shot flash messages shown on the next page render.
pub struct SessionStore {
    sessions: DashMap<String, Session>,
    login_states: DashMap<String, DateTime<Utc>>,
    flashes: DashMap<String, String>,
}

impl SessionStore {
    pub fn new() -> Self {
        SessionStore {
            sessions: DashMap::new(),
            login_states: DashMap::new(),
            flashes: DashMap::new(),
        }
    }

    /// Create a session for a signed-in user and return its cookie token
    pub fn create(&self, user: UserInfo) -> String {
        let token = Uuid::new_v4().to_string();
        self.sessions.insert(
            token.clone(),
            Session {
                user,
                logged_in_at: Utc::now(),
            },
        );
        token
    }

    pub fn get(&self, token: &str) -> Option<Session> {
        self.sessions.get(token).map(|entry| entry.value().clone())
    }

    pub fn remove(&self, token: &str) {
        self.sessions.remove(token);
    }

    /// Start an OAuth login: returns the random `state` parameter to bind
    /// the authorization redirect to this server
    pub fn begin_login(&self) -> String {
        let cutoff = Utc::now()
            - Duration::try_minutes(LOGIN_STATE_MAX_AGE_MINUTES).expect("Valid minutes");
        self.login_states.retain(|_, created| *created > cutoff);

        let state: String = rand::thread_rng()
            .sample_iter(&rand::distributions::Alphanumeric)
            .take(24)
            .map(char::from)
            .collect();
        self.login_states.insert(state.clone(), Utc::now());
        state
    }

    /// Consume a login state; false when unknown (stale or forged redirect)
    pub fn take_login_state(&self, state: &str) -> bool {
        self.login_states.remove(state).is_some()
    }

    /// Store a one-shot message and return the token to put in a cookie
    pub fn set_flash(&self, message: &str) -> String {
        let token = Uuid::new_v4().to_string();
        self.flashes.insert(token.clone(), message.to_string());
        token
    }

    /// Consume a one-shot message
    pub fn take_flash(&self, token: &str) -> Option<String> {
        self.flashes.remove(token).map(|(_, message)| message)
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        SessionStore::new()
    }
}
