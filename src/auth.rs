use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;
use axum::response::Redirect;
use rand::RngCore;

use crate::db::Database;
use crate::error::{AppError, AppResult};
use crate::model::{AppState, Role, User};

pub const SESSION_COOKIE: &str = "session";

pub fn hash_password(password: &str) -> AppResult<String> {
    Ok(bcrypt::hash(password, bcrypt::DEFAULT_COST)?)
}

/// Constant-time-safe comparison against the stored digest. A malformed
/// stored hash counts as a failed match rather than an error, so the caller
/// can only ever report generic invalid credentials.
pub fn verify_password(password: &str, password_hash: &str) -> bool {
    bcrypt::verify(password, password_hash).unwrap_or(false)
}

/// Looks the user up by exact username and checks the password. Returns
/// `None` on unknown username and on wrong password alike; the login handler
/// must not distinguish the two.
pub fn authenticate(db: &Database, username: &str, password: &str) -> AppResult<Option<User>> {
    match db.find_user_by_username(username)? {
        Some(user) if verify_password(password, &user.password_hash) => Ok(Some(user)),
        _ => Ok(None),
    }
}

/// Identity and role established at login, snapshotted into the session.
#[derive(Debug, Clone)]
pub struct SessionUser {
    pub user_id: i64,
    pub username: String,
    pub role: Role,
}

/// In-process session table keyed by random tokens. Holds no inventory data;
/// losing it only forces users to log in again.
#[derive(Clone, Default)]
pub struct Sessions {
    inner: Arc<Mutex<HashMap<String, SessionUser>>>,
}

impl Sessions {
    pub fn new() -> Sessions {
        Sessions::default()
    }

    pub fn create(&self, user: SessionUser) -> String {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        let token = hex::encode(bytes);
        self.inner.lock().unwrap().insert(token.clone(), user);
        token
    }

    pub fn get(&self, token: &str) -> Option<SessionUser> {
        self.inner.lock().unwrap().get(token).cloned()
    }

    pub fn remove(&self, token: &str) {
        self.inner.lock().unwrap().remove(token);
    }
}

/// Extracts the `session` token from a Cookie header value.
pub fn session_token(cookie_header: &str) -> Option<&str> {
    cookie_header.split(';').find_map(|part| {
        part.trim()
            .strip_prefix(SESSION_COOKIE)
            .and_then(|rest| rest.strip_prefix('='))
    })
}

/// `Set-Cookie` value establishing a session.
pub fn set_session_cookie(token: &str) -> String {
    format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax")
}

/// `Set-Cookie` value dropping the session on logout.
pub fn clear_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; Max-Age=0")
}

/// Request-scoped identity. Every handler that mutates state takes this as an
/// argument; nothing reads the current actor from ambient state.
#[derive(Debug, Clone)]
pub struct AuthUser(pub SessionUser);

impl AuthUser {
    pub fn username(&self) -> &str {
        &self.0.username
    }

    /// Two-value role gate. Anything that is not `admin` is denied.
    pub fn require_admin(&self) -> AppResult<()> {
        if self.0.role.is_admin() {
            Ok(())
        } else {
            Err(AppError::Forbidden)
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = Redirect;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = parts
            .headers
            .get(header::COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(session_token)
            .and_then(|token| state.sessions.get(token));
        match user {
            Some(user) => Ok(AuthUser(user)),
            None => Err(Redirect::to("/login")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_user(role: Role) -> SessionUser {
        SessionUser {
            user_id: 1,
            username: "anna".to_string(),
            role,
        }
    }

    #[test]
    fn verify_rejects_wrong_password_and_garbage_hash() {
        // low cost keeps the test fast; verification is cost-independent
        let hash = bcrypt::hash("segreta", 4).unwrap();
        assert!(verify_password("segreta", &hash));
        assert!(!verify_password("sbagliata", &hash));
        assert!(!verify_password("segreta", "not-a-bcrypt-hash"));
    }

    #[test]
    fn session_round_trip() {
        let sessions = Sessions::new();
        let token = sessions.create(session_user(Role::User));
        assert_eq!(token.len(), 64);
        assert_eq!(sessions.get(&token).unwrap().username, "anna");

        sessions.remove(&token);
        assert!(sessions.get(&token).is_none());
    }

    #[test]
    fn tokens_are_unique_per_login() {
        let sessions = Sessions::new();
        let a = sessions.create(session_user(Role::User));
        let b = sessions.create(session_user(Role::User));
        assert_ne!(a, b);
    }

    #[test]
    fn cookie_header_parsing() {
        assert_eq!(session_token("session=abc123"), Some("abc123"));
        assert_eq!(session_token("theme=dark; session=abc123"), Some("abc123"));
        assert_eq!(session_token("sessionx=abc123"), None);
        assert_eq!(session_token(""), None);
    }

    #[test]
    fn admin_gate_denies_plain_users() {
        assert!(AuthUser(session_user(Role::Admin)).require_admin().is_ok());
        let err = AuthUser(session_user(Role::User)).require_admin().unwrap_err();
        assert!(matches!(err, AppError::Forbidden));
    }
}
