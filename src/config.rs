use std::env;

const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

/// Runtime configuration, read once at startup from the environment. Nothing
/// here is compiled into the artifact; the bootstrap admin password in
/// particular must be rotated in any real deployment.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path of the SQLite database file (`PANTRY_DB`).
    pub db_path: String,
    /// Listen address for the HTTP server (`PANTRY_BIND`).
    pub bind_addr: String,
    /// Password given to the bootstrap `admin` account
    /// (`PANTRY_ADMIN_PASSWORD`).
    pub admin_password: String,
    /// True when no password was supplied and the well-known default is in
    /// use; startup logs a warning in that case.
    pub admin_password_is_default: bool,
}

impl Config {
    pub fn from_env() -> Config {
        let admin_password = env::var("PANTRY_ADMIN_PASSWORD").ok();
        let admin_password_is_default = admin_password.is_none();
        Config {
            db_path: env::var("PANTRY_DB").unwrap_or_else(|_| "pantry.db".to_string()),
            bind_addr: env::var("PANTRY_BIND").unwrap_or_else(|_| "0.0.0.0:8000".to_string()),
            admin_password: admin_password.unwrap_or_else(|| DEFAULT_ADMIN_PASSWORD.to_string()),
            admin_password_is_default,
        }
    }
}
