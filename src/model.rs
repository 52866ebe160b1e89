use chrono::{DateTime, NaiveDate, Utc};

use crate::auth::Sessions;
use crate::db::Database;

/// Access level attached to every authenticated request. Anything that is not
/// exactly the stored string `admin` is treated as a plain user, so an
/// unrecognized or missing role can never pass the admin gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    User,
}

impl Role {
    pub fn from_db(s: &str) -> Role {
        if s == "admin" {
            Role::Admin
        } else {
            Role::User
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

/// Account row. The credential is stored only as a bcrypt digest.
#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub role: Role,
}

/// Catalog entry. `total_quantity` is deliberately not a field: it is always
/// computed from the live batch rows (see `Database::total_quantity`).
#[derive(Debug, Clone)]
pub struct Product {
    pub id: i64,
    pub barcode: String,
    pub name: String,
    pub brand: String,
    pub supplier: String,
    pub unit_measure: String,
    pub unit_price: f64,
}

/// One received lot of a product. `quantity_initial` is an immutable snapshot
/// of the arrival; `quantity_current` only ever decreases and stays within
/// `0 ..= quantity_initial`.
#[derive(Debug, Clone)]
pub struct Batch {
    pub id: i64,
    pub product_id: i64,
    pub quantity_initial: f64,
    pub quantity_current: f64,
    pub entry_date: DateTime<Utc>,
    pub expiry_date: Option<NaiveDate>,
    pub created_by: String,
}

/// Audit action kinds recorded in the operation log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogAction {
    Create,
    In,
    Out,
}

impl LogAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogAction::Create => "CREATE",
            LogAction::In => "IN",
            LogAction::Out => "OUT",
        }
    }

    pub fn from_db(s: &str) -> LogAction {
        match s {
            "CREATE" => LogAction::Create,
            "IN" => LogAction::In,
            _ => LogAction::Out,
        }
    }
}

/// Append-only audit record. Username and product name are free-string
/// snapshots, not foreign keys, so history survives user or product deletion.
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub id: i64,
    pub username: String,
    pub product_name: String,
    pub action: LogAction,
    pub quantity_change: f64,
    pub timestamp: DateTime<Utc>,
}

/// A product together with its computed on-hand total, as shown in the
/// inventory list and the CSV export.
#[derive(Debug, Clone)]
pub struct ProductStock {
    pub product: Product,
    pub total_quantity: f64,
}

impl ProductStock {
    /// Pure arithmetic: on-hand quantity times unit price.
    pub fn total_value(&self) -> f64 {
        self.total_quantity * self.product.unit_price
    }
}

/// The high-level application state shared by every request handler. Holds
/// the database handle and the in-process session table; there is no other
/// in-memory state, so every read reflects the store's committed state.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub sessions: Sessions,
}
