use std::path::Path;
use std::sync::{Arc, Mutex};

use chrono::{NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::error::{AppError, AppResult};
use crate::model::{Batch, LogAction, LogEntry, Product, ProductStock, Role, User};

/// Form/handler-level input for creating or editing a product. Uniqueness of
/// the barcode is checked against the store, not here.
#[derive(Debug, Clone)]
pub struct ProductInput {
    pub barcode: String,
    pub name: String,
    pub brand: String,
    pub supplier: String,
    pub unit_measure: String,
    pub unit_price: f64,
}

#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn open<P: AsRef<Path>>(path: P) -> AppResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute("PRAGMA foreign_keys = ON;", [])?;
        let _mode: String = conn.query_row("PRAGMA journal_mode = WAL;", [], |row| row.get(0))?;

        // 1. Users
        conn.execute(
            "CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY,
                username TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                role TEXT NOT NULL DEFAULT 'user'
            )",
            [],
        )?;

        // 2. Products
        conn.execute(
            "CREATE TABLE IF NOT EXISTS products (
                id INTEGER PRIMARY KEY,
                barcode TEXT NOT NULL UNIQUE,
                name TEXT NOT NULL,
                brand TEXT NOT NULL DEFAULT '',
                supplier TEXT NOT NULL DEFAULT '',
                unit_measure TEXT NOT NULL DEFAULT '',
                unit_price REAL NOT NULL DEFAULT 0.0
            )",
            [],
        )?;

        // 3. Batches. Deletion cascades from the product in an explicit
        //    application-level transaction, not via ON DELETE.
        conn.execute(
            "CREATE TABLE IF NOT EXISTS batches (
                id INTEGER PRIMARY KEY,
                product_id INTEGER NOT NULL REFERENCES products(id),
                quantity_initial REAL NOT NULL,
                quantity_current REAL NOT NULL,
                entry_date TEXT NOT NULL,
                expiry_date TEXT,
                created_by TEXT NOT NULL DEFAULT ''
            )",
            [],
        )?;

        // 4. Operation log. Username and product name are snapshots, never
        //    foreign keys.
        conn.execute(
            "CREATE TABLE IF NOT EXISTS logs (
                id INTEGER PRIMARY KEY,
                username TEXT NOT NULL,
                product_name TEXT NOT NULL,
                action TEXT NOT NULL,
                quantity_change REAL NOT NULL,
                timestamp TEXT NOT NULL
            )",
            [],
        )?;

        Ok(Database {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Creates the default `admin` account on first run. Returns true when
    /// the account was created by this call.
    pub fn bootstrap_admin(&self, password_hash: &str) -> AppResult<bool> {
        let conn = self.conn.lock().unwrap();
        let existing: Option<i64> = conn
            .query_row(
                "SELECT id FROM users WHERE username = 'admin'",
                [],
                |row| row.get(0),
            )
            .optional()?;
        if existing.is_some() {
            return Ok(false);
        }
        conn.execute(
            "INSERT INTO users (username, password_hash, role) VALUES ('admin', ?1, 'admin')",
            params![password_hash],
        )?;
        Ok(true)
    }

    // --- Users ---

    pub fn create_user(&self, username: &str, password_hash: &str, role: Role) -> AppResult<i64> {
        let conn = self.conn.lock().unwrap();
        let taken: Option<i64> = conn
            .query_row(
                "SELECT id FROM users WHERE username = ?1",
                params![username],
                |row| row.get(0),
            )
            .optional()?;
        if taken.is_some() {
            return Err(AppError::DuplicateUsername);
        }
        conn.execute(
            "INSERT INTO users (username, password_hash, role) VALUES (?1, ?2, ?3)",
            params![username, password_hash, role.as_str()],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn delete_user(&self, id: i64) -> AppResult<()> {
        let conn = self.conn.lock().unwrap();
        let n = conn.execute("DELETE FROM users WHERE id = ?1", params![id])?;
        if n == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    pub fn find_user_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let conn = self.conn.lock().unwrap();
        Ok(conn
            .query_row(
                "SELECT id, username, password_hash, role FROM users WHERE username = ?1",
                params![username],
                user_from_row,
            )
            .optional()?)
    }

    pub fn list_users(&self) -> AppResult<Vec<User>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt =
            conn.prepare("SELECT id, username, password_hash, role FROM users ORDER BY id ASC")?;
        let rows = stmt.query_map([], user_from_row)?;
        let mut result = Vec::new();
        for r in rows {
            result.push(r?);
        }
        Ok(result)
    }

    // --- Products ---

    /// Inserts a product and its `CREATE` log entry in one transaction.
    /// Fails with `DuplicateBarcode` on an exact barcode collision.
    pub fn create_product(&self, input: &ProductInput, actor: &str) -> AppResult<i64> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;

        let clash: Option<i64> = tx
            .query_row(
                "SELECT id FROM products WHERE barcode = ?1",
                params![input.barcode],
                |row| row.get(0),
            )
            .optional()?;
        if clash.is_some() {
            return Err(AppError::DuplicateBarcode);
        }

        tx.execute(
            "INSERT INTO products (barcode, name, brand, supplier, unit_measure, unit_price)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                input.barcode,
                input.name,
                input.brand,
                input.supplier,
                input.unit_measure,
                input.unit_price
            ],
        )?;
        let id = tx.last_insert_rowid();

        tx.execute(
            "INSERT INTO logs (username, product_name, action, quantity_change, timestamp)
             VALUES (?1, ?2, ?3, 0.0, ?4)",
            params![actor, input.name, LogAction::Create.as_str(), Utc::now()],
        )?;

        tx.commit()?;
        Ok(id)
    }

    pub fn get_product(&self, id: i64) -> AppResult<Product> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT id, barcode, name, brand, supplier, unit_measure, unit_price
             FROM products WHERE id = ?1",
            params![id],
            product_from_row,
        )
        .optional()?
        .ok_or(AppError::NotFound)
    }

    pub fn find_product_by_barcode(&self, barcode: &str) -> AppResult<Option<Product>> {
        let conn = self.conn.lock().unwrap();
        Ok(conn
            .query_row(
                "SELECT id, barcode, name, brand, supplier, unit_measure, unit_price
                 FROM products WHERE barcode = ?1",
                params![barcode],
                product_from_row,
            )
            .optional()?)
    }

    /// Every product with its computed on-hand total, for the inventory list
    /// and the CSV export. Exhausted batches count for zero but a product
    /// with no batches at all still appears.
    pub fn list_stock(&self) -> AppResult<Vec<ProductStock>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT p.id, p.barcode, p.name, p.brand, p.supplier, p.unit_measure, p.unit_price,
                    COALESCE(SUM(b.quantity_current), 0.0)
             FROM products p
             LEFT JOIN batches b ON b.product_id = p.id
             GROUP BY p.id
             ORDER BY p.name ASC, p.id ASC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(ProductStock {
                product: product_from_row(row)?,
                total_quantity: row.get(7)?,
            })
        })?;
        let mut result = Vec::new();
        for r in rows {
            result.push(r?);
        }
        Ok(result)
    }

    /// Re-checks barcode uniqueness against all other products when the
    /// barcode changes; the admin gate lives at the handler.
    pub fn update_product(&self, id: i64, input: &ProductInput) -> AppResult<()> {
        let conn = self.conn.lock().unwrap();
        let current: Option<String> = conn
            .query_row(
                "SELECT barcode FROM products WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()?;
        let current = current.ok_or(AppError::NotFound)?;

        if input.barcode != current {
            let clash: Option<i64> = conn
                .query_row(
                    "SELECT id FROM products WHERE barcode = ?1 AND id != ?2",
                    params![input.barcode, id],
                    |row| row.get(0),
                )
                .optional()?;
            if clash.is_some() {
                return Err(AppError::DuplicateBarcode);
            }
        }

        conn.execute(
            "UPDATE products
             SET barcode = ?1, name = ?2, brand = ?3, supplier = ?4, unit_measure = ?5,
                 unit_price = ?6
             WHERE id = ?7",
            params![
                input.barcode,
                input.name,
                input.brand,
                input.supplier,
                input.unit_measure,
                input.unit_price,
                id
            ],
        )?;
        Ok(())
    }

    /// Deletes a product and all of its batches in one transaction. Log rows
    /// reference the product only by name and are left untouched.
    pub fn delete_product(&self, id: i64) -> AppResult<()> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM batches WHERE product_id = ?1", params![id])?;
        let n = tx.execute("DELETE FROM products WHERE id = ?1", params![id])?;
        if n == 0 {
            return Err(AppError::NotFound);
        }
        tx.commit()?;
        Ok(())
    }

    // --- Accounting ---

    /// Sum of `quantity_current` over all batches of the product, exhausted
    /// ones included.
    pub fn total_quantity(&self, product_id: i64) -> AppResult<f64> {
        let conn = self.conn.lock().unwrap();
        Ok(conn.query_row(
            "SELECT COALESCE(SUM(quantity_current), 0.0) FROM batches WHERE product_id = ?1",
            params![product_id],
            |row| row.get(0),
        )?)
    }

    /// Batches still holding stock, ordered earliest-expiry-first with
    /// no-expiry batches last. The ordering is consumption guidance only;
    /// the operator picks the batch to deplete.
    pub fn active_batches(&self, product_id: i64) -> AppResult<Vec<Batch>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, product_id, quantity_initial, quantity_current, entry_date, expiry_date,
                    created_by
             FROM batches
             WHERE product_id = ?1 AND quantity_current > 0
             ORDER BY expiry_date IS NULL, expiry_date ASC, id ASC",
        )?;
        let rows = stmt.query_map(params![product_id], batch_from_row)?;
        let mut result = Vec::new();
        for r in rows {
            result.push(r?);
        }
        Ok(result)
    }

    pub fn get_batch(&self, id: i64) -> AppResult<Batch> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT id, product_id, quantity_initial, quantity_current, entry_date, expiry_date,
                    created_by
             FROM batches WHERE id = ?1",
            params![id],
            batch_from_row,
        )
        .optional()?
        .ok_or(AppError::NotFound)
    }

    /// Stock-in: creates a batch with `quantity_initial = quantity_current =
    /// quantity` and its `IN` log entry atomically. Past expiry dates are
    /// accepted as backdated entries.
    pub fn receive(
        &self,
        product_id: i64,
        quantity: f64,
        expiry_date: Option<NaiveDate>,
        actor: &str,
    ) -> AppResult<i64> {
        if !quantity.is_finite() || quantity <= 0.0 {
            return Err(AppError::InvalidInput(
                "la quantità deve essere positiva".to_string(),
            ));
        }

        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;

        let product_name: Option<String> = tx
            .query_row(
                "SELECT name FROM products WHERE id = ?1",
                params![product_id],
                |row| row.get(0),
            )
            .optional()?;
        let product_name = product_name.ok_or(AppError::NotFound)?;

        tx.execute(
            "INSERT INTO batches (product_id, quantity_initial, quantity_current, entry_date,
                                  expiry_date, created_by)
             VALUES (?1, ?2, ?2, ?3, ?4, ?5)",
            params![product_id, quantity, Utc::now(), expiry_date, actor],
        )?;
        let batch_id = tx.last_insert_rowid();

        tx.execute(
            "INSERT INTO logs (username, product_name, action, quantity_change, timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![actor, product_name, LogAction::In.as_str(), quantity, Utc::now()],
        )?;

        tx.commit()?;
        Ok(batch_id)
    }

    /// Stock-out: decrements `quantity_current` and appends the `OUT` log
    /// entry atomically. A withdrawal larger than the remaining quantity
    /// fails with `InsufficientQuantity` and mutates nothing.
    pub fn consume(&self, batch_id: i64, quantity: f64, actor: &str) -> AppResult<()> {
        if !quantity.is_finite() || quantity <= 0.0 {
            return Err(AppError::InvalidInput(
                "la quantità deve essere positiva".to_string(),
            ));
        }

        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;

        let row: Option<(f64, String)> = tx
            .query_row(
                "SELECT b.quantity_current, p.name
                 FROM batches b JOIN products p ON p.id = b.product_id
                 WHERE b.id = ?1",
                params![batch_id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;
        let (current, product_name) = row.ok_or(AppError::NotFound)?;

        if quantity > current {
            return Err(AppError::InsufficientQuantity);
        }

        tx.execute(
            "UPDATE batches SET quantity_current = quantity_current - ?1 WHERE id = ?2",
            params![quantity, batch_id],
        )?;
        tx.execute(
            "INSERT INTO logs (username, product_name, action, quantity_change, timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![actor, product_name, LogAction::Out.as_str(), quantity, Utc::now()],
        )?;

        tx.commit()?;
        Ok(())
    }

    // --- Logs ---

    /// Most recent operations first, for the dashboard summary.
    pub fn recent_logs(&self, limit: u32) -> AppResult<Vec<LogEntry>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, username, product_name, action, quantity_change, timestamp
             FROM logs ORDER BY id DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit], log_from_row)?;
        let mut result = Vec::new();
        for r in rows {
            result.push(r?);
        }
        Ok(result)
    }
}

fn user_from_row(row: &Row) -> rusqlite::Result<User> {
    let role: String = row.get(3)?;
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        password_hash: row.get(2)?,
        role: Role::from_db(&role),
    })
}

fn product_from_row(row: &Row) -> rusqlite::Result<Product> {
    Ok(Product {
        id: row.get(0)?,
        barcode: row.get(1)?,
        name: row.get(2)?,
        brand: row.get(3)?,
        supplier: row.get(4)?,
        unit_measure: row.get(5)?,
        unit_price: row.get(6)?,
    })
}

fn batch_from_row(row: &Row) -> rusqlite::Result<Batch> {
    Ok(Batch {
        id: row.get(0)?,
        product_id: row.get(1)?,
        quantity_initial: row.get(2)?,
        quantity_current: row.get(3)?,
        entry_date: row.get(4)?,
        expiry_date: row.get(5)?,
        created_by: row.get(6)?,
    })
}

fn log_from_row(row: &Row) -> rusqlite::Result<LogEntry> {
    let action: String = row.get(3)?;
    Ok(LogEntry {
        id: row.get(0)?,
        username: row.get(1)?,
        product_name: row.get(2)?,
        action: LogAction::from_db(&action),
        quantity_change: row.get(4)?,
        timestamp: row.get(5)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn test_db() -> (Database, NamedTempFile) {
        let file = NamedTempFile::new().unwrap();
        let db = Database::open(file.path()).unwrap();
        (db, file)
    }

    fn sample_product(barcode: &str, name: &str) -> ProductInput {
        ProductInput {
            barcode: barcode.to_string(),
            name: name.to_string(),
            brand: "Molino".to_string(),
            supplier: "Rossi".to_string(),
            unit_measure: "Kg".to_string(),
            unit_price: 1.5,
        }
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn duplicate_barcode_rejected() {
        let (db, _f) = test_db();
        db.create_product(&sample_product("111", "Flour"), "admin").unwrap();
        let err = db
            .create_product(&sample_product("111", "Other"), "admin")
            .unwrap_err();
        assert!(matches!(err, AppError::DuplicateBarcode));
        assert_eq!(db.list_stock().unwrap().len(), 1);
    }

    #[test]
    fn receive_then_consume_updates_quantities() {
        let (db, _f) = test_db();
        let pid = db.create_product(&sample_product("111", "Flour"), "admin").unwrap();
        let bid = db.receive(pid, 10.0, None, "admin").unwrap();

        db.consume(bid, 4.0, "admin").unwrap();
        let batch = db.get_batch(bid).unwrap();
        assert_eq!(batch.quantity_current, 6.0);
        assert_eq!(batch.quantity_initial, 10.0);
        assert_eq!(db.total_quantity(pid).unwrap(), 6.0);

        let err = db.consume(bid, 7.0, "admin").unwrap_err();
        assert!(matches!(err, AppError::InsufficientQuantity));
        assert_eq!(db.get_batch(bid).unwrap().quantity_current, 6.0);
        assert_eq!(db.total_quantity(pid).unwrap(), 6.0);
    }

    #[test]
    fn quantity_bounds_hold_across_operations() {
        let (db, _f) = test_db();
        let pid = db.create_product(&sample_product("222", "Yeast"), "admin").unwrap();
        let bid = db.receive(pid, 5.0, None, "admin").unwrap();
        db.consume(bid, 5.0, "admin").unwrap();

        let batch = db.get_batch(bid).unwrap();
        assert_eq!(batch.quantity_current, 0.0);
        assert!(batch.quantity_current >= 0.0);
        assert!(batch.quantity_current <= batch.quantity_initial);

        // exhausted batches still exist and count toward the total (for
        // zero) but are excluded from the active view
        assert_eq!(db.total_quantity(pid).unwrap(), 0.0);
        assert!(db.active_batches(pid).unwrap().is_empty());
    }

    #[test]
    fn active_batches_ordered_by_expiry_nulls_last() {
        let (db, _f) = test_db();
        let pid = db.create_product(&sample_product("333", "Milk"), "admin").unwrap();
        let b_none = db.receive(pid, 1.0, None, "admin").unwrap();
        let b_mar = db.receive(pid, 1.0, Some(date("2025-03-01")), "admin").unwrap();
        let b_jan = db.receive(pid, 1.0, Some(date("2025-01-01")), "admin").unwrap();

        let ids: Vec<i64> = db.active_batches(pid).unwrap().iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![b_jan, b_mar, b_none]);
    }

    #[test]
    fn past_expiry_dates_are_accepted() {
        let (db, _f) = test_db();
        let pid = db.create_product(&sample_product("444", "Eggs"), "admin").unwrap();
        let bid = db.receive(pid, 2.0, Some(date("2001-06-15")), "admin").unwrap();
        assert_eq!(db.get_batch(bid).unwrap().expiry_date, Some(date("2001-06-15")));
    }

    #[test]
    fn rejects_non_positive_quantities() {
        let (db, _f) = test_db();
        let pid = db.create_product(&sample_product("555", "Salt"), "admin").unwrap();
        assert!(matches!(
            db.receive(pid, 0.0, None, "admin").unwrap_err(),
            AppError::InvalidInput(_)
        ));
        assert!(matches!(
            db.receive(pid, -3.0, None, "admin").unwrap_err(),
            AppError::InvalidInput(_)
        ));
        let bid = db.receive(pid, 1.0, None, "admin").unwrap();
        assert!(matches!(
            db.consume(bid, 0.0, "admin").unwrap_err(),
            AppError::InvalidInput(_)
        ));
    }

    #[test]
    fn delete_product_cascades_batches_but_keeps_logs() {
        let (db, _f) = test_db();
        let pid = db.create_product(&sample_product("666", "Butter"), "anna").unwrap();
        let b1 = db.receive(pid, 3.0, None, "anna").unwrap();
        let b2 = db.receive(pid, 4.0, Some(date("2027-01-01")), "anna").unwrap();
        assert_eq!(db.recent_logs(10).unwrap().len(), 3); // CREATE + IN + IN

        db.delete_product(pid).unwrap();

        assert!(matches!(db.get_product(pid).unwrap_err(), AppError::NotFound));
        assert!(matches!(db.get_batch(b1).unwrap_err(), AppError::NotFound));
        assert!(matches!(db.get_batch(b2).unwrap_err(), AppError::NotFound));

        let logs_after = db.recent_logs(10).unwrap();
        assert_eq!(logs_after.len(), 3);
        assert!(logs_after.iter().all(|l| l.product_name == "Butter"));
    }

    #[test]
    fn operations_append_log_snapshots() {
        let (db, _f) = test_db();
        let pid = db.create_product(&sample_product("777", "Sugar"), "marco").unwrap();
        let bid = db.receive(pid, 8.0, None, "marco").unwrap();
        db.consume(bid, 2.5, "giulia").unwrap();

        let mut logs = db.recent_logs(10).unwrap();
        logs.reverse(); // chronological
        assert_eq!(logs.len(), 3);
        assert_eq!(logs[0].action, LogAction::Create);
        assert_eq!(logs[0].quantity_change, 0.0);
        assert_eq!(logs[1].action, LogAction::In);
        assert_eq!(logs[1].quantity_change, 8.0);
        assert_eq!(logs[2].action, LogAction::Out);
        assert_eq!(logs[2].quantity_change, 2.5);
        assert_eq!(logs[2].username, "giulia");
        assert_eq!(logs[2].product_name, "Sugar");

        let recent = db.recent_logs(2).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].action, LogAction::Out);
        assert_eq!(recent[1].action, LogAction::In);
    }

    #[test]
    fn edit_rechecks_barcode_uniqueness() {
        let (db, _f) = test_db();
        db.create_product(&sample_product("100", "A"), "admin").unwrap();
        let pid = db.create_product(&sample_product("200", "B"), "admin").unwrap();

        let mut input = sample_product("100", "B");
        assert!(matches!(
            db.update_product(pid, &input).unwrap_err(),
            AppError::DuplicateBarcode
        ));

        // keeping its own barcode is always legal
        input.barcode = "200".to_string();
        input.name = "B renamed".to_string();
        db.update_product(pid, &input).unwrap();
        assert_eq!(db.get_product(pid).unwrap().name, "B renamed");
    }

    #[test]
    fn duplicate_username_rejected() {
        let (db, _f) = test_db();
        db.create_user("anna", "hash1", Role::User).unwrap();
        assert!(matches!(
            db.create_user("anna", "hash2", Role::Admin).unwrap_err(),
            AppError::DuplicateUsername
        ));
        assert_eq!(db.list_users().unwrap().len(), 1);
    }

    #[test]
    fn bootstrap_admin_is_idempotent() {
        let (db, _f) = test_db();
        assert!(db.bootstrap_admin("hash").unwrap());
        assert!(!db.bootstrap_admin("other-hash").unwrap());
        let admin = db.find_user_by_username("admin").unwrap().unwrap();
        assert_eq!(admin.role, Role::Admin);
        assert_eq!(admin.password_hash, "hash");
    }

    #[test]
    fn user_deletion_leaves_history_intact() {
        let (db, _f) = test_db();
        let uid = db.create_user("temp", "hash", Role::User).unwrap();
        let pid = db.create_product(&sample_product("900", "Jam"), "temp").unwrap();
        db.receive(pid, 1.0, None, "temp").unwrap();

        db.delete_user(uid).unwrap();
        let logs = db.recent_logs(10).unwrap();
        assert_eq!(logs.len(), 2);
        assert!(logs.iter().all(|l| l.username == "temp"));
    }
}
