use crate::errors::{AppError, AppResult};
use rusqlite::types::Type;
use rusqlite::{Connection, Result, Row};
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard};

pub struct Database {
    pub conn: Mutex<Connection>,
}

impl Database {
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;

        Ok(Database {
            conn: Mutex::new(conn),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;

        Ok(Database {
            conn: Mutex::new(conn),
        })
    }

    pub fn lock(&self) -> AppResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| AppError::Internal("database connection lock poisoned".to_string()))
    }

    pub fn initialize(&self) -> AppResult<()> {
        let conn = self.lock()?;

        conn.execute_batch(
            "
            PRAGMA foreign_keys = ON;

            -- Products; money and percentages are canonical decimal text
            CREATE TABLE IF NOT EXISTS products (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                price TEXT NOT NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            -- Orders
            CREATE TABLE IF NOT EXISTS orders (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                created_at DATETIME NOT NULL
            );

            -- Order items
            CREATE TABLE IF NOT EXISTS order_items (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                order_id INTEGER NOT NULL,
                product_id INTEGER NOT NULL,
                quantity INTEGER NOT NULL CHECK (quantity >= 1),
                FOREIGN KEY (order_id) REFERENCES orders(id),
                FOREIGN KEY (product_id) REFERENCES products(id)
            );

            CREATE INDEX IF NOT EXISTS idx_order_items_order ON order_items(order_id);
            ",
        )?;

        // Pass the locked connection to avoid a second lock
        Self::migrate_conn(&conn)?;

        Ok(())
    }

    fn migrate_conn(conn: &Connection) -> Result<()> {
        // Discount columns were added after the first release
        let columns: Vec<String> = conn
            .prepare("PRAGMA table_info(products)")?
            .query_map([], |row| row.get::<_, String>(1))?
            .filter_map(|r| r.ok())
            .collect();

        if !columns.contains(&"discount_percentage".to_string()) {
            conn.execute("ALTER TABLE products ADD COLUMN discount_percentage TEXT", [])?;
        }
        if !columns.contains(&"discount_quantity_threshold".to_string()) {
            conn.execute(
                "ALTER TABLE products ADD COLUMN discount_quantity_threshold INTEGER",
                [],
            )?;
        }

        Ok(())
    }
}

/// Reads a decimal stored as text.
pub fn decimal_at(row: &Row<'_>, idx: usize) -> Result<Decimal> {
    let raw: String = row.get(idx)?;
    Decimal::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub fn optional_decimal_at(row: &Row<'_>, idx: usize) -> Result<Option<Decimal>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|s| {
        Decimal::from_str(&s)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
    })
    .transpose()
}
