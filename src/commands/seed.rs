use crate::db::Database;
use crate::errors::AppResult;
use actix_web::{web, HttpResponse};
use chrono::Utc;
use rusqlite::Connection;
use serde_json::json;

const SAMPLE_PRODUCTS: [(&str, &str); 3] = [
    ("Widget", "10.99"),
    ("Gadget", "15.49"),
    ("Thingamajig", "7.25"),
];

/// Orders as (product index, quantity) lines.
const SAMPLE_ORDERS: [&[(usize, i32)]; 2] = [&[(0, 2), (1, 1)], &[(2, 5)]];

/// Wipes every product, order and line, then inserts the sample data.
pub fn reset_and_seed(conn: &mut Connection) -> AppResult<()> {
    let tx = conn.transaction()?;

    tx.execute_batch(
        "
        DELETE FROM order_items;
        DELETE FROM orders;
        DELETE FROM products;
        ",
    )?;

    let mut product_ids = Vec::with_capacity(SAMPLE_PRODUCTS.len());
    for (name, price) in SAMPLE_PRODUCTS {
        tx.execute(
            "INSERT INTO products (name, price) VALUES (?1, ?2)",
            [name, price],
        )?;
        product_ids.push(tx.last_insert_rowid());
    }

    for lines in SAMPLE_ORDERS {
        tx.execute("INSERT INTO orders (created_at) VALUES (?1)", [Utc::now()])?;
        let order_id = tx.last_insert_rowid();

        for &(product, quantity) in lines {
            tx.execute(
                "INSERT INTO order_items (order_id, product_id, quantity) VALUES (?1, ?2, ?3)",
                rusqlite::params![order_id, product_ids[product], quantity],
            )?;
        }
    }

    tx.commit()?;

    Ok(())
}

pub async fn seed_database(db: web::Data<Database>) -> AppResult<HttpResponse> {
    let mut conn = db.lock()?;

    reset_and_seed(&mut conn)?;
    log::info!("Database seeded with sample data");

    Ok(HttpResponse::Ok().json(json!({ "message": "Database seeded with test data." })))
}
