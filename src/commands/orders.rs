use crate::db::{decimal_at, optional_decimal_at, Database};
use crate::errors::{AppError, AppResult};
use crate::models::{
    CreateOrder, Invoice, Order, OrderItem, OrderWithItems, PageQuery, Paged, Paging, PricedLine,
};
use crate::pricing;
use crate::validation::{self, OrderLine};
use actix_web::{web, HttpResponse};
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension};
use std::collections::BTreeSet;

fn find_order(conn: &Connection, id: i64) -> AppResult<Option<Order>> {
    let order = conn
        .query_row(
            "SELECT id, created_at FROM orders WHERE id = ?1",
            [id],
            |row| {
                Ok(Order {
                    id: row.get(0)?,
                    created_at: row.get(1)?,
                })
            },
        )
        .optional()?;

    Ok(order)
}

fn items_for_order(conn: &Connection, order_id: i64) -> AppResult<Vec<OrderItem>> {
    let mut stmt = conn.prepare(
        "SELECT oi.id, oi.product_id, p.name, oi.quantity
         FROM order_items oi
         LEFT JOIN products p ON oi.product_id = p.id
         WHERE oi.order_id = ?1
         ORDER BY oi.id",
    )?;

    let items = stmt
        .query_map([order_id], |row| {
            Ok(OrderItem {
                id: row.get(0)?,
                product_id: row.get(1)?,
                product_name: row.get(2)?,
                quantity: row.get(3)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(items)
}

pub fn get_order_with_items(conn: &Connection, id: i64) -> AppResult<Option<OrderWithItems>> {
    match find_order(conn, id)? {
        Some(order) => {
            let items = items_for_order(conn, order.id)?;
            Ok(Some(OrderWithItems::new(order, items)))
        }
        None => Ok(None),
    }
}

/// Returns the requested ids that have no product row.
fn missing_products(conn: &Connection, lines: &[OrderLine]) -> AppResult<Vec<i64>> {
    let wanted: BTreeSet<i64> = lines.iter().map(|l| l.product_id).collect();

    let mut stmt = conn.prepare("SELECT 1 FROM products WHERE id = ?1")?;
    let mut missing = Vec::new();
    for id in wanted {
        if !stmt.exists([id])? {
            missing.push(id);
        }
    }

    Ok(missing)
}

/// Creates an order and its lines in one transaction.
///
/// Nothing is written unless every line is valid and every product exists.
/// Repeated product ids become separate lines.
pub fn insert_order(conn: &mut Connection, request: &CreateOrder) -> AppResult<OrderWithItems> {
    let lines = validation::validate_order_items(request.items.as_deref())?;

    let tx = conn.transaction()?;

    let missing = missing_products(&tx, &lines)?;
    if !missing.is_empty() {
        log::debug!("Order rejected, unknown products {:?}", missing);
        return Err(AppError::NotFound(
            "One or more products not found.".to_string(),
        ));
    }

    let created_at = Utc::now();
    tx.execute("INSERT INTO orders (created_at) VALUES (?1)", [created_at])?;
    let order_id = tx.last_insert_rowid();

    {
        let mut stmt = tx.prepare(
            "INSERT INTO order_items (order_id, product_id, quantity) VALUES (?1, ?2, ?3)",
        )?;
        for line in &lines {
            stmt.execute(rusqlite::params![order_id, line.product_id, line.quantity])?;
        }
    }

    let order = get_order_with_items(&tx, order_id)?
        .ok_or_else(|| AppError::Internal(format!("order {} vanished after insert", order_id)))?;

    tx.commit()?;

    Ok(order)
}

pub fn list_orders(conn: &Connection, paging: Paging) -> AppResult<Paged<OrderWithItems>> {
    let total_count: i64 = conn.query_row("SELECT COUNT(*) FROM orders", [], |row| row.get(0))?;

    let mut stmt = conn.prepare(
        "SELECT id, created_at
         FROM orders
         ORDER BY id
         LIMIT ?1 OFFSET ?2",
    )?;

    let orders: Vec<Order> = stmt
        .query_map([paging.page_size, paging.offset()], |row| {
            Ok(Order {
                id: row.get(0)?,
                created_at: row.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut items = Vec::new();

    for order in orders {
        let lines = items_for_order(conn, order.id)?;
        items.push(OrderWithItems::new(order, lines));
    }

    Ok(Paged {
        items,
        total_count,
        page: paging.page,
        page_size: paging.page_size,
    })
}

/// Order lines joined with the current product state; `None` for all orders.
pub fn priced_lines(conn: &Connection, order_id: Option<i64>) -> AppResult<Vec<PricedLine>> {
    let mut stmt = conn.prepare(
        "SELECT oi.product_id, p.name, p.price, p.discount_percentage, p.discount_quantity_threshold, oi.quantity
         FROM order_items oi
         JOIN products p ON oi.product_id = p.id
         WHERE ?1 IS NULL OR oi.order_id = ?1
         ORDER BY oi.order_id, oi.id",
    )?;

    let lines = stmt
        .query_map([order_id], |row| {
            Ok(PricedLine {
                product_id: row.get(0)?,
                product_name: row.get(1)?,
                price: decimal_at(row, 2)?,
                discount_percentage: optional_decimal_at(row, 3)?,
                discount_quantity_threshold: row.get(4)?,
                quantity: row.get(5)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(lines)
}

pub fn invoice_for_order(conn: &Connection, id: i64) -> AppResult<Invoice> {
    if find_order(conn, id)?.is_none() {
        return Err(AppError::NotFound(format!("Order {} not found.", id)));
    }

    let lines = priced_lines(conn, Some(id))?;

    pricing::compute_invoice(&lines)
}

pub async fn create_order(
    db: web::Data<Database>,
    body: web::Json<CreateOrder>,
) -> AppResult<HttpResponse> {
    let mut conn = db.lock()?;

    let order = insert_order(&mut conn, &body)?;
    log::info!("Created order {} with {} items", order.id, order.items.len());

    Ok(HttpResponse::Created()
        .insert_header(("Location", format!("/api/orders/{}", order.id)))
        .json(order))
}

pub async fn get_orders(
    db: web::Data<Database>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let paging = validation::validate_paging(query.page, query.page_size)?;
    let conn = db.lock()?;

    let page = list_orders(&conn, paging)?;

    Ok(HttpResponse::Ok().json(page))
}

pub async fn get_order(db: web::Data<Database>, path: web::Path<i64>) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let conn = db.lock()?;

    let order = get_order_with_items(&conn, id)?
        .ok_or_else(|| AppError::NotFound(format!("Order {} not found.", id)))?;

    Ok(HttpResponse::Ok().json(order))
}

pub async fn get_order_invoice(
    db: web::Data<Database>,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let conn = db.lock()?;

    let invoice = invoice_for_order(&conn, id)?;

    Ok(HttpResponse::Ok().json(invoice))
}
