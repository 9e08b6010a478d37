use crate::db::{decimal_at, optional_decimal_at, Database};
use crate::errors::{AppError, AppResult};
use crate::models::{ApplyDiscount, CreateProduct, Paged, Paging, Product, ProductQuery};
use crate::validation::{self, DiscountChange};
use actix_web::{web, HttpResponse};
use rusqlite::{Connection, OptionalExtension, Row};

const PRODUCT_COLUMNS: &str =
    "id, name, price, discount_percentage, discount_quantity_threshold";

fn product_from_row(row: &Row<'_>) -> rusqlite::Result<Product> {
    Ok(Product {
        id: row.get(0)?,
        name: row.get(1)?,
        price: decimal_at(row, 2)?,
        discount_percentage: optional_decimal_at(row, 3)?,
        discount_quantity_threshold: row.get(4)?,
    })
}

pub fn find_product(conn: &Connection, id: i64) -> AppResult<Option<Product>> {
    let product = conn
        .query_row(
            &format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1"),
            [id],
            product_from_row,
        )
        .optional()?;

    Ok(product)
}

pub fn insert_product(conn: &Connection, product: &CreateProduct) -> AppResult<Product> {
    validation::validate_product(product)?;

    conn.execute(
        "INSERT INTO products (name, price, discount_percentage, discount_quantity_threshold) VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![
            product.name,
            product.price.to_string(),
            product.discount_percentage.map(|p| p.to_string()),
            product.discount_quantity_threshold,
        ],
    )?;

    let id = conn.last_insert_rowid();

    find_product(conn, id)?
        .ok_or_else(|| AppError::Internal(format!("product {} vanished after insert", id)))
}

/// Lists products whose name contains `name` (case-insensitive), one page at a time.
pub fn list_products(
    conn: &Connection,
    name: Option<&str>,
    paging: Paging,
) -> AppResult<Paged<Product>> {
    let filter = name.map(str::trim).filter(|n| !n.is_empty());

    let total_count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM products
         WHERE ?1 IS NULL OR instr(lower(name), lower(?1)) > 0",
        [filter],
        |row| row.get(0),
    )?;

    let mut stmt = conn.prepare(&format!(
        "SELECT {PRODUCT_COLUMNS}
         FROM products
         WHERE ?1 IS NULL OR instr(lower(name), lower(?1)) > 0
         ORDER BY id
         LIMIT ?2 OFFSET ?3"
    ))?;

    let items = stmt
        .query_map(
            rusqlite::params![filter, paging.page_size, paging.offset()],
            product_from_row,
        )?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Paged {
        items,
        total_count,
        page: paging.page,
        page_size: paging.page_size,
    })
}

/// Sets or clears a product's discount.
///
/// The resulting product state goes through the same validation as a new
/// product before anything is written.
pub fn apply_discount(conn: &Connection, id: i64, discount: &ApplyDiscount) -> AppResult<Product> {
    let existing = find_product(conn, id)?
        .ok_or_else(|| AppError::NotFound(format!("Product {} not found.", id)))?;

    let (percentage, quantity_threshold) = match validation::validate_discount(discount)? {
        DiscountChange::Set {
            percentage,
            quantity_threshold,
        } => (Some(percentage), Some(quantity_threshold)),
        DiscountChange::Clear => (None, None),
    };

    validation::validate_product(&CreateProduct {
        name: existing.name,
        price: existing.price,
        discount_percentage: percentage,
        discount_quantity_threshold: quantity_threshold,
    })?;

    conn.execute(
        "UPDATE products SET discount_percentage = ?1, discount_quantity_threshold = ?2 WHERE id = ?3",
        rusqlite::params![percentage.map(|p| p.to_string()), quantity_threshold, id],
    )?;

    match (percentage, quantity_threshold) {
        (Some(percentage), Some(quantity_threshold)) => log::info!(
            "Discount on product {} set to {}% from quantity {}",
            id,
            percentage,
            quantity_threshold
        ),
        _ => log::info!("Discount on product {} cleared", id),
    }

    find_product(conn, id)?.ok_or_else(|| AppError::NotFound(format!("Product {} not found.", id)))
}

pub async fn create_product(
    db: web::Data<Database>,
    body: web::Json<CreateProduct>,
) -> AppResult<HttpResponse> {
    let conn = db.lock()?;

    let product = insert_product(&conn, &body)?;
    log::info!("Created product {} ({})", product.id, product.name);

    Ok(HttpResponse::Created()
        .insert_header(("Location", format!("/api/products/{}", product.id)))
        .json(product))
}

pub async fn get_products(
    db: web::Data<Database>,
    query: web::Query<ProductQuery>,
) -> AppResult<HttpResponse> {
    let paging = validation::validate_paging(query.page, query.page_size)?;
    let conn = db.lock()?;

    let page = list_products(&conn, query.name.as_deref(), paging)?;

    Ok(HttpResponse::Ok().json(page))
}

pub async fn update_discount(
    db: web::Data<Database>,
    path: web::Path<i64>,
    body: web::Json<ApplyDiscount>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let conn = db.lock()?;

    let product = apply_discount(&conn, id, &body)?;

    Ok(HttpResponse::Ok().json(product))
}
