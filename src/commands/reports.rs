use crate::commands::orders::priced_lines;
use crate::db::Database;
use crate::errors::AppResult;
use crate::models::DiscountedProductReportItem;
use crate::pricing;
use actix_web::{web, HttpResponse};
use rusqlite::Connection;

pub fn discounted_products(conn: &Connection) -> AppResult<Vec<DiscountedProductReportItem>> {
    let lines = priced_lines(conn, None)?;

    pricing::discounted_product_report(&lines)
}

pub async fn get_discounted_products(db: web::Data<Database>) -> AppResult<HttpResponse> {
    let conn = db.lock()?;

    let report = discounted_products(&conn)?;

    Ok(HttpResponse::Ok().json(report))
}
