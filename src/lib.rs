pub mod commands;
pub mod config;
pub mod db;
pub mod errors;
pub mod models;
pub mod pricing;
pub mod validation;


use actix_web::{middleware, web, App, HttpServer};
use commands::{orders, products, reports, seed};
use config::Config;
use db::Database;
use errors::AppError;
use std::io;

/// Route table plus extractor error handling, shared by the server and tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| AppError::Validation(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| AppError::Validation(err.to_string()).into()),
    )
    .app_data(
        web::PathConfig::default()
            .error_handler(|err, _req| AppError::Validation(err.to_string()).into()),
    )
    .service(
        web::scope("/api")
            // Products
            .route("/products", web::post().to(products::create_product))
            .route("/products", web::get().to(products::get_products))
            .route(
                "/products/{id}/discount",
                web::put().to(products::update_discount),
            )
            // Orders
            .route("/orders", web::post().to(orders::create_order))
            .route("/orders", web::get().to(orders::get_orders))
            .route("/orders/{id}", web::get().to(orders::get_order))
            .route(
                "/orders/{id}/invoice",
                web::get().to(orders::get_order_invoice),
            )
            // Reports
            .route(
                "/reports/discounted-products",
                web::get().to(reports::get_discounted_products),
            )
            // Development only
            .route("/seed", web::post().to(seed::seed_database)),
    );
}

pub fn open_database(path: &str) -> io::Result<Database> {
    let db = if path == ":memory:" {
        Database::open_in_memory()
    } else {
        Database::new(path)
    }
    .map_err(|e| io::Error::other(format!("Failed to open database {}: {}", path, e)))?;

    db.initialize()
        .map_err(|e| io::Error::other(format!("Failed to initialize database: {}", e)))?;

    Ok(db)
}

pub async fn run() -> io::Result<()> {
    let config = Config::from_env()?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let db = web::Data::new(open_database(&config.database_path)?);
    log::info!("Using database {}", config.database_path);

    let (host, port) = config.bind_address();
    log::info!("Order Management API listening on {}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .app_data(db.clone())
            .configure(configure)
    })
    .bind((host, port))?
    .run()
    .await
}
