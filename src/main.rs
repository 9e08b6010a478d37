#[actix_web::main]
async fn main() -> std::io::Result<()> {
    order_management_lib::run().await
}
