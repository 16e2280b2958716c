mod config;
mod db;
mod error;
mod middleware;
mod models;
mod routes;
mod services;
mod utils;

use actix_web::{middleware::Logger, web, App, HttpServer};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;
use crate::services::payment_gateway::{PaymentGateway, StripeGateway};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("kermesse_backend=info,actix_web=info")),
        )
        .init();

    let config = AppConfig::from_env().map_err(std::io::Error::other)?;

    tracing::info!("connecting to database");
    let db = db::establish_connection(&config)
        .await
        .map_err(std::io::Error::other)?;
    db::create_schema(&db).await.map_err(std::io::Error::other)?;
    tracing::info!("database connected");

    if config.payment.stripe_secret_key.is_none() {
        tracing::warn!("STRIPE_SECRET_KEY not set, /payment will answer 502");
    }
    let gateway: Arc<dyn PaymentGateway> = Arc::new(StripeGateway::new(&config.payment));

    let bind = (config.host.clone(), config.port);
    tracing::info!(host = %bind.0, port = bind.1, "starting server");

    let db_data = web::Data::new(db);
    let config_data = web::Data::new(config);
    let gateway_data: web::Data<dyn PaymentGateway> = web::Data::from(gateway);

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(db_data.clone())
            .app_data(config_data.clone())
            .app_data(gateway_data.clone())
            .configure(routes::configure_routes)
    })
    .bind(bind)?
    .run()
    .await
}
