use std::io;
use std::sync::Arc;

use dotenvy::dotenv;
use food_order_service::auth::AuthSettings;
use food_order_service::config::AppConfig;
use food_order_service::infrastructure::order_repo::DieselOrderRepository;
use food_order_service::payment::PaymentVerifier;
use food_order_service::realtime::OrderHub;
use food_order_service::{build_server, create_pool, run_migrations, AppState};

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = AppConfig::from_env().map_err(|e| {
        log::error!("Invalid configuration: {}", e);
        io::Error::new(io::ErrorKind::InvalidInput, e)
    })?;

    let pool = create_pool(&config.database_url).map_err(|e| {
        log::error!("Failed to create database pool: {}", e);
        io::Error::other(e)
    })?;
    run_migrations(&pool).map_err(|e| {
        log::error!("Failed to run database migrations: {}", e);
        io::Error::other(e)
    })?;

    let verifier = PaymentVerifier::from_config(&config.payment);
    let state = AppState::new(
        Arc::new(DieselOrderRepository::new(pool)),
        verifier,
        OrderHub::new(),
        AuthSettings {
            jwt_secret: config.jwt_secret.clone(),
            require_operator_for_status: config.require_operator_for_status,
        },
    );
    if !config.require_operator_for_status {
        log::warn!("Order status updates are open to unauthenticated callers");
    }

    log::info!("Starting server at http://{}:{}", config.host, config.port);

    build_server(state, &config.host, config.port)?.await
}
