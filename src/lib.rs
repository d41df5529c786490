pub mod application;
pub mod auth;
pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod payment;
pub mod realtime;
pub mod schema;
pub mod state;

#[cfg(test)]
pub mod testing;

use actix_web::{middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use db::{create_pool, DbPool};
pub use state::AppState;

use errors::AppError;
use handlers::{health, orders, realtime as ws};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut conn = pool.get()?;
    let applied = conn.run_pending_migrations(MIGRATIONS)?;
    log::info!("Applied {} pending migration(s)", applied.len());
    Ok(())
}

/// Registers shared state, the `/api` routes and the realtime endpoint.
pub fn configure(state: &AppState, cfg: &mut web::ServiceConfig) {
    cfg.app_data(state.orders.clone())
        .app_data(state.hub.clone())
        .app_data(state.auth.clone())
        .app_data(
            web::JsonConfig::default()
                .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
        )
        .service(
            web::scope("/api")
                .route("/health", web::get().to(health::health))
                .service(
                    web::scope("/orders")
                        .route("", web::post().to(orders::create_order))
                        .route("/create-payment-intent", web::post().to(orders::create_payment_intent))
                        .route("/create-order", web::post().to(orders::create_payment_intent))
                        .route("/confirm-payment", web::post().to(orders::confirm_payment))
                        .route("/verify-payment", web::post().to(orders::confirm_payment))
                        // Literal paths must precede `/{id}`.
                        .route("/my-orders", web::get().to(orders::my_orders))
                        .route("/{id}", web::get().to(orders::get_order))
                        .route("/{id}/status", web::put().to(orders::update_status))
                        .default_service(web::to(health::api_not_found)),
                )
                .default_service(web::to(health::api_not_found)),
        )
        .route("/ws", web::get().to(ws::order_socket));
}

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(state: AppState, host: &str, port: u16) -> std::io::Result<actix_web::dev::Server> {
    let openapi = handlers::ApiDoc::openapi();
    Ok(HttpServer::new(move || {
        let state = state.clone();
        App::new()
            .wrap(Logger::default())
            .configure(move |cfg| configure(&state, cfg))
            .service(SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", openapi.clone()))
    })
    .bind((host.to_string(), port))?
    .run())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::http::StatusCode;
    use actix_web::test;
    use serde_json::Value;

    use super::*;
    use crate::auth::AuthSettings;
    use crate::payment::PaymentVerifier;
    use crate::realtime::OrderHub;
    use crate::testing::InMemoryOrderRepository;

    fn state() -> AppState {
        AppState::new(
            Arc::new(InMemoryOrderRepository::new()),
            PaymentVerifier::disabled(),
            OrderHub::new(),
            AuthSettings {
                jwt_secret: "s".to_string(),
                require_operator_for_status: false,
            },
        )
    }

    #[actix_web::test]
    async fn unmatched_api_routes_fall_back_to_json_404() {
        let state = state();
        let app = test::init_service(App::new().configure(move |cfg| configure(&state, cfg))).await;

        for uri in ["/api/nope", "/api/orders/42/items"] {
            let req = test::TestRequest::get().uri(uri).to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{uri}");
            let body: Value = test::read_body_json(resp).await;
            assert_eq!(body["path"], uri);
        }
    }

    #[actix_web::test]
    async fn health_is_public() {
        let state = state();
        let app = test::init_service(App::new().configure(move |cfg| configure(&state, cfg))).await;

        let req = test::TestRequest::get().uri("/api/health").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
    }
}
