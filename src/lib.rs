// src/lib.rs

pub mod common;
pub mod config;
pub mod db;
pub mod docs;
pub mod handlers;
pub mod models;
pub mod services;

use axum::{
    routing::{get, post, put},
    Router,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{config::AppState, docs::ApiDoc};

/// Todas as rotas da API, mais a documentação em `/docs`.
pub fn app(app_state: AppState) -> Router {
    let order_routes = Router::new()
        .route("/", post(handlers::orders::create_order))
        .route("/{order_id}", get(handlers::orders::get_order))
        .route("/{order_id}/confirm", post(handlers::orders::confirm_order))
        .route("/{order_id}/status", put(handlers::orders::update_order_status));

    let payment_routes = Router::new()
        .route("/intentions", post(handlers::payments::record_intention))
        .route("/{transaction_id}/status/{status}", post(handlers::payments::payment_callback));

    let promo_routes = Router::new()
        .route(
            "/",
            post(handlers::promo_codes::create_promo_code).get(handlers::promo_codes::list_promo_codes),
        )
        .route("/validate", post(handlers::promo_codes::validate_promo_code))
        .route("/redeem", post(handlers::promo_codes::redeem_promo_code));

    let subscription_routes = Router::new()
        .route("/", post(handlers::subscriptions::create_subscription))
        .route("/plans", get(handlers::subscriptions::list_plans))
        .route("/plans/seed", post(handlers::subscriptions::seed_plans))
        .route("/activate", post(handlers::subscriptions::activate_subscription));

    let user_routes = Router::new()
        .route("/", post(handlers::users::register_user))
        .route("/{user_id}", get(handlers::users::get_user))
        .route("/{user_id}/subscriptions", get(handlers::subscriptions::get_ai_status))
        .route("/{user_id}/segmentations", post(handlers::subscriptions::record_segmentation));

    let training_routes = Router::new()
        .route("/", post(handlers::registrations::create_training))
        .route("/{training_id}/registrations", post(handlers::registrations::register_for_training));

    let event_routes = Router::new()
        .route("/", post(handlers::registrations::create_event))
        .route("/{event_id}/registrations", post(handlers::registrations::register_for_event));

    let product_routes = Router::new()
        .route("/", post(handlers::catalog::create_product))
        .route("/{product_id}", get(handlers::catalog::get_product));

    let category_routes = Router::new().route(
        "/",
        post(handlers::catalog::create_category).get(handlers::catalog::list_categories),
    );

    let scan_routes = Router::new()
        .route("/", post(handlers::scans::track_scan))
        .route("/{transaction_guid}", get(handlers::scans::get_scan));

    Router::new()
        .route("/api/health", get(handlers::health::health))
        .nest("/api/orders", order_routes)
        .nest("/api/payments", payment_routes)
        .nest("/api/promo-codes", promo_routes)
        .nest("/api/subscriptions", subscription_routes)
        .nest("/api/users", user_routes)
        .nest("/api/trainings", training_routes)
        .nest("/api/events", event_routes)
        .nest("/api/products", product_routes)
        .nest("/api/categories", category_routes)
        .nest("/api/scans", scan_routes)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(app_state)
}
