// src/docs.rs

use utoipa::OpenApi;

use crate::handlers;
use crate::models;
use crate::services;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Health ---
        handlers::health::health,

        // --- Orders ---
        handlers::orders::create_order,
        handlers::orders::get_order,
        handlers::orders::confirm_order,
        handlers::orders::update_order_status,

        // --- Payments ---
        handlers::payments::record_intention,
        handlers::payments::payment_callback,

        // --- Promo Codes ---
        handlers::promo_codes::create_promo_code,
        handlers::promo_codes::list_promo_codes,
        handlers::promo_codes::validate_promo_code,
        handlers::promo_codes::redeem_promo_code,

        // --- Subscriptions ---
        handlers::subscriptions::list_plans,
        handlers::subscriptions::seed_plans,
        handlers::subscriptions::create_subscription,
        handlers::subscriptions::activate_subscription,
        handlers::subscriptions::get_ai_status,
        handlers::subscriptions::record_segmentation,

        // --- Trainings & Events ---
        handlers::registrations::create_training,
        handlers::registrations::create_event,
        handlers::registrations::register_for_training,
        handlers::registrations::register_for_event,

        // --- Catalog ---
        handlers::catalog::create_product,
        handlers::catalog::get_product,
        handlers::catalog::create_category,
        handlers::catalog::list_categories,

        // --- Users ---
        handlers::users::register_user,
        handlers::users::get_user,

        // --- Scans ---
        handlers::scans::track_scan,
        handlers::scans::get_scan,
    ),
    components(
        schemas(
            // --- Orders ---
            models::orders::OrderStatus,
            models::orders::LineItemKind,
            models::orders::OrderItem,
            models::orders::ShippingDetails,
            models::orders::Order,
            models::orders::ConfirmationReceipt,

            // --- Payments ---
            models::payments::Payment,
            services::payment_service::OrderEffect,
            services::payment_service::PaymentCallbackOutcome,

            // --- Promo ---
            models::promo::PromoCode,
            models::promo::PromoValidation,
            models::promo::UserPromoCodeUsage,

            // --- Subscriptions ---
            models::subscriptions::SubscriptionPlan,
            models::subscriptions::UserSubscription,
            handlers::subscriptions::AiStatus,

            // --- Training ---
            models::training::DentalTraining,
            models::training::DentalTrainingRegistration,
            models::training::Event,
            models::training::EventRegistration,

            // --- Catalog ---
            models::catalog::Category,
            models::catalog::ProductSide,
            models::catalog::VariantOption,
            models::catalog::Product,
            models::catalog::ProductVariant,

            // --- Users & Scans ---
            models::users::User,
            models::scans::ScanStatus,
            models::scans::ScanTransaction,

            // --- Payloads ---
            handlers::orders::ShippingPayload,
            handlers::orders::CheckoutItemPayload,
            handlers::orders::CheckoutPayload,
            handlers::orders::UpdateStatusPayload,
            handlers::payments::PaymentIntentionPayload,
            handlers::promo_codes::CreatePromoCodePayload,
            handlers::promo_codes::ValidatePromoPayload,
            handlers::promo_codes::RedeemPromoPayload,
            handlers::subscriptions::CreateSubscriptionPayload,
            handlers::subscriptions::ActivateSubscriptionPayload,
            handlers::registrations::CreateTrainingPayload,
            handlers::registrations::CreateEventPayload,
            handlers::registrations::TrainingRegistrationPayload,
            handlers::registrations::EventRegistrationPayload,
            handlers::catalog::CreateVariantPayload,
            handlers::catalog::CreateProductPayload,
            handlers::catalog::CreateCategoryPayload,
            handlers::users::RegisterUserPayload,
            handlers::scans::TrackScanPayload,
        )
    ),
    tags(
        (name = "Health", description = "Disponibilidade da API"),
        (name = "Orders", description = "Checkout, confirmação e cancelamento de pedidos"),
        (name = "Payments", description = "Intenções de pagamento e callbacks do provedor"),
        (name = "Promo Codes", description = "Cupons de desconto"),
        (name = "Subscriptions", description = "Planos e assinaturas do Tiara AI"),
        (name = "Trainings", description = "Treinamentos, eventos e inscrições"),
        (name = "Catalog", description = "Produtos, variantes e categorias"),
        (name = "Users", description = "Cadastro de usuários"),
        (name = "Scans", description = "Processamento de scans CBCT")
    )
)]
pub struct ApiDoc;
