#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use rust_decimal::Decimal;

use tiara_backend::{
    common::error::AppError,
    db::{MemoryStore, Store},
    models::{
        catalog::{Product, ProductSide, ProductVariant},
        orders::{LineItemKind, Order, OrderItem, OrderStatus, ShippingDetails},
        promo::PromoCode,
        subscriptions::{SubscriptionPlan, UserSubscription},
        training::{DentalTraining, DentalTrainingRegistration},
        users::User,
    },
    services::{
        ConfirmationNotifier, Mailer, NotificationSettings, OrderService, OutboundEmail, PaymentService,
        PromoService, SubscriptionService, TrainingService,
    },
};

// ---
// Mailers de teste
// ---

#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<OutboundEmail>>,
}

impl RecordingMailer {
    pub fn sent(&self) -> Vec<OutboundEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: OutboundEmail) -> Result<(), AppError> {
        self.sent.lock().unwrap().push(email);
        Ok(())
    }
}

pub struct FailingMailer;

#[async_trait]
impl Mailer for FailingMailer {
    async fn send(&self, _email: OutboundEmail) -> Result<(), AppError> {
        Err(anyhow::anyhow!("relay SMTP fora do ar").into())
    }
}

/// Demora mais que o timeout do notificador antes de entregar.
pub struct SlowMailer {
    pub delay: Duration,
    pub delivered: RecordingMailer,
}

#[async_trait]
impl Mailer for SlowMailer {
    async fn send(&self, email: OutboundEmail) -> Result<(), AppError> {
        tokio::time::sleep(self.delay).await;
        self.delivered.send(email).await
    }
}

pub fn settings() -> NotificationSettings {
    NotificationSettings {
        shipping_fee: Decimal::from(150),
        sales_cc: "sales@tiarapro.com".into(),
        training_cc: "dentaltraining@tiarapro.com".into(),
        timeout: Duration::from_secs(2),
    }
}

// ---
// Serviços montados sobre o store em memória
// ---

pub struct Harness {
    pub store: MemoryStore,
    pub mailer: Arc<RecordingMailer>,
    pub notifier: ConfirmationNotifier,
    pub orders: OrderService,
    pub payments: PaymentService,
    pub promos: PromoService,
    pub subscriptions: SubscriptionService,
    pub trainings: TrainingService,
}

pub fn harness() -> Harness {
    let mailer = Arc::new(RecordingMailer::default());
    build(mailer.clone(), mailer)
}

/// Mesmo conjunto, mas com um mailer que sempre falha.
pub fn harness_with_failing_mailer() -> Harness {
    build(Arc::new(FailingMailer), Arc::new(RecordingMailer::default()))
}

/// Mailer que leva um minuto por e-mail; o timeout configurado é de 2s.
pub fn harness_with_slow_mailer() -> Harness {
    let slow = SlowMailer {
        delay: Duration::from_secs(60),
        delivered: RecordingMailer::default(),
    };
    build(Arc::new(slow), Arc::new(RecordingMailer::default()))
}

fn build(mailer: Arc<dyn Mailer>, recording: Arc<RecordingMailer>) -> Harness {
    let store = MemoryStore::new();
    let shared: Arc<dyn Store> = Arc::new(store.clone());
    let notifier = ConfirmationNotifier::new(mailer, settings()).unwrap();

    let orders = OrderService::new(shared.clone(), notifier.clone());
    let promos = PromoService::new(shared.clone());
    let subscriptions = SubscriptionService::new(shared.clone());
    let payments = PaymentService::new(shared.clone(), orders.clone(), subscriptions.clone(), promos.clone());

    Harness {
        store,
        mailer: recording,
        notifier,
        orders,
        payments,
        promos,
        subscriptions,
        trainings: TrainingService::new(shared),
    }
}

// ---
// Fixtures
// ---

pub fn user(id: i32) -> User {
    User {
        id,
        email: format!("dentista{id}@example.com"),
        first_name: "Marina".into(),
        middle_name: None,
        last_name: "Costa".into(),
        created_at: Utc::now(),
    }
}

pub fn product(id: i32, quantity: i32, price: i64) -> Product {
    Product {
        id,
        name: format!("Produto {id}"),
        sku: format!("SKU-{id}"),
        quantity,
        price: Decimal::from(price),
        description: None,
        is_active: true,
        is_variant: false,
        category_id: None,
        parent_sku: None,
        brand: None,
        logo_url: None,
        variants: Vec::new(),
    }
}

/// Coroa com duas variantes (UpperRight S2 e S3), estoque repartido entre elas.
pub fn crown(id: i32, per_variant: i32) -> Product {
    let variant = |variant_id: i32, size: i32| ProductVariant {
        id: variant_id,
        product_id: id,
        sku: format!("CR-{size}"),
        quantity: per_variant,
        side: Some(ProductSide::UpperRight),
        size: Some(size),
        size_range: 7,
        variant_option: None,
        parent_product_id: id,
    };
    Product {
        name: "Coroa Pediátrica".into(),
        is_variant: true,
        quantity: per_variant * 2,
        variants: vec![variant(id * 100 + 2, 2), variant(id * 100 + 3, 3)],
        ..product(id, 0, 80)
    }
}

pub fn training(id: i32, capacity: Option<i32>, price: i64) -> DentalTraining {
    DentalTraining {
        id,
        title: format!("Treinamento {id}"),
        description: "Hands-on".into(),
        date: Utc::now() + ChronoDuration::days(30),
        location: Some("Cairo".into()),
        price: Decimal::from(price),
        capacity,
    }
}

pub fn registration(id: i32, user_id: i32, training_id: i32, order_id: i32) -> DentalTrainingRegistration {
    DentalTrainingRegistration {
        id,
        user_id,
        training_id,
        order_id: Some(order_id),
        confirmed: false,
        registered_at: Utc::now(),
    }
}

pub fn plan(id: i32, name: &str, price: i64, segmentations: i32) -> SubscriptionPlan {
    SubscriptionPlan {
        id,
        name: name.into(),
        price: Decimal::from(price),
        segmentations_allowed: segmentations,
        description: None,
        is_active: true,
    }
}

pub fn subscription(id: i32, user_id: i32, plan_id: i32, order_id: i32, active: bool) -> UserSubscription {
    UserSubscription {
        id,
        user_id,
        plan_id,
        order_id,
        segmentations_used: 0,
        segmentations_allowed: 10,
        subscribed_at: Utc::now(),
        expires_at: None,
        is_active: active,
    }
}

pub fn promo(id: i32, code: &str, percent: i64) -> PromoCode {
    let now = Utc::now();
    PromoCode {
        id,
        code: code.into(),
        discount_percent: Decimal::from(percent),
        start_date: now - ChronoDuration::days(1),
        end_date: now + ChronoDuration::days(30),
        is_active: true,
        max_uses: Some(100),
        current_uses: 0,
        minimum_order_amount: None,
        created_at: now,
    }
}

pub fn shipping(email: &str) -> ShippingDetails {
    ShippingDetails {
        shipping_address: "Rua das Flores, 10".into(),
        shipping_city: "Cairo".into(),
        shipping_country: "Egypt".into(),
        shipping_phone: "+20 100 000 0000".into(),
        shipping_email: email.into(),
        shipping_first_name: "Ana".into(),
        shipping_last_name: "Souza".into(),
        ..ShippingDetails::default()
    }
}

pub fn item(id: i32, order_id: i32, kind: LineItemKind, quantity: i32, unit_price: i64) -> OrderItem {
    OrderItem {
        id,
        order_id,
        kind,
        quantity,
        unit_price: Decimal::from(unit_price),
        product_name: Some(format!("Item {id}")),
        product_image: None,
    }
}

pub fn order(id: i32, user_id: Option<i32>, items: Vec<OrderItem>) -> Order {
    let total: Decimal = items
        .iter()
        .map(|i| i.unit_price * Decimal::from(i.quantity))
        .sum();
    Order {
        id,
        user_id,
        status: OrderStatus::Pending,
        total_amount: total,
        promo_code_id: None,
        shipping: shipping("cliente@example.com"),
        created_at: Utc::now(),
        updated_at: None,
        items,
        payments: Vec::new(),
    }
}

pub fn product_line(product_id: i32, variant_id: Option<i32>) -> LineItemKind {
    LineItemKind::Product { product_id, variant_id }
}

pub fn training_line(training_id: i32) -> LineItemKind {
    LineItemKind::TrainingPackage { training_id }
}

pub fn ai_line(plan_id: i32) -> LineItemKind {
    LineItemKind::AiSubscription { plan_id }
}
