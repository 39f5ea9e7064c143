// src/db/store.rs

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        catalog::{Category, NewCategory, NewProduct, Product},
        orders::{Order, OrderDraft, OrderStatus},
        payments::{NewPayment, Payment},
        promo::{NewPromoCode, PromoCode, UserPromoCodeUsage},
        scans::{NewScanTransaction, ScanStatus, ScanTransaction},
        subscriptions::{NewSubscriptionPlan, NewUserSubscription, SubscriptionPlan, UserSubscription},
        training::{
            DentalTraining, DentalTrainingRegistration, Event, EventRegistration, NewDentalTraining,
            NewEvent,
        },
        users::{NewUser, User},
    },
};

// Cada contrato abaixo é implementado uma vez para o Postgres (`PgUnitOfWork`)
// e uma vez em memória (`MemoryUnitOfWork`). Leituras feitas dentro de uma
// unidade de trabalho travam a linha até o commit.

#[async_trait]
pub trait OrderStore {
    /// Pedido com itens (na ordem do checkout) e pagamentos.
    async fn get_order(&mut self, id: i32) -> Result<Option<Order>, AppError>;
    async fn insert_order(&mut self, draft: OrderDraft) -> Result<Order, AppError>;
    async fn update_order_status(&mut self, id: i32, status: OrderStatus) -> Result<(), AppError>;
}

#[async_trait]
pub trait CatalogStore {
    /// Produto com as suas variantes.
    async fn get_product(&mut self, id: i32) -> Result<Option<Product>, AppError>;
    async fn update_product_stock(&mut self, id: i32, quantity: i32) -> Result<(), AppError>;
    async fn update_variant_stock(&mut self, id: i32, quantity: i32) -> Result<(), AppError>;
    async fn insert_product(&mut self, product: NewProduct) -> Result<Product, AppError>;
    async fn insert_category(&mut self, category: NewCategory) -> Result<Category, AppError>;
    async fn list_categories(&mut self) -> Result<Vec<Category>, AppError>;
}

#[async_trait]
pub trait TrainingStore {
    async fn get_training(&mut self, id: i32) -> Result<Option<DentalTraining>, AppError>;
    async fn update_training_capacity(&mut self, id: i32, capacity: Option<i32>) -> Result<(), AppError>;
    async fn insert_training(&mut self, training: NewDentalTraining) -> Result<DentalTraining, AppError>;

    async fn get_registration(
        &mut self,
        user_id: i32,
        training_id: i32,
    ) -> Result<Option<DentalTrainingRegistration>, AppError>;

    /// Cria a inscrição (não confirmada) ou re-vincula a existente ao pedido.
    async fn upsert_registration(
        &mut self,
        user_id: i32,
        training_id: i32,
        order_id: Option<i32>,
    ) -> Result<DentalTrainingRegistration, AppError>;

    /// Marca a inscrição do pedido como confirmada (ou não). `false` se ela não existe.
    async fn set_registration_confirmed(
        &mut self,
        order_id: i32,
        user_id: i32,
        training_id: i32,
        confirmed: bool,
    ) -> Result<bool, AppError>;

    async fn get_event(&mut self, id: i32) -> Result<Option<Event>, AppError>;
    async fn insert_event(&mut self, event: NewEvent) -> Result<Event, AppError>;
    async fn count_event_registrations(&mut self, event_id: i32) -> Result<i64, AppError>;
    async fn find_event_registration(
        &mut self,
        user_id: i32,
        event_id: i32,
    ) -> Result<Option<EventRegistration>, AppError>;
    async fn insert_event_registration(
        &mut self,
        user_id: i32,
        event_id: i32,
    ) -> Result<EventRegistration, AppError>;
}

#[async_trait]
pub trait UserStore {
    async fn get_user(&mut self, id: i32) -> Result<Option<User>, AppError>;
    async fn insert_user(&mut self, user: NewUser) -> Result<User, AppError>;
}

#[async_trait]
pub trait PaymentStore {
    async fn insert_payment(&mut self, payment: NewPayment) -> Result<Payment, AppError>;
    async fn find_payment_by_transaction(&mut self, transaction_id: &str) -> Result<Option<Payment>, AppError>;
    async fn update_payment_status(&mut self, id: i32, status: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait PromoStore {
    async fn find_promo_by_code(&mut self, code: &str) -> Result<Option<PromoCode>, AppError>;
    async fn get_promo(&mut self, id: i32) -> Result<Option<PromoCode>, AppError>;
    async fn list_promos(&mut self) -> Result<Vec<PromoCode>, AppError>;
    async fn insert_promo(&mut self, promo: NewPromoCode) -> Result<PromoCode, AppError>;
    async fn has_used_promo(&mut self, user_id: i32, promo_code_id: i32) -> Result<bool, AppError>;
    async fn increment_promo_uses(&mut self, promo_code_id: i32) -> Result<(), AppError>;
    async fn insert_promo_usage(
        &mut self,
        user_id: i32,
        promo_code_id: i32,
        order_id: Option<i32>,
    ) -> Result<UserPromoCodeUsage, AppError>;
}

#[async_trait]
pub trait SubscriptionStore {
    async fn list_plans(&mut self) -> Result<Vec<SubscriptionPlan>, AppError>;
    async fn get_plan(&mut self, id: i32) -> Result<Option<SubscriptionPlan>, AppError>;
    async fn insert_plan(&mut self, plan: NewSubscriptionPlan) -> Result<SubscriptionPlan, AppError>;

    async fn insert_user_subscription(
        &mut self,
        subscription: NewUserSubscription,
    ) -> Result<UserSubscription, AppError>;
    async fn find_subscription_by_order(
        &mut self,
        user_id: i32,
        order_id: i32,
    ) -> Result<Option<UserSubscription>, AppError>;
    async fn find_active_subscription(&mut self, user_id: i32) -> Result<Option<UserSubscription>, AppError>;
    async fn list_user_subscriptions(&mut self, user_id: i32) -> Result<Vec<UserSubscription>, AppError>;
    /// Desativa todas as assinaturas ativas do usuário. Retorna quantas mudaram.
    async fn deactivate_user_subscriptions(&mut self, user_id: i32) -> Result<u64, AppError>;
    async fn set_subscription_active(&mut self, id: i32, active: bool) -> Result<(), AppError>;
    async fn increment_segmentations_used(&mut self, id: i32) -> Result<(), AppError>;
}

#[async_trait]
pub trait ScanStore {
    async fn insert_scan(&mut self, scan: NewScanTransaction) -> Result<ScanTransaction, AppError>;
    async fn find_scan(&mut self, guid: Uuid) -> Result<Option<ScanTransaction>, AppError>;
    /// Scans em `pending` ou `running`.
    async fn list_open_scans(&mut self) -> Result<Vec<ScanTransaction>, AppError>;
    async fn update_scan_result(
        &mut self,
        id: i32,
        status: ScanStatus,
        result_folder: Option<String>,
        result_view_url: Option<String>,
    ) -> Result<(), AppError>;
}

/// Uma transação. Se for descartada sem `commit`, nada do que foi escrito aparece.
#[async_trait]
pub trait UnitOfWork:
    OrderStore
    + CatalogStore
    + TrainingStore
    + UserStore
    + PaymentStore
    + PromoStore
    + SubscriptionStore
    + ScanStore
    + Send
{
    async fn commit(self: Box<Self>) -> Result<(), AppError>;
    async fn rollback(self: Box<Self>) -> Result<(), AppError>;
}

#[async_trait]
pub trait Store: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, AppError>;
}
