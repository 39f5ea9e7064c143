// src/db/pg_store.rs

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{
        store::{
            CatalogStore, OrderStore, PaymentStore, PromoStore, ScanStore, Store, SubscriptionStore,
            TrainingStore, UnitOfWork, UserStore,
        },
        CatalogRepository, OrderRepository, PaymentRepository, PromoRepository, ScanRepository,
        SubscriptionRepository, TrainingRepository, UserRepository,
    },
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

#[derive(Debug, Clone, Copy, Default)]
struct Repositories {
    orders: OrderRepository,
    catalog: CatalogRepository,
    training: TrainingRepository,
    users: UserRepository,
    payments: PaymentRepository,
    promos: PromoRepository,
    subscriptions: SubscriptionRepository,
    scans: ScanRepository,
}

/// Store de produção: cada unidade de trabalho é uma transação do Postgres.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
    repos: Repositories,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool, repos: Repositories::default() }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, AppError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgUnitOfWork { tx, repos: self.repos }))
    }
}

// Descartada sem commit, a transação do sqlx faz rollback sozinha.
pub struct PgUnitOfWork {
    tx: Transaction<'static, Postgres>,
    repos: Repositories,
}

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
    async fn commit(self: Box<Self>) -> Result<(), AppError> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), AppError> {
        self.tx.rollback().await?;
        Ok(())
    }
}

#[async_trait]
impl OrderStore for PgUnitOfWork {
    async fn get_order(&mut self, id: i32) -> Result<Option<Order>, AppError> {
        self.repos.orders.find_order(&mut self.tx, id).await
    }

    async fn insert_order(&mut self, draft: OrderDraft) -> Result<Order, AppError> {
        self.repos.orders.insert_order(&mut self.tx, draft).await
    }

    async fn update_order_status(&mut self, id: i32, status: OrderStatus) -> Result<(), AppError> {
        self.repos.orders.update_status(&mut *self.tx, id, status).await
    }
}

#[async_trait]
impl CatalogStore for PgUnitOfWork {
    async fn get_product(&mut self, id: i32) -> Result<Option<Product>, AppError> {
        self.repos.catalog.find_product(&mut self.tx, id).await
    }

    async fn update_product_stock(&mut self, id: i32, quantity: i32) -> Result<(), AppError> {
        self.repos.catalog.update_product_quantity(&mut *self.tx, id, quantity).await
    }

    async fn update_variant_stock(&mut self, id: i32, quantity: i32) -> Result<(), AppError> {
        self.repos.catalog.update_variant_quantity(&mut *self.tx, id, quantity).await
    }

    async fn insert_product(&mut self, product: NewProduct) -> Result<Product, AppError> {
        self.repos.catalog.insert_product(&mut self.tx, product).await
    }

    async fn insert_category(&mut self, category: NewCategory) -> Result<Category, AppError> {
        self.repos.catalog.insert_category(&mut *self.tx, category).await
    }

    async fn list_categories(&mut self) -> Result<Vec<Category>, AppError> {
        self.repos.catalog.list_categories(&mut *self.tx).await
    }
}

#[async_trait]
impl TrainingStore for PgUnitOfWork {
    async fn get_training(&mut self, id: i32) -> Result<Option<DentalTraining>, AppError> {
        self.repos.training.find_training(&mut *self.tx, id).await
    }

    async fn update_training_capacity(&mut self, id: i32, capacity: Option<i32>) -> Result<(), AppError> {
        self.repos.training.update_capacity(&mut *self.tx, id, capacity).await
    }

    async fn insert_training(&mut self, training: NewDentalTraining) -> Result<DentalTraining, AppError> {
        self.repos.training.insert_training(&mut *self.tx, training).await
    }

    async fn get_registration(
        &mut self,
        user_id: i32,
        training_id: i32,
    ) -> Result<Option<DentalTrainingRegistration>, AppError> {
        self.repos.training.find_registration(&mut *self.tx, user_id, training_id).await
    }

    async fn upsert_registration(
        &mut self,
        user_id: i32,
        training_id: i32,
        order_id: Option<i32>,
    ) -> Result<DentalTrainingRegistration, AppError> {
        self.repos
            .training
            .upsert_registration(&mut *self.tx, user_id, training_id, order_id)
            .await
    }

    async fn set_registration_confirmed(
        &mut self,
        order_id: i32,
        user_id: i32,
        training_id: i32,
        confirmed: bool,
    ) -> Result<bool, AppError> {
        self.repos
            .training
            .set_registration_confirmed(&mut *self.tx, order_id, user_id, training_id, confirmed)
            .await
    }

    async fn get_event(&mut self, id: i32) -> Result<Option<Event>, AppError> {
        self.repos.training.find_event(&mut *self.tx, id).await
    }

    async fn insert_event(&mut self, event: NewEvent) -> Result<Event, AppError> {
        self.repos.training.insert_event(&mut *self.tx, event).await
    }

    async fn count_event_registrations(&mut self, event_id: i32) -> Result<i64, AppError> {
        self.repos.training.count_event_registrations(&mut *self.tx, event_id).await
    }

    async fn find_event_registration(
        &mut self,
        user_id: i32,
        event_id: i32,
    ) -> Result<Option<EventRegistration>, AppError> {
        self.repos.training.find_event_registration(&mut *self.tx, user_id, event_id).await
    }

    async fn insert_event_registration(&mut self, user_id: i32, event_id: i32) -> Result<EventRegistration, AppError> {
        self.repos.training.insert_event_registration(&mut *self.tx, user_id, event_id).await
    }
}

#[async_trait]
impl UserStore for PgUnitOfWork {
    async fn get_user(&mut self, id: i32) -> Result<Option<User>, AppError> {
        self.repos.users.find_by_id(&mut *self.tx, id).await
    }

    async fn insert_user(&mut self, user: NewUser) -> Result<User, AppError> {
        self.repos.users.create_user(&mut *self.tx, user).await
    }
}

#[async_trait]
impl PaymentStore for PgUnitOfWork {
    async fn insert_payment(&mut self, payment: NewPayment) -> Result<Payment, AppError> {
        self.repos.payments.insert_payment(&mut *self.tx, payment).await
    }

    async fn find_payment_by_transaction(&mut self, transaction_id: &str) -> Result<Option<Payment>, AppError> {
        self.repos.payments.find_by_transaction(&mut *self.tx, transaction_id).await
    }

    async fn update_payment_status(&mut self, id: i32, status: &str) -> Result<(), AppError> {
        self.repos.payments.update_status(&mut *self.tx, id, status).await
    }
}

#[async_trait]
impl PromoStore for PgUnitOfWork {
    async fn find_promo_by_code(&mut self, code: &str) -> Result<Option<PromoCode>, AppError> {
        self.repos.promos.find_by_code(&mut *self.tx, code).await
    }

    async fn get_promo(&mut self, id: i32) -> Result<Option<PromoCode>, AppError> {
        self.repos.promos.find_by_id(&mut *self.tx, id).await
    }

    async fn list_promos(&mut self) -> Result<Vec<PromoCode>, AppError> {
        self.repos.promos.list_all(&mut *self.tx).await
    }

    async fn insert_promo(&mut self, promo: NewPromoCode) -> Result<PromoCode, AppError> {
        self.repos.promos.insert(&mut *self.tx, promo).await
    }

    async fn has_used_promo(&mut self, user_id: i32, promo_code_id: i32) -> Result<bool, AppError> {
        self.repos.promos.has_usage(&mut *self.tx, user_id, promo_code_id).await
    }

    async fn increment_promo_uses(&mut self, promo_code_id: i32) -> Result<(), AppError> {
        self.repos.promos.increment_uses(&mut *self.tx, promo_code_id).await
    }

    async fn insert_promo_usage(
        &mut self,
        user_id: i32,
        promo_code_id: i32,
        order_id: Option<i32>,
    ) -> Result<UserPromoCodeUsage, AppError> {
        self.repos
            .promos
            .insert_usage(&mut *self.tx, user_id, promo_code_id, order_id)
            .await
    }
}

#[async_trait]
impl SubscriptionStore for PgUnitOfWork {
    async fn list_plans(&mut self) -> Result<Vec<SubscriptionPlan>, AppError> {
        self.repos.subscriptions.list_plans(&mut *self.tx).await
    }

    async fn get_plan(&mut self, id: i32) -> Result<Option<SubscriptionPlan>, AppError> {
        self.repos.subscriptions.find_plan(&mut *self.tx, id).await
    }

    async fn insert_plan(&mut self, plan: NewSubscriptionPlan) -> Result<SubscriptionPlan, AppError> {
        self.repos.subscriptions.insert_plan(&mut *self.tx, plan).await
    }

    async fn insert_user_subscription(
        &mut self,
        subscription: NewUserSubscription,
    ) -> Result<UserSubscription, AppError> {
        self.repos.subscriptions.insert_subscription(&mut *self.tx, subscription).await
    }

    async fn find_subscription_by_order(
        &mut self,
        user_id: i32,
        order_id: i32,
    ) -> Result<Option<UserSubscription>, AppError> {
        self.repos.subscriptions.find_by_order(&mut *self.tx, user_id, order_id).await
    }

    async fn find_active_subscription(&mut self, user_id: i32) -> Result<Option<UserSubscription>, AppError> {
        self.repos.subscriptions.find_active(&mut *self.tx, user_id).await
    }

    async fn list_user_subscriptions(&mut self, user_id: i32) -> Result<Vec<UserSubscription>, AppError> {
        self.repos.subscriptions.list_for_user(&mut *self.tx, user_id).await
    }

    async fn deactivate_user_subscriptions(&mut self, user_id: i32) -> Result<u64, AppError> {
        self.repos.subscriptions.deactivate_all(&mut *self.tx, user_id).await
    }

    async fn set_subscription_active(&mut self, id: i32, active: bool) -> Result<(), AppError> {
        self.repos.subscriptions.set_active(&mut *self.tx, id, active).await
    }

    async fn increment_segmentations_used(&mut self, id: i32) -> Result<(), AppError> {
        self.repos.subscriptions.increment_used(&mut *self.tx, id).await
    }
}

#[async_trait]
impl ScanStore for PgUnitOfWork {
    async fn insert_scan(&mut self, scan: NewScanTransaction) -> Result<ScanTransaction, AppError> {
        self.repos.scans.insert(&mut *self.tx, scan).await
    }

    async fn find_scan(&mut self, guid: Uuid) -> Result<Option<ScanTransaction>, AppError> {
        self.repos.scans.find_by_guid(&mut *self.tx, guid).await
    }

    async fn list_open_scans(&mut self) -> Result<Vec<ScanTransaction>, AppError> {
        self.repos.scans.list_open(&mut *self.tx).await
    }

    async fn update_scan_result(
        &mut self,
        id: i32,
        status: ScanStatus,
        result_folder: Option<String>,
        result_view_url: Option<String>,
    ) -> Result<(), AppError> {
        self.repos
            .scans
            .update_result(&mut *self.tx, id, status, result_folder, result_view_url)
            .await
    }
}
