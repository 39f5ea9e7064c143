// src/db/memory.rs

//! Store em memória, para testes e desenvolvimento local.
//!
//! Uma unidade de trabalho segura o mutex do estado inteiro e trabalha numa
//! cópia; o `commit` troca a cópia pelo estado compartilhado. Como o mutex
//! fica preso até o commit (ou o drop), as unidades de trabalho rodam uma de
//! cada vez, assim como as linhas travadas com `FOR UPDATE` no Postgres.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::store::{
        CatalogStore, OrderStore, PaymentStore, PromoStore, ScanStore, Store, SubscriptionStore, TrainingStore,
        UnitOfWork, UserStore,
    },
    models::{
        catalog::{Category, NewCategory, NewProduct, Product, ProductVariant},
        orders::{Order, OrderDraft, OrderItem, OrderStatus},
        payments::{NewPayment, Payment},
        promo::{NewPromoCode, PromoCode, UserPromoCodeUsage},
        scans::{NewScanTransaction, ScanStatus, ScanTransaction},
        subscriptions::{NewSubscriptionPlan, NewUserSubscription, SubscriptionPlan, UserSubscription},
        training::{
            DentalTraining, DentalTrainingRegistration, Event, EventRegistration, NewDentalTraining, NewEvent,
        },
        users::{NewUser, User},
    },
};

const DEFAULT_SIZE_RANGE: i32 = 7;

#[derive(Debug, Clone, Default)]
struct MemoryState {
    last_id: i32,
    users: BTreeMap<i32, User>,
    categories: BTreeMap<i32, Category>,
    products: BTreeMap<i32, Product>,
    trainings: BTreeMap<i32, DentalTraining>,
    registrations: Vec<DentalTrainingRegistration>,
    events: BTreeMap<i32, Event>,
    event_registrations: Vec<EventRegistration>,
    promos: BTreeMap<i32, PromoCode>,
    promo_usages: Vec<UserPromoCodeUsage>,
    // Pagamentos ficam fora do pedido, como na tabela.
    orders: BTreeMap<i32, Order>,
    payments: Vec<Payment>,
    plans: BTreeMap<i32, SubscriptionPlan>,
    subscriptions: BTreeMap<i32, UserSubscription>,
    scans: BTreeMap<i32, ScanTransaction>,
}

impl MemoryState {
    fn next_id(&mut self) -> i32 {
        self.last_id += 1;
        self.last_id
    }

    fn reserve_id(&mut self, id: i32) {
        self.last_id = self.last_id.max(id);
    }

    fn order_with_payments(&self, id: i32) -> Option<Order> {
        let mut order = self.orders.get(&id)?.clone();
        order.payments = self.payments.iter().filter(|p| p.order_id == id).cloned().collect();
        Some(order)
    }
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
    commits: Arc<AtomicUsize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Quantas unidades de trabalho já foram confirmadas.
    pub fn commit_count(&self) -> usize {
        self.commits.load(Ordering::SeqCst)
    }

    // ---
    // Fixtures: gravam direto no estado, com os IDs informados.
    // ---

    pub async fn put_user(&self, user: User) {
        let mut state = self.state.lock().await;
        state.reserve_id(user.id);
        state.users.insert(user.id, user);
    }

    pub async fn put_product(&self, product: Product) {
        let mut state = self.state.lock().await;
        state.reserve_id(product.id);
        for variant in &product.variants {
            state.reserve_id(variant.id);
        }
        state.products.insert(product.id, product);
    }

    pub async fn put_training(&self, training: DentalTraining) {
        let mut state = self.state.lock().await;
        state.reserve_id(training.id);
        state.trainings.insert(training.id, training);
    }

    pub async fn put_registration(&self, registration: DentalTrainingRegistration) {
        let mut state = self.state.lock().await;
        state.reserve_id(registration.id);
        state
            .registrations
            .retain(|r| !(r.user_id == registration.user_id && r.training_id == registration.training_id));
        state.registrations.push(registration);
    }

    pub async fn put_event(&self, event: Event) {
        let mut state = self.state.lock().await;
        state.reserve_id(event.id);
        state.events.insert(event.id, event);
    }

    pub async fn put_promo(&self, promo: PromoCode) {
        let mut state = self.state.lock().await;
        state.reserve_id(promo.id);
        state.promos.insert(promo.id, promo);
    }

    pub async fn put_plan(&self, plan: SubscriptionPlan) {
        let mut state = self.state.lock().await;
        state.reserve_id(plan.id);
        state.plans.insert(plan.id, plan);
    }

    pub async fn put_subscription(&self, subscription: UserSubscription) {
        let mut state = self.state.lock().await;
        state.reserve_id(subscription.id);
        state.subscriptions.insert(subscription.id, subscription);
    }

    pub async fn put_order(&self, mut order: Order) {
        let mut state = self.state.lock().await;
        state.reserve_id(order.id);
        for item in &order.items {
            state.reserve_id(item.id);
        }
        for payment in order.payments.drain(..) {
            state.reserve_id(payment.id);
            state.payments.push(payment);
        }
        state.orders.insert(order.id, order);
    }

    pub async fn put_scan(&self, scan: ScanTransaction) {
        let mut state = self.state.lock().await;
        state.reserve_id(scan.id);
        state.scans.insert(scan.id, scan);
    }

    // ---
    // Leitura do estado confirmado
    // ---

    pub async fn product(&self, id: i32) -> Option<Product> {
        self.state.lock().await.products.get(&id).cloned()
    }

    pub async fn training(&self, id: i32) -> Option<DentalTraining> {
        self.state.lock().await.trainings.get(&id).cloned()
    }

    pub async fn order(&self, id: i32) -> Option<Order> {
        self.state.lock().await.order_with_payments(id)
    }

    pub async fn registration(&self, user_id: i32, training_id: i32) -> Option<DentalTrainingRegistration> {
        self.state
            .lock()
            .await
            .registrations
            .iter()
            .find(|r| r.user_id == user_id && r.training_id == training_id)
            .cloned()
    }

    pub async fn user_subscriptions(&self, user_id: i32) -> Vec<UserSubscription> {
        self.state
            .lock()
            .await
            .subscriptions
            .values()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect()
    }

    pub async fn promo(&self, id: i32) -> Option<PromoCode> {
        self.state.lock().await.promos.get(&id).cloned()
    }

    pub async fn promo_usages(&self, user_id: i32) -> Vec<UserPromoCodeUsage> {
        self.state
            .lock()
            .await
            .promo_usages
            .iter()
            .filter(|u| u.user_id == user_id)
            .cloned()
            .collect()
    }

    pub async fn scan(&self, guid: Uuid) -> Option<ScanTransaction> {
        self.state
            .lock()
            .await
            .scans
            .values()
            .find(|s| s.transaction_guid == guid)
            .cloned()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, AppError> {
        let guard = self.state.clone().lock_owned().await;
        let working = (*guard).clone();
        Ok(Box::new(MemoryUnitOfWork {
            guard,
            working,
            commits: self.commits.clone(),
        }))
    }
}

pub struct MemoryUnitOfWork {
    guard: OwnedMutexGuard<MemoryState>,
    working: MemoryState,
    commits: Arc<AtomicUsize>,
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
    async fn commit(self: Box<Self>) -> Result<(), AppError> {
        let MemoryUnitOfWork { mut guard, working, commits } = *self;
        *guard = working;
        commits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), AppError> {
        // A cópia é descartada junto com o guard.
        Ok(())
    }
}

#[async_trait]
impl OrderStore for MemoryUnitOfWork {
    async fn get_order(&mut self, id: i32) -> Result<Option<Order>, AppError> {
        Ok(self.working.order_with_payments(id))
    }

    async fn insert_order(&mut self, draft: OrderDraft) -> Result<Order, AppError> {
        let state = &mut self.working;
        let id = state.next_id();
        let items = draft
            .items
            .into_iter()
            .map(|item| OrderItem {
                id: state.next_id(),
                order_id: id,
                kind: item.kind,
                quantity: item.quantity,
                unit_price: item.unit_price,
                product_name: item.product_name,
                product_image: item.product_image,
            })
            .collect();

        let order = Order {
            id,
            user_id: draft.user_id,
            status: OrderStatus::Pending,
            total_amount: draft.total_amount,
            promo_code_id: draft.promo_code_id,
            shipping: draft.shipping,
            created_at: Utc::now(),
            updated_at: None,
            items,
            payments: Vec::new(),
        };
        state.orders.insert(id, order.clone());
        Ok(order)
    }

    async fn update_order_status(&mut self, id: i32, status: OrderStatus) -> Result<(), AppError> {
        let order = self.working.orders.get_mut(&id).ok_or(AppError::OrderNotFound(id))?;
        order.status = status;
        order.updated_at = Some(Utc::now());
        Ok(())
    }
}

#[async_trait]
impl CatalogStore for MemoryUnitOfWork {
    async fn get_product(&mut self, id: i32) -> Result<Option<Product>, AppError> {
        Ok(self.working.products.get(&id).cloned())
    }

    async fn update_product_stock(&mut self, id: i32, quantity: i32) -> Result<(), AppError> {
        let product = self.working.products.get_mut(&id).ok_or(AppError::ProductNotFound(id))?;
        product.quantity = quantity;
        Ok(())
    }

    async fn update_variant_stock(&mut self, id: i32, quantity: i32) -> Result<(), AppError> {
        if let Some(variant) = self
            .working
            .products
            .values_mut()
            .flat_map(|p| p.variants.iter_mut())
            .find(|v| v.id == id)
        {
            variant.quantity = quantity;
        }
        Ok(())
    }

    async fn insert_product(&mut self, new: NewProduct) -> Result<Product, AppError> {
        let state = &mut self.working;
        let id = state.next_id();
        let variants: Vec<ProductVariant> = new
            .variants
            .into_iter()
            .map(|v| ProductVariant {
                id: state.next_id(),
                product_id: id,
                sku: v.sku,
                quantity: v.quantity,
                side: v.side,
                size: v.size,
                size_range: DEFAULT_SIZE_RANGE,
                variant_option: v.variant_option,
                parent_product_id: id,
            })
            .collect();

        let product = Product {
            id,
            name: new.name,
            sku: new.sku,
            quantity: new.quantity,
            price: new.price,
            description: new.description,
            is_active: true,
            is_variant: !variants.is_empty(),
            category_id: new.category_id,
            parent_sku: None,
            brand: new.brand,
            logo_url: new.logo_url,
            variants,
        };
        state.products.insert(id, product.clone());
        Ok(product)
    }

    async fn insert_category(&mut self, new: NewCategory) -> Result<Category, AppError> {
        let id = self.working.next_id();
        let category = Category {
            id,
            name: new.name,
            description: new.description,
            parent_id: new.parent_id,
        };
        self.working.categories.insert(id, category.clone());
        Ok(category)
    }

    async fn list_categories(&mut self) -> Result<Vec<Category>, AppError> {
        let mut categories: Vec<Category> = self.working.categories.values().cloned().collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }
}

#[async_trait]
impl TrainingStore for MemoryUnitOfWork {
    async fn get_training(&mut self, id: i32) -> Result<Option<DentalTraining>, AppError> {
        Ok(self.working.trainings.get(&id).cloned())
    }

    async fn update_training_capacity(&mut self, id: i32, capacity: Option<i32>) -> Result<(), AppError> {
        let training = self.working.trainings.get_mut(&id).ok_or(AppError::TrainingNotFound(id))?;
        training.capacity = capacity;
        Ok(())
    }

    async fn insert_training(&mut self, new: NewDentalTraining) -> Result<DentalTraining, AppError> {
        let id = self.working.next_id();
        let training = DentalTraining {
            id,
            title: new.title,
            description: new.description,
            date: new.date,
            location: new.location,
            price: new.price,
            capacity: new.capacity,
        };
        self.working.trainings.insert(id, training.clone());
        Ok(training)
    }

    async fn get_registration(
        &mut self,
        user_id: i32,
        training_id: i32,
    ) -> Result<Option<DentalTrainingRegistration>, AppError> {
        Ok(self
            .working
            .registrations
            .iter()
            .find(|r| r.user_id == user_id && r.training_id == training_id)
            .cloned())
    }

    async fn upsert_registration(
        &mut self,
        user_id: i32,
        training_id: i32,
        order_id: Option<i32>,
    ) -> Result<DentalTrainingRegistration, AppError> {
        if let Some(existing) = self
            .working
            .registrations
            .iter_mut()
            .find(|r| r.user_id == user_id && r.training_id == training_id)
        {
            existing.order_id = order_id;
            existing.confirmed = false;
            return Ok(existing.clone());
        }

        let registration = DentalTrainingRegistration {
            id: self.working.next_id(),
            user_id,
            training_id,
            order_id,
            confirmed: false,
            registered_at: Utc::now(),
        };
        self.working.registrations.push(registration.clone());
        Ok(registration)
    }

    async fn set_registration_confirmed(
        &mut self,
        order_id: i32,
        user_id: i32,
        training_id: i32,
        confirmed: bool,
    ) -> Result<bool, AppError> {
        let mut touched = false;
        for registration in self.working.registrations.iter_mut().filter(|r| {
            r.order_id == Some(order_id) && r.user_id == user_id && r.training_id == training_id
        }) {
            registration.confirmed = confirmed;
            touched = true;
        }
        Ok(touched)
    }

    async fn get_event(&mut self, id: i32) -> Result<Option<Event>, AppError> {
        Ok(self.working.events.get(&id).cloned())
    }

    async fn insert_event(&mut self, new: NewEvent) -> Result<Event, AppError> {
        let id = self.working.next_id();
        let event = Event {
            id,
            title: new.title,
            description: new.description,
            date: new.date,
            location: new.location,
            capacity: new.capacity,
            created_at: Utc::now(),
        };
        self.working.events.insert(id, event.clone());
        Ok(event)
    }

    async fn count_event_registrations(&mut self, event_id: i32) -> Result<i64, AppError> {
        Ok(self
            .working
            .event_registrations
            .iter()
            .filter(|r| r.event_id == event_id)
            .count() as i64)
    }

    async fn find_event_registration(
        &mut self,
        user_id: i32,
        event_id: i32,
    ) -> Result<Option<EventRegistration>, AppError> {
        Ok(self
            .working
            .event_registrations
            .iter()
            .find(|r| r.user_id == user_id && r.event_id == event_id)
            .cloned())
    }

    async fn insert_event_registration(&mut self, user_id: i32, event_id: i32) -> Result<EventRegistration, AppError> {
        if self
            .working
            .event_registrations
            .iter()
            .any(|r| r.user_id == user_id && r.event_id == event_id)
        {
            return Err(AppError::AlreadyRegistered {
                user_id,
                target: format!("evento {event_id}"),
            });
        }

        let registration = EventRegistration {
            id: self.working.next_id(),
            user_id,
            event_id,
            registered_at: Utc::now(),
        };
        self.working.event_registrations.push(registration.clone());
        Ok(registration)
    }
}

#[async_trait]
impl UserStore for MemoryUnitOfWork {
    async fn get_user(&mut self, id: i32) -> Result<Option<User>, AppError> {
        Ok(self.working.users.get(&id).cloned())
    }

    async fn insert_user(&mut self, new: NewUser) -> Result<User, AppError> {
        if self.working.users.values().any(|u| u.email.eq_ignore_ascii_case(&new.email)) {
            return Err(AppError::EmailAlreadyExists(new.email));
        }
        let id = self.working.next_id();
        let user = User {
            id,
            email: new.email,
            first_name: new.first_name,
            middle_name: new.middle_name,
            last_name: new.last_name,
            created_at: Utc::now(),
        };
        self.working.users.insert(id, user.clone());
        Ok(user)
    }
}

#[async_trait]
impl PaymentStore for MemoryUnitOfWork {
    async fn insert_payment(&mut self, new: NewPayment) -> Result<Payment, AppError> {
        let payment = Payment {
            id: self.working.next_id(),
            order_id: new.order_id,
            method: new.method,
            status: new.status,
            amount: new.amount,
            transaction_id: Some(new.transaction_id),
            notes: new.notes,
            created_at: Utc::now(),
        };
        self.working.payments.push(payment.clone());
        Ok(payment)
    }

    async fn find_payment_by_transaction(&mut self, transaction_id: &str) -> Result<Option<Payment>, AppError> {
        Ok(self
            .working
            .payments
            .iter()
            .find(|p| p.transaction_id.as_deref() == Some(transaction_id))
            .cloned())
    }

    async fn update_payment_status(&mut self, id: i32, status: &str) -> Result<(), AppError> {
        if let Some(payment) = self.working.payments.iter_mut().find(|p| p.id == id) {
            payment.status = status.to_string();
        }
        Ok(())
    }
}

#[async_trait]
impl PromoStore for MemoryUnitOfWork {
    async fn find_promo_by_code(&mut self, code: &str) -> Result<Option<PromoCode>, AppError> {
        Ok(self.working.promos.values().find(|p| p.code == code).cloned())
    }

    async fn get_promo(&mut self, id: i32) -> Result<Option<PromoCode>, AppError> {
        Ok(self.working.promos.get(&id).cloned())
    }

    async fn list_promos(&mut self) -> Result<Vec<PromoCode>, AppError> {
        let mut promos: Vec<PromoCode> = self.working.promos.values().cloned().collect();
        promos.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(promos)
    }

    async fn insert_promo(&mut self, new: NewPromoCode) -> Result<PromoCode, AppError> {
        if self.working.promos.values().any(|p| p.code == new.code) {
            return Err(AppError::PromoCodeAlreadyExists(new.code));
        }
        let promo = PromoCode {
            id: self.working.next_id(),
            code: new.code,
            discount_percent: new.discount_percent,
            start_date: new.start_date,
            end_date: new.end_date,
            is_active: new.is_active,
            max_uses: new.max_uses,
            current_uses: 0,
            minimum_order_amount: new.minimum_order_amount,
            created_at: Utc::now(),
        };
        self.working.promos.insert(promo.id, promo.clone());
        Ok(promo)
    }

    async fn has_used_promo(&mut self, user_id: i32, promo_code_id: i32) -> Result<bool, AppError> {
        Ok(self
            .working
            .promo_usages
            .iter()
            .any(|u| u.user_id == user_id && u.promo_code_id == promo_code_id))
    }

    async fn increment_promo_uses(&mut self, promo_code_id: i32) -> Result<(), AppError> {
        if let Some(promo) = self.working.promos.get_mut(&promo_code_id) {
            promo.current_uses += 1;
        }
        Ok(())
    }

    async fn insert_promo_usage(
        &mut self,
        user_id: i32,
        promo_code_id: i32,
        order_id: Option<i32>,
    ) -> Result<UserPromoCodeUsage, AppError> {
        if self.has_used_promo(user_id, promo_code_id).await? {
            return Err(AppError::PromoCodeAlreadyUsed { user_id, promo_code_id });
        }
        let usage = UserPromoCodeUsage {
            id: self.working.next_id(),
            user_id,
            promo_code_id,
            order_id,
            used_at: Utc::now(),
        };
        self.working.promo_usages.push(usage.clone());
        Ok(usage)
    }
}

#[async_trait]
impl SubscriptionStore for MemoryUnitOfWork {
    async fn list_plans(&mut self) -> Result<Vec<SubscriptionPlan>, AppError> {
        let mut plans: Vec<SubscriptionPlan> =
            self.working.plans.values().filter(|p| p.is_active).cloned().collect();
        plans.sort_by(|a, b| a.price.cmp(&b.price));
        Ok(plans)
    }

    async fn get_plan(&mut self, id: i32) -> Result<Option<SubscriptionPlan>, AppError> {
        Ok(self.working.plans.get(&id).cloned())
    }

    async fn insert_plan(&mut self, new: NewSubscriptionPlan) -> Result<SubscriptionPlan, AppError> {
        let plan = SubscriptionPlan {
            id: self.working.next_id(),
            name: new.name,
            price: new.price,
            segmentations_allowed: new.segmentations_allowed,
            description: new.description,
            is_active: true,
        };
        self.working.plans.insert(plan.id, plan.clone());
        Ok(plan)
    }

    async fn insert_user_subscription(
        &mut self,
        new: NewUserSubscription,
    ) -> Result<UserSubscription, AppError> {
        let subscription = UserSubscription {
            id: self.working.next_id(),
            user_id: new.user_id,
            plan_id: new.plan_id,
            order_id: new.order_id,
            segmentations_used: 0,
            segmentations_allowed: new.segmentations_allowed,
            subscribed_at: Utc::now(),
            expires_at: new.expires_at,
            is_active: false,
        };
        self.working.subscriptions.insert(subscription.id, subscription.clone());
        Ok(subscription)
    }

    async fn find_subscription_by_order(
        &mut self,
        user_id: i32,
        order_id: i32,
    ) -> Result<Option<UserSubscription>, AppError> {
        Ok(self
            .working
            .subscriptions
            .values()
            .rev()
            .find(|s| s.user_id == user_id && s.order_id == order_id)
            .cloned())
    }

    async fn find_active_subscription(&mut self, user_id: i32) -> Result<Option<UserSubscription>, AppError> {
        Ok(self
            .working
            .subscriptions
            .values()
            .find(|s| s.user_id == user_id && s.is_active)
            .cloned())
    }

    async fn list_user_subscriptions(&mut self, user_id: i32) -> Result<Vec<UserSubscription>, AppError> {
        Ok(self
            .working
            .subscriptions
            .values()
            .rev()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn deactivate_user_subscriptions(&mut self, user_id: i32) -> Result<u64, AppError> {
        let mut changed = 0;
        for subscription in self
            .working
            .subscriptions
            .values_mut()
            .filter(|s| s.user_id == user_id && s.is_active)
        {
            subscription.is_active = false;
            changed += 1;
        }
        Ok(changed)
    }

    async fn set_subscription_active(&mut self, id: i32, active: bool) -> Result<(), AppError> {
        let Some(user_id) = self.working.subscriptions.get(&id).map(|s| s.user_id) else {
            return Ok(());
        };
        // Mesmo efeito do índice único parcial `user_subscriptions_one_active`.
        let other_active = self
            .working
            .subscriptions
            .values()
            .any(|s| s.user_id == user_id && s.is_active && s.id != id);
        if active && other_active {
            return Err(anyhow::anyhow!("usuário {user_id} já possui uma assinatura ativa").into());
        }
        if let Some(subscription) = self.working.subscriptions.get_mut(&id) {
            subscription.is_active = active;
        }
        Ok(())
    }

    async fn increment_segmentations_used(&mut self, id: i32) -> Result<(), AppError> {
        if let Some(subscription) = self.working.subscriptions.get_mut(&id) {
            subscription.segmentations_used += 1;
        }
        Ok(())
    }
}

#[async_trait]
impl ScanStore for MemoryUnitOfWork {
    async fn insert_scan(&mut self, new: NewScanTransaction) -> Result<ScanTransaction, AppError> {
        let scan = ScanTransaction {
            id: self.working.next_id(),
            transaction_guid: new.transaction_guid,
            s3_url: new.s3_url,
            user_id: new.user_id,
            status: ScanStatus::Running,
            result_folder: None,
            result_view_url: None,
            created_at: Utc::now(),
        };
        self.working.scans.insert(scan.id, scan.clone());
        Ok(scan)
    }

    async fn find_scan(&mut self, guid: Uuid) -> Result<Option<ScanTransaction>, AppError> {
        Ok(self.working.scans.values().find(|s| s.transaction_guid == guid).cloned())
    }

    async fn list_open_scans(&mut self) -> Result<Vec<ScanTransaction>, AppError> {
        Ok(self
            .working
            .scans
            .values()
            .filter(|s| s.status.is_open())
            .cloned()
            .collect())
    }

    async fn update_scan_result(
        &mut self,
        id: i32,
        status: ScanStatus,
        result_folder: Option<String>,
        result_view_url: Option<String>,
    ) -> Result<(), AppError> {
        if let Some(scan) = self.working.scans.get_mut(&id) {
            scan.status = status;
            if result_folder.is_some() {
                scan.result_folder = result_folder;
            }
            if result_view_url.is_some() {
                scan.result_view_url = result_view_url;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn new_product(quantity: i32) -> NewProduct {
        NewProduct {
            name: "Escova".into(),
            sku: "ESC-1".into(),
            quantity,
            price: Decimal::from(45),
            description: None,
            category_id: None,
            brand: None,
            logo_url: None,
            variants: Vec::new(),
        }
    }

    #[tokio::test]
    async fn dropped_unit_of_work_leaves_no_trace() {
        let store = MemoryStore::new();
        {
            let mut uow = store.begin().await.unwrap();
            uow.insert_product(new_product(3)).await.unwrap();
        }
        assert_eq!(store.commit_count(), 0);
        assert!(store.product(1).await.is_none());
    }

    #[tokio::test]
    async fn commit_publishes_the_working_copy() {
        let store = MemoryStore::new();
        let mut uow = store.begin().await.unwrap();
        let product = uow.insert_product(new_product(3)).await.unwrap();
        uow.update_product_stock(product.id, 1).await.unwrap();
        uow.commit().await.unwrap();

        assert_eq!(store.commit_count(), 1);
        assert_eq!(store.product(product.id).await.unwrap().quantity, 1);
    }
}
