pub mod store;
pub use store::{
    CatalogStore, OrderStore, PaymentStore, PromoStore, ScanStore, Store, SubscriptionStore, TrainingStore,
    UnitOfWork, UserStore,
};

pub mod pg_store;
pub use pg_store::PgStore;
pub mod memory;
pub use memory::MemoryStore;

pub mod order_repo;
pub use order_repo::OrderRepository;
pub mod catalog_repo;
pub use catalog_repo::CatalogRepository;
pub mod training_repo;
pub use training_repo::TrainingRepository;
pub mod user_repo;
pub use user_repo::UserRepository;
pub mod payment_repo;
pub use payment_repo::PaymentRepository;
pub mod promo_repo;
pub use promo_repo::PromoRepository;
pub mod subscription_repo;
pub use subscription_repo::SubscriptionRepository;
pub mod scan_repo;
pub use scan_repo::ScanRepository;
pub mod outbox_repo;
pub use outbox_repo::OutboxRepository;
