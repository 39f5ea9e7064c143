pub mod catalog_service;
pub mod notification;
pub mod order_service;
pub mod payment_service;
pub mod promo_service;
pub mod scan_poller;
pub mod scan_service;
pub mod subscription_service;
pub mod training_service;
pub mod user_service;

pub use catalog_service::CatalogService;
pub use notification::{ConfirmationNotifier, Mailer, NotificationSettings, OutboundEmail, OutboxMailer};
pub use order_service::OrderService;
pub use payment_service::PaymentService;
pub use promo_service::PromoService;
pub use scan_poller::{MeshApi, MeshApiClient, ScanPoller};
pub use scan_service::ScanService;
pub use subscription_service::SubscriptionService;
pub use training_service::TrainingService;
pub use user_service::UserService;
