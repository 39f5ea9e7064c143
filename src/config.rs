// src/config.rs

use std::{env, str::FromStr, sync::Arc, time::Duration};

use anyhow::Context;
use rust_decimal::Decimal;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    db::{OutboxRepository, PgStore, Store},
    services::{
        CatalogService, ConfirmationNotifier, Mailer, MeshApiClient, NotificationSettings, OrderService,
        OutboxMailer, PaymentService, PromoService, ScanPoller, ScanService, SubscriptionService,
        TrainingService, UserService,
    },
};

#[derive(Debug, Clone)]
pub struct MeshApiConfig {
    pub base_url: String,
    pub token: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: String,
    pub db_max_connections: u32,
    pub notification: NotificationSettings,
    pub scan_poll_interval: Duration,
    /// Sem URL e token o monitor de scans não sobe.
    pub mesh_api: Option<MeshApiConfig>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").context("DATABASE_URL deve ser definida")?;

        let mesh_api = match (env::var("MESH_API_BASE_URL"), env::var("MESH_API_TOKEN")) {
            (Ok(base_url), Ok(token)) if !base_url.trim().is_empty() && !token.trim().is_empty() => {
                Some(MeshApiConfig { base_url, token })
            }
            _ => None,
        };

        Ok(Self {
            database_url,
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            db_max_connections: parse_var("DB_MAX_CONNECTIONS", 5)?,
            notification: NotificationSettings {
                shipping_fee: parse_var("SHIPPING_FEE", Decimal::from(150))?,
                sales_cc: env::var("SALES_CC_EMAIL").unwrap_or_else(|_| "sales@tiarapro.com".to_string()),
                training_cc: env::var("TRAINING_CC_EMAIL")
                    .unwrap_or_else(|_| "dentaltraining@tiarapro.com".to_string()),
                timeout: Duration::from_secs(parse_var("NOTIFICATION_TIMEOUT_SECS", 10)?),
            },
            scan_poll_interval: Duration::from_secs(parse_var("SCAN_POLL_INTERVAL_SECS", 300)?),
            mesh_api,
        })
    }
}

// Variável ausente usa o padrão; presente e inválida é erro.
fn parse_var<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{name} inválida: '{raw}'")),
        Err(_) => Ok(default),
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub store: Arc<dyn Store>,
    pub notifier: ConfirmationNotifier,
    pub order_service: OrderService,
    pub payment_service: PaymentService,
    pub promo_service: PromoService,
    pub subscription_service: SubscriptionService,
    pub training_service: TrainingService,
    pub catalog_service: CatalogService,
    pub scan_service: ScanService,
    pub user_service: UserService,
}

impl AppState {
    pub async fn new(config: &AppConfig) -> anyhow::Result<Self> {
        let db_pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        sqlx::migrate!()
            .run(&db_pool)
            .await
            .context("Falha ao rodar as migrações do banco de dados")?;

        tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

        let store: Arc<dyn Store> = Arc::new(PgStore::new(db_pool.clone()));
        let mailer: Arc<dyn Mailer> = Arc::new(OutboxMailer::new(db_pool.clone(), OutboxRepository::new()));

        Self::with_store(db_pool, store, mailer, config)
    }

    // --- Monta o gráfico de dependências ---
    pub fn with_store(
        db_pool: PgPool,
        store: Arc<dyn Store>,
        mailer: Arc<dyn Mailer>,
        config: &AppConfig,
    ) -> anyhow::Result<Self> {
        let notifier = ConfirmationNotifier::new(mailer, config.notification.clone())
            .context("Falha ao carregar os templates de e-mail")?;

        let order_service = OrderService::new(store.clone(), notifier.clone());
        let subscription_service = SubscriptionService::new(store.clone());
        let promo_service = PromoService::new(store.clone());
        let payment_service = PaymentService::new(
            store.clone(),
            order_service.clone(),
            subscription_service.clone(),
            promo_service.clone(),
        );

        Ok(Self {
            db_pool,
            store: store.clone(),
            notifier,
            order_service,
            payment_service,
            promo_service,
            subscription_service,
            training_service: TrainingService::new(store.clone()),
            catalog_service: CatalogService::new(store.clone()),
            scan_service: ScanService::new(store.clone()),
            user_service: UserService::new(store),
        })
    }

    /// Monitor de scans, quando a API de processamento está configurada.
    pub fn scan_poller(&self, config: &AppConfig) -> anyhow::Result<Option<ScanPoller>> {
        let Some(mesh) = &config.mesh_api else {
            return Ok(None);
        };
        let client = MeshApiClient::new(mesh.base_url.clone(), mesh.token.clone(), config.notification.timeout)
            .context("Falha ao criar o cliente da API de processamento")?;

        Ok(Some(ScanPoller::new(
            self.store.clone(),
            Arc::new(client),
            self.notifier.clone(),
            config.scan_poll_interval,
        )))
    }
}
