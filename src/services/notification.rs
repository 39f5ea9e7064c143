// src/services/notification.rs

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use handlebars::Handlebars;
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::OutboxRepository,
    models::{
        orders::Order,
        scans::{ScanStatus, ScanTransaction},
        users::User,
    },
};

const ORDER_CONFIRMATION: &str = "order_confirmation";
const SCAN_RESULT: &str = "scan_result";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundEmail {
    pub to: String,
    pub subject: String,
    pub html_body: String,
    pub cc: Option<String>,
}

/// Envio de e-mail. A entrega real (SMTP) fica fora deste serviço.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: OutboundEmail) -> Result<(), AppError>;
}

// --- Caixa de saída no Postgres ---
#[derive(Clone)]
pub struct OutboxMailer {
    pool: PgPool,
    outbox_repo: OutboxRepository,
}

impl OutboxMailer {
    pub fn new(pool: PgPool, outbox_repo: OutboxRepository) -> Self {
        Self { pool, outbox_repo }
    }
}

#[async_trait]
impl Mailer for OutboxMailer {
    async fn send(&self, email: OutboundEmail) -> Result<(), AppError> {
        let id = self
            .outbox_repo
            .enqueue(&self.pool, &email.to, email.cc.as_deref(), &email.subject, &email.html_body)
            .await?;
        tracing::info!("📨 E-mail #{} para {} enfileirado", id, email.to);
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct NotificationSettings {
    pub shipping_fee: Decimal,
    pub sales_cc: String,
    pub training_cc: String,
    pub timeout: Duration,
}

/// Monta e despacha os e-mails que saem depois do commit.
#[derive(Clone)]
pub struct ConfirmationNotifier {
    mailer: Arc<dyn Mailer>,
    settings: NotificationSettings,
    templates: Arc<Handlebars<'static>>,
}

#[derive(Serialize)]
struct OrderEmailView<'a> {
    customer_name: String,
    order_id: i32,
    items: Vec<OrderLineView<'a>>,
    shipping_fee: Option<String>,
    total: String,
}

#[derive(Serialize)]
struct OrderLineView<'a> {
    name: &'a str,
    quantity: i32,
    price: String,
}

#[derive(Serialize)]
struct ScanEmailView<'a> {
    guid: String,
    completed: bool,
    download_url: Option<&'a str>,
    viewer_url: Option<&'a str>,
}

impl ConfirmationNotifier {
    /// Registra os templates uma vez; um template quebrado impede a subida.
    pub fn new(mailer: Arc<dyn Mailer>, settings: NotificationSettings) -> Result<Self, AppError> {
        let mut templates = Handlebars::new();
        templates
            .register_template_string(ORDER_CONFIRMATION, include_str!("../../templates/order_confirmation.hbs"))
            .map_err(template_error)?;
        templates
            .register_template_string(SCAN_RESULT, include_str!("../../templates/scan_result.hbs"))
            .map_err(template_error)?;

        Ok(Self {
            mailer,
            settings,
            templates: Arc::new(templates),
        })
    }

    pub fn settings(&self) -> &NotificationSettings {
        &self.settings
    }

    /// Destinatário: o usuário do pedido ou, sem ele, os dados de entrega.
    pub fn render_order_confirmation(&self, order: &Order, user: Option<&User>) -> Result<OutboundEmail, AppError> {
        let (to, customer_name) = match user {
            Some(user) => (user.email.clone(), user.full_name()),
            None => {
                let s = &order.shipping;
                let name = [&s.shipping_first_name, &s.shipping_middle_name, &s.shipping_last_name]
                    .into_iter()
                    .map(|part| part.trim())
                    .filter(|part| !part.is_empty())
                    .collect::<Vec<_>>()
                    .join(" ");
                (s.shipping_email.clone(), name)
            }
        };
        let customer_name = if customer_name.is_empty() { "Customer".to_string() } else { customer_name };

        let view = OrderEmailView {
            customer_name,
            order_id: order.id,
            items: order
                .items
                .iter()
                .map(|item| OrderLineView {
                    name: item.product_name.as_deref().unwrap_or("Item"),
                    quantity: item.quantity,
                    price: format_money(item.unit_price),
                })
                .collect(),
            shipping_fee: order.has_physical_items().then(|| format_money(self.settings.shipping_fee)),
            total: format_money(order.total_amount),
        };
        let html_body = self.templates.render(ORDER_CONFIRMATION, &view).map_err(template_error)?;

        let cc = if order.has_training_items() {
            self.settings.training_cc.clone()
        } else {
            self.settings.sales_cc.clone()
        };

        Ok(OutboundEmail {
            to,
            subject: format!("Order Confirmation - #{}", order.id),
            html_body,
            cc: Some(cc),
        })
    }

    pub fn render_scan_result(&self, scan: &ScanTransaction, email: &str) -> Result<OutboundEmail, AppError> {
        let view = ScanEmailView {
            guid: scan.transaction_guid.to_string(),
            completed: scan.status == ScanStatus::Completed,
            download_url: scan.result_folder.as_deref(),
            viewer_url: scan.result_view_url.as_deref(),
        };
        let html_body = self.templates.render(SCAN_RESULT, &view).map_err(template_error)?;

        Ok(OutboundEmail {
            to: email.to_string(),
            subject: "EMRA CBCT Scan - Result".to_string(),
            html_body,
            cc: Some(self.settings.sales_cc.clone()),
        })
    }

    /// Melhor esforço: falha ou timeout vira `false` e um aviso no log.
    pub async fn dispatch(&self, email: OutboundEmail) -> bool {
        let to = email.to.clone();
        match tokio::time::timeout(self.settings.timeout, self.mailer.send(email)).await {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                tracing::warn!("⚠️ Falha ao enviar e-mail para {}: {}", to, e);
                false
            }
            Err(_) => {
                tracing::warn!("⚠️ Envio de e-mail para {} excedeu {:?}", to, self.settings.timeout);
                false
            }
        }
    }
}

fn format_money(amount: Decimal) -> String {
    format!("EGP {:.2}", amount)
}

fn template_error(e: impl std::fmt::Display) -> AppError {
    AppError::InternalServerError(anyhow::anyhow!("Template de e-mail inválido: {e}"))
}
