// src/db/order_repo.rs

use sqlx::{Executor, PgConnection, Postgres};

use crate::{
    common::error::AppError,
    models::{
        orders::{LineItemKind, LineItemKindTag, Order, OrderDraft, OrderItem, OrderItemRow, OrderStatus},
        payments::Payment,
    },
};

#[derive(Debug, Clone, Copy, Default)]
pub struct OrderRepository;

impl OrderRepository {
    pub fn new() -> Self {
        Self
    }

    /// Lê o pedido travando a linha (`FOR UPDATE`) junto com itens e pagamentos.
    pub async fn find_order(&self, conn: &mut PgConnection, id: i32) -> Result<Option<Order>, AppError> {
        let maybe_order = sqlx::query_as::<_, Order>(
            r#"
            SELECT
                id, user_id, status, total_amount, promo_code_id,
                shipping_address, shipping_city, shipping_state, shipping_postal_code,
                shipping_country, shipping_phone, shipping_email,
                shipping_first_name, shipping_middle_name, shipping_last_name,
                created_at, updated_at
            FROM orders
            WHERE id = $1
            FOR UPDATE
            "#,
        )
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;

        let Some(mut order) = maybe_order else {
            return Ok(None);
        };

        order.items = self.find_items(&mut *conn, id).await?;
        order.payments = self.find_payments(&mut *conn, id).await?;
        Ok(Some(order))
    }

    pub async fn find_items<'e, E>(&self, executor: E, order_id: i32) -> Result<Vec<OrderItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, OrderItemRow>(
            r#"
            SELECT id, order_id, kind, product_id, variant_id, plan_id, training_id,
                   quantity, unit_price, product_name, product_image
            FROM order_items
            WHERE order_id = $1
            ORDER BY position ASC
            "#,
        )
            .bind(order_id)
            .fetch_all(executor)
            .await?;

        rows.into_iter().map(OrderItem::try_from).collect()
    }

    pub async fn find_payments<'e, E>(&self, executor: E, order_id: i32) -> Result<Vec<Payment>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let payments = sqlx::query_as::<_, Payment>(
            r#"
            SELECT id, order_id, method, status, amount, transaction_id, notes, created_at
            FROM payments
            WHERE order_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
            .bind(order_id)
            .fetch_all(executor)
            .await?;
        Ok(payments)
    }

    /// Insere o pedido `Pending` e as suas linhas, preservando a ordem do carrinho.
    pub async fn insert_order(&self, conn: &mut PgConnection, draft: OrderDraft) -> Result<Order, AppError> {
        let shipping = &draft.shipping;
        let mut order = sqlx::query_as::<_, Order>(
            r#"
            INSERT INTO orders (
                user_id, status, total_amount, promo_code_id,
                shipping_address, shipping_city, shipping_state, shipping_postal_code,
                shipping_country, shipping_phone, shipping_email,
                shipping_first_name, shipping_middle_name, shipping_last_name
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING
                id, user_id, status, total_amount, promo_code_id,
                shipping_address, shipping_city, shipping_state, shipping_postal_code,
                shipping_country, shipping_phone, shipping_email,
                shipping_first_name, shipping_middle_name, shipping_last_name,
                created_at, updated_at
            "#,
        )
            .bind(draft.user_id)
            .bind(OrderStatus::Pending)
            .bind(draft.total_amount)
            .bind(draft.promo_code_id)
            .bind(&shipping.shipping_address)
            .bind(&shipping.shipping_city)
            .bind(&shipping.shipping_state)
            .bind(&shipping.shipping_postal_code)
            .bind(&shipping.shipping_country)
            .bind(&shipping.shipping_phone)
            .bind(&shipping.shipping_email)
            .bind(&shipping.shipping_first_name)
            .bind(&shipping.shipping_middle_name)
            .bind(&shipping.shipping_last_name)
            .fetch_one(&mut *conn)
            .await?;

        for (position, item) in draft.items.into_iter().enumerate() {
            // Uma coluna de referência por tipo (ver CHECK da tabela).
            let (tag, product_id, variant_id, plan_id, training_id) = match item.kind {
                LineItemKind::Product { product_id, variant_id } => {
                    (LineItemKindTag::Product, Some(product_id), variant_id, None, None)
                }
                LineItemKind::AiSubscription { plan_id } => {
                    (LineItemKindTag::AiSubscription, None, None, Some(plan_id), None)
                }
                LineItemKind::TrainingPackage { training_id } => {
                    (LineItemKindTag::TrainingPackage, None, None, None, Some(training_id))
                }
            };

            let row = sqlx::query_as::<_, OrderItemRow>(
                r#"
                INSERT INTO order_items (
                    order_id, position, kind, product_id, variant_id, plan_id, training_id,
                    quantity, unit_price, product_name, product_image
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
                RETURNING id, order_id, kind, product_id, variant_id, plan_id, training_id,
                          quantity, unit_price, product_name, product_image
                "#,
            )
                .bind(order.id)
                .bind(position as i32)
                .bind(tag)
                .bind(product_id)
                .bind(variant_id)
                .bind(plan_id)
                .bind(training_id)
                .bind(item.quantity)
                .bind(item.unit_price)
                .bind(item.product_name)
                .bind(item.product_image)
                .fetch_one(&mut *conn)
                .await?;

            order.items.push(OrderItem::try_from(row)?);
        }

        Ok(order)
    }

    pub async fn update_status<'e, E>(&self, executor: E, id: i32, status: OrderStatus) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("UPDATE orders SET status = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(status)
            .execute(executor)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::OrderNotFound(id));
        }
        Ok(())
    }
}
