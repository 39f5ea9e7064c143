// src/handlers/orders.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    models::orders::{Checkout, CheckoutLine, ConfirmationReceipt, Order, OrderStatus, ShippingDetails},
};

// ---
// Payload: Checkout
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShippingPayload {
    #[validate(length(min = 1, message = "O endereço é obrigatório."))]
    pub shipping_address: String,
    #[validate(length(min = 1, message = "A cidade é obrigatória."))]
    pub shipping_city: String,
    #[serde(default)]
    pub shipping_state: String,
    #[serde(default)]
    pub shipping_postal_code: String,
    #[validate(length(min = 1, message = "O país é obrigatório."))]
    pub shipping_country: String,
    #[validate(length(min = 1, message = "O telefone é obrigatório."))]
    pub shipping_phone: String,
    #[validate(email(message = "O e-mail é inválido."))]
    pub shipping_email: String,
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub shipping_first_name: String,
    #[serde(default)]
    pub shipping_middle_name: String,
    #[validate(length(min = 1, message = "O sobrenome é obrigatório."))]
    pub shipping_last_name: String,
}

impl From<ShippingPayload> for ShippingDetails {
    fn from(p: ShippingPayload) -> Self {
        ShippingDetails {
            shipping_address: p.shipping_address,
            shipping_city: p.shipping_city,
            shipping_state: p.shipping_state,
            shipping_postal_code: p.shipping_postal_code,
            shipping_country: p.shipping_country,
            shipping_phone: p.shipping_phone,
            shipping_email: p.shipping_email,
            shipping_first_name: p.shipping_first_name,
            shipping_middle_name: p.shipping_middle_name,
            shipping_last_name: p.shipping_last_name,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutItemPayload {
    /// ID como o carrinho envia; planos e treinamentos usam faixas próprias.
    #[schema(example = 5)]
    pub product_id: i32,
    pub variant_id: Option<i32>,
    #[validate(range(min = 1, message = "A quantidade deve ser maior que zero."))]
    pub quantity: i32,
    #[schema(example = "Coroa Pediátrica, UpperRight, 2")]
    pub product_name: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutPayload {
    pub user_id: Option<i32>,
    pub promo_code: Option<String>,
    #[validate(nested)]
    pub shipping: ShippingPayload,
    #[validate(length(min = 1, message = "O pedido precisa de ao menos um item."), nested)]
    pub items: Vec<CheckoutItemPayload>,
}

impl From<CheckoutPayload> for Checkout {
    fn from(p: CheckoutPayload) -> Self {
        Checkout {
            user_id: p.user_id,
            promo_code: p.promo_code,
            shipping: p.shipping.into(),
            lines: p
                .items
                .into_iter()
                .map(|item| CheckoutLine {
                    product_id: item.product_id,
                    variant_id: item.variant_id,
                    quantity: item.quantity,
                    product_name: item.product_name,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusPayload {
    #[validate(length(min = 1, message = "O status é obrigatório."))]
    #[schema(example = "Cancelled")]
    pub status: String,
}

// ---
// Handlers
// ---

#[utoipa::path(
    post,
    path = "/api/orders",
    tag = "Orders",
    request_body = CheckoutPayload,
    responses(
        (status = 201, description = "Pedido criado como Pending", body = Order),
        (status = 400, description = "Payload inválido"),
        (status = 409, description = "Cupom recusado ou compra sem conta não permitida")
    )
)]
pub async fn create_order(
    State(app_state): State<AppState>,
    Json(payload): Json<CheckoutPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let order = app_state.order_service.create_order(payload.into()).await?;

    Ok((StatusCode::CREATED, Json(order)))
}

#[utoipa::path(
    get,
    path = "/api/orders/{order_id}",
    tag = "Orders",
    params(("order_id" = i32, Path, description = "ID do Pedido")),
    responses(
        (status = 200, description = "Pedido com itens e pagamentos", body = Order),
        (status = 404, description = "Pedido não encontrado")
    )
)]
pub async fn get_order(
    State(app_state): State<AppState>,
    Path(order_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let order = app_state.order_service.get_order(order_id).await?;
    Ok(Json(order))
}

#[utoipa::path(
    post,
    path = "/api/orders/{order_id}/confirm",
    tag = "Orders",
    params(("order_id" = i32, Path, description = "ID do Pedido")),
    responses(
        (status = 200, description = "Estoque e vagas reservados", body = ConfirmationReceipt),
        (status = 404, description = "Pedido, produto ou treinamento não encontrado"),
        (status = 409, description = "Estoque/vagas insuficientes ou pedido já confirmado")
    )
)]
pub async fn confirm_order(
    State(app_state): State<AppState>,
    Path(order_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let receipt = app_state.order_service.confirm_order(order_id).await?;
    Ok(Json(receipt))
}

#[utoipa::path(
    put,
    path = "/api/orders/{order_id}/status",
    tag = "Orders",
    request_body = UpdateStatusPayload,
    params(("order_id" = i32, Path, description = "ID do Pedido")),
    responses(
        (status = 200, description = "Status atualizado", body = Order),
        (status = 409, description = "Transição inválida ou status desconhecido")
    )
)]
pub async fn update_order_status(
    State(app_state): State<AppState>,
    Path(order_id): Path<i32>,
    Json(payload): Json<UpdateStatusPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let status: OrderStatus = payload.status.parse()?;

    let order = app_state.order_service.update_order_status(order_id, status).await?;
    Ok(Json(order))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(items: serde_json::Value) -> CheckoutPayload {
        serde_json::from_value(serde_json::json!({
            "userId": 4,
            "shipping": {
                "shippingAddress": "Rua das Flores, 10",
                "shippingCity": "Cairo",
                "shippingCountry": "Egypt",
                "shippingPhone": "+20 100 000 0000",
                "shippingEmail": "dr@example.com",
                "shippingFirstName": "Carlos",
                "shippingLastName": "Lima"
            },
            "items": items
        }))
        .unwrap()
    }

    #[test]
    fn checkout_with_items_is_valid() {
        let p = payload(serde_json::json!([{ "productId": 5, "quantity": 2, "productName": "Coroa" }]));

        assert!(p.validate().is_ok());
        let checkout: Checkout = p.into();
        assert_eq!(checkout.lines.len(), 1);
        assert_eq!(checkout.lines[0].quantity, 2);
    }

    #[test]
    fn checkout_without_items_is_rejected() {
        let errors = payload(serde_json::json!([])).validate().unwrap_err();

        assert!(errors.field_errors().contains_key("items"));
    }

    #[test]
    fn item_with_zero_quantity_is_rejected() {
        let p = payload(serde_json::json!([{ "productId": 5, "quantity": 0 }]));

        assert!(p.validate().is_err());
    }
}
