// src/handlers/catalog.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::{
    common::error::AppError,
    config::AppState,
    models::catalog::{Category, NewCategory, NewProduct, NewProductVariant, Product, ProductSide, VariantOption},
};

fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &0.0);
        err.message = Some("O valor não pode ser negativo.".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateVariantPayload {
    #[validate(length(min = 1, message = "O SKU da variante é obrigatório."))]
    pub sku: String,
    #[validate(range(min = 0, message = "O estoque não pode ser negativo."))]
    pub quantity: i32,
    pub side: Option<ProductSide>,
    pub size: Option<i32>,
    pub variant_option: Option<VariantOption>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,
    #[validate(length(min = 1, message = "O SKU é obrigatório."))]
    pub sku: String,
    #[validate(range(min = 0, message = "O estoque não pode ser negativo."))]
    pub quantity: i32,
    #[validate(custom(function = "validate_not_negative"))]
    pub price: Decimal,
    pub description: Option<String>,
    pub category_id: Option<i32>,
    pub brand: Option<String>,
    pub logo_url: Option<String>,
    #[serde(default)]
    #[validate(nested)]
    pub variants: Vec<CreateVariantPayload>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,
    pub description: Option<String>,
    pub parent_id: Option<i32>,
}

#[utoipa::path(
    post,
    path = "/api/products",
    tag = "Catalog",
    request_body = CreateProductPayload,
    responses((status = 201, description = "Produto criado", body = Product))
)]
pub async fn create_product(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateProductPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let product = app_state
        .catalog_service
        .create_product(NewProduct {
            name: payload.name,
            sku: payload.sku,
            quantity: payload.quantity,
            price: payload.price,
            description: payload.description,
            category_id: payload.category_id,
            brand: payload.brand,
            logo_url: payload.logo_url,
            variants: payload
                .variants
                .into_iter()
                .map(|v| NewProductVariant {
                    sku: v.sku,
                    quantity: v.quantity,
                    side: v.side,
                    size: v.size,
                    variant_option: v.variant_option,
                })
                .collect(),
        })
        .await?;
    Ok((StatusCode::CREATED, Json(product)))
}

#[utoipa::path(
    get,
    path = "/api/products/{product_id}",
    tag = "Catalog",
    params(("product_id" = i32, Path, description = "ID do Produto")),
    responses(
        (status = 200, description = "Produto com variantes", body = Product),
        (status = 404, description = "Produto não encontrado")
    )
)]
pub async fn get_product(
    State(app_state): State<AppState>,
    Path(product_id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let product = app_state.catalog_service.get_product(product_id).await?;
    Ok(Json(product))
}

#[utoipa::path(
    post,
    path = "/api/categories",
    tag = "Catalog",
    request_body = CreateCategoryPayload,
    responses((status = 201, description = "Categoria criada", body = Category))
)]
pub async fn create_category(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateCategoryPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let category = app_state
        .catalog_service
        .create_category(NewCategory {
            name: payload.name,
            description: payload.description,
            parent_id: payload.parent_id,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(category)))
}

#[utoipa::path(
    get,
    path = "/api/categories",
    tag = "Catalog",
    responses((status = 200, description = "Categorias", body = [Category]))
)]
pub async fn list_categories(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let categories = app_state.catalog_service.list_categories().await?;
    Ok(Json(categories))
}
