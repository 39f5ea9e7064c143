// src/services/catalog_service.rs

use std::sync::Arc;

use crate::{
    common::error::AppError,
    db::{Store, UnitOfWork},
    models::catalog::{Category, NewCategory, NewProduct, Product, VariantSelector},
};

#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn Store>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    // --- PRIMITIVA DE AJUSTE DE ESTOQUE ---
    // Soma `delta` ao produto e, se ele tem variantes, à variante da linha.
    // Roda dentro da unidade de trabalho de quem chama.
    pub async fn adjust_stock(
        uow: &mut dyn UnitOfWork,
        product: &mut Product,
        delta: i32,
        variant_id: Option<i32>,
    ) -> Result<(), AppError> {
        let new_quantity = product.quantity + delta;
        if new_quantity < 0 {
            return Err(AppError::InsufficientStock {
                product_id: product.id,
                available: product.quantity,
                requested: -delta,
            });
        }

        if product.is_variant {
            let product_id = product.id;
            let variant = variant_id
                .and_then(|id| product.variant_mut(id))
                .ok_or_else(|| AppError::VariantNotResolved {
                    product_id,
                    hint: variant_id.map(|id| format!("variante {id}")).unwrap_or_else(|| "sem variante".into()),
                })?;

            let variant_quantity = variant.quantity + delta;
            if variant_quantity < 0 {
                return Err(AppError::InsufficientStock {
                    product_id,
                    available: variant.quantity,
                    requested: -delta,
                });
            }
            variant.quantity = variant_quantity;
            uow.update_variant_stock(variant.id, variant_quantity).await?;
        }

        product.quantity = new_quantity;
        uow.update_product_stock(product.id, new_quantity).await?;
        Ok(())
    }

    /// Resolve a variante de uma linha de checkout: o ID explícito tem
    /// prioridade; sem ele, interpreta o nome exibido no carrinho.
    pub fn resolve_variant(
        product: &Product,
        variant_id: Option<i32>,
        display_name: Option<&str>,
    ) -> Result<Option<i32>, AppError> {
        if !product.is_variant {
            return Ok(None);
        }

        if let Some(id) = variant_id {
            return product
                .variant(id)
                .map(|v| Some(v.id))
                .ok_or_else(|| AppError::VariantNotResolved {
                    product_id: product.id,
                    hint: format!("variante {id}"),
                });
        }

        let hint = display_name.unwrap_or_default();
        VariantSelector::parse(hint)
            .and_then(|selector| product.find_variant(&selector))
            .map(|v| Some(v.id))
            .ok_or_else(|| AppError::VariantNotResolved {
                product_id: product.id,
                hint: hint.to_string(),
            })
    }

    // --- CRUD ---

    pub async fn create_product(&self, new: NewProduct) -> Result<Product, AppError> {
        let mut uow = self.store.begin().await?;
        let product = uow.insert_product(new).await?;
        uow.commit().await?;
        tracing::info!("✅ Produto {} ({}) cadastrado", product.id, product.sku);
        Ok(product)
    }

    pub async fn create_category(&self, new: NewCategory) -> Result<Category, AppError> {
        let mut uow = self.store.begin().await?;
        let category = uow.insert_category(new).await?;
        uow.commit().await?;
        Ok(category)
    }

    pub async fn list_categories(&self) -> Result<Vec<Category>, AppError> {
        let mut uow = self.store.begin().await?;
        let categories = uow.list_categories().await?;
        uow.rollback().await?;
        Ok(categories)
    }

    pub async fn get_product(&self, id: i32) -> Result<Product, AppError> {
        let mut uow = self.store.begin().await?;
        let product = uow.get_product(id).await?.ok_or(AppError::ProductNotFound(id))?;
        uow.rollback().await?;
        Ok(product)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::catalog::{ProductSide, ProductVariant};
    use rust_decimal::Decimal;

    fn crown() -> Product {
        Product {
            id: 10,
            name: "Coroa Pediátrica".into(),
            sku: "CP".into(),
            quantity: 6,
            price: Decimal::from(80),
            description: None,
            is_active: true,
            is_variant: true,
            category_id: None,
            parent_sku: None,
            brand: None,
            logo_url: None,
            variants: vec![
                ProductVariant {
                    id: 11,
                    product_id: 10,
                    sku: "CP-UR-2".into(),
                    quantity: 3,
                    side: Some(ProductSide::UpperRight),
                    size: Some(2),
                    size_range: 7,
                    variant_option: None,
                    parent_product_id: 10,
                },
                ProductVariant {
                    id: 12,
                    product_id: 10,
                    sku: "CP-LR-2".into(),
                    quantity: 3,
                    side: Some(ProductSide::LowerRight),
                    size: Some(2),
                    size_range: 7,
                    variant_option: None,
                    parent_product_id: 10,
                },
            ],
        }
    }

    #[test]
    fn explicit_variant_id_wins_over_name() {
        let product = crown();
        let resolved =
            CatalogService::resolve_variant(&product, Some(12), Some("Coroa, UpperRight, S2")).unwrap();
        assert_eq!(resolved, Some(12));
    }

    #[test]
    fn legacy_name_resolves_variant() {
        let product = crown();
        let resolved = CatalogService::resolve_variant(&product, None, Some("Coroa, LowerRight, S2")).unwrap();
        assert_eq!(resolved, Some(12));
    }

    #[test]
    fn unknown_variant_is_rejected() {
        let product = crown();
        assert!(matches!(
            CatalogService::resolve_variant(&product, Some(99), None),
            Err(AppError::VariantNotResolved { product_id: 10, .. })
        ));
        assert!(matches!(
            CatalogService::resolve_variant(&product, None, Some("Coroa")),
            Err(AppError::VariantNotResolved { .. })
        ));
    }
}
