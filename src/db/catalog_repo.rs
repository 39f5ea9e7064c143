// src/db/catalog_repo.rs

use sqlx::{Executor, PgConnection, Postgres};

use crate::{
    common::error::AppError,
    models::catalog::{Category, NewCategory, NewProduct, Product, ProductVariant},
};

#[derive(Debug, Clone, Copy, Default)]
pub struct CatalogRepository;

impl CatalogRepository {
    pub fn new() -> Self {
        Self
    }

    // ---
    // Leitura
    // ---

    /// Produto + variantes. A linha do produto fica travada até o fim da transação.
    pub async fn find_product(&self, conn: &mut PgConnection, id: i32) -> Result<Option<Product>, AppError> {
        let maybe_product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, sku, quantity, price, description, is_active, is_variant,
                   category_id, parent_sku, brand, logo_url
            FROM products
            WHERE id = $1
            FOR UPDATE
            "#,
        )
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;

        let Some(mut product) = maybe_product else {
            return Ok(None);
        };

        product.variants = self.find_variants(&mut *conn, id).await?;
        Ok(Some(product))
    }

    pub async fn find_variants(&self, conn: &mut PgConnection, product_id: i32) -> Result<Vec<ProductVariant>, AppError> {
        let variants = sqlx::query_as::<_, ProductVariant>(
            r#"
            SELECT id, product_id, sku, quantity, side, size, size_range, variant_option, parent_product_id
            FROM product_variants
            WHERE product_id = $1
            ORDER BY id ASC
            FOR UPDATE
            "#,
        )
            .bind(product_id)
            .fetch_all(&mut *conn)
            .await?;
        Ok(variants)
    }

    pub async fn list_categories<'e, E>(&self, executor: E) -> Result<Vec<Category>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT id, name, description, parent_id FROM categories ORDER BY name ASC",
        )
            .fetch_all(executor)
            .await?;
        Ok(categories)
    }

    // ---
    // Escrita
    // ---

    pub async fn update_product_quantity<'e, E>(&self, executor: E, id: i32, quantity: i32) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("UPDATE products SET quantity = $2 WHERE id = $1")
            .bind(id)
            .bind(quantity)
            .execute(executor)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::ProductNotFound(id));
        }
        Ok(())
    }

    pub async fn update_variant_quantity<'e, E>(&self, executor: E, id: i32, quantity: i32) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("UPDATE product_variants SET quantity = $2 WHERE id = $1")
            .bind(id)
            .bind(quantity)
            .execute(executor)
            .await?;
        Ok(())
    }

    pub async fn insert_product(&self, conn: &mut PgConnection, new: NewProduct) -> Result<Product, AppError> {
        let is_variant = !new.variants.is_empty();
        let mut product = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (name, sku, quantity, price, description, is_variant, category_id, brand, logo_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, name, sku, quantity, price, description, is_active, is_variant,
                      category_id, parent_sku, brand, logo_url
            "#,
        )
            .bind(&new.name)
            .bind(&new.sku)
            .bind(new.quantity)
            .bind(new.price)
            .bind(&new.description)
            .bind(is_variant)
            .bind(new.category_id)
            .bind(&new.brand)
            .bind(&new.logo_url)
            .fetch_one(&mut *conn)
            .await?;

        for variant in new.variants {
            let created = sqlx::query_as::<_, ProductVariant>(
                r#"
                INSERT INTO product_variants (product_id, sku, quantity, side, size, variant_option, parent_product_id)
                VALUES ($1, $2, $3, $4, $5, $6, $1)
                RETURNING id, product_id, sku, quantity, side, size, size_range, variant_option, parent_product_id
                "#,
            )
                .bind(product.id)
                .bind(&variant.sku)
                .bind(variant.quantity)
                .bind(variant.side)
                .bind(variant.size)
                .bind(variant.variant_option)
                .fetch_one(&mut *conn)
                .await?;
            product.variants.push(created);
        }

        Ok(product)
    }

    pub async fn insert_category<'e, E>(&self, executor: E, new: NewCategory) -> Result<Category, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let category = sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (name, description, parent_id)
            VALUES ($1, $2, $3)
            RETURNING id, name, description, parent_id
            "#,
        )
            .bind(&new.name)
            .bind(&new.description)
            .bind(new.parent_id)
            .fetch_one(executor)
            .await?;
        Ok(category)
    }
}
