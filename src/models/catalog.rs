// src/models/catalog.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

// --- 1. Categorias ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub parent_id: Option<i32>,
}

#[derive(Debug, Clone)]
pub struct NewCategory {
    pub name: String,
    pub description: Option<String>,
    pub parent_id: Option<i32>,
}

// --- 2. Lado do dente (variantes de coroas) ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "product_side", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductSide {
    UpperRight,
    LowerRight,
    LowerLeft,
    UpperLeft,
    PrimaryCentral,
    PrimaryLateral,
    PrimaryCuspid,
    PrimaryUpperCuspid,
    PrimaryLowerCuspid,
}

impl ProductSide {
    const ALL: [ProductSide; 9] = [
        ProductSide::UpperRight,
        ProductSide::LowerRight,
        ProductSide::LowerLeft,
        ProductSide::UpperLeft,
        ProductSide::PrimaryCentral,
        ProductSide::PrimaryLateral,
        ProductSide::PrimaryCuspid,
        ProductSide::PrimaryUpperCuspid,
        ProductSide::PrimaryLowerCuspid,
    ];

    fn label(self) -> &'static str {
        match self {
            ProductSide::UpperRight => "UpperRight",
            ProductSide::LowerRight => "LowerRight",
            ProductSide::LowerLeft => "LowerLeft",
            ProductSide::UpperLeft => "UpperLeft",
            ProductSide::PrimaryCentral => "PrimaryCentral",
            ProductSide::PrimaryLateral => "PrimaryLateral",
            ProductSide::PrimaryCuspid => "PrimaryCuspid",
            ProductSide::PrimaryUpperCuspid => "PrimaryUpperCuspid",
            ProductSide::PrimaryLowerCuspid => "PrimaryLowerCuspid",
        }
    }

    /// Aceita "UpperRight", "Upper Right", "upperright".
    pub fn parse_label(raw: &str) -> Option<Self> {
        let wanted = normalize(raw);
        Self::ALL.into_iter().find(|side| normalize(side.label()) == wanted)
    }
}

// --- 3. Opções de variante (espessura / cor) ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "variant_option")]
pub enum VariantOption {
    #[sqlx(rename = "EXTRATHIN_9061100")]
    Extrathin9061100,
    #[sqlx(rename = "THIRTEEN_T_9061101")]
    ThirteenT9061101,
    #[sqlx(rename = "THIRTEEN_9061102")]
    Thirteen9061102,
    #[sqlx(rename = "ULTRA_THIN_9061106")]
    UltraThin9061106,
    #[sqlx(rename = "MINI_9061109")]
    Mini9061109,
    #[sqlx(rename = "BLUE")]
    Blue,
}

impl VariantOption {
    const ALL: [VariantOption; 6] = [
        VariantOption::Extrathin9061100,
        VariantOption::ThirteenT9061101,
        VariantOption::Thirteen9061102,
        VariantOption::UltraThin9061106,
        VariantOption::Mini9061109,
        VariantOption::Blue,
    ];

    /// (identificador, descrição exibida na loja)
    fn labels(self) -> (&'static str, &'static str) {
        match self {
            VariantOption::Extrathin9061100 => ("Extrathin_9061100", "9061100 Extrathin"),
            VariantOption::ThirteenT9061101 => ("ThirteenT_9061101", "9061101 13T"),
            VariantOption::Thirteen9061102 => ("Thirteen_9061102", "9061102 13"),
            VariantOption::UltraThin9061106 => ("UltraThin_9061106", "9061106 Ultra thin"),
            VariantOption::Mini9061109 => ("Mini_9061109", "9061109 Mini"),
            VariantOption::Blue => ("Blue", "Blue"),
        }
    }

    pub fn parse_label(raw: &str) -> Option<Self> {
        let wanted = normalize(raw);
        Self::ALL.into_iter().find(|option| {
            let (ident, description) = option.labels();
            normalize(ident) == wanted || normalize(description) == wanted
        })
    }
}

fn normalize(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

// --- 4. Produtos ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i32,
    pub name: String,
    pub sku: String,
    pub quantity: i32,
    pub price: Decimal,
    pub description: Option<String>,
    pub is_active: bool,
    pub is_variant: bool,
    pub category_id: Option<i32>,
    pub parent_sku: Option<String>,
    pub brand: Option<String>,
    pub logo_url: Option<String>,
    #[sqlx(skip)]
    pub variants: Vec<ProductVariant>,
}

impl Product {
    pub fn variant(&self, variant_id: i32) -> Option<&ProductVariant> {
        self.variants.iter().find(|v| v.id == variant_id)
    }

    pub fn variant_mut(&mut self, variant_id: i32) -> Option<&mut ProductVariant> {
        self.variants.iter_mut().find(|v| v.id == variant_id)
    }

    pub fn find_variant(&self, selector: &VariantSelector) -> Option<&ProductVariant> {
        self.variants
            .iter()
            .find(|v| v.parent_product_id == self.id && selector.matches(v))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductVariant {
    pub id: i32,
    pub product_id: i32,
    pub sku: String,
    pub quantity: i32,
    pub side: Option<ProductSide>,
    pub size: Option<i32>,
    pub size_range: i32,
    pub variant_option: Option<VariantOption>,
    pub parent_product_id: i32,
}

#[derive(Debug, Clone)]
pub struct NewProductVariant {
    pub sku: String,
    pub quantity: i32,
    pub side: Option<ProductSide>,
    pub size: Option<i32>,
    pub variant_option: Option<VariantOption>,
}

#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub sku: String,
    pub quantity: i32,
    pub price: Decimal,
    pub description: Option<String>,
    pub category_id: Option<i32>,
    pub brand: Option<String>,
    pub logo_url: Option<String>,
    pub variants: Vec<NewProductVariant>,
}

// --- 5. Seletor de variante a partir do nome exibido ---

/// Interpreta o nome que o carrinho mostra para uma variante:
/// `"<nome>, <Lado>, S<n>"`, `"<nome>, S<n>"` ou `"<nome>, <Opção>"`.
/// Usado apenas no checkout, quando o carrinho não manda o ID da variante.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariantSelector {
    SideAndSize { side: ProductSide, size: i32 },
    Size(i32),
    Option(VariantOption),
}

impl VariantSelector {
    pub fn parse(display_name: &str) -> Option<Self> {
        let tokens: Vec<&str> = display_name.split(',').map(str::trim).collect();
        if tokens.len() < 2 {
            return None;
        }

        let last = tokens[tokens.len() - 1];
        if let Some(size) = parse_size_token(last) {
            // O nome do produto pode ter vírgulas; olhamos só o penúltimo token.
            if tokens.len() >= 3 {
                if let Some(side) = ProductSide::parse_label(tokens[tokens.len() - 2]) {
                    return Some(VariantSelector::SideAndSize { side, size });
                }
            }
            return Some(VariantSelector::Size(size));
        }

        VariantOption::parse_label(last).map(VariantSelector::Option)
    }

    pub fn matches(&self, variant: &ProductVariant) -> bool {
        match *self {
            VariantSelector::SideAndSize { side, size } => {
                variant.side == Some(side) && variant.size == Some(size)
            }
            VariantSelector::Size(size) => variant.size == Some(size),
            VariantSelector::Option(option) => variant.variant_option == Some(option),
        }
    }
}

// "S2" -> 2
fn parse_size_token(token: &str) -> Option<i32> {
    let digits = token.strip_prefix('S').or_else(|| token.strip_prefix('s'))?;
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variant(id: i32, side: Option<ProductSide>, size: Option<i32>, option: Option<VariantOption>) -> ProductVariant {
        ProductVariant {
            id,
            product_id: 10,
            sku: format!("V-{id}"),
            quantity: 5,
            side,
            size,
            size_range: 7,
            variant_option: option,
            parent_product_id: 10,
        }
    }

    #[test]
    fn parses_side_and_size() {
        assert_eq!(
            VariantSelector::parse("Coroa Pediátrica, UpperRight, S2"),
            Some(VariantSelector::SideAndSize { side: ProductSide::UpperRight, size: 2 })
        );
        assert_eq!(
            VariantSelector::parse("Coroa,Upper Right,S4"),
            Some(VariantSelector::SideAndSize { side: ProductSide::UpperRight, size: 4 })
        );
    }

    #[test]
    fn parses_size_only_and_options() {
        assert_eq!(VariantSelector::parse("Coroa, S3"), Some(VariantSelector::Size(3)));
        assert_eq!(
            VariantSelector::parse("Fio Ortodôntico, 9061106 Ultra thin"),
            Some(VariantSelector::Option(VariantOption::UltraThin9061106))
        );
        assert_eq!(
            VariantSelector::parse("Escova, Blue"),
            Some(VariantSelector::Option(VariantOption::Blue))
        );
    }

    #[test]
    fn names_with_commas_use_trailing_tokens() {
        assert_eq!(
            VariantSelector::parse("Kit, grande, LowerLeft, S1"),
            Some(VariantSelector::SideAndSize { side: ProductSide::LowerLeft, size: 1 })
        );
    }

    #[test]
    fn rejects_plain_or_unknown_names() {
        assert_eq!(VariantSelector::parse("Coroa Pediátrica"), None);
        assert_eq!(VariantSelector::parse("Coroa, Verde"), None);
        assert_eq!(VariantSelector::parse("Coroa, S"), None);
    }

    #[test]
    fn selector_matches_variant_attributes() {
        let upper = variant(1, Some(ProductSide::UpperRight), Some(2), None);
        let lower = variant(2, Some(ProductSide::LowerRight), Some(2), None);
        let blue = variant(3, None, None, Some(VariantOption::Blue));

        let selector = VariantSelector::SideAndSize { side: ProductSide::LowerRight, size: 2 };
        assert!(!selector.matches(&upper));
        assert!(selector.matches(&lower));
        assert!(VariantSelector::Size(2).matches(&upper));
        assert!(VariantSelector::Option(VariantOption::Blue).matches(&blue));
    }
}
