//! Catalog domain models: categories, brands, and products.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use clementine_core::{BrandId, CategoryId, ProductId, UserId};

/// A catalog category with its derived product count.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub is_active: bool,
    pub sort_order: i32,
    /// Count of products referencing this category, computed on read.
    pub product_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A product brand with its derived product count.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Brand {
    pub id: BrandId,
    pub name: String,
    pub description: Option<String>,
    pub logo_url: Option<String>,
    pub is_active: bool,
    pub sort_order: i32,
    /// Count of active products referencing this brand, computed on read.
    pub product_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A catalog product, denormalized with its category and creator names.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub category_id: CategoryId,
    pub category_name: String,
    pub brand: Option<String>,
    pub brand_id: Option<BrandId>,
    pub sku: Option<String>,
    pub stock: i32,
    pub image_url: Option<String>,
    pub is_active: bool,
    pub is_featured: bool,
    pub discount_price: Option<Decimal>,
    pub created_by_id: UserId,
    pub created_by_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// The price a buyer actually pays: the discount price when present,
    /// the list price otherwise. Whether the discount undercuts the list
    /// price is not enforced anywhere.
    #[must_use]
    pub fn effective_price(&self) -> Decimal {
        self.discount_price.unwrap_or(self.price)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn product(price: &str, discount: Option<&str>) -> Product {
        Product {
            id: ProductId::new(1),
            name: "Wireless Headphones".to_string(),
            description: None,
            price: Decimal::from_str(price).unwrap(),
            category_id: CategoryId::new(1),
            category_name: "Electronics".to_string(),
            brand: None,
            brand_id: None,
            sku: None,
            stock: 10,
            image_url: None,
            is_active: true,
            is_featured: false,
            discount_price: discount.map(|d| Decimal::from_str(d).unwrap()),
            created_by_id: UserId::new(1),
            created_by_name: "Admin".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_effective_price_without_discount() {
        let p = product("19.99", None);
        assert_eq!(p.effective_price(), Decimal::from_str("19.99").unwrap());
    }

    #[test]
    fn test_effective_price_with_discount() {
        let p = product("19.99", Some("14.99"));
        assert_eq!(p.effective_price(), Decimal::from_str("14.99").unwrap());
    }
}
