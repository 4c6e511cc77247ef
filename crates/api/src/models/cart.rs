//! Cart domain models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use clementine_core::{CartItemId, ProductId};

/// A cart line joined to live product data.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CartItemDetail {
    pub id: CartItemId,
    pub product_id: ProductId,
    pub product_name: String,
    pub product_image_url: Option<String>,
    pub product_price: Decimal,
    pub product_discount_price: Option<Decimal>,
    pub quantity: i32,
    /// Live stock of the product at read time.
    pub available_stock: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CartItemDetail {
    /// Effective unit price: discount price when present, list price otherwise.
    #[must_use]
    pub fn unit_price(&self) -> Decimal {
        self.product_discount_price.unwrap_or(self.product_price)
    }

    /// Line total at the effective unit price.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        Decimal::from(self.quantity) * self.unit_price()
    }
}

/// A user's cart with computed totals.
#[derive(Debug, Clone)]
pub struct CartSummary {
    pub items: Vec<CartItemDetail>,
    /// Sum of line quantities.
    pub total_items: i32,
    pub sub_total: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

impl CartSummary {
    /// Compute a summary over cart lines at the given tax rate.
    #[must_use]
    pub fn from_items(items: Vec<CartItemDetail>, tax_rate: Decimal) -> Self {
        let sub_total: Decimal = items.iter().map(CartItemDetail::line_total).sum();
        let tax = sub_total * tax_rate;
        let total = sub_total + tax;
        let total_items = items.iter().map(|item| item.quantity).sum();

        Self {
            items,
            total_items,
            sub_total,
            tax,
            total,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn item(quantity: i32, price: &str, discount: Option<&str>) -> CartItemDetail {
        CartItemDetail {
            id: CartItemId::new(1),
            product_id: ProductId::new(1),
            product_name: "Test Product".to_string(),
            product_image_url: None,
            product_price: Decimal::from_str(price).unwrap(),
            product_discount_price: discount.map(|d| Decimal::from_str(d).unwrap()),
            quantity,
            available_stock: 100,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_line_total_uses_list_price() {
        assert_eq!(item(3, "10.00", None).line_total(), dec("30.00"));
    }

    #[test]
    fn test_line_total_prefers_discount_price() {
        assert_eq!(item(2, "25.00", Some("20.00")).line_total(), dec("40.00"));
    }

    #[test]
    fn test_summary_totals_at_eight_percent() {
        // Cart of (P, qty 2, unit 10.00) and (Q, qty 1, unit 25.00):
        // subtotal 45.00, tax 3.60, total 48.60
        let summary = CartSummary::from_items(
            vec![item(2, "10.00", None), item(1, "25.00", None)],
            dec("0.08"),
        );

        assert_eq!(summary.sub_total, dec("45.00"));
        assert_eq!(summary.tax, dec("3.60"));
        assert_eq!(summary.total, dec("48.60"));
        assert_eq!(summary.total_items, 3);
    }

    #[test]
    fn test_summary_of_empty_cart_is_zero() {
        let summary = CartSummary::from_items(vec![], dec("0.08"));
        assert_eq!(summary.sub_total, Decimal::ZERO);
        assert_eq!(summary.tax, Decimal::ZERO);
        assert_eq!(summary.total, Decimal::ZERO);
        assert_eq!(summary.total_items, 0);
    }

    #[test]
    fn test_spec_stock_example_line_total() {
        // Product P at stock 5, price 10.00: quantity 5 yields line total 50.00
        assert_eq!(item(5, "10.00", None).line_total(), dec("50.00"));
    }
}
