//! Order domain models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use clementine_core::{OrderId, OrderItemId, OrderStatus, PaymentStatus, ProductId, UserId};

use super::cart::CartItemDetail;

/// An immutable per-order snapshot of a purchased product.
///
/// Name, image and unit price are copied from the product at order-creation
/// time so later product edits do not retroactively alter historical orders.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub product_id: ProductId,
    pub product_name: String,
    pub product_image_url: Option<String>,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub total_price: Decimal,
}

/// An order header with its item snapshots and the owning user's
/// display fields.
#[derive(Debug, Clone)]
pub struct Order {
    pub id: OrderId,
    pub order_number: String,
    pub user_id: UserId,
    pub user_name: String,
    pub user_email: String,
    pub total_amount: Decimal,
    pub status: OrderStatus,
    pub payment_id: Option<String>,
    pub payment_status: Option<PaymentStatus>,
    pub shipping_name: String,
    pub shipping_address: String,
    pub shipping_address2: Option<String>,
    pub shipping_city: String,
    pub shipping_state: String,
    pub shipping_zip: String,
    pub shipping_country: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub items: Vec<OrderItem>,
}

/// Totals computed for a checkout attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderTotals {
    pub sub_total: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

impl OrderTotals {
    /// Compute checkout totals over cart lines at the given tax rate.
    ///
    /// Uses the same effective-unit-price rule as the cart summary, so the
    /// total a buyer sees in the cart is the total the order records.
    #[must_use]
    pub fn from_cart(items: &[CartItemDetail], tax_rate: Decimal) -> Self {
        let sub_total: Decimal = items.iter().map(CartItemDetail::line_total).sum();
        let tax = sub_total * tax_rate;

        Self {
            sub_total,
            tax,
            total: sub_total + tax,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use clementine_core::CartItemId;
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
    fn test_totals_for_spec_example() {
        let totals = OrderTotals::from_cart(
            &[item(2, "10.00", None), item(1, "25.00", None)],
            dec("0.08"),
        );

        assert_eq!(totals.sub_total, dec("45.00"));
        assert_eq!(totals.tax, dec("3.60"));
        assert_eq!(totals.total, dec("48.60"));
    }

    #[test]
    fn test_totals_use_discount_prices() {
        let totals = OrderTotals::from_cart(&[item(2, "30.00", Some("25.00"))], dec("0.08"));

        assert_eq!(totals.sub_total, dec("50.00"));
        assert_eq!(totals.tax, dec("4.00"));
        assert_eq!(totals.total, dec("54.00"));
    }
}
