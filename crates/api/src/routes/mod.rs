//! HTTP route handlers for the API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                  - Liveness check
//! GET  /health/ready            - Readiness check (database ping)
//!
//! # Auth
//! POST /auth/register           - Register and receive a token pair
//! POST /auth/login              - Login and receive a token pair
//! POST /auth/refresh            - Re-issue a token pair
//! POST /auth/logout             - Logout (client discards tokens)
//! GET  /auth/me                 - Current user
//! POST /auth/change-password    - Change password
//!
//! # Catalog
//! GET  /products                - Filtered, sorted, paginated listing
//! POST /products                - Create product (admin)
//! GET  /products/{id}           - Product detail
//! PUT  /products/{id}           - Update product (admin)
//! DELETE /products/{id}         - Delete product (admin, blocked if ordered)
//! GET  /categories[/all|/{id}]  - Categories (/all is admin-only)
//! POST/PUT/DELETE /categories   - Mutations (admin)
//! GET  /brands[/all|/{id}]      - Brands (/all is admin-only)
//! POST/PUT/DELETE /brands       - Mutations (admin)
//!
//! # Cart (authenticated, caller-scoped)
//! GET  /cart                    - Cart summary with totals
//! DELETE /cart                  - Clear cart
//! POST /cart/items              - Add item (upsert)
//! PUT  /cart/items/{id}         - Update quantity
//! DELETE /cart/items/{id}       - Remove item
//!
//! # Orders (authenticated)
//! GET  /orders                  - Own orders; admins may filter any user
//! POST /orders                  - Place order from cart
//! GET  /orders/{id}             - Order detail (ownership enforced)
//! PUT  /orders/{id}/status      - Status update (admin)
//!
//! # Config
//! GET  /config[/{key}]          - Read settings
//! POST /config                  - Bulk upsert (admin)
//! PUT  /config/{key}            - Upsert (admin)
//! DELETE /config/{key}          - Delete (admin)
//! ```

pub mod app_config;
pub mod auth;
pub mod brands;
pub mod cart;
pub mod categories;
pub mod orders;
pub mod products;

use axum::Router;

use crate::state::AppState;

/// Create all routes for the API.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/products", products::router())
        .nest("/categories", categories::router())
        .nest("/brands", brands::router())
        .nest("/cart", cart::router())
        .nest("/orders", orders::router())
        .nest("/config", app_config::router())
}

/// Number of pages needed to cover `total_count` rows at `page_size` rows
/// per page.
pub(crate) const fn total_pages(total_count: i64, page_size: i64) -> i64 {
    if page_size <= 0 {
        return 0;
    }
    (total_count + page_size - 1) / page_size
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(0, 20), 0);
        assert_eq!(total_pages(1, 20), 1);
        assert_eq!(total_pages(20, 20), 1);
        assert_eq!(total_pages(21, 20), 2);
        assert_eq!(total_pages(41, 20), 3);
    }
}
