//! Domain models for the API.
//!
//! These are read models hydrated by the repositories in [`crate::db`]:
//! plain structs with id-typed foreign keys, never bidirectional object
//! graphs. Joined display fields (category name, user name, ...) are
//! denormalized onto the model at query time.

pub mod cart;
pub mod catalog;
pub mod order;
pub mod user;

pub use cart::{CartItemDetail, CartSummary};
pub use catalog::{Brand, Category, Product};
pub use order::{Order, OrderItem, OrderTotals};
pub use user::User;
