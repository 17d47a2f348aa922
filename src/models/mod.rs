//! Data models for the RuhCart API.
//!
//! This module contains the wire-format structures exchanged with the
//! RuhCart REST backend:
//!
//! - `Category`, `Product`: storefront catalog
//! - `Cart`, `CartItem`: the authenticated user's cart
//! - `Order`, `OrderItem`: order history and placement
//! - `UserProfile`, `NewCustomer`, `NewSeller`: accounts
//! - `CheckoutOrder`, `PaymentProof`: payment gateway handshake
//!
//! Monetary amounts arrive as decimal strings (e.g. `"499.00"`) on catalog
//! and order items; computed subtotals and cart totals arrive as JSON
//! numbers. Both are kept as serialized, with `price_value()` helpers where
//! arithmetic is useful.

pub mod cart;
pub mod order;
pub mod payment;
pub mod product;
pub mod user;

pub use cart::{Cart, CartItem, CartProduct};
pub use order::{Order, OrderItem, OrderStatus};
pub use payment::{CheckoutOrder, CheckoutPrefill, PaymentProof};
pub use product::{Category, Product, ProductQuery, ProductWrite};
pub use user::{NewCustomer, NewSeller, UserProfile};
