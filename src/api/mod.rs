//! REST API client module for the RuhCart backend.
//!
//! This module provides the `ApiClient` for the storefront and seller
//! surfaces: catalog browsing, cart management, checkout, order history,
//! and seller product CRUD.
//!
//! The API uses JWT bearer authentication; expired access tokens are
//! refreshed transparently through the single-flight coordinator in
//! `crate::auth::refresh`.

pub mod client;
pub mod error;

pub use client::ApiClient;
pub use error::ApiError;
