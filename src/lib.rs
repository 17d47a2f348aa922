//! ruhcart-client - typed async client for the RuhCart e-commerce API.
//!
//! Covers the storefront surface (catalog, cart, checkout, orders) and the
//! seller portal (product CRUD), with transparent access-token refresh:
//! when a burst of requests fails with 401, exactly one refresh call is
//! issued and every affected request is replayed with the new token. If no
//! refresh is possible the session is torn down and
//! [`auth::AuthState::LoggedOut`] is published for the host to act on.
//!
//! ```no_run
//! use ruhcart_client::{ApiClient, Config, ProductQuery};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = Config::load()?;
//! let client = ApiClient::new(&config.api_base(), config.session_dir()?)?;
//!
//! client.login("asha", "secret").await?;
//! let products = client.products(&ProductQuery::default()).await?;
//! let cart = client.add_to_cart(products[0].id, 1).await?;
//! println!("cart total: {}", cart.total);
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod models;

pub use api::{ApiClient, ApiError};
pub use auth::{AuthState, CredentialStore, RefreshError, Session, SessionData, TokenPair};
pub use config::Config;
pub use models::{
    Cart, CartItem, CartProduct, Category, CheckoutOrder, CheckoutPrefill, NewCustomer,
    NewSeller, Order, OrderItem, OrderStatus, PaymentProof, Product, ProductQuery, ProductWrite,
    UserProfile,
};
