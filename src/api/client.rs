//! API client for the RuhCart storefront and seller backend.
//!
//! All authenticated calls go through [`ApiClient::send_authed`], which owns
//! the 401 recovery contract: a call that fails because the access token
//! expired triggers (or joins) exactly one refresh, then is replayed once
//! with the new token. Unrecoverable auth failures tear the session down and
//! publish [`AuthState::LoggedOut`].

use std::path::PathBuf;
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use reqwest::{Client, Method};
use serde::{de::DeserializeOwned, Deserialize};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::auth::credentials::CredentialStore;
use crate::auth::refresh::{await_waiter, RefreshError, RefreshGate, RefreshOutcome, Ticket};
use crate::auth::{AuthState, Session, SessionData, TokenPair};
use crate::models::{
    Cart, Category, CheckoutOrder, NewCustomer, NewSeller, Order, PaymentProof, Product,
    ProductQuery, ProductWrite, UserProfile,
};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// HTTP request timeout in seconds.
/// 30s allows for slow API responses while failing fast enough for good UX.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default bound on the refresh call. Tighter than the general timeout:
/// while a refresh hangs, every queued 401 caller is stalled with it.
const REFRESH_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Deserialize)]
struct LoginResponse {
    access: String,
    refresh: String,
}

/// The refresh endpoint always returns `access`; `refresh` only appears
/// when the server rotates refresh tokens.
#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access: Option<String>,
    refresh: Option<String>,
}

/// An owned request description. Every dispatch attempt builds a fresh
/// outbound request from this template plus the token in use at that
/// moment; templates are never mutated after construction.
#[derive(Debug, Clone)]
struct ApiRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: Option<serde_json::Value>,
}

impl ApiRequest {
    fn get(path: &str) -> Self {
        Self {
            method: Method::GET,
            path: path.to_string(),
            query: Vec::new(),
            body: None,
        }
    }

    fn post(path: &str, body: serde_json::Value) -> Self {
        Self {
            method: Method::POST,
            path: path.to_string(),
            query: Vec::new(),
            body: Some(body),
        }
    }

    fn patch(path: &str, body: serde_json::Value) -> Self {
        Self {
            method: Method::PATCH,
            path: path.to_string(),
            query: Vec::new(),
            body: Some(body),
        }
    }

    fn put(path: &str, body: serde_json::Value) -> Self {
        Self {
            method: Method::PUT,
            path: path.to_string(),
            query: Vec::new(),
            body: Some(body),
        }
    }

    fn delete(path: &str) -> Self {
        Self {
            method: Method::DELETE,
            path: path.to_string(),
            query: Vec::new(),
            body: None,
        }
    }

    fn with_query(mut self, params: Vec<(String, String)>) -> Self {
        self.query = params;
        self
    }
}

struct Inner {
    http: Client,
    base_url: String,
    session: Mutex<Session>,
    /// Current access token, applied to every authed dispatch. The analog
    /// of a default Authorization header.
    access: RwLock<Option<String>>,
    gate: RefreshGate,
    auth_state: watch::Sender<AuthState>,
    /// Bound on the whole refresh exchange, headers and body included.
    refresh_timeout: Duration,
}

/// API client for RuhCart.
/// Clone is cheap - all shared state lives behind one Arc.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<Inner>,
}

impl ApiClient {
    /// Create a client against `base_url` (no trailing slash needed),
    /// persisting session credentials under `session_dir`. Any session
    /// saved by a previous run is picked up here.
    pub fn new(base_url: &str, session_dir: PathBuf) -> Result<Self, ApiError> {
        Self::with_refresh_timeout(
            base_url,
            session_dir,
            Duration::from_secs(REFRESH_TIMEOUT_SECS),
        )
    }

    /// Like [`ApiClient::new`], with a custom bound on the token refresh
    /// exchange. A refresh that does not complete within the bound counts
    /// as failed and tears the session down.
    pub fn with_refresh_timeout(
        base_url: &str,
        session_dir: PathBuf,
        refresh_timeout: Duration,
    ) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        let mut session = Session::new(session_dir);
        match session.load() {
            Ok(true) => debug!("restored saved session"),
            Ok(false) => {}
            Err(e) => warn!(error = %e, "could not restore saved session"),
        }
        let access = session.access_token().map(str::to_string);
        let initial_state = if access.is_some() {
            AuthState::Authenticated
        } else {
            AuthState::LoggedOut
        };
        let (auth_state, _) = watch::channel(initial_state);

        Ok(Self {
            inner: Arc::new(Inner {
                http,
                base_url: base_url.trim_end_matches('/').to_string(),
                session: Mutex::new(session),
                access: RwLock::new(access),
                gate: RefreshGate::new(),
                auth_state,
                refresh_timeout,
            }),
        })
    }

    /// Observe login/logout transitions. A change to `LoggedOut` is the
    /// host's cue to show its login screen.
    pub fn auth_state(&self) -> watch::Receiver<AuthState> {
        self.inner.auth_state.subscribe()
    }

    pub fn is_authenticated(&self) -> bool {
        *self.inner.auth_state.borrow() == AuthState::Authenticated
    }

    /// Username of the restored or logged-in session, if any.
    pub fn session_username(&self) -> Option<String> {
        self.lock_session().username().map(str::to_string)
    }

    // ===== Auth =====

    /// Authenticate and store the issued credential pair.
    pub async fn login(&self, username: &str, password: &str) -> Result<(), ApiError> {
        let req = ApiRequest::post(
            "/auth/login/",
            serde_json::json!({"username": username, "password": password}),
        );
        let tokens: LoginResponse = self.request_json(&req, None).await?;

        {
            let mut session = self.lock_session();
            session.update(SessionData::new(
                TokenPair {
                    access: tokens.access.clone(),
                    refresh: tokens.refresh,
                },
                username,
            ));
            if let Err(e) = session.save() {
                warn!(error = %e, "failed to persist session");
            }
        }
        self.set_access(Some(tokens.access));
        self.inner.auth_state.send_replace(AuthState::Authenticated);
        info!(username, "logged in");
        Ok(())
    }

    /// Re-authenticate with a password previously saved via
    /// [`CredentialStore::remember`]. Useful after an unrecoverable
    /// refresh failure tore the session down.
    pub async fn login_remembered(&self, username: &str) -> Result<(), ApiError> {
        let password = CredentialStore::for_user(username)
            .recall()
            .map_err(|e| ApiError::Credentials(format!("no remembered password: {e:#}")))?;
        self.login(username, &password).await
    }

    /// Drop the session locally. The stored keychain password, if any,
    /// is left alone.
    pub fn logout(&self) {
        self.teardown();
    }

    /// Fetch the authenticated user's profile
    pub async fn me(&self) -> Result<UserProfile, ApiError> {
        self.send_authed(ApiRequest::get("/auth/me/")).await
    }

    pub async fn register_customer(&self, new: &NewCustomer) -> Result<UserProfile, ApiError> {
        let req = ApiRequest::post("/auth/register/customer/", serde_json::to_value(new)?);
        self.send_public(req).await
    }

    pub async fn register_seller(&self, new: &NewSeller) -> Result<UserProfile, ApiError> {
        let req = ApiRequest::post("/auth/register/seller/", serde_json::to_value(new)?);
        self.send_public(req).await
    }

    // ===== Catalog (public) =====

    pub async fn categories(&self) -> Result<Vec<Category>, ApiError> {
        self.send_public(ApiRequest::get("/categories/")).await
    }

    /// List active products, optionally filtered by category slug and
    /// name search.
    pub async fn products(&self, query: &ProductQuery) -> Result<Vec<Product>, ApiError> {
        let req = ApiRequest::get("/products/").with_query(query.to_params());
        self.send_public(req).await
    }

    pub async fn product(&self, slug: &str) -> Result<Product, ApiError> {
        self.send_public(ApiRequest::get(&format!("/products/{slug}/")))
            .await
    }

    // ===== Cart =====

    pub async fn cart(&self) -> Result<Cart, ApiError> {
        self.send_authed(ApiRequest::get("/cart/")).await
    }

    pub async fn add_to_cart(&self, product_id: i64, quantity: u32) -> Result<Cart, ApiError> {
        let req = ApiRequest::post(
            "/cart/add/",
            serde_json::json!({"product_id": product_id, "quantity": quantity}),
        );
        self.send_authed(req).await
    }

    pub async fn update_cart_item(
        &self,
        product_id: i64,
        quantity: u32,
    ) -> Result<Cart, ApiError> {
        let req = ApiRequest::patch(
            "/cart/update_item/",
            serde_json::json!({"product_id": product_id, "quantity": quantity}),
        );
        self.send_authed(req).await
    }

    pub async fn remove_from_cart(&self, product_id: i64) -> Result<Cart, ApiError> {
        let req = ApiRequest::delete("/cart/remove/")
            .with_query(vec![("product_id".to_string(), product_id.to_string())]);
        self.send_authed(req).await
    }

    pub async fn clear_cart(&self) -> Result<Cart, ApiError> {
        self.send_authed(ApiRequest::delete("/cart/clear/")).await
    }

    // ===== Orders =====

    pub async fn orders(&self) -> Result<Vec<Order>, ApiError> {
        self.send_authed(ApiRequest::get("/orders/")).await
    }

    pub async fn order(&self, id: i64) -> Result<Order, ApiError> {
        self.send_authed(ApiRequest::get(&format!("/orders/{id}/")))
            .await
    }

    /// Convert the current cart into an order (test-mode direct placement,
    /// no payment gateway involved).
    pub async fn place_order(&self, shipping_address: &str) -> Result<Order, ApiError> {
        let req = ApiRequest::post(
            "/orders/",
            serde_json::json!({"shipping_address": shipping_address}),
        );
        self.send_authed(req).await
    }

    // ===== Payments =====

    /// Create a gateway order for the current cart. The returned value is
    /// everything the hosted checkout widget needs.
    pub async fn create_checkout(&self) -> Result<CheckoutOrder, ApiError> {
        let req = ApiRequest::post("/pay/razorpay/create_order/", serde_json::json!({}));
        self.send_authed(req).await
    }

    /// Verify the widget's signature server-side and convert the cart into
    /// a paid order.
    pub async fn verify_payment(&self, proof: &PaymentProof) -> Result<Order, ApiError> {
        let req = ApiRequest::post("/pay/razorpay/verify/", serde_json::to_value(proof)?);
        self.send_authed(req).await
    }

    // ===== Seller portal =====

    pub async fn seller_products(&self) -> Result<Vec<Product>, ApiError> {
        self.send_authed(ApiRequest::get("/seller/products/")).await
    }

    pub async fn seller_product(&self, slug: &str) -> Result<Product, ApiError> {
        self.send_authed(ApiRequest::get(&format!("/seller/products/{slug}/")))
            .await
    }

    pub async fn create_product(&self, product: &ProductWrite) -> Result<Product, ApiError> {
        let req = ApiRequest::post("/seller/products/", serde_json::to_value(product)?);
        self.send_authed(req).await
    }

    pub async fn update_product(
        &self,
        slug: &str,
        product: &ProductWrite,
    ) -> Result<Product, ApiError> {
        let req = ApiRequest::put(
            &format!("/seller/products/{slug}/"),
            serde_json::to_value(product)?,
        );
        self.send_authed(req).await
    }

    // ===== Dispatch machinery =====

    /// Send an unauthenticated request. 401s here are terminal; only the
    /// authed path participates in the refresh flow.
    async fn send_public<T: DeserializeOwned>(&self, req: ApiRequest) -> Result<T, ApiError> {
        self.request_json(&req, None).await
    }

    /// Send an authenticated request with transparent 401 recovery.
    ///
    /// The contract, in order:
    /// 1. Non-401 failures propagate unchanged.
    /// 2. On 401 with no stored refresh token: teardown, original error.
    /// 3. Otherwise obtain a fresh token through the single-flight gate
    ///    (performing the refresh, or waiting on the one in flight).
    /// 4. Replay once with the new token. There is no loop: a 401 on the
    ///    replay propagates.
    async fn send_authed<T: DeserializeOwned>(&self, req: ApiRequest) -> Result<T, ApiError> {
        let token = self.current_access();
        match self.request_json(&req, token.as_deref()).await {
            Err(err) if err.is_auth_failure() => {
                if self.refresh_token().is_none() {
                    debug!(path = %req.path, "401 with no refresh token, tearing down");
                    self.teardown();
                    return Err(err);
                }
                let access = self.refresh_access().await?;
                debug!(path = %req.path, "replaying request with refreshed token");
                self.request_json(&req, Some(&access)).await
            }
            other => other,
        }
    }

    async fn request_json<T: DeserializeOwned>(
        &self,
        req: &ApiRequest,
        token: Option<&str>,
    ) -> Result<T, ApiError> {
        let response = self.dispatch(req, token).await?;
        response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("{} {}: {e}", req.method, req.path)))
    }

    /// Build and send one outbound request from the template. Returns the
    /// response only on 2xx; anything else maps through `ApiError`.
    async fn dispatch(
        &self,
        req: &ApiRequest,
        token: Option<&str>,
    ) -> Result<reqwest::Response, ApiError> {
        let url = format!("{}{}", self.inner.base_url, req.path);
        let mut builder = self.inner.http.request(req.method.clone(), &url);
        if !req.query.is_empty() {
            builder = builder.query(&req.query);
        }
        if let Some(ref body) = req.body {
            builder = builder.json(body);
        }
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }

        debug!(method = %req.method, path = %req.path, "dispatching request");
        let response = builder.send().await?;
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    // ===== Refresh coordination =====

    /// Obtain a fresh access token, as leader or waiter. Exactly one HTTP
    /// refresh happens per 401 storm; the leader tears the session down on
    /// failure after waiters have been resolved with the error.
    async fn refresh_access(&self) -> RefreshOutcome {
        match self.inner.gate.acquire() {
            Ticket::Leader => {
                let outcome = self.perform_refresh().await;
                self.inner.gate.finish(&outcome);
                if outcome.is_err() {
                    self.teardown();
                }
                outcome
            }
            Ticket::Waiter(rx) => {
                debug!("refresh already in flight, waiting");
                await_waiter(rx).await
            }
        }
    }

    /// The one refresh HTTP call. Goes straight through the raw client -
    /// deliberately outside `send_authed`, so it can never intercept
    /// itself. On success the new token is persisted and becomes the
    /// default for future calls before any waiter is resolved.
    async fn perform_refresh(&self) -> RefreshOutcome {
        let Some(refresh_token) = self.refresh_token() else {
            return Err(RefreshError::MissingRefreshToken);
        };

        info!("access token expired, refreshing");
        let url = format!("{}/auth/token/refresh/", self.inner.base_url);
        // The bound covers the whole exchange: a server that answers the
        // headers promptly but stalls on the body still counts as timed out.
        let exchange = async {
            let response = self
                .inner
                .http
                .post(&url)
                .json(&serde_json::json!({"refresh": refresh_token}))
                .send()
                .await
                .map_err(|e| RefreshError::Transport(e.to_string()))?;
            let status = response.status();
            let text = response
                .text()
                .await
                .map_err(|e| RefreshError::Transport(e.to_string()))?;
            Ok::<_, RefreshError>((status, text))
        };

        let (status, text) = match tokio::time::timeout(self.inner.refresh_timeout, exchange).await
        {
            Ok(Ok(pair)) => pair,
            Ok(Err(e)) => return Err(e),
            Err(_) => {
                warn!("refresh did not complete in time");
                return Err(RefreshError::TimedOut);
            }
        };

        if !status.is_success() {
            warn!(status = status.as_u16(), "refresh rejected");
            return Err(RefreshError::Rejected {
                status: status.as_u16(),
                detail: text.chars().take(200).collect(),
            });
        }

        let parsed: RefreshResponse =
            serde_json::from_str(&text).map_err(|_| RefreshError::MissingAccessToken)?;
        let Some(access) = parsed.access else {
            warn!("refresh response was 2xx but carried no access token");
            return Err(RefreshError::MissingAccessToken);
        };

        self.store_access(&access, parsed.refresh.as_deref());
        info!("access token refreshed");
        Ok(access)
    }

    /// Persist a refreshed access token and make it the default for
    /// subsequent calls.
    fn store_access(&self, access: &str, rotated_refresh: Option<&str>) {
        {
            let mut session = self.lock_session();
            session.update_access(access, rotated_refresh);
            if let Err(e) = session.save() {
                // The in-memory token still works for this process.
                warn!(error = %e, "failed to persist refreshed session");
            }
        }
        self.set_access(Some(access.to_string()));
    }

    /// Destroy the session: stored credentials, the default token, and the
    /// observable auth state. The host sees `LoggedOut` and routes to its
    /// login screen.
    fn teardown(&self) {
        {
            let mut session = self.lock_session();
            if let Err(e) = session.clear() {
                warn!(error = %e, "failed to clear stored session");
            }
        }
        self.set_access(None);
        self.inner.auth_state.send_replace(AuthState::LoggedOut);
        info!("session torn down");
    }

    fn lock_session(&self) -> std::sync::MutexGuard<'_, Session> {
        self.inner
            .session
            .lock()
            .unwrap_or_else(|e| e.into_inner())
    }

    fn current_access(&self) -> Option<String> {
        self.inner
            .access
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn set_access(&self, token: Option<String>) {
        *self
            .inner
            .access
            .write()
            .unwrap_or_else(|e| e.into_inner()) = token;
    }

    fn refresh_token(&self) -> Option<String> {
        self.lock_session().refresh_token().map(str::to_string)
    }
}
