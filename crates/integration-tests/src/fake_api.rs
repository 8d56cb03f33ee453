//! In-process stand-in for the upstream REST API.
//!
//! Holds products, addresses and orders in memory and issues JWT-shaped
//! tokens whose payload carries `sub` and `exp`, so the storefront's local
//! expiry check sees realistic values.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde_json::{Value, json};
use tokio::sync::RwLock;

/// Seeded administrator.
pub const ADMIN_EMAIL: &str = "admin@eshop.test";
pub const ADMIN_PASSWORD: &str = "Admin@123";

/// Seeded shopper.
pub const USER_EMAIL: &str = "user@eshop.test";
pub const USER_PASSWORD: &str = "User@123";

/// Shopper whose tokens are issued already expired.
pub const STALE_EMAIL: &str = "stale@eshop.test";
pub const STALE_PASSWORD: &str = "Stale@123";

const TOKEN_HEADER: &str = "x-auth-token";

struct Account {
    id: String,
    email: String,
    password: String,
    name: String,
    roles: Vec<&'static str>,
    /// Token lifetime in seconds; negative issues expired tokens.
    token_ttl: i64,
}

#[derive(Default)]
struct Store {
    accounts: Vec<Account>,
    /// token -> account email
    tokens: HashMap<String, String>,
    products: Vec<Value>,
    /// (owner email, address)
    addresses: Vec<(String, Value)>,
    orders: Vec<Value>,
    next_id: u64,
}

impl Store {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }

    fn account(&self, email: &str) -> Option<&Account> {
        self.accounts.iter().find(|a| a.email == email)
    }

    /// Resolve the caller from the token header.
    fn caller(&self, headers: &HeaderMap) -> Result<&Account, Response> {
        let email = headers
            .get(TOKEN_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|token| self.tokens.get(token))
            .ok_or_else(|| error(StatusCode::UNAUTHORIZED, "Unauthorized"))?;

        self.account(email)
            .ok_or_else(|| error(StatusCode::UNAUTHORIZED, "Unauthorized"))
    }

    fn admin(&self, headers: &HeaderMap) -> Result<&Account, Response> {
        let account = self.caller(headers)?;
        if account.roles.contains(&"ADMIN") {
            Ok(account)
        } else {
            Err(error(StatusCode::FORBIDDEN, "Forbidden"))
        }
    }
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

/// Mint a JWT-shaped token for `email` that expires `ttl` seconds from now.
#[must_use]
pub fn mint_token(email: &str, ttl: i64) -> String {
    let now = chrono::Utc::now().timestamp();
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(
        json!({ "sub": email, "iat": now, "exp": now + ttl, "jti": nonce(email, now) })
            .to_string(),
    );
    format!("{header}.{payload}.fake-signature")
}

/// Distinguishes tokens minted in the same second.
fn nonce(email: &str, now: i64) -> String {
    use std::sync::atomic::{AtomicU64, Ordering};
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    format!("{email}-{now}-{}", COUNTER.fetch_add(1, Ordering::Relaxed))
}

/// Handle on the fake API's data.
#[derive(Clone)]
pub struct FakeApi {
    store: Arc<RwLock<Store>>,
}

impl Default for FakeApi {
    fn default() -> Self {
        Self::seeded()
    }
}

impl FakeApi {
    /// Three accounts and a small catalog.
    #[must_use]
    pub fn seeded() -> Self {
        let account = |id: &str, email: &str, password: &str, name: &str, roles, ttl| Account {
            id: id.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            name: name.to_string(),
            roles,
            token_ttl: ttl,
        };

        let store = Store {
            accounts: vec![
                account("u-admin", ADMIN_EMAIL, ADMIN_PASSWORD, "Ada Admin", vec!["ADMIN"], 3600),
                account("u-user", USER_EMAIL, USER_PASSWORD, "Sam Shopper", vec!["USER"], 3600),
                account("u-stale", STALE_EMAIL, STALE_PASSWORD, "Old Timer", vec!["USER"], -60),
            ],
            products: vec![
                json!({
                    "id": "p-lamp", "name": "Desk Lamp", "category": "Furniture",
                    "manufacturer": "Lumen", "price": 1250, "availableItems": 12,
                    "imageUrl": "https://img.example/lamp.png",
                    "description": "A bright lamp for late nights."
                }),
                json!({
                    "_id": "p-phone", "name": "Smart Phone", "category": "Electronics",
                    "manufacturer": "Acme", "price": "24999.50", "availableItems": 3,
                    "description": "x".repeat(200)
                }),
                json!({
                    "id": "p-shirt", "name": "Linen Shirt", "category": "Apparel",
                    "manufacturer": "Weave", "price": 899, "availableItems": 40
                }),
            ],
            next_id: 0,
            ..Store::default()
        };

        Self {
            store: Arc::new(RwLock::new(store)),
        }
    }

    /// Router serving the REST API paths.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/api/auth/signin", axum::routing::post(signin))
            .route("/api/auth/signup", axum::routing::post(signup))
            .route("/api/auth/health-check", get(health_check))
            .route("/api/products", get(list_products).post(create_product))
            .route(
                "/api/products/{id}",
                get(get_product).put(update_product).delete(delete_product),
            )
            .route("/api/addresses", get(list_addresses).post(create_address))
            .route(
                "/api/addresses/{id}",
                axum::routing::put(update_address).delete(delete_address),
            )
            .route("/api/orders", axum::routing::post(create_order))
            .with_state(self.clone())
    }

    /// Invalidate every issued token.
    pub async fn revoke_tokens(&self) {
        self.store.write().await.tokens.clear();
    }

    pub async fn products(&self) -> Vec<Value> {
        self.store.read().await.products.clone()
    }

    pub async fn addresses(&self) -> Vec<Value> {
        self.store
            .read()
            .await
            .addresses
            .iter()
            .map(|(_, a)| a.clone())
            .collect()
    }

    pub async fn orders(&self) -> Vec<Value> {
        self.store.read().await.orders.clone()
    }
}

/// Set the `id` field of a JSON object.
fn with_id(mut body: Value, id: String) -> Value {
    if let Some(object) = body.as_object_mut() {
        object.insert("id".to_string(), Value::String(id));
    }
    body
}

fn id_of(value: &Value) -> Option<&str> {
    value
        .get("id")
        .or_else(|| value.get("_id"))
        .and_then(Value::as_str)
}

// =============================================================================
// Auth
// =============================================================================

async fn signin(State(api): State<FakeApi>, Json(body): Json<Value>) -> Response {
    let username = body.get("username").and_then(Value::as_str).unwrap_or_default();
    let password = body.get("password").and_then(Value::as_str).unwrap_or_default();

    let mut store = api.store.write().await;
    let Some(account) = store
        .account(username)
        .filter(|a| a.password == password)
    else {
        return error(StatusCode::UNAUTHORIZED, "Bad credentials");
    };

    let token = mint_token(&account.email, account.token_ttl);
    let body = json!({
        "id": account.id,
        "email": account.email,
        "name": account.name,
        "roles": account.roles,
    });
    let email = account.email.clone();
    store.tokens.insert(token.clone(), email);

    let mut response = Json(body).into_response();
    if let Ok(value) = HeaderValue::from_str(&token) {
        response.headers_mut().insert(TOKEN_HEADER, value);
    }
    response
}

async fn signup(State(api): State<FakeApi>, Json(body): Json<Value>) -> Response {
    let field = |key: &str| {
        body.get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };
    let email = field("email");

    let mut store = api.store.write().await;
    if store.account(&email).is_some() {
        return error(
            StatusCode::BAD_REQUEST,
            "Error: Email is already in use!",
        );
    }

    let id = store.next_id("u");
    store.accounts.push(Account {
        id,
        name: format!("{} {}", field("firstName"), field("lastName")),
        email,
        password: field("password"),
        roles: vec!["USER"],
        token_ttl: 3600,
    });

    Json(json!({ "message": "User registered successfully!" })).into_response()
}

async fn health_check(State(api): State<FakeApi>, headers: HeaderMap) -> Response {
    let store = api.store.read().await;
    if headers.contains_key(TOKEN_HEADER)
        && let Err(response) = store.caller(&headers)
    {
        return response;
    }
    StatusCode::OK.into_response()
}

// =============================================================================
// Products
// =============================================================================

async fn list_products(State(api): State<FakeApi>) -> Response {
    Json(api.store.read().await.products.clone()).into_response()
}

async fn get_product(State(api): State<FakeApi>, Path(id): Path<String>) -> Response {
    let store = api.store.read().await;
    store
        .products
        .iter()
        .find(|p| id_of(p) == Some(id.as_str()))
        .map_or_else(
            || error(StatusCode::NOT_FOUND, "Product not found"),
            |p| Json(p.clone()).into_response(),
        )
}

async fn create_product(
    State(api): State<FakeApi>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut store = api.store.write().await;
    if let Err(response) = store.admin(&headers) {
        return response;
    }

    let body = with_id(body, store.next_id("p"));
    store.products.push(body.clone());
    (StatusCode::CREATED, Json(body)).into_response()
}

async fn update_product(
    State(api): State<FakeApi>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let mut store = api.store.write().await;
    if let Err(response) = store.admin(&headers) {
        return response;
    }

    let Some(slot) = store
        .products
        .iter_mut()
        .find(|p| id_of(p) == Some(id.as_str()))
    else {
        return error(StatusCode::NOT_FOUND, "Product not found");
    };
    let body = with_id(body, id);
    *slot = body.clone();
    Json(body).into_response()
}

async fn delete_product(
    State(api): State<FakeApi>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let mut store = api.store.write().await;
    if let Err(response) = store.admin(&headers) {
        return response;
    }

    let before = store.products.len();
    store.products.retain(|p| id_of(p) != Some(id.as_str()));
    if store.products.len() == before {
        return error(StatusCode::NOT_FOUND, "Product not found");
    }
    StatusCode::NO_CONTENT.into_response()
}

// =============================================================================
// Addresses and orders
// =============================================================================

async fn list_addresses(State(api): State<FakeApi>, headers: HeaderMap) -> Response {
    let store = api.store.read().await;
    let owner = match store.caller(&headers) {
        Ok(account) => account.email.clone(),
        Err(response) => return response,
    };

    let addresses: Vec<Value> = store
        .addresses
        .iter()
        .filter(|(o, _)| *o == owner)
        .map(|(_, a)| a.clone())
        .collect();
    Json(addresses).into_response()
}

async fn create_address(
    State(api): State<FakeApi>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut store = api.store.write().await;
    let owner = match store.caller(&headers) {
        Ok(account) => account.email.clone(),
        Err(response) => return response,
    };
    if body.get("zipcode").and_then(Value::as_str) == Some("000000") {
        return error(StatusCode::BAD_REQUEST, "Invalid zipcode");
    }

    let body = with_id(body, store.next_id("a"));
    store.addresses.push((owner, body.clone()));
    (StatusCode::CREATED, Json(body)).into_response()
}

async fn update_address(
    State(api): State<FakeApi>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let mut store = api.store.write().await;
    let owner = match store.caller(&headers) {
        Ok(account) => account.email.clone(),
        Err(response) => return response,
    };

    let Some((_, slot)) = store
        .addresses
        .iter_mut()
        .find(|(o, a)| *o == owner && id_of(a) == Some(id.as_str()))
    else {
        return error(StatusCode::NOT_FOUND, "Address not found");
    };
    let body = with_id(body, id);
    *slot = body.clone();
    Json(body).into_response()
}

async fn delete_address(
    State(api): State<FakeApi>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    let mut store = api.store.write().await;
    let owner = match store.caller(&headers) {
        Ok(account) => account.email.clone(),
        Err(response) => return response,
    };

    let before = store.addresses.len();
    store
        .addresses
        .retain(|(o, a)| !(*o == owner && id_of(a) == Some(id.as_str())));
    if store.addresses.len() == before {
        return error(StatusCode::NOT_FOUND, "Address not found");
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn create_order(
    State(api): State<FakeApi>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut store = api.store.write().await;
    if let Err(response) = store.caller(&headers) {
        return response;
    }

    store.orders.push(body.clone());
    (StatusCode::CREATED, Json(body)).into_response()
}
