//! HTTP surface over a shared [`Storefront`].

use axum::{extract::{Path, Query, State}, http::StatusCode, routing::{get, post, put}, Json, Router};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use crate::domain::aggregates::{DistributorOrderView, ProductDraft};
use crate::pricing::PricedLine;
use crate::services::{redirect_for, Registration, Stats};
use crate::{Category, Order, OrderStatus, Product, Role, Session, Storefront, StorefrontError};

#[derive(Clone)]
pub struct AppState {
    pub shop: Arc<Storefront>,
}

type ApiResult<T> = std::result::Result<T, (StatusCode, String)>;

fn reject(e: StorefrontError) -> (StatusCode, String) {
    let status = match &e {
        StorefrontError::Validation(_) | StorefrontError::OutOfStock | StorefrontError::InsufficientStock { .. } => StatusCode::BAD_REQUEST,
        StorefrontError::ProductNotFound | StorefrontError::OrderNotFound
        | StorefrontError::UserNotFound | StorefrontError::CategoryNotFound => StatusCode::NOT_FOUND,
        StorefrontError::InvalidCredentials => StatusCode::UNAUTHORIZED,
        StorefrontError::Unauthorized => StatusCode::FORBIDDEN,
        StorefrontError::DuplicateEmail | StorefrontError::DuplicateCategory
        | StorefrontError::InvalidTransition { .. } => StatusCode::CONFLICT,
        StorefrontError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, e.to_string())
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { Json(serde_json::json!({"status": "healthy", "service": "hb-storefront"})) }))
        .route("/api/v1/products", get(list_products).post(create_product))
        .route("/api/v1/products/:id", get(get_product).put(update_product).delete(delete_product))
        .route("/api/v1/categories", get(list_categories).post(create_category))
        .route("/api/v1/cart", get(get_cart).post(add_to_cart).delete(clear_cart))
        .route("/api/v1/cart/:product_id", put(set_cart_quantity).delete(remove_from_cart))
        .route("/api/v1/auth/login", post(login))
        .route("/api/v1/auth/logout", post(logout))
        .route("/api/v1/auth/register", post(register))
        .route("/api/v1/session", get(current_session))
        .route("/api/v1/orders", get(list_orders).post(place_order))
        .route("/api/v1/orders/:id", get(get_order))
        .route("/api/v1/orders/:id/status", put(update_order_status))
        .route("/api/v1/checkout/whatsapp", get(whatsapp_checkout))
        .route("/api/v1/stats", get(stats))
        .layer(TraceLayer::new_for_http()).layer(CorsLayer::permissive()).with_state(state)
}

// -----------------------------------------------------------------------------
// Catalog
// -----------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct ProductQuery { pub category: Option<String>, pub search: Option<String>, pub owner: Option<String>, pub featured: Option<bool> }

async fn list_products(State(s): State<AppState>, Query(q): Query<ProductQuery>) -> Json<Vec<Product>> {
    let catalog = s.shop.catalog();
    let mut products = match q.search.as_deref().filter(|t| !t.trim().is_empty()) {
        Some(term) => catalog.search(term),
        None => catalog.list(),
    };
    if let Some(category) = &q.category { products.retain(|p| &p.category == category); }
    if let Some(owner) = &q.owner { products.retain(|p| p.is_owned_by(owner)); }
    if q.featured == Some(true) { products.retain(|p| p.featured); }
    Json(products)
}

async fn get_product(State(s): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Product>> {
    s.shop.catalog().get(&id).map(Json).map_err(reject)
}

/// Admins and distributors edit the catalog; distributors only their own products.
fn catalog_editor(shop: &Storefront) -> crate::Result<Session> {
    shop.auth().require_role(&[Role::Admin, Role::Distributor])
}

fn check_owner(session: &Session, product: &Product) -> crate::Result<()> {
    if session.role == Role::Distributor && !product.is_owned_by(&session.id) {
        return Err(StorefrontError::Unauthorized);
    }
    Ok(())
}

async fn create_product(State(s): State<AppState>, Json(mut draft): Json<ProductDraft>) -> ApiResult<(StatusCode, Json<Product>)> {
    let session = catalog_editor(&s.shop).map_err(reject)?;
    if session.role == Role::Distributor { draft.owner = Some(session.id); }
    let p = s.shop.catalog().add_product(draft).map_err(reject)?;
    Ok((StatusCode::CREATED, Json(p)))
}

async fn update_product(State(s): State<AppState>, Path(id): Path<String>, Json(mut draft): Json<ProductDraft>) -> ApiResult<Json<Product>> {
    let session = catalog_editor(&s.shop).map_err(reject)?;
    let catalog = s.shop.catalog();
    check_owner(&session, &catalog.get(&id).map_err(reject)?).map_err(reject)?;
    if session.role == Role::Distributor { draft.owner = Some(session.id); }
    catalog.update_product(&id, draft).map(Json).map_err(reject)
}

async fn delete_product(State(s): State<AppState>, Path(id): Path<String>) -> ApiResult<StatusCode> {
    let session = catalog_editor(&s.shop).map_err(reject)?;
    let catalog = s.shop.catalog();
    check_owner(&session, &catalog.get(&id).map_err(reject)?).map_err(reject)?;
    catalog.delete_product(&id).map_err(reject)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_categories(State(s): State<AppState>) -> Json<Vec<Category>> {
    Json(s.shop.catalog().categories())
}

#[derive(Debug, Deserialize)] pub struct CreateCategoryRequest { pub name: String, pub icon: Option<String>, pub description: Option<String> }

async fn create_category(State(s): State<AppState>, Json(r): Json<CreateCategoryRequest>) -> ApiResult<(StatusCode, Json<Category>)> {
    catalog_editor(&s.shop).map_err(reject)?;
    let c = s.shop.catalog().add_category(&r.name, r.icon, r.description).map_err(reject)?;
    Ok((StatusCode::CREATED, Json(c)))
}

// -----------------------------------------------------------------------------
// Cart
// -----------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView { pub lines: Vec<PricedLine>, pub item_count: u32, pub total: Decimal }

fn cart_view(shop: &Storefront) -> CartView {
    let cart = shop.cart();
    CartView { lines: cart.lines(), item_count: cart.item_count(), total: cart.total() }
}

async fn get_cart(State(s): State<AppState>) -> Json<CartView> { Json(cart_view(&s.shop)) }

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest { pub product_id: String, #[serde(default = "one")] pub quantity: u32 }

fn one() -> u32 { 1 }

async fn add_to_cart(State(s): State<AppState>, Json(r): Json<AddToCartRequest>) -> ApiResult<(StatusCode, Json<CartView>)> {
    s.shop.cart().add(&r.product_id, r.quantity).map_err(reject)?;
    Ok((StatusCode::CREATED, Json(cart_view(&s.shop))))
}

#[derive(Debug, Deserialize)] pub struct QuantityRequest { pub quantity: i64 }

async fn set_cart_quantity(State(s): State<AppState>, Path(product_id): Path<String>, Json(r): Json<QuantityRequest>) -> ApiResult<Json<CartView>> {
    s.shop.cart().set_quantity(&product_id, r.quantity).map_err(reject)?;
    Ok(Json(cart_view(&s.shop)))
}

async fn remove_from_cart(State(s): State<AppState>, Path(product_id): Path<String>) -> ApiResult<Json<CartView>> {
    s.shop.cart().remove(&product_id).map_err(reject)?;
    Ok(Json(cart_view(&s.shop)))
}

async fn clear_cart(State(s): State<AppState>) -> ApiResult<StatusCode> {
    s.shop.cart().clear().map_err(reject)?;
    Ok(StatusCode::NO_CONTENT)
}

// -----------------------------------------------------------------------------
// Auth
// -----------------------------------------------------------------------------

#[derive(Debug, Deserialize)] pub struct LoginRequest { pub email: String, pub password: String, pub redirect: Option<String> }
#[derive(Debug, Serialize)] pub struct LoginResponse { pub session: Session, pub redirect: &'static str }

async fn login(State(s): State<AppState>, Json(r): Json<LoginRequest>) -> ApiResult<Json<LoginResponse>> {
    let session = s.shop.auth().login(&r.email, &r.password).map_err(reject)?;
    let redirect = redirect_for(session.role, r.redirect.as_deref());
    Ok(Json(LoginResponse { session, redirect }))
}

async fn logout(State(s): State<AppState>) -> ApiResult<StatusCode> {
    s.shop.auth().logout().map_err(reject)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn register(State(s): State<AppState>, Json(r): Json<Registration>) -> ApiResult<(StatusCode, Json<Session>)> {
    let session = s.shop.auth().register(r).map_err(reject)?;
    Ok((StatusCode::CREATED, Json(session)))
}

async fn current_session(State(s): State<AppState>) -> Json<Option<Session>> {
    Json(s.shop.auth().current_session())
}

// -----------------------------------------------------------------------------
// Orders
// -----------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum OrderListing { Orders(Vec<Order>), Distributor(Vec<DistributorOrderView>) }

/// Admins see every order, distributors their slice, clients their own.
async fn list_orders(State(s): State<AppState>) -> ApiResult<Json<OrderListing>> {
    let session = s.shop.auth().current_session().ok_or_else(|| reject(StorefrontError::Unauthorized))?;
    let orders = s.shop.orders();
    let listing = match session.role {
        Role::Admin => OrderListing::Orders(orders.list()),
        Role::Distributor => OrderListing::Distributor(orders.for_distributor(&session.id)),
        Role::Client => OrderListing::Orders(
            orders.list().into_iter().filter(|o| o.customer_id.as_deref() == Some(session.id.as_str())).collect(),
        ),
    };
    Ok(Json(listing))
}

#[derive(Debug, Default, Deserialize)] pub struct PlaceOrderRequest { pub notes: Option<String> }

async fn place_order(State(s): State<AppState>, body: Option<Json<PlaceOrderRequest>>) -> ApiResult<(StatusCode, Json<Order>)> {
    let notes = body.and_then(|Json(r)| r.notes).filter(|n| !n.trim().is_empty());
    let o = s.shop.orders().place_from_cart(notes).map_err(reject)?;
    Ok((StatusCode::CREATED, Json(o)))
}

async fn get_order(State(s): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Order>> {
    let session = s.shop.auth().current_session().ok_or_else(|| reject(StorefrontError::Unauthorized))?;
    s.shop.orders().get_for(&session, &id).map(Json).map_err(reject)
}

#[derive(Debug, Deserialize)] pub struct StatusRequest { pub status: OrderStatus }

async fn update_order_status(State(s): State<AppState>, Path(id): Path<String>, Json(r): Json<StatusRequest>) -> ApiResult<Json<Order>> {
    let session = s.shop.auth().require_role(&[Role::Admin, Role::Distributor]).map_err(reject)?;
    let orders = s.shop.orders();
    orders.get_for(&session, &id).map_err(reject)?;
    orders.update_status(&id, r.status).map(Json).map_err(reject)
}

// -----------------------------------------------------------------------------
// Checkout and dashboard
// -----------------------------------------------------------------------------

#[derive(Debug, Serialize)] pub struct CheckoutLink { pub url: String }

async fn whatsapp_checkout(State(s): State<AppState>) -> ApiResult<Json<CheckoutLink>> {
    let today = chrono::Local::now().date_naive();
    s.shop.whatsapp_checkout_url(today)
        .map(|url| Json(CheckoutLink { url }))
        .ok_or_else(|| reject(StorefrontError::Validation("cart is empty".into())))
}

async fn stats(State(s): State<AppState>) -> ApiResult<Json<Stats>> {
    s.shop.auth().require_role(&[Role::Admin]).map_err(reject)?;
    Ok(Json(s.shop.stats()))
}
