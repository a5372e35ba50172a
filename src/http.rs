//! HTTP surface over the engine: catalog options, resolution, session carts.

use axum::{extract::{Path, Query, State}, http::StatusCode, routing::{delete, get, post}, Json, Router};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use validator::Validate;

use crate::domain::aggregates::{Cart, CartLine, CartStore, MergeOutcome};
use crate::domain::catalog::{resolve, AttributeOptions, Catalog, ProductGroup, ProductVariant, Resolution, Selection};
use crate::domain::configurator::spec_text;
use crate::domain::events::DomainEvent;
use crate::domain::pricing::PriceQuote;
use crate::domain::quantity::{Adjustment, Direction, QuantityPolicy};
use crate::domain::storage::InMemoryStore;
use crate::domain::value_objects::{Money, Sku};
use crate::{EcommerceError, Engine};

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub engine: Arc<Engine>,
    pub carts: Arc<RwLock<HashMap<String, Cart>>>,
    pub dates: Arc<RwLock<InMemoryStore>>,
    pub nats: Option<async_nats::Client>,
}

impl AppState {
    pub fn new(catalog: Catalog, engine: Engine, nats: Option<async_nats::Client>) -> Self {
        Self { catalog: Arc::new(catalog), engine: Arc::new(engine), carts: Arc::default(), dates: Arc::default(), nats }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { Json(serde_json::json!({"status": "healthy", "service": "storefront-configurator"})) }))
        .route("/api/v1/groups", get(list_groups))
        .route("/api/v1/groups/:id", get(get_group))
        .route("/api/v1/groups/:id/options", get(get_options))
        .route("/api/v1/groups/:id/resolve", post(resolve_selection))
        .route("/api/v1/cart/:session", get(get_cart).post(add_to_cart))
        .route("/api/v1/cart/:session/:sku", delete(remove_line))
        .route("/api/v1/cart/:session/:sku/adjust", post(adjust_line))
        .route("/api/v1/dispatch-date/:sku", get(get_dispatch_date).put(set_dispatch_date))
        .layer(TraceLayer::new_for_http()).layer(CorsLayer::permissive()).with_state(state)
}

type ApiError = (StatusCode, String);

fn not_found(what: impl std::fmt::Display) -> ApiError { (StatusCode::NOT_FOUND, format!("{what} not found")) }

fn api_error(e: EcommerceError) -> ApiError {
    let status = match &e {
        EcommerceError::InsufficientInventory(_) => StatusCode::CONFLICT,
        EcommerceError::InvalidQuantity => StatusCode::UNPROCESSABLE_ENTITY,
        EcommerceError::VariantNotFound(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, e.to_string())
}

fn parse_sku(raw: &str) -> Result<Sku, ApiError> { Sku::new(raw).map_err(|e| (StatusCode::UNPROCESSABLE_ENTITY, e.to_string())) }

fn find_group<'a>(s: &'a AppState, id: &str) -> Result<&'a ProductGroup, ApiError> {
    s.catalog.group(id).ok_or_else(|| not_found(format!("group {id}")))
}

fn find_variant<'a>(s: &'a AppState, sku: &Sku) -> Result<(&'a ProductGroup, &'a ProductVariant), ApiError> {
    s.catalog.variant(sku).ok_or_else(|| api_error(EcommerceError::VariantNotFound(sku.clone())))
}

async fn publish(nats: Option<&async_nats::Client>, events: Vec<DomainEvent>) {
    let Some(client) = nats else { return };
    for event in events {
        let subject = format!("storefront.{}", event.event_type());
        let payload = match serde_json::to_vec(&event) {
            Ok(payload) => payload,
            Err(e) => { tracing::warn!(%subject, error = %e, "event not serializable"); continue; }
        };
        if let Err(e) = client.publish(subject.clone(), payload.into()).await {
            tracing::warn!(%subject, error = %e, "event publish failed");
        }
    }
}

// =============================================================================
// Catalog
// =============================================================================

async fn list_groups(State(s): State<AppState>) -> Json<Vec<ProductGroup>> { Json(s.catalog.groups().to_vec()) }

async fn get_group(State(s): State<AppState>, Path(id): Path<String>) -> Result<Json<ProductGroup>, ApiError> {
    find_group(&s, &id).cloned().map(Json)
}

async fn get_options(State(s): State<AppState>, Path(id): Path<String>, Query(selection): Query<Selection>) -> Result<Json<AttributeOptions>, ApiError> {
    let group = find_group(&s, &id)?;
    Ok(Json(s.engine.get_attribute_options(group, &selection)))
}

#[derive(Debug, Serialize)]
pub struct ResolveResponse { pub variant: ProductVariant, pub resolution: Resolution, pub quote: PriceQuote, pub policy: QuantityPolicy, pub spec_text: Vec<String> }

async fn resolve_selection(State(s): State<AppState>, Path(id): Path<String>, Json(selection): Json<Selection>) -> Result<Json<ResolveResponse>, ApiError> {
    let group = find_group(&s, &id)?;
    let resolved = resolve(group, &selection, None).ok_or_else(|| not_found(format!("variants of group {id}")))?;
    let quote = s.engine.quote(group, resolved.variant);
    Ok(Json(ResolveResponse {
        variant: resolved.variant.clone(),
        resolution: resolved.resolution,
        policy: s.engine.quantity_policy(resolved.variant),
        spec_text: spec_text(resolved.variant, &quote),
        quote,
    }))
}

// =============================================================================
// Cart
// =============================================================================

#[derive(Debug, Serialize)]
pub struct CartView { pub id: String, pub items: Vec<CartLine>, pub subtotal: Money }

impl From<&Cart> for CartView {
    fn from(c: &Cart) -> Self { Self { id: c.id().to_string(), items: c.items().to_vec(), subtotal: c.subtotal().clone() } }
}

async fn get_cart(State(s): State<AppState>, Path(session): Path<String>) -> Result<Json<CartView>, ApiError> {
    let carts = s.carts.read().await;
    carts.get(&session).map(|c| Json(CartView::from(c))).ok_or_else(|| not_found(format!("cart {session}")))
}

#[derive(Debug, Deserialize, Validate)]
pub struct AddToCartRequest {
    #[validate(length(min = 1, max = 50))]
    pub sku: String,
    #[validate(range(min = 1))]
    pub quantity: u32,
}

#[derive(Debug, Serialize)] pub struct AddToCartResponse { pub outcome: MergeOutcome, pub cart: CartView }

async fn add_to_cart(State(s): State<AppState>, Path(session): Path<String>, Json(r): Json<AddToCartRequest>) -> Result<(StatusCode, Json<AddToCartResponse>), ApiError> {
    r.validate().map_err(|e| (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()))?;
    let sku = parse_sku(&r.sku)?;
    let (group, variant) = find_variant(&s, &sku)?;
    let unit_price = s.engine.quote(group, variant).unit_price;
    let (response, events) = {
        let mut carts = s.carts.write().await;
        let dates = s.dates.read().await;
        let cart = carts.entry(session.clone()).or_insert_with(|| Cart::for_session(&session, s.engine.currency()));
        let outcome = s.engine.add_to_cart(cart, &*dates, group, variant, r.quantity, unit_price).map_err(api_error)?;
        (AddToCartResponse { outcome, cart: CartView::from(&*cart) }, cart.take_events())
    };
    publish(s.nats.as_ref(), events).await;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn remove_line(State(s): State<AppState>, Path((session, sku)): Path<(String, String)>) -> Result<StatusCode, ApiError> {
    let sku = parse_sku(&sku)?;
    let events = {
        let mut carts = s.carts.write().await;
        let cart = carts.get_mut(&session).ok_or_else(|| not_found(format!("cart {session}")))?;
        s.engine.remove_from_cart(cart, &sku);
        cart.take_events()
    };
    publish(s.nats.as_ref(), events).await;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)] pub struct AdjustRequest { pub direction: Direction }
#[derive(Debug, Serialize)] pub struct AdjustResponse { pub adjustment: Adjustment, pub cart: CartView }

async fn adjust_line(State(s): State<AppState>, Path((session, sku)): Path<(String, String)>, Json(r): Json<AdjustRequest>) -> Result<Json<AdjustResponse>, ApiError> {
    let sku = parse_sku(&sku)?;
    let (_, variant) = find_variant(&s, &sku)?;
    let (response, events) = {
        let mut carts = s.carts.write().await;
        let cart = carts.get_mut(&session).ok_or_else(|| not_found(format!("cart {session}")))?;
        let current = cart.line(&sku).map(CartLine::quantity).ok_or_else(|| not_found(format!("line {sku}")))?;
        let adjustment = s.engine.adjust_quantity(variant, current, r.direction);
        if adjustment.should_remove {
            cart.remove_item(&sku);
        } else if !adjustment.capped {
            cart.update_quantity(&sku, adjustment.qty).map_err(|e| api_error(e.into()))?;
        }
        (AdjustResponse { adjustment, cart: CartView::from(&*cart) }, cart.take_events())
    };
    publish(s.nats.as_ref(), events).await;
    Ok(Json(response))
}

// =============================================================================
// Dispatch dates
// =============================================================================

#[derive(Debug, Serialize)] pub struct DispatchDateView { pub sku: Sku, pub date: Option<NaiveDate> }
#[derive(Debug, Deserialize)] pub struct DispatchDateRequest { pub date: NaiveDate }

async fn get_dispatch_date(State(s): State<AppState>, Path(sku): Path<String>) -> Result<Json<DispatchDateView>, ApiError> {
    let sku = parse_sku(&sku)?;
    let date = s.engine.dispatch_date(&*s.dates.read().await, &sku);
    Ok(Json(DispatchDateView { sku, date }))
}

async fn set_dispatch_date(State(s): State<AppState>, Path(sku): Path<String>, Json(r): Json<DispatchDateRequest>) -> Result<Json<DispatchDateView>, ApiError> {
    let sku = parse_sku(&sku)?;
    find_variant(&s, &sku)?;
    s.engine.set_dispatch_date(&mut *s.dates.write().await, &sku, r.date);
    publish(s.nats.as_ref(), vec![DomainEvent::DispatchDateSet { sku: sku.clone(), date: r.date }]).await;
    Ok(Json(DispatchDateView { sku, date: Some(r.date) }))
}
