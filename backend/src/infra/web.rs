use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::core::api_types::{AddItemRequest, ApiCart, ApiCriteria, ApiProduct, SetQtyRequest};
use crate::core::cart::CartStore;
use crate::core::catalog::{Catalog, FilterCriteria};
use crate::core::storage::SlotStore;

// ── App state ────────────────────────────────────────────────

pub type DynSlot = Box<dyn SlotStore + Send>;
pub type SharedCart = Arc<Mutex<CartStore<DynSlot>>>;

/// Combined state passed to handlers via axum State extractor.
#[derive(Clone)]
pub struct AppState {
    catalog: Arc<Catalog>,
    cart: SharedCart,
}

impl AppState {
    pub fn new(catalog: Catalog, cart: SharedCart) -> Self {
        Self {
            catalog: Arc::new(catalog),
            cart,
        }
    }
}

// ── Server bootstrap ─────────────────────────────────────────

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/api/products", get(list_products))
        .route("/api/artists", get(list_artists))
        .route("/api/filters/default", get(default_filters))
        .route("/api/cart", get(get_cart))
        .route("/api/cart/items", post(add_item))
        .route("/api/cart/items/{id}", put(set_qty).delete(remove_item))
        .with_state(state);

    api.fallback(static_handler)
        .layer(TraceLayer::new_for_http())
        .layer(tower_http::cors::CorsLayer::permissive())
}

/// Serves until Ctrl-C. Callers keep their own handle on the cart so the store,
/// and any runtime its slot owns, is dropped outside the server's runtime.
pub async fn start_server(state: AppState, port: u16) -> std::io::Result<()> {
    let app = router(state);

    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("Vinilo storefront listening on http://localhost:{port} (API under /api)");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

// ── GET /api/products?q=&artist=&max_price= ──────────────────

async fn list_products(
    State(state): State<AppState>,
    Query(params): Query<ApiCriteria>,
) -> Response {
    let criteria = FilterCriteria::from(&params);
    let api: Vec<ApiProduct> = state
        .catalog
        .filter(&criteria)
        .into_iter()
        .map(ApiProduct::from)
        .collect();
    Json(api).into_response()
}

// ── GET /api/artists ─────────────────────────────────────────

async fn list_artists(State(state): State<AppState>) -> Response {
    Json(state.catalog.artists()).into_response()
}

// ── GET /api/filters/default ─────────────────────────────────

async fn default_filters() -> Response {
    Json(ApiCriteria::from(&FilterCriteria::default())).into_response()
}

// ── GET /api/cart ────────────────────────────────────────────

async fn get_cart(State(state): State<AppState>) -> Response {
    let cart = state.cart.lock().await;
    Json(ApiCart::from(cart.summary())).into_response()
}

// ── POST /api/cart/items ─────────────────────────────────────

async fn add_item(State(state): State<AppState>, Json(req): Json<AddItemRequest>) -> Response {
    let Some(product) = state.catalog.get(req.id).cloned() else {
        return (StatusCode::NOT_FOUND, format!("Unknown product {}", req.id)).into_response();
    };
    with_cart(state.cart, move |cart| cart.add(&product)).await
}

// ── PUT /api/cart/items/:id ──────────────────────────────────

async fn set_qty(
    State(state): State<AppState>,
    Path(id): Path<u32>,
    Json(req): Json<SetQtyRequest>,
) -> Response {
    let qty = req.qty();
    with_cart(state.cart, move |cart| {
        cart.set_qty(id, qty);
    })
    .await
}

// ── DELETE /api/cart/items/:id ───────────────────────────────

async fn remove_item(State(state): State<AppState>, Path(id): Path<u32>) -> Response {
    match run_on_cart(state.cart, move |cart| {
        cart.remove(id);
    })
    .await
    {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(resp) => resp,
    }
}

/// Runs a mutation on the blocking pool, since a slot may block on its own
/// runtime, and answers with the updated cart.
async fn with_cart<F>(cart: SharedCart, op: F) -> Response
where
    F: FnOnce(&mut CartStore<DynSlot>) + Send + 'static,
{
    match run_on_cart(cart, op).await {
        Ok(api) => Json(api).into_response(),
        Err(resp) => resp,
    }
}

async fn run_on_cart<F>(cart: SharedCart, op: F) -> Result<ApiCart, Response>
where
    F: FnOnce(&mut CartStore<DynSlot>) + Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let mut guard = cart.blocking_lock();
        op(&mut guard);
        ApiCart::from(guard.summary())
    })
    .await
    .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response())
}

// ── Fallback ─────────────────────────────────────────────────

async fn static_handler(uri: axum::http::Uri) -> Response {
    if uri.path().starts_with("/api/") {
        return StatusCode::NOT_FOUND.into_response();
    }
    axum::response::Html(
        r#"<!DOCTYPE html>
<html><head><meta charset="utf-8"><title>ViniloStore</title></head>
<body style="font-family:system-ui;text-align:center;margin-top:20vh">
<h1>ViniloStore API</h1>
<p>Catalog: <code>/api/products</code> &middot; Artists: <code>/api/artists</code></p>
<p>Cart: <code>/api/cart</code></p>
</body></html>"#,
    )
    .into_response()
}
