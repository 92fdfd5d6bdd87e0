//! Cart route handlers.
//!
//! Each visitor's cart document lives in their session. A request loads
//! the document into a [`MemoryStorage`] snapshot, runs one cart store
//! operation against it, and writes the snapshot back to the session.
//! Stock advisories raised during the operation are returned alongside
//! the updated cart.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shapeshop_core::{CartLine, LineId, Price, ProductId};
use tower_sessions::Session;
use tracing::instrument;

use crate::cart::{
    CART_STORAGE_KEY, CartStore, MemoryStorage, RecordingNotifier, StockAdvisory,
};
use crate::error::{AppError, Result};
use crate::models::session_keys;
use crate::state::AppState;

type SessionCart = CartStore<MemoryStorage, RecordingNotifier>;

/// Cart line display data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItemView {
    pub id: LineId,
    pub product_id: ProductId,
    pub title: String,
    pub quantity: u32,
    pub customized: bool,
    pub customization: Option<Value>,
    pub price: String,
    pub line_price: String,
}

/// Cart display data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub subtotal: String,
    pub item_count: u64,
}

/// A stock advisory with its customer-facing message.
#[derive(Debug, Clone, Serialize)]
pub struct AdvisoryView {
    #[serde(flatten)]
    pub advisory: StockAdvisory,
    pub message: String,
}

/// Response to a cart mutation.
#[derive(Debug, Clone, Serialize)]
pub struct CartResponse {
    pub cart: CartView,
    pub advisories: Vec<AdvisoryView>,
}

/// Cart count badge data.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CartCount {
    pub count: u64,
}

// =============================================================================
// Type Conversions
// =============================================================================

impl From<&CartLine> for CartItemView {
    fn from(line: &CartLine) -> Self {
        Self {
            id: line.id,
            product_id: line.product_id,
            title: line.title.clone(),
            quantity: line.quantity,
            customized: line.is_customized,
            customization: line.customization.clone(),
            price: Price::from_amount(line.unit_total()).display(),
            line_price: Price::from_amount(line.line_total()).display(),
        }
    }
}

impl From<&SessionCart> for CartView {
    fn from(cart: &SessionCart) -> Self {
        Self {
            items: cart.lines().iter().map(CartItemView::from).collect(),
            subtotal: Price::from_amount(cart.total_price()).display(),
            item_count: cart.item_count(),
        }
    }
}

impl From<&StockAdvisory> for AdvisoryView {
    fn from(advisory: &StockAdvisory) -> Self {
        Self {
            advisory: *advisory,
            message: advisory.message(),
        }
    }
}

// =============================================================================
// Session Helpers
// =============================================================================

/// Load the visitor's cart from the session.
async fn load_cart(session: &Session) -> Result<SessionCart> {
    let document = session.get::<String>(session_keys::CART).await?;
    let storage = document.map_or_else(MemoryStorage::new, |document| {
        MemoryStorage::with_document(CART_STORAGE_KEY, document)
    });
    Ok(CartStore::load(storage, RecordingNotifier::new()))
}

/// Write the cart back to the session and build the response.
async fn save_cart(session: &Session, cart: SessionCart) -> Result<CartResponse> {
    let view = CartView::from(&cart);
    let (storage, notifier) = cart.into_parts();

    if let Some(document) = storage.document(CART_STORAGE_KEY) {
        session.insert(session_keys::CART, document).await?;
    }

    Ok(CartResponse {
        cart: view,
        advisories: notifier
            .into_advisories()
            .iter()
            .map(AdvisoryView::from)
            .collect(),
    })
}

// =============================================================================
// Request Bodies
// =============================================================================

/// Add to cart request.
#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    pub product_id: ProductId,
    pub quantity: Option<u32>,
    /// Options chosen in the configurator; omitted for the plain product.
    pub customization: Option<Value>,
}

/// Update quantity request.
#[derive(Debug, Deserialize)]
pub struct UpdateCartRequest {
    pub line_id: LineId,
    pub quantity: u32,
}

/// Remove line request.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartRequest {
    pub line_id: LineId,
}

/// Configurator options must arrive as a JSON object.
fn check_customization(customization: Option<&Value>) -> Result<()> {
    match customization {
        Some(options) if !options.is_object() => Err(AppError::BadRequest(
            "customization must be a JSON object".to_string(),
        )),
        _ => Ok(()),
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Display cart.
#[instrument(skip(session))]
pub async fn show(session: Session) -> Result<Json<CartView>> {
    let cart = load_cart(&session).await?;
    Ok(Json(CartView::from(&cart)))
}

/// Get cart count badge.
#[instrument(skip(session))]
pub async fn count(session: Session) -> Result<Json<CartCount>> {
    let cart = load_cart(&session).await?;
    Ok(Json(CartCount {
        count: cart.item_count(),
    }))
}

/// Add item to cart.
///
/// Price, customization fee and stock ceiling come from the catalog. A
/// request clamped to zero by stock still succeeds; the advisory explains
/// why nothing was added.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<AddToCartRequest>,
) -> Result<Json<CartResponse>> {
    check_customization(request.customization.as_ref())?;

    let product = state
        .catalog()
        .get(request.product_id)
        .ok_or_else(|| AppError::NotFound(format!("product {}", request.product_id)))?;
    let candidate = product.cart_line(request.customization)?;

    let mut cart = load_cart(&session).await?;
    let outcome = cart.add_item(candidate, request.quantity.unwrap_or(1));
    tracing::info!(product_id = %request.product_id, added = outcome.added(), "Add to cart");

    Ok(Json(save_cart(&session, cart).await?))
}

/// Update cart line quantity.
#[instrument(skip(session))]
pub async fn update(
    session: Session,
    Json(request): Json<UpdateCartRequest>,
) -> Result<Json<CartResponse>> {
    let mut cart = load_cart(&session).await?;
    cart.update_quantity(request.line_id, request.quantity);
    Ok(Json(save_cart(&session, cart).await?))
}

/// Remove line from cart.
#[instrument(skip(session))]
pub async fn remove(
    session: Session,
    Json(request): Json<RemoveFromCartRequest>,
) -> Result<Json<CartResponse>> {
    let mut cart = load_cart(&session).await?;
    cart.remove_item(request.line_id);
    Ok(Json(save_cart(&session, cart).await?))
}

/// Empty the cart.
#[instrument(skip(session))]
pub async fn clear(session: Session) -> Result<Json<CartResponse>> {
    let mut cart = load_cart(&session).await?;
    cart.clear_cart();
    Ok(Json(save_cart(&session, cart).await?))
}

#[cfg(test)]
#[allow(clippy::indexing_slicing)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use shapeshop_core::NewCartLine;

    #[test]
    fn test_cart_view_formats_prices() {
        let mut cart = CartStore::load(MemoryStorage::new(), RecordingNotifier::new());
        cart.add_item(
            NewCartLine::customized(
                ProductId::new(1),
                Decimal::new(2000, 2),
                Decimal::new(450, 2),
                serde_json::json!({"text": "hi"}),
            ),
            2,
        );

        let view = CartView::from(&cart);
        assert_eq!(view.item_count, 2);
        assert_eq!(view.subtotal, "$49.00");
        assert_eq!(view.items[0].price, "$24.50");
        assert_eq!(view.items[0].line_price, "$49.00");
        assert!(view.items[0].customized);
    }

    #[test]
    fn test_empty_cart_view() {
        let cart = CartStore::load(MemoryStorage::new(), RecordingNotifier::new());
        let view = CartView::from(&cart);
        assert!(view.items.is_empty());
        assert_eq!(view.subtotal, "$0.00");
        assert_eq!(view.item_count, 0);
    }

    #[test]
    fn test_customization_must_be_object() {
        assert!(check_customization(None).is_ok());
        assert!(check_customization(Some(&serde_json::json!({"text": "hi"}))).is_ok());
        assert!(matches!(
            check_customization(Some(&serde_json::json!("red"))),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            check_customization(Some(&serde_json::json!([1, 2]))),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn test_advisory_view_serializes_flat() {
        let advisory = StockAdvisory {
            product_id: ProductId::new(3),
            ceiling: 5,
            in_cart: 3,
            requested: 4,
            allowed: 2,
        };
        let value = serde_json::to_value(AdvisoryView::from(&advisory)).unwrap_or_default();
        assert_eq!(value["allowed"], 2);
        assert_eq!(value["product_id"], 3);
        assert!(value["message"].as_str().unwrap_or_default().contains("adjusted to 2"));
    }
}
