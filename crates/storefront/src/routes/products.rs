//! Product route handlers.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;
use shapeshop_core::{Price, ProductId};
use tracing::instrument;

use crate::catalog::Product;
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Product display data.
#[derive(Debug, Clone, Serialize)]
pub struct ProductView {
    pub id: ProductId,
    pub handle: String,
    pub title: String,
    pub description: String,
    pub price: String,
    pub customizable: bool,
    pub customization_price: Option<String>,
    pub stock: Option<u32>,
}

impl From<&Product> for ProductView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            handle: product.handle.clone(),
            title: product.title.clone(),
            description: product.description.clone(),
            price: Price::from_amount(product.price).display(),
            customizable: product.customizable,
            customization_price: product
                .customizable
                .then(|| Price::from_amount(product.customization_price).display()),
            stock: product.stock,
        }
    }
}

/// Product listing.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Json<Vec<ProductView>> {
    Json(
        state
            .catalog()
            .products()
            .iter()
            .map(ProductView::from)
            .collect(),
    )
}

/// Product detail.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<ProductView>> {
    state
        .catalog()
        .get(id)
        .map(|product| Json(ProductView::from(product)))
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))
}
