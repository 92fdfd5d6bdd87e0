//! Product catalog.
//!
//! The catalog supplies what the cart store cannot know on its own: the
//! price of a product, its customization surcharge, and the stock ceiling
//! pooled across its variants. It is loaded once at startup from a JSON
//! file exported from the product API.

use std::collections::HashMap;
use std::path::Path;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shapeshop_core::{NewCartLine, ProductId};
use thiserror::Error;

/// Errors loading or using the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Duplicate product id in catalog: {0}")]
    DuplicateId(ProductId),

    #[error("Product {0} cannot be customized")]
    NotCustomizable(ProductId),

    #[error("Product {0} has a negative price")]
    NegativePrice(ProductId),
}

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub handle: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    #[serde(default)]
    pub customization_price: Decimal,
    /// Units available across all variants; `None` when unknown.
    #[serde(default)]
    pub stock: Option<u32>,
    #[serde(default)]
    pub customizable: bool,
}

impl Product {
    /// Build the cart line for this product.
    ///
    /// The customization surcharge applies only when `customization` is
    /// given.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotCustomizable` if options are supplied for a
    /// product that does not accept them.
    pub fn cart_line(&self, customization: Option<Value>) -> Result<NewCartLine, CatalogError> {
        let line = match customization {
            Some(options) if self.customizable => NewCartLine::customized(
                self.id,
                self.price,
                self.customization_price,
                options,
            ),
            Some(_) => return Err(CatalogError::NotCustomizable(self.id)),
            None => NewCartLine::plain(self.id, self.price),
        };

        Ok(line
            .with_title(self.title.clone())
            .with_stock_ceiling(self.stock))
    }
}

/// In-memory product catalog.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: Vec<Product>,
    index: HashMap<ProductId, usize>,
}

impl Catalog {
    /// Build a catalog from a list of products.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::DuplicateId` if two products share an ID, or
    /// `CatalogError::NegativePrice` if a price or surcharge is below zero.
    pub fn new(products: Vec<Product>) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(products.len());
        for (position, product) in products.iter().enumerate() {
            if product.price.is_sign_negative() || product.customization_price.is_sign_negative() {
                return Err(CatalogError::NegativePrice(product.id));
            }
            if index.insert(product.id, position).is_some() {
                return Err(CatalogError::DuplicateId(product.id));
            }
        }
        Ok(Self { products, index })
    }

    /// Parse a catalog from a JSON array of products.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is invalid or contains duplicate IDs.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let products: Vec<Product> = serde_json::from_str(json)?;
        Self::new(products)
    }

    /// Load a catalog from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        let json = std::fs::read_to_string(path)?;
        let catalog = Self::from_json(&json)?;
        tracing::info!(path = %path.display(), products = catalog.len(), "Catalog loaded");
        Ok(catalog)
    }

    /// Look up a product by ID.
    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<&Product> {
        self.index.get(&id).and_then(|&i| self.products.get(i))
    }

    /// All products in file order.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Number of products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Whether the catalog has no products.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    const CATALOG: &str = r#"[
        {"id": 1, "handle": "desk-lamp", "title": "Desk Lamp", "price": "25.00",
         "customization_price": "5.00", "stock": 4, "customizable": true},
        {"id": 2, "handle": "planter", "title": "Planter", "price": "12.50"}
    ]"#;

    #[test]
    fn test_parse_catalog() {
        let catalog = Catalog::from_json(CATALOG).unwrap();
        assert_eq!(catalog.len(), 2);

        let planter = catalog.get(ProductId::new(2)).unwrap();
        assert_eq!(planter.stock, None);
        assert!(!planter.customizable);
        assert_eq!(planter.customization_price, Decimal::ZERO);
        assert!(catalog.get(ProductId::new(3)).is_none());
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let json = r#"[
            {"id": 1, "handle": "a", "title": "A", "price": "1"},
            {"id": 1, "handle": "b", "title": "B", "price": "2"}
        ]"#;
        assert!(matches!(
            Catalog::from_json(json),
            Err(CatalogError::DuplicateId(id)) if id == ProductId::new(1)
        ));
    }

    #[test]
    fn test_negative_prices_rejected() {
        let json = r#"[{"id": 7, "handle": "a", "title": "A", "price": "-1.00"}]"#;
        assert!(matches!(
            Catalog::from_json(json),
            Err(CatalogError::NegativePrice(id)) if id == ProductId::new(7)
        ));

        let json = r#"[{"id": 8, "handle": "b", "title": "B", "price": "3.00",
                        "customization_price": "-0.50"}]"#;
        assert!(matches!(
            Catalog::from_json(json),
            Err(CatalogError::NegativePrice(id)) if id == ProductId::new(8)
        ));
    }

    #[test]
    fn test_invalid_json_rejected() {
        assert!(matches!(
            Catalog::from_json("{"),
            Err(CatalogError::Parse(_))
        ));
    }

    #[test]
    fn test_plain_cart_line() {
        let catalog = Catalog::from_json(CATALOG).unwrap();
        let line = catalog.get(ProductId::new(1)).unwrap().cart_line(None).unwrap();
        assert!(!line.is_customized());
        assert_eq!(line.customization_price, Decimal::ZERO);
        assert_eq!(line.stock_ceiling, Some(4));
        assert_eq!(line.title, "Desk Lamp");
    }

    #[test]
    fn test_customized_cart_line() {
        let catalog = Catalog::from_json(CATALOG).unwrap();
        let line = catalog
            .get(ProductId::new(1))
            .unwrap()
            .cart_line(Some(json!({"shade": "linen"})))
            .unwrap();
        assert!(line.is_customized());
        assert_eq!(line.customization_price, Decimal::new(500, 2));
    }

    #[test]
    fn test_customizing_fixed_product_fails() {
        let catalog = Catalog::from_json(CATALOG).unwrap();
        let result = catalog
            .get(ProductId::new(2))
            .unwrap()
            .cart_line(Some(json!({"color": "red"})));
        assert!(matches!(result, Err(CatalogError::NotCustomizable(_))));
    }
}
