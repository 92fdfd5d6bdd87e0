//! Cart line items.
//!
//! A [`CartLine`] is one entry in a cart: a quantity of either the plain
//! product or one specific customization of it. Lines are created from a
//! [`NewCartLine`], which carries everything except the identity and the
//! quantity the cart store settles on.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::customization::CustomizationSignature;
use super::id::{LineId, ProductId};

/// A line item in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// Unique line identifier, minted at insertion.
    pub id: LineId,
    /// Catalog product this line refers to.
    pub product_id: ProductId,
    /// Display title copied from the catalog.
    #[serde(default)]
    pub title: String,
    /// Units of this line (always at least 1).
    pub quantity: u32,
    /// Base price per unit.
    pub unit_price: Decimal,
    /// Customization surcharge per unit (zero for plain lines).
    pub customization_price: Decimal,
    /// Total available stock for the product when the line was created.
    ///
    /// `None` means the stock is unknown and is not enforced.
    pub stock_ceiling: Option<u32>,
    /// Whether this line is a customized variant.
    pub is_customized: bool,
    /// Canonical signature of the chosen options (customized lines only).
    pub customization_signature: Option<CustomizationSignature>,
    /// The chosen options as submitted by the configurator.
    #[serde(default)]
    pub customization: Option<Value>,
    /// When the line was first added.
    pub added_at: DateTime<Utc>,
}

impl CartLine {
    /// Price of a single unit including the customization surcharge.
    #[must_use]
    pub fn unit_total(&self) -> Decimal {
        self.unit_price + self.customization_price
    }

    /// Total for this line: `(unit_price + customization_price) * quantity`.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_total() * Decimal::from(self.quantity)
    }

    /// Whether `candidate` describes the same line and must merge into it.
    ///
    /// Plain lines match on product alone. Customized lines additionally
    /// require identical customization signatures. A plain line never
    /// matches a customized one.
    #[must_use]
    pub fn is_same_line(&self, candidate: &NewCartLine) -> bool {
        if self.product_id != candidate.product_id
            || self.is_customized != candidate.is_customized()
        {
            return false;
        }
        !self.is_customized || self.customization_signature.as_ref() == candidate.signature()
    }
}

/// A cart line before it is placed in a cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCartLine {
    /// Catalog product.
    pub product_id: ProductId,
    /// Display title.
    pub title: String,
    /// Base price per unit.
    pub unit_price: Decimal,
    /// Customization surcharge per unit.
    pub customization_price: Decimal,
    /// Stock available for the product, if known.
    pub stock_ceiling: Option<u32>,
    customization: Option<(CustomizationSignature, Value)>,
}

impl NewCartLine {
    /// A plain (non-customized) line.
    #[must_use]
    pub const fn plain(product_id: ProductId, unit_price: Decimal) -> Self {
        Self {
            product_id,
            title: String::new(),
            unit_price,
            customization_price: Decimal::ZERO,
            stock_ceiling: None,
            customization: None,
        }
    }

    /// A customized line; the signature is derived from `options`.
    #[must_use]
    pub fn customized(
        product_id: ProductId,
        unit_price: Decimal,
        customization_price: Decimal,
        options: Value,
    ) -> Self {
        let signature = CustomizationSignature::from_options(&options);
        Self {
            product_id,
            title: String::new(),
            unit_price,
            customization_price,
            stock_ceiling: None,
            customization: Some((signature, options)),
        }
    }

    /// Set the display title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the product's stock ceiling.
    #[must_use]
    pub const fn with_stock_ceiling(mut self, stock_ceiling: Option<u32>) -> Self {
        self.stock_ceiling = stock_ceiling;
        self
    }

    /// Whether this is a customized variant.
    #[must_use]
    pub const fn is_customized(&self) -> bool {
        self.customization.is_some()
    }

    /// Signature of the chosen options, if customized.
    #[must_use]
    pub fn signature(&self) -> Option<&CustomizationSignature> {
        self.customization.as_ref().map(|(signature, _)| signature)
    }

    /// Materialize a cart line with a fresh ID.
    #[must_use]
    pub fn into_line(self, quantity: u32) -> CartLine {
        let is_customized = self.is_customized();
        let (customization_signature, customization) = match self.customization {
            Some((signature, options)) => (Some(signature), Some(options)),
            None => (None, None),
        };

        CartLine {
            id: LineId::generate(),
            product_id: self.product_id,
            title: self.title,
            quantity,
            unit_price: self.unit_price,
            customization_price: self.customization_price,
            stock_ceiling: self.stock_ceiling,
            is_customized,
            customization_signature,
            customization,
            added_at: Utc::now(),
        }
    }
}
