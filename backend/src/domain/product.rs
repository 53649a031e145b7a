//! Product aggregate: catalogue entries with price and tax rate.
//!
//! Monetary values are `rust_decimal::Decimal` with two-fractional-digit
//! semantics; binary floats never enter the domain.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Default tax rate applied when a product is created without one (15.00%).
pub const DEFAULT_TAX_RATE: Decimal = Decimal::from_parts(1500, 0, 0, false, 2);

/// Store-assigned product identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(i32);

impl ProductId {
    /// Wrap a raw store identifier.
    pub fn new(raw: i32) -> Self {
        Self(raw)
    }

    /// Raw integer value for persistence and wire payloads.
    pub fn as_i32(self) -> i32 {
        self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validation errors for product drafts and patches.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProductValidationError {
    /// Name was missing or blank once trimmed.
    #[error("product name must not be empty")]
    EmptyName,
    /// Unit price below zero.
    #[error("unit price must not be negative")]
    NegativeUnitPrice,
    /// Tax rate below zero.
    #[error("tax rate must not be negative")]
    NegativeTaxRate,
}

/// A persisted product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    id: ProductId,
    name: String,
    unit_price: Decimal,
    tax_rate: Decimal,
    active: bool,
}

impl Product {
    /// Rehydrate a product from stored fields without re-validation.
    pub fn from_parts(
        id: ProductId,
        name: String,
        unit_price: Decimal,
        tax_rate: Decimal,
        active: bool,
    ) -> Self {
        Self {
            id,
            name,
            unit_price,
            tax_rate,
            active,
        }
    }

    /// Store-assigned identifier.
    pub fn id(&self) -> ProductId {
        self.id
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sale price per unit.
    pub fn unit_price(&self) -> Decimal {
        self.unit_price
    }

    /// Tax rate as a percentage (e.g. `15.00`).
    pub fn tax_rate(&self) -> Decimal {
        self.tax_rate
    }

    /// Whether the product is offered for new invoice lines. Presentation
    /// layers filter on this; the store itself does not enforce it.
    pub fn active(&self) -> bool {
        self.active
    }

    /// Merge a partial update, keeping absent fields.
    pub fn apply(&self, patch: ProductPatch) -> Result<Self, ProductValidationError> {
        let draft = NewProduct::new(
            patch.name.unwrap_or_else(|| self.name.clone()),
            patch.unit_price.unwrap_or(self.unit_price),
            Some(patch.tax_rate.unwrap_or(self.tax_rate)),
            patch.active.unwrap_or(self.active),
        )?;
        Ok(Self {
            id: self.id,
            name: draft.name,
            unit_price: draft.unit_price,
            tax_rate: draft.tax_rate,
            active: draft.active,
        })
    }
}

/// Validated input for creating a product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub(crate) name: String,
    pub(crate) unit_price: Decimal,
    pub(crate) tax_rate: Decimal,
    pub(crate) active: bool,
}

impl NewProduct {
    /// Validate raw create input. A missing tax rate defaults to
    /// [`DEFAULT_TAX_RATE`].
    ///
    /// # Examples
    /// ```
    /// use backend::domain::{NewProduct, DEFAULT_TAX_RATE};
    /// use rust_decimal::Decimal;
    ///
    /// let draft = NewProduct::new("Widget", Decimal::new(1000, 2), None, true).unwrap();
    /// assert_eq!(draft.tax_rate(), DEFAULT_TAX_RATE);
    /// ```
    pub fn new(
        name: impl Into<String>,
        unit_price: Decimal,
        tax_rate: Option<Decimal>,
        active: bool,
    ) -> Result<Self, ProductValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ProductValidationError::EmptyName);
        }
        if unit_price < Decimal::ZERO {
            return Err(ProductValidationError::NegativeUnitPrice);
        }
        let tax_rate = tax_rate.unwrap_or(DEFAULT_TAX_RATE);
        if tax_rate < Decimal::ZERO {
            return Err(ProductValidationError::NegativeTaxRate);
        }
        Ok(Self {
            name,
            unit_price,
            tax_rate,
            active,
        })
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sale price per unit.
    pub fn unit_price(&self) -> Decimal {
        self.unit_price
    }

    /// Tax rate percentage.
    pub fn tax_rate(&self) -> Decimal {
        self.tax_rate
    }

    /// Whether the product starts active.
    pub fn active(&self) -> bool {
        self.active
    }
}

/// Partial update for a product. `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub unit_price: Option<Decimal>,
    pub tax_rate: Option<Decimal>,
    pub active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn widget() -> Product {
        Product::from_parts(
            ProductId::new(1),
            "Widget".into(),
            dec!(9.99),
            dec!(15.00),
            true,
        )
    }

    #[rstest]
    fn default_tax_rate_is_fifteen_percent() {
        assert_eq!(DEFAULT_TAX_RATE, dec!(15.00));
        let draft = NewProduct::new("Widget", dec!(1.00), None, true).expect("valid draft");
        assert_eq!(draft.tax_rate(), dec!(15.00));
    }

    #[rstest]
    #[case("", dec!(1.00), None, ProductValidationError::EmptyName)]
    #[case("Widget", dec!(-0.01), None, ProductValidationError::NegativeUnitPrice)]
    #[case("Widget", dec!(1.00), Some(dec!(-1.00)), ProductValidationError::NegativeTaxRate)]
    fn new_product_rejects_invalid_input(
        #[case] name: &str,
        #[case] price: Decimal,
        #[case] tax: Option<Decimal>,
        #[case] expected: ProductValidationError,
    ) {
        let err = NewProduct::new(name, price, tax, true).expect_err("invalid input must fail");
        assert_eq!(err, expected);
    }

    #[rstest]
    fn zero_price_and_zero_tax_are_allowed() {
        let draft = NewProduct::new("Sample", Decimal::ZERO, Some(Decimal::ZERO), false)
            .expect("zero values are valid");
        assert_eq!(draft.unit_price(), Decimal::ZERO);
        assert_eq!(draft.tax_rate(), Decimal::ZERO);
    }

    #[rstest]
    fn patch_keeps_absent_fields() {
        let updated = widget()
            .apply(ProductPatch {
                unit_price: Some(dec!(12.50)),
                ..ProductPatch::default()
            })
            .expect("valid patch");
        assert_eq!(updated.name(), "Widget");
        assert_eq!(updated.unit_price(), dec!(12.50));
        assert_eq!(updated.tax_rate(), dec!(15.00));
    }

    #[rstest]
    fn patch_rejects_negative_price() {
        let err = widget()
            .apply(ProductPatch {
                unit_price: Some(dec!(-1.00)),
                ..ProductPatch::default()
            })
            .expect_err("negative price must fail");
        assert_eq!(err, ProductValidationError::NegativeUnitPrice);
    }
}
