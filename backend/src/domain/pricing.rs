//! Invoice computation engine.
//!
//! Pure and deterministic: the same arithmetic runs for cart building, for
//! the transactional line-set replace, and for reporting, so client-visible
//! and audited totals can never diverge. The engine owns no state and never
//! mutates product records.
//!
//! Rounding happens only at the boundary: per-line subtotal and tax are each
//! rounded to two decimals half-away-from-zero, the line total is their sum,
//! and the invoice total is the rounded sum of line totals.

use rust_decimal::{Decimal, RoundingStrategy};

use super::error::Error;
use super::product::{Product, ProductId};

/// Two-decimal rounding, half away from zero (`4.4955` → `4.50`).
///
/// The result always carries scale 2 so serialized amounts keep their
/// trailing zeros (`0` renders as `0.00`).
pub fn round2(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}

/// Pricing snapshot of a product at the moment it enters a cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductSnapshot {
    pub product_id: ProductId,
    pub unit_price: Decimal,
    pub tax_rate: Decimal,
}

impl From<&Product> for ProductSnapshot {
    fn from(product: &Product) -> Self {
        Self {
            product_id: product.id(),
            unit_price: product.unit_price(),
            tax_rate: product.tax_rate(),
        }
    }
}

/// Derived amounts for a single line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineTotals {
    /// `round2(unit_price * quantity)`.
    pub subtotal: Decimal,
    /// `round2(subtotal * tax_rate / 100)`.
    pub tax: Decimal,
    /// `subtotal + tax`.
    pub total: Decimal,
}

/// Compute the derived amounts for one line.
///
/// # Examples
/// ```
/// use backend::domain::pricing::line_totals;
/// use rust_decimal::Decimal;
///
/// let totals = line_totals(Decimal::new(999, 2), Decimal::new(1500, 2), 3);
/// assert_eq!(totals.subtotal, Decimal::new(2997, 2));
/// assert_eq!(totals.tax, Decimal::new(450, 2));
/// assert_eq!(totals.total, Decimal::new(3447, 2));
/// ```
pub fn line_totals(unit_price: Decimal, tax_rate: Decimal, quantity: i32) -> LineTotals {
    let subtotal = round2(unit_price * Decimal::from(quantity));
    let tax = round2(subtotal * tax_rate / Decimal::ONE_HUNDRED);
    LineTotals {
        subtotal,
        tax,
        total: subtotal + tax,
    }
}

/// Sum already-derived line totals into the invoice grand total.
pub fn invoice_total<I>(line_totals: I) -> Decimal
where
    I: IntoIterator<Item = LineTotals>,
{
    round2(line_totals.into_iter().map(|t| t.total).sum())
}

/// One accumulated cart line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    product_id: ProductId,
    quantity: i32,
    unit_price: Decimal,
    tax_rate: Decimal,
}

impl CartLine {
    /// Product this line refers to.
    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    /// Accumulated quantity.
    pub fn quantity(&self) -> i32 {
        self.quantity
    }

    /// Unit price snapshotted on the first add.
    pub fn unit_price(&self) -> Decimal {
        self.unit_price
    }

    /// Tax rate snapshotted on the first add.
    pub fn tax_rate(&self) -> Decimal {
        self.tax_rate
    }

    /// Derived amounts for this line.
    pub fn totals(&self) -> LineTotals {
        line_totals(self.unit_price, self.tax_rate, self.quantity)
    }
}

/// Ordered accumulation of `(product, quantity)` add requests.
///
/// Adding a product already present merges additively: the quantity grows
/// and the price/tax snapshot from the first add is kept. Lines keep first-add
/// order, matching how the checkout UI lists them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Empty cart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `quantity` units of the snapshotted product, merging on repeat.
    ///
    /// # Errors
    ///
    /// Rejects non-positive quantities with a validation error, and a merge
    /// whose accumulated quantity would overflow `i32`.
    pub fn add(&mut self, snapshot: &ProductSnapshot, quantity: i32) -> Result<(), Error> {
        if quantity <= 0 {
            return Err(Error::invalid_request("quantity must be at least 1"));
        }
        if let Some(line) = self
            .lines
            .iter_mut()
            .find(|line| line.product_id == snapshot.product_id)
        {
            line.quantity = line
                .quantity
                .checked_add(quantity)
                .ok_or_else(|| Error::invalid_request("quantity too large"))?;
        } else {
            self.lines.push(CartLine {
                product_id: snapshot.product_id,
                quantity,
                unit_price: snapshot.unit_price,
                tax_rate: snapshot.tax_rate,
            });
        }
        Ok(())
    }

    /// Drop the line for the given product entirely. Returns whether a line
    /// was present. Partial-quantity removal is not an engine operation.
    pub fn remove(&mut self, product_id: ProductId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|line| line.product_id != product_id);
        self.lines.len() != before
    }

    /// Accumulated lines in first-add order.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Grand total across all lines.
    pub fn total(&self) -> Decimal {
        invoice_total(self.lines.iter().map(CartLine::totals))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn snapshot(id: i32, price: Decimal, tax: Decimal) -> ProductSnapshot {
        ProductSnapshot {
            product_id: ProductId::new(id),
            unit_price: price,
            tax_rate: tax,
        }
    }

    #[rstest]
    #[case(dec!(4.4955), dec!(4.50))]
    #[case(dec!(4.4949), dec!(4.49))]
    #[case(dec!(-4.4955), dec!(-4.50))]
    #[case(dec!(2.40), dec!(2.40))]
    fn round2_is_half_away_from_zero(#[case] input: Decimal, #[case] expected: Decimal) {
        assert_eq!(round2(input), expected);
    }

    #[rstest]
    fn line_totals_match_reference_vector() {
        // 9.99 at 15.00% tax, quantity 3.
        let totals = line_totals(dec!(9.99), dec!(15.00), 3);
        assert_eq!(totals.subtotal, dec!(29.97));
        assert_eq!(totals.tax, dec!(4.50));
        assert_eq!(totals.total, dec!(34.47));
    }

    #[rstest]
    fn invoice_total_sums_line_totals() {
        let line = line_totals(dec!(9.99), dec!(15.00), 3);
        assert_eq!(invoice_total([line, line]), dec!(68.94));
    }

    #[rstest]
    fn widget_scenario_line_total() {
        // Widget at 10.00 with 12.00% tax, quantity 2: 20.00 + 2.40 tax.
        let totals = line_totals(dec!(10.00), dec!(12.00), 2);
        assert_eq!(totals.subtotal, dec!(20.00));
        assert_eq!(totals.tax, dec!(2.40));
        assert_eq!(totals.total, dec!(22.40));
    }

    #[rstest]
    fn add_merges_duplicate_products_additively() {
        let mut cart = Cart::new();
        cart.add(&snapshot(1, dec!(9.99), dec!(15.00)), 2)
            .expect("first add");
        // Second add carries a drifted price; the first-add snapshot wins.
        cart.add(&snapshot(1, dec!(11.50), dec!(15.00)), 3)
            .expect("merge add");

        assert_eq!(cart.lines().len(), 1);
        let line = &cart.lines()[0];
        assert_eq!(line.quantity(), 5);
        assert_eq!(line.unit_price(), dec!(9.99));
    }

    #[rstest]
    #[case(0)]
    #[case(-3)]
    fn add_rejects_non_positive_quantity(#[case] quantity: i32) {
        let mut cart = Cart::new();
        let err = cart
            .add(&snapshot(1, dec!(1.00), dec!(15.00)), quantity)
            .expect_err("non-positive quantity must fail");
        assert_eq!(err.code(), crate::domain::ErrorCode::InvalidRequest);
    }

    #[rstest]
    fn merge_rejects_quantity_overflow() {
        let mut cart = Cart::new();
        cart.add(&snapshot(1, dec!(1.00), dec!(15.00)), i32::MAX)
            .expect("first add");
        let err = cart
            .add(&snapshot(1, dec!(1.00), dec!(15.00)), 2)
            .expect_err("overflowing merge must fail");
        assert_eq!(err.code(), crate::domain::ErrorCode::InvalidRequest);
        assert_eq!(err.message(), "quantity too large");
        // The stored line is untouched by the failed merge.
        assert_eq!(cart.lines()[0].quantity(), i32::MAX);
    }

    #[rstest]
    fn remove_drops_the_whole_line() {
        let mut cart = Cart::new();
        cart.add(&snapshot(1, dec!(1.00), dec!(15.00)), 4)
            .expect("add");
        assert!(cart.remove(ProductId::new(1)));
        assert!(cart.lines().is_empty());
        assert!(!cart.remove(ProductId::new(1)));
    }

    #[rstest]
    fn lines_keep_first_add_order() {
        let mut cart = Cart::new();
        cart.add(&snapshot(2, dec!(1.00), dec!(0.00)), 1).expect("add");
        cart.add(&snapshot(1, dec!(1.00), dec!(0.00)), 1).expect("add");
        cart.add(&snapshot(2, dec!(1.00), dec!(0.00)), 1).expect("add");

        let order: Vec<i32> = cart.lines().iter().map(|l| l.product_id().as_i32()).collect();
        assert_eq!(order, vec![2, 1]);
    }

    #[rstest]
    fn cart_total_covers_mixed_lines() {
        let mut cart = Cart::new();
        cart.add(&snapshot(1, dec!(9.99), dec!(15.00)), 3).expect("add");
        cart.add(&snapshot(2, dec!(10.00), dec!(12.00)), 2).expect("add");
        assert_eq!(cart.total(), dec!(34.47) + dec!(22.40));
    }
}
