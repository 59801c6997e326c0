//! Discount Summary
//!
//! The derived result of one calculation pass, and its rendered form.

use std::io;

use rust_decimal::{Decimal, RoundingStrategy};
use rustc_hash::FxHashMap;
use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;
use tabled::{
    builder::Builder,
    grid::config::HorizontalLine,
    settings::{
        Alignment, Color, Style, Theme,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{
    coupons::{CouponCode, CouponKey, Discount},
    stores::StoreId,
};

/// Errors that can occur when rendering a summary.
#[derive(Debug, Error)]
pub enum SummaryError {
    /// IO error
    #[error("IO error")]
    IO,
}

/// One coupon's contribution to the summary.
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedDiscount {
    /// Canonical coupon code.
    pub code: CouponCode,

    /// Catalog entry the contribution came from.
    pub coupon: CouponKey,

    /// Amount this coupon took off the cart, unrounded.
    pub amount: Decimal,

    /// Discount configuration that produced the amount.
    pub discount: Discount,

    /// Store scope in effect, from the apply-time snapshot.
    pub applicable_stores: Vec<String>,
}

/// The derived discount summary for one cart.
///
/// A summary is replaced wholesale on every recompute, never edited in
/// place. Contributions are ordered the way they discounted: descending
/// priority, application order on ties.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiscountSummary {
    total_discount: Decimal,
    coupons_used: usize,
    store_breakdown: FxHashMap<StoreId, Decimal>,
    applied: SmallVec<[AppliedDiscount; 4]>,
}

impl DiscountSummary {
    /// Fold per-coupon contributions into the published summary.
    ///
    /// This is the one place rounding happens: the published total is
    /// rounded to two decimal places, midpoint away from zero, and capped at
    /// the cart total. Per-coupon amounts and the store breakdown stay
    /// unrounded.
    #[must_use]
    pub fn aggregate(
        applied: SmallVec<[AppliedDiscount; 4]>,
        store_breakdown: FxHashMap<StoreId, Decimal>,
        cart_total: Decimal,
    ) -> Self {
        let raw_total: Decimal = applied.iter().map(|entry| entry.amount).sum();
        let total_discount = raw_total
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
            .min(cart_total);

        Self {
            total_discount,
            coupons_used: applied.len(),
            store_breakdown,
            applied,
        }
    }

    /// The total discount across all contributing coupons.
    #[must_use]
    pub fn total_discount(&self) -> Decimal {
        self.total_discount
    }

    /// How many coupons contributed a non-zero amount.
    #[must_use]
    pub fn coupons_used(&self) -> usize {
        self.coupons_used
    }

    /// Discount attributed to each store.
    #[must_use]
    pub fn store_breakdown(&self) -> &FxHashMap<StoreId, Decimal> {
        &self.store_breakdown
    }

    /// The per-coupon contributions, in the order they discounted.
    #[must_use]
    pub fn applied(&self) -> &[AppliedDiscount] {
        &self.applied
    }

    /// Render the summary: a table of contributions followed by the
    /// per-store attribution and the total.
    ///
    /// Amounts are formatted in `currency` for display only; the stored
    /// values stay unrounded.
    ///
    /// # Errors
    ///
    /// Returns [`SummaryError::IO`] if writing to `out` fails.
    pub fn write_to(
        &self,
        out: &mut impl io::Write,
        currency: &'static Currency,
    ) -> Result<(), SummaryError> {
        let mut builder = Builder::default();
        builder.push_record(["Coupon", "Discount", "Stores", "Amount"]);

        for entry in &self.applied {
            builder.push_record([
                entry.code.to_string(),
                discount_label(entry.discount, currency),
                stores_label(&entry.applicable_stores),
                format!("-{}", format_amount(entry.amount, currency)),
            ]);
        }

        let mut table = builder.build();

        let mut theme = Theme::from(Style::modern_rounded());
        let separator = HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤'));
        theme.remove_horizontal_lines();
        theme.insert_horizontal_line(1, separator);

        table.with(theme);
        table.modify(Rows::first(), Color::BOLD);
        table.modify(Columns::new(3..4), Alignment::right());

        writeln!(out, "{table}").map_err(|_err| SummaryError::IO)?;

        self.write_breakdown(out, currency)
    }

    /// Write the per-store attribution lines and the total, aligned to a
    /// shared label column. Stores are sorted for stable output.
    fn write_breakdown(
        &self,
        out: &mut impl io::Write,
        currency: &'static Currency,
    ) -> Result<(), SummaryError> {
        let mut stores: Vec<(&StoreId, &Decimal)> = self.store_breakdown.iter().collect();
        stores.sort_by(|a, b| a.0.as_str().cmp(b.0.as_str()));

        let mut lines: Vec<(String, String)> = stores
            .into_iter()
            .map(|(store, amount)| (format!("{store}:"), format_amount(*amount, currency)))
            .collect();

        lines.push((
            "Total discount:".to_string(),
            format_amount(self.total_discount, currency),
        ));

        let label_width = lines
            .iter()
            .map(|(label, _)| label.chars().count())
            .max()
            .unwrap_or(0);
        let amount_width = lines
            .iter()
            .map(|(_, amount)| amount.chars().count())
            .max()
            .unwrap_or(0);

        for (label, amount) in &lines {
            writeln!(out, " {label:<label_width$} {amount:>amount_width$}")
                .map_err(|_err| SummaryError::IO)?;
        }

        Ok(())
    }
}

/// Format an amount in the given currency, rounded for display to the
/// currency's exponent.
fn format_amount(amount: Decimal, currency: &'static Currency) -> String {
    let rounded =
        amount.round_dp_with_strategy(currency.exponent, RoundingStrategy::MidpointAwayFromZero);

    Money::from_decimal(rounded, currency).to_string()
}

/// Human-readable discount configuration, e.g. `15% off` or `$5.00 off`.
fn discount_label(discount: Discount, currency: &'static Currency) -> String {
    match discount {
        Discount::Percentage(fraction) => {
            let points = (fraction * Decimal::ONE) * Decimal::ONE_HUNDRED;
            format!("{}% off", points.normalize())
        }
        Discount::Fixed(amount) => format!("{} off", format_amount(amount, currency)),
    }
}

/// The store-scope column: restriction entries one per line, or `all stores`
/// for unrestricted coupons.
fn stores_label(stores: &[String]) -> String {
    if stores.is_empty() {
        "all stores".to_string()
    } else {
        stores.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use decimal_percentage::Percentage;
    use rusty_money::iso;
    use slotmap::Key;
    use smallvec::smallvec;
    use testresult::TestResult;

    use super::*;

    fn entry(code: &str, amount: Decimal, discount: Discount) -> AppliedDiscount {
        AppliedDiscount {
            code: CouponCode::new(code),
            coupon: CouponKey::null(),
            amount,
            discount,
            applicable_stores: Vec::new(),
        }
    }

    #[test]
    fn aggregate_rounds_the_total_and_counts_contributions() {
        let applied = smallvec![
            entry(
                "THIRD",
                Decimal::new(33330, 4),
                Discount::Percentage(Percentage::from(0.3333)),
            ),
            entry("FIVER", Decimal::from(5), Discount::Fixed(Decimal::from(5))),
        ];

        let summary = DiscountSummary::aggregate(applied, FxHashMap::default(), Decimal::from(100));

        assert_eq!(summary.total_discount(), Decimal::new(833, 2));
        assert_eq!(summary.coupons_used(), 2);
    }

    #[test]
    fn aggregate_caps_the_total_at_the_cart_total() {
        let applied = smallvec![entry(
            "BIG",
            Decimal::new(100_005, 3),
            Discount::Fixed(Decimal::from(100)),
        )];

        let summary = DiscountSummary::aggregate(applied, FxHashMap::default(), Decimal::from(100));

        // 100.005 rounds up to 100.01, then the cap brings it back.
        assert_eq!(summary.total_discount(), Decimal::from(100));
    }

    #[test]
    fn empty_summary_renders_without_contributions() -> TestResult {
        let summary = DiscountSummary::default();

        let mut output = Vec::new();
        summary.write_to(&mut output, iso::USD)?;
        let rendered = String::from_utf8(output)?;

        assert!(rendered.contains("Coupon"), "header row is always present");
        assert!(rendered.contains("Total discount:"));
        assert!(rendered.contains("$0.00"));

        Ok(())
    }

    #[test]
    fn write_to_renders_contributions_and_breakdown() -> TestResult {
        let mut scoped = entry(
            "COFFEE5",
            Decimal::new(500, 2),
            Discount::Fixed(Decimal::new(500, 2)),
        );
        scoped.applicable_stores = vec!["shop.hartley.coffee".to_string()];

        let applied = smallvec![
            entry(
                "WELCOME10",
                Decimal::new(1240, 2),
                Discount::Percentage(Percentage::from(0.10)),
            ),
            scoped,
        ];

        let mut store_breakdown = FxHashMap::default();
        store_breakdown.insert(StoreId::new("brightmart"), Decimal::new(450, 2));
        store_breakdown.insert(StoreId::new("shop.hartley.coffee"), Decimal::new(1290, 2));

        let summary = DiscountSummary::aggregate(applied, store_breakdown, Decimal::from(124));

        let mut output = Vec::new();
        summary.write_to(&mut output, iso::USD)?;
        let rendered = String::from_utf8(output)?;

        assert!(rendered.contains("WELCOME10"));
        assert!(rendered.contains("10% off"));
        assert!(rendered.contains("all stores"));
        assert!(rendered.contains("$5.00 off"));
        assert!(rendered.contains("-$12.40"));
        assert!(rendered.contains("brightmart:"));
        assert!(rendered.contains("$12.90"));
        assert!(rendered.contains("Total discount:"));
        assert!(rendered.contains("$17.40"));

        Ok(())
    }

    #[test]
    fn percentage_labels_drop_trailing_zeros() {
        let label = discount_label(Discount::Percentage(Percentage::from(0.10)), iso::USD);

        assert_eq!(label, "10% off");
    }
}
