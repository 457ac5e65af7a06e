//! Advisory risk scoring for reconciliation discrepancies.
//!
//! Every weight here is a heuristic for ordering the worklist, not a
//! statutory formula — tune via [`RiskConfig`], never treat a score as a
//! compliance determination.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::recon::matching::ReconciliationResult;

/// Weights for the risk formula
/// `clamp(value_gap_weight * gap + category_weight * category + age_weight * age, 0, 1)`.
///
/// The three top-level weights should sum to 1 for the clamp to be a
/// formality rather than a cap; this is not enforced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskConfig {
    pub value_gap_weight: Decimal,
    pub category_weight: Decimal,
    pub age_weight: Decimal,
    /// Per-category severity, each in [0, 1].
    pub not_in_2a_severity: Decimal,
    pub mismatch_value_severity: Decimal,
    pub mismatch_tax_severity: Decimal,
    pub not_in_books_severity: Decimal,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            value_gap_weight: dec!(0.5),
            category_weight: dec!(0.3),
            age_weight: dec!(0.2),
            // Outright credit denial outranks a correctable value gap.
            not_in_2a_severity: dec!(1.0),
            mismatch_value_severity: dec!(0.6),
            mismatch_tax_severity: dec!(0.4),
            not_in_books_severity: dec!(0.3),
        }
    }
}

/// Discrepancy category, ordered by default severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskCategory {
    #[serde(rename = "not_in_2a")]
    NotIn2a,
    MismatchValue,
    MismatchTax,
    NotInBooks,
}

impl std::fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RiskCategory::NotIn2a => "not_in_2a",
            RiskCategory::MismatchValue => "mismatch_value",
            RiskCategory::MismatchTax => "mismatch_tax",
            RiskCategory::NotInBooks => "not_in_books",
        };
        f.write_str(s)
    }
}

/// One scored discrepancy. `score` is in [0, 1]; higher means act sooner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskItem {
    pub category: RiskCategory,
    pub gstin: Option<String>,
    pub invoice_number: String,
    /// Taxable value per own books (zero for `not_in_books`).
    pub book_value: Decimal,
    /// Taxable value per the external record, where one exists.
    pub external_value: Option<Decimal>,
    /// Tax amount riding on this discrepancy.
    pub tax_exposure: Decimal,
    pub score: Decimal,
}

/// Score every non-matched entry of a reconciliation run.
///
/// Pure function of the result, the scoring date, and the config; output is
/// sorted by descending score, then invoice number, for a stable worklist.
pub fn score_result(
    result: &ReconciliationResult,
    as_of: NaiveDate,
    cfg: &RiskConfig,
) -> Vec<RiskItem> {
    let age = age_factor(result.period, as_of);
    let mut items = Vec::new();

    for e in &result.not_in_2a {
        items.push(item(
            cfg,
            RiskCategory::NotIn2a,
            cfg.not_in_2a_severity,
            age,
            e.gstin.clone(),
            e.invoice_number.clone(),
            e.taxable_value,
            None,
            e.itc_at_risk.total(),
        ));
    }
    for e in &result.mismatch_value {
        items.push(item(
            cfg,
            RiskCategory::MismatchValue,
            cfg.mismatch_value_severity,
            age,
            Some(e.gstin.clone()),
            e.invoice_number.clone(),
            e.taxable_value,
            Some(e.external_taxable_value),
            e.tax.total(),
        ));
    }
    for e in &result.mismatch_tax {
        items.push(item(
            cfg,
            RiskCategory::MismatchTax,
            cfg.mismatch_tax_severity,
            age,
            Some(e.gstin.clone()),
            e.invoice_number.clone(),
            e.taxable_value,
            Some(e.external_taxable_value),
            (e.tax.total() - e.external_tax.total()).abs(),
        ));
    }
    for e in &result.not_in_books {
        items.push(item(
            cfg,
            RiskCategory::NotInBooks,
            cfg.not_in_books_severity,
            age,
            Some(e.gstin.clone()),
            e.invoice_number.clone(),
            Decimal::ZERO,
            Some(e.taxable_value),
            e.tax.total(),
        ));
    }

    items.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| a.invoice_number.cmp(&b.invoice_number))
    });
    items
}

#[allow(clippy::too_many_arguments)]
fn item(
    cfg: &RiskConfig,
    category: RiskCategory,
    severity: Decimal,
    age: Decimal,
    gstin: Option<String>,
    invoice_number: String,
    book_value: Decimal,
    external_value: Option<Decimal>,
    tax_exposure: Decimal,
) -> RiskItem {
    let gap = relative_value_gap(book_value, external_value.unwrap_or(Decimal::ZERO));
    let raw = cfg.value_gap_weight * gap + cfg.category_weight * severity + cfg.age_weight * age;
    RiskItem {
        category,
        gstin,
        invoice_number,
        book_value,
        external_value,
        tax_exposure,
        score: raw.clamp(Decimal::ZERO, Decimal::ONE).round_dp(4),
    }
}

/// `|book - external| / max(book, external, 1)`. The floor of 1 keeps tiny
/// invoices from producing divide-by-near-zero spikes.
fn relative_value_gap(book: Decimal, external: Decimal) -> Decimal {
    (book - external).abs() / book.max(external).max(Decimal::ONE)
}

/// Urgency in [0, 1]: 0 at period end, 1 once the ITC claim deadline for the
/// period's financial year has arrived or passed.
fn age_factor(period: crate::core::Period, as_of: NaiveDate) -> Decimal {
    let start = period.last_day();
    let deadline = period.itc_claim_deadline();
    if as_of <= start {
        return Decimal::ZERO;
    }
    if as_of >= deadline {
        return Decimal::ONE;
    }
    let elapsed = Decimal::from((as_of - start).num_days());
    let window = Decimal::from((deadline - start).num_days());
    (elapsed / window).round_dp(4)
}
