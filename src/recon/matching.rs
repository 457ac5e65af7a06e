//! Purchase-side reconciliation against counterparty-reported records.
//!
//! [`reconcile`] is a pure function of the invoice set and the external
//! record set for a period — no I/O, no clock — so re-running after a new
//! upload is idempotent and two runs over identical inputs produce identical
//! results, byte for byte.

use std::collections::{HashMap, HashSet};

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::{ExternalRecord, ExternalSource, Invoice, InvoiceDirection, Period, TaxAmounts};

/// Tolerance band for value comparison: a pairing is "within tolerance" when
/// the difference is at most the larger of the absolute and relative bounds.
/// Defaults (₹1 / 1%) absorb rounding differences between the two sides;
/// they are inferred conventions, not statutory constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToleranceConfig {
    /// Absolute tolerance in rupees.
    pub absolute: Decimal,
    /// Relative tolerance as a fraction (0.01 = 1%).
    pub relative: Decimal,
}

impl Default for ToleranceConfig {
    fn default() -> Self {
        Self {
            absolute: dec!(1),
            relative: dec!(0.01),
        }
    }
}

impl ToleranceConfig {
    /// Whether `a` and `b` differ by no more than the band.
    pub fn within(&self, a: Decimal, b: Decimal) -> bool {
        let band = self.absolute.max(self.relative * a.abs().max(b.abs()));
        (a - b).abs() <= band
    }
}

/// A book invoice paired with an external record (matched or mismatched).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairedEntry {
    pub invoice_id: String,
    pub invoice_number: String,
    pub gstin: String,
    pub counterparty_name: Option<String>,
    /// Taxable value per own books.
    pub taxable_value: Decimal,
    /// Taxable value per the counterparty record.
    pub external_taxable_value: Decimal,
    /// Tax split per own books — the ITC being claimed.
    pub tax: TaxAmounts,
    /// Tax split per the counterparty record.
    pub external_tax: TaxAmounts,
    pub source: ExternalSource,
}

/// A purchase invoice with no counterpart in the uploaded 2A/2B — ITC at risk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnreportedEntry {
    pub invoice_id: String,
    pub invoice_number: String,
    pub gstin: Option<String>,
    pub counterparty_name: Option<String>,
    pub taxable_value: Decimal,
    /// Tax components whose credit is at risk of denial.
    pub itc_at_risk: TaxAmounts,
}

/// An external record with no corresponding ledger invoice — an omission in
/// own books.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnbookedEntry {
    pub gstin: String,
    pub invoice_number: String,
    pub taxable_value: Decimal,
    pub tax: TaxAmounts,
    pub source: ExternalSource,
}

/// A passed-over duplicate counterpart row: multiple external records shared
/// one (GSTIN, invoice number) key; the closest taxable value was selected
/// as canonical and the rest are reported here, not silently dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicateWarning {
    pub gstin: String,
    pub invoice_number: String,
    /// Taxable value of the record selected as canonical.
    pub selected_taxable_value: Decimal,
    /// Taxable value of this passed-over duplicate.
    pub duplicate_taxable_value: Decimal,
    pub source: ExternalSource,
}

/// Headline counts and the total ITC at risk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconSummary {
    pub matched: usize,
    pub mismatch_value: usize,
    pub mismatch_tax: usize,
    pub not_in_2a: usize,
    pub not_in_books: usize,
    pub duplicates: usize,
    /// Sum of tax components of purchases absent from 2A/2B.
    pub potential_itc_at_risk: Decimal,
}

/// Outcome of one reconciliation run. Derived, never the source of truth —
/// recompute from ledger + store state whenever inputs change.
///
/// Partition invariant: every purchase invoice of the period lands in exactly
/// one of `matched`/`mismatch_value`/`mismatch_tax`/`not_in_2a`, and every
/// external record of the period is either the selected counterpart of
/// exactly one paired entry, a duplicate warning, or an `not_in_books` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationResult {
    pub period: Period,
    pub matched: Vec<PairedEntry>,
    pub mismatch_value: Vec<PairedEntry>,
    pub mismatch_tax: Vec<PairedEntry>,
    pub not_in_2a: Vec<UnreportedEntry>,
    pub not_in_books: Vec<UnbookedEntry>,
    pub duplicate_warnings: Vec<DuplicateWarning>,
    pub summary: ReconSummary,
}

/// Uppercase and trim a GSTIN for matching.
pub fn normalize_gstin(gstin: &str) -> String {
    gstin.trim().to_ascii_uppercase()
}

/// Normalize an invoice number for matching: uppercase, drop everything that
/// is not alphanumeric, and strip leading zeros from each digit run —
/// statutory systems are lenient on punctuation and zero padding, so
/// "inv-007/A" and "INV7A" refer to the same document.
pub fn normalize_invoice_number(number: &str) -> String {
    let mut out = String::with_capacity(number.len());
    let mut digit_run = String::new();

    let flush = |out: &mut String, run: &mut String| {
        if !run.is_empty() {
            let trimmed = run.trim_start_matches('0');
            out.push_str(if trimmed.is_empty() { "0" } else { trimmed });
            run.clear();
        }
    };

    for c in number.trim().chars() {
        if c.is_ascii_digit() {
            digit_run.push(c);
        } else if c.is_ascii_alphanumeric() {
            flush(&mut out, &mut digit_run);
            out.push(c.to_ascii_uppercase());
        } else {
            // Punctuation/whitespace is collapsed away, but it still ends
            // the digit run: "2024-010" is the runs 2024 and 010, not 2024010.
            flush(&mut out, &mut digit_run);
        }
    }
    flush(&mut out, &mut digit_run);
    out
}

type MatchKey = (String, String);

/// Run reconciliation for one period.
///
/// Invoices that are not purchases or fall outside the period are ignored, as
/// are records from other periods, so callers can pass unfiltered slices.
pub fn reconcile(
    period: Period,
    invoices: &[&Invoice],
    records: &[ExternalRecord],
    cfg: &ToleranceConfig,
) -> ReconciliationResult {
    let mut purchases: Vec<&Invoice> = invoices
        .iter()
        .copied()
        .filter(|inv| inv.direction == InvoiceDirection::Purchase && period.contains(inv.date))
        .collect();
    // Deterministic processing order regardless of caller ordering.
    purchases.sort_by(|a, b| a.number.cmp(&b.number).then_with(|| a.id.cmp(&b.id)));

    let in_period: Vec<usize> = (0..records.len())
        .filter(|&i| records[i].period == period)
        .collect();

    let mut index: HashMap<MatchKey, Vec<usize>> = HashMap::new();
    for &i in &in_period {
        let key = (
            normalize_gstin(&records[i].gstin),
            normalize_invoice_number(&records[i].invoice_number),
        );
        index.entry(key).or_default().push(i);
    }

    let mut consumed: HashSet<usize> = HashSet::new();
    let mut selected_taxable: HashMap<MatchKey, Decimal> = HashMap::new();

    let mut matched = Vec::new();
    let mut mismatch_value = Vec::new();
    let mut mismatch_tax = Vec::new();
    let mut not_in_2a = Vec::new();

    for inv in &purchases {
        let key = match &inv.counterparty_gstin {
            Some(gstin) => (normalize_gstin(gstin), normalize_invoice_number(&inv.number)),
            // Unregistered supplier — nothing to match against.
            None => {
                not_in_2a.push(unreported(inv));
                continue;
            }
        };

        let candidate = index
            .get(&key)
            .into_iter()
            .flatten()
            .filter(|&&i| !consumed.contains(&i))
            // Closest taxable value wins; ties break on upload order.
            .min_by_key(|&&i| ((records[i].taxable_value - inv.taxable_value()).abs(), i))
            .copied();

        let Some(rec_idx) = candidate else {
            not_in_2a.push(unreported(inv));
            continue;
        };

        consumed.insert(rec_idx);
        let record = &records[rec_idx];
        selected_taxable
            .entry(key)
            .or_insert(record.taxable_value);

        let entry = PairedEntry {
            invoice_id: inv.id.clone(),
            invoice_number: inv.number.clone(),
            gstin: record.gstin.clone(),
            counterparty_name: inv.counterparty_name.clone(),
            taxable_value: inv.taxable_value(),
            external_taxable_value: record.taxable_value,
            tax: inv.tax_amounts(),
            external_tax: record.tax,
            source: record.source,
        };

        let value_ok = cfg.within(inv.taxable_value(), record.taxable_value);
        let tax_ok = cfg.within(inv.tax_amounts().total(), record.tax.total());

        if !value_ok {
            mismatch_value.push(entry);
        } else if !tax_ok {
            mismatch_tax.push(entry);
        } else {
            matched.push(entry);
        }
    }

    let mut not_in_books = Vec::new();
    let mut duplicate_warnings = Vec::new();
    for &i in &in_period {
        if consumed.contains(&i) {
            continue;
        }
        let record = &records[i];
        let key = (
            normalize_gstin(&record.gstin),
            normalize_invoice_number(&record.invoice_number),
        );
        if let Some(&selected) = selected_taxable.get(&key) {
            duplicate_warnings.push(DuplicateWarning {
                gstin: record.gstin.clone(),
                invoice_number: record.invoice_number.clone(),
                selected_taxable_value: selected,
                duplicate_taxable_value: record.taxable_value,
                source: record.source,
            });
        } else {
            not_in_books.push(UnbookedEntry {
                gstin: record.gstin.clone(),
                invoice_number: record.invoice_number.clone(),
                taxable_value: record.taxable_value,
                tax: record.tax,
                source: record.source,
            });
        }
    }

    not_in_books.sort_by(|a, b| {
        (&a.gstin, &a.invoice_number, a.taxable_value)
            .cmp(&(&b.gstin, &b.invoice_number, b.taxable_value))
    });
    duplicate_warnings.sort_by(|a, b| {
        (&a.gstin, &a.invoice_number, a.duplicate_taxable_value)
            .cmp(&(&b.gstin, &b.invoice_number, b.duplicate_taxable_value))
    });

    let potential_itc_at_risk: Decimal = not_in_2a.iter().map(|e| e.itc_at_risk.total()).sum();
    let summary = ReconSummary {
        matched: matched.len(),
        mismatch_value: mismatch_value.len(),
        mismatch_tax: mismatch_tax.len(),
        not_in_2a: not_in_2a.len(),
        not_in_books: not_in_books.len(),
        duplicates: duplicate_warnings.len(),
        potential_itc_at_risk,
    };
    debug!(
        %period,
        matched = summary.matched,
        mismatch_value = summary.mismatch_value,
        mismatch_tax = summary.mismatch_tax,
        not_in_2a = summary.not_in_2a,
        not_in_books = summary.not_in_books,
        "reconciliation complete"
    );

    ReconciliationResult {
        period,
        matched,
        mismatch_value,
        mismatch_tax,
        not_in_2a,
        not_in_books,
        duplicate_warnings,
        summary,
    }
}

fn unreported(inv: &Invoice) -> UnreportedEntry {
    UnreportedEntry {
        invoice_id: inv.id.clone(),
        invoice_number: inv.number.clone(),
        gstin: inv.counterparty_gstin.clone(),
        counterparty_name: inv.counterparty_name.clone(),
        taxable_value: inv.taxable_value(),
        itc_at_risk: inv.tax_amounts(),
    }
}
