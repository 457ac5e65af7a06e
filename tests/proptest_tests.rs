//! Property-based tests for tax arithmetic and reconciliation partitioning.

use chrono::NaiveDate;
use milaan::core::*;
use milaan::recon::{reconcile, ToleranceConfig};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn period() -> Period {
    "062024".parse().unwrap()
}

// ── Strategies ──────────────────────────────────────────────────────────────

/// Taxable value from ₹0.01 to ₹99,999.99 with paise precision.
fn arb_taxable() -> impl Strategy<Value = Decimal> {
    (1u64..10_000_000u64).prop_map(|paise| Decimal::new(paise as i64, 2))
}

/// One of the enumerated GST rate slabs.
fn arb_rate() -> impl Strategy<Value = Decimal> {
    prop::sample::select(GST_RATE_SLABS.to_vec())
}

/// A purchase invoice with precomputed totals, as the ledger would hold it.
fn purchase(id: usize, number: String, gstin: String, taxable: Decimal) -> Invoice {
    let tax = compute_line_tax(taxable, dec!(18), dec!(0), false).unwrap();
    Invoice {
        id: format!("inv-{id:06}"),
        direction: InvoiceDirection::Purchase,
        number,
        date: date(2024, 6, 10),
        counterparty_gstin: Some(gstin),
        counterparty_name: None,
        place_of_supply: "27".into(),
        kind: DocumentKind::Invoice,
        lines: Vec::new(),
        totals: Some(InvoiceTotals {
            taxable_value: taxable,
            tax,
            grand_total: taxable + tax.total(),
        }),
        category: None,
        status: InvoiceStatus::Verified,
        filing_id: None,
    }
}

fn record(gstin: String, number: String, taxable: Decimal) -> ExternalRecord {
    ExternalRecord {
        source: ExternalSource::TwoB,
        period: period(),
        gstin,
        invoice_number: number,
        invoice_date: None,
        taxable_value: taxable,
        tax: compute_line_tax(taxable, dec!(18), dec!(0), false).unwrap(),
    }
}

const GSTIN_POOL: [&str; 3] = ["27AAAAA0000A1Z5", "29BBBBB1111B1Z4", "33CCCCC2222C1Z2"];

/// (gstin index, invoice number suffix, taxable paise) tuples for both sides.
fn arb_side() -> impl Strategy<Value = Vec<(usize, u8, u64)>> {
    prop::collection::vec((0..3usize, 0..8u8, 1u64..1_000_000u64), 0..12)
}

// ── Tax arithmetic ──────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn grand_total_is_exact_for_all_slabs(
        prices in prop::collection::vec(arb_taxable(), 1..6),
        rate in arb_rate(),
    ) {
        let mut builder = InvoiceBuilder::new("INV-PROP", date(2024, 6, 15), InvoiceDirection::Sales)
            .consumer("Walk-in customer")
            .place_of_supply("27");
        for (i, price) in prices.iter().enumerate() {
            builder = builder.add_line(
                LineItemBuilder::new(format!("Item {i}"), "8471", dec!(1), *price)
                    .tax(rate)
                    .build(),
            );
        }
        let mut invoice = builder.draft();
        calculate_totals(&mut invoice, "27").unwrap();

        let totals = invoice.totals.unwrap();
        // Exact identity, no floating drift.
        prop_assert_eq!(
            totals.grand_total,
            totals.taxable_value
                + totals.tax.cgst
                + totals.tax.sgst
                + totals.tax.igst
                + totals.tax.cess
        );
        // Aggregate equals the sum of already-rounded line taxes.
        let line_sum: Decimal = invoice.lines.iter().map(|l| l.tax.unwrap().total()).sum();
        prop_assert_eq!(totals.tax.total(), line_sum);
        // Each component carries at most two decimal places.
        prop_assert_eq!(totals.tax.cgst, totals.tax.cgst.round_dp(2));
    }

    #[test]
    fn intra_state_splits_evenly(taxable in arb_taxable(), rate in arb_rate()) {
        let tax = compute_line_tax(taxable, rate, dec!(0), false).unwrap();
        prop_assert_eq!(tax.igst, Decimal::ZERO);
        prop_assert_eq!(tax.cgst, tax.sgst);
        prop_assert_eq!(tax.cgst, round_half_up(taxable * rate / dec!(200), 2));
    }

    #[test]
    fn inter_state_is_igst_only(taxable in arb_taxable(), rate in arb_rate()) {
        let tax = compute_line_tax(taxable, rate, dec!(0), true).unwrap();
        prop_assert_eq!(tax.cgst, Decimal::ZERO);
        prop_assert_eq!(tax.sgst, Decimal::ZERO);
        prop_assert_eq!(tax.igst, round_half_up(taxable * rate / dec!(100), 2));
    }

    #[test]
    fn non_slab_rates_are_rejected(rate in 1u32..100u32) {
        prop_assume!(!GST_RATE_SLABS.contains(&Decimal::from(rate)));
        let err = compute_line_tax(dec!(1000), Decimal::from(rate), dec!(0), false).unwrap_err();
        prop_assert_eq!(err.code(), "INVALID_RATE");
    }
}

// ── Reconciliation partitioning ─────────────────────────────────────────────

proptest! {
    #[test]
    fn every_invoice_and_record_lands_in_exactly_one_partition(
        book in arb_side(),
        external in arb_side(),
    ) {
        let invoices: Vec<Invoice> = book
            .iter()
            .enumerate()
            .map(|(i, &(g, n, paise))| {
                purchase(i, format!("P-{n}"), GSTIN_POOL[g].to_string(), Decimal::new(paise as i64, 2))
            })
            .collect();
        let invoice_refs: Vec<&Invoice> = invoices.iter().collect();
        let records: Vec<ExternalRecord> = external
            .iter()
            .map(|&(g, n, paise)| {
                record(GSTIN_POOL[g].to_string(), format!("P-{n}"), Decimal::new(paise as i64, 2))
            })
            .collect();

        let result = reconcile(period(), &invoice_refs, &records, &ToleranceConfig::default());

        // Every invoice in exactly one of the four book-side partitions.
        let book_total = result.matched.len()
            + result.mismatch_value.len()
            + result.mismatch_tax.len()
            + result.not_in_2a.len();
        prop_assert_eq!(book_total, invoices.len());

        let mut seen_ids: Vec<&str> = result
            .matched
            .iter()
            .chain(&result.mismatch_value)
            .chain(&result.mismatch_tax)
            .map(|e| e.invoice_id.as_str())
            .chain(result.not_in_2a.iter().map(|e| e.invoice_id.as_str()))
            .collect();
        seen_ids.sort_unstable();
        seen_ids.dedup();
        prop_assert_eq!(seen_ids.len(), invoices.len());

        // Every record is a selected counterpart, a duplicate, or unbooked.
        let selected = result.matched.len() + result.mismatch_value.len() + result.mismatch_tax.len();
        prop_assert_eq!(
            selected + result.duplicate_warnings.len() + result.not_in_books.len(),
            records.len()
        );

        prop_assert_eq!(result.summary.matched, result.matched.len());
        prop_assert_eq!(result.summary.not_in_2a, result.not_in_2a.len());
    }

    #[test]
    fn reconciliation_is_idempotent(book in arb_side(), external in arb_side()) {
        let invoices: Vec<Invoice> = book
            .iter()
            .enumerate()
            .map(|(i, &(g, n, paise))| {
                purchase(i, format!("P-{n}"), GSTIN_POOL[g].to_string(), Decimal::new(paise as i64, 2))
            })
            .collect();
        let invoice_refs: Vec<&Invoice> = invoices.iter().collect();
        let records: Vec<ExternalRecord> = external
            .iter()
            .map(|&(g, n, paise)| {
                record(GSTIN_POOL[g].to_string(), format!("P-{n}"), Decimal::new(paise as i64, 2))
            })
            .collect();

        let cfg = ToleranceConfig::default();
        let a = reconcile(period(), &invoice_refs, &records, &cfg);
        let b = reconcile(period(), &invoice_refs, &records, &cfg);
        prop_assert_eq!(&a, &b);
        prop_assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }
}
