use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::{DocumentKind, Invoice, InvoiceCategory, Period, TaxAmounts};
use crate::ledger::InvoiceLedger;

/// Aggregate for one GSTR-1 section (B2B, B2CS, B2CL, CDNR, EXP).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SectionTotals {
    pub document_count: usize,
    pub taxable_value: Decimal,
    pub tax: TaxAmounts,
}

/// GSTR-1 outward-supply summary for one period.
///
/// A pure derivation of the sales ledger: regenerating always reflects
/// current ledger state. Credit notes contribute negatively, debit notes
/// positively, so totals are the net outward liability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gstr1Summary {
    pub gstin: String,
    pub period: Period,
    /// Per-section totals, only for sections with at least one document.
    pub sections: BTreeMap<InvoiceCategory, SectionTotals>,
    pub document_count: usize,
    pub total_taxable_value: Decimal,
    /// Liability split, summed from already-computed per-line taxes.
    pub tax: TaxAmounts,
    pub total_tax: Decimal,
    /// No outward documents in the period — a nil return is still filed.
    pub nil: bool,
}

/// Build the GSTR-1 summary from every sales document of the period.
pub fn build_gstr1(ledger: &InvoiceLedger, period: Period) -> Gstr1Summary {
    let mut sections: BTreeMap<InvoiceCategory, SectionTotals> = BTreeMap::new();
    let mut total_taxable_value = Decimal::ZERO;
    let mut tax = TaxAmounts::ZERO;
    let mut document_count = 0usize;

    for invoice in ledger.sales_for(period) {
        let (taxable, line_tax) = signed_amounts(invoice);
        let category = invoice
            .category
            .unwrap_or_else(|| invoice.classify(ledger.home_state()));

        let section = sections.entry(category).or_default();
        section.document_count += 1;
        section.taxable_value += taxable;
        section.tax += line_tax;

        document_count += 1;
        total_taxable_value += taxable;
        tax += line_tax;
    }

    Gstr1Summary {
        gstin: ledger.gstin().to_string(),
        period,
        sections,
        document_count,
        total_taxable_value,
        total_tax: tax.total(),
        tax,
        nil: document_count == 0,
    }
}

/// Document contribution with credit-note sign applied.
pub(crate) fn signed_amounts(invoice: &Invoice) -> (Decimal, TaxAmounts) {
    let taxable = invoice.taxable_value();
    let tax = invoice.tax_amounts();
    match invoice.kind {
        DocumentKind::CreditNote => (
            -taxable,
            TaxAmounts {
                cgst: -tax.cgst,
                sgst: -tax.sgst,
                igst: -tax.igst,
                cess: -tax.cess,
            },
        ),
        DocumentKind::Invoice | DocumentKind::DebitNote => (taxable, tax),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{InvoiceBuilder, InvoiceDirection, LineItemBuilder};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()
    }

    fn ledger() -> InvoiceLedger {
        InvoiceLedger::new("27AABCU9603R1ZM").unwrap()
    }

    fn period() -> Period {
        "062024".parse().unwrap()
    }

    fn sale(number: &str, quantity: Decimal) -> Invoice {
        InvoiceBuilder::new(number, date(), InvoiceDirection::Sales)
            .counterparty("29AAAAA0000A1Z3", "Bengaluru Buyer")
            .place_of_supply("29")
            .add_line(
                LineItemBuilder::new("Machined parts", "8466", quantity, dec!(500))
                    .tax(dec!(18))
                    .build(),
            )
            .draft()
    }

    #[test]
    fn groups_by_section_and_sums_line_taxes() {
        let mut ledger = ledger();
        ledger.create(sale("S-1", dec!(10)), "ops").unwrap();
        ledger.create(sale("S-2", dec!(4)), "ops").unwrap();

        let consumer = InvoiceBuilder::new("S-3", date(), InvoiceDirection::Sales)
            .consumer("Walk-in customer")
            .place_of_supply("27")
            .add_line(
                LineItemBuilder::new("Retail item", "9503", dec!(2), dec!(750))
                    .tax(dec!(12))
                    .build(),
            )
            .draft();
        ledger.create(consumer, "ops").unwrap();

        let summary = build_gstr1(&ledger, period());
        assert_eq!(summary.document_count, 3);
        assert!(!summary.nil);

        let b2b = &summary.sections[&InvoiceCategory::B2b];
        assert_eq!(b2b.document_count, 2);
        assert_eq!(b2b.taxable_value, dec!(7000.00));
        assert_eq!(b2b.tax.igst, dec!(1260.00));

        let b2cs = &summary.sections[&InvoiceCategory::B2cs];
        assert_eq!(b2cs.document_count, 1);
        assert_eq!(b2cs.tax.cgst, dec!(90.00));
        assert_eq!(b2cs.tax.sgst, dec!(90.00));

        assert_eq!(summary.total_taxable_value, dec!(8500.00));
        assert_eq!(summary.total_tax, dec!(1440.00));
        assert_eq!(summary.total_tax, summary.tax.total());
    }

    #[test]
    fn credit_note_reduces_net_liability() {
        let mut ledger = ledger();
        ledger.create(sale("S-1", dec!(10)), "ops").unwrap();

        let mut note = sale("CN-1", dec!(2));
        note.kind = DocumentKind::CreditNote;
        ledger.create(note, "ops").unwrap();

        let summary = build_gstr1(&ledger, period());
        assert_eq!(summary.total_taxable_value, dec!(4000.00));
        assert_eq!(summary.tax.igst, dec!(720.00));
        let cdnr = &summary.sections[&InvoiceCategory::Cdnr];
        assert_eq!(cdnr.taxable_value, dec!(-1000.00));
    }

    #[test]
    fn empty_period_is_a_nil_return() {
        let summary = build_gstr1(&ledger(), period());
        assert!(summary.nil);
        assert_eq!(summary.document_count, 0);
        assert_eq!(summary.total_tax, dec!(0));
        assert!(summary.sections.is_empty());
    }

    #[test]
    fn regeneration_is_idempotent_against_unchanged_ledger() {
        let mut ledger = ledger();
        ledger.create(sale("S-1", dec!(10)), "ops").unwrap();

        let a = build_gstr1(&ledger, period());
        let b = build_gstr1(&ledger, period());
        assert_eq!(a, b);
    }
}
