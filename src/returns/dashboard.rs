use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::{InvoiceStatus, Period, TaxAmounts};
use crate::filing::{FilingRegister, FilingStatus, ReturnType};
use crate::ledger::InvoiceLedger;

use super::gstr1::signed_amounts;

/// Statutory due dates for a period's returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DueDates {
    /// GSTR-1 — 11th of the following month.
    pub gstr1: NaiveDate,
    /// GSTR-3B — 20th of the following month.
    pub gstr3b: NaiveDate,
}

/// Compliance overview for one period — everything the landing screen shows.
/// Recomputed on demand from ledger and register state, never cached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    pub period: Period,
    /// Whole-ledger invoice counts per lifecycle status.
    pub invoice_counts: Vec<(InvoiceStatus, usize)>,
    pub sales_count: usize,
    pub purchase_count: usize,
    /// Net outward taxable value for the period (credit notes subtracted).
    pub sales_taxable_value: Decimal,
    pub sales_tax: TaxAmounts,
    pub purchase_taxable_value: Decimal,
    pub purchase_tax: TaxAmounts,
    /// Filing state for this period's returns, if generated.
    pub gstr1_status: Option<FilingStatus>,
    pub gstr3b_status: Option<FilingStatus>,
    /// Filings awaiting CA review across all periods.
    pub pending_review_filings: usize,
    pub due_dates: DueDates,
}

pub fn build_dashboard(
    ledger: &InvoiceLedger,
    register: &FilingRegister,
    period: Period,
) -> Dashboard {
    let mut sales_taxable_value = Decimal::ZERO;
    let mut sales_tax = TaxAmounts::ZERO;
    let sales = ledger.sales_for(period);
    for invoice in &sales {
        let (taxable, tax) = signed_amounts(invoice);
        sales_taxable_value += taxable;
        sales_tax += tax;
    }

    let mut purchase_taxable_value = Decimal::ZERO;
    let mut purchase_tax = TaxAmounts::ZERO;
    let purchases = ledger.purchases_for(period);
    for invoice in &purchases {
        purchase_taxable_value += invoice.taxable_value();
        purchase_tax += invoice.tax_amounts();
    }

    Dashboard {
        period,
        invoice_counts: ledger.status_counts().to_vec(),
        sales_count: sales.len(),
        purchase_count: purchases.len(),
        sales_taxable_value,
        sales_tax,
        purchase_taxable_value,
        purchase_tax,
        gstr1_status: register.status_of(ReturnType::Gstr1, period),
        gstr3b_status: register.status_of(ReturnType::Gstr3b, period),
        pending_review_filings: register.pending_review_count(),
        due_dates: DueDates {
            gstr1: period.gstr1_due_date(),
            gstr3b: period.gstr3b_due_date(),
        },
    }
}
