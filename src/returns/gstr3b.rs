use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::{ComputationWarning, Period, TaxAmounts};
use crate::ledger::InvoiceLedger;
use crate::recon::ReconciliationResult;

use super::gstr1::signed_amounts;

/// GSTR-3B summary tax-payment figures for one period.
///
/// ITC comes only from a reconciliation run: matched purchases in full, tax
/// mismatches at the lower of the two reported amounts. Without a run for
/// the period ITC is zero and a [`ComputationWarning`] rides in the payload —
/// credit is never inferred from unreconciled purchase invoices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gstr3bSummary {
    pub gstin: String,
    pub period: Period,
    /// Net outward taxable value (credit notes already subtracted).
    pub outward_taxable_value: Decimal,
    /// Outward tax liability split.
    pub outward_tax: TaxAmounts,
    /// Input tax credit available per the reconciliation run.
    pub itc: TaxAmounts,
    /// Per-component liability after ITC offset, floored at zero. Cross-head
    /// utilisation rules are left to the filing portal.
    pub net_payable: TaxAmounts,
    pub total_payable: Decimal,
    pub warnings: Vec<ComputationWarning>,
    pub nil: bool,
}

/// Build the GSTR-3B summary from the sales ledger and, when available, the
/// latest reconciliation run for the period.
pub fn build_gstr3b(
    ledger: &InvoiceLedger,
    period: Period,
    recon: Option<&ReconciliationResult>,
) -> Gstr3bSummary {
    let mut outward_taxable_value = Decimal::ZERO;
    let mut outward_tax = TaxAmounts::ZERO;
    let mut document_count = 0usize;
    for invoice in ledger.sales_for(period) {
        let (taxable, tax) = signed_amounts(invoice);
        outward_taxable_value += taxable;
        outward_tax += tax;
        document_count += 1;
    }

    let mut warnings = Vec::new();
    let itc = match recon {
        Some(result) => eligible_itc(result),
        None => {
            warnings.push(ComputationWarning::ReconciliationMissing { period });
            TaxAmounts::ZERO
        }
    };

    let net_payable = TaxAmounts {
        cgst: (outward_tax.cgst - itc.cgst).max(Decimal::ZERO),
        sgst: (outward_tax.sgst - itc.sgst).max(Decimal::ZERO),
        igst: (outward_tax.igst - itc.igst).max(Decimal::ZERO),
        cess: (outward_tax.cess - itc.cess).max(Decimal::ZERO),
    };

    Gstr3bSummary {
        gstin: ledger.gstin().to_string(),
        period,
        outward_taxable_value,
        outward_tax,
        itc,
        total_payable: net_payable.total(),
        net_payable,
        warnings,
        nil: document_count == 0 && itc.is_zero(),
    }
}

/// ITC from a reconciliation run: matched entries claim the book split in
/// full; tax mismatches claim whichever side reports the lower total, the
/// conservative figure until the supplier corrects.
fn eligible_itc(result: &ReconciliationResult) -> TaxAmounts {
    let mut itc = TaxAmounts::ZERO;
    for e in &result.matched {
        itc += e.tax;
    }
    for e in &result.mismatch_tax {
        itc += if e.external_tax.total() < e.tax.total() {
            e.external_tax
        } else {
            e.tax
        };
    }
    itc
}
