use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::states::EXPORT_STATE_CODE;

/// Invoice value threshold splitting B2CS from B2CL for unregistered
/// inter-state sales (₹2,50,000 per the GSTR-1 instructions).
pub const B2CL_THRESHOLD: Decimal = dec!(250_000);

/// Tax component breakdown for one line or one aggregate.
///
/// Intra-state supplies carry CGST+SGST, inter-state supplies carry IGST;
/// cess applies on top of either.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxAmounts {
    pub cgst: Decimal,
    pub sgst: Decimal,
    pub igst: Decimal,
    pub cess: Decimal,
}

impl TaxAmounts {
    pub const ZERO: TaxAmounts = TaxAmounts {
        cgst: Decimal::ZERO,
        sgst: Decimal::ZERO,
        igst: Decimal::ZERO,
        cess: Decimal::ZERO,
    };

    /// Sum of all four components.
    pub fn total(&self) -> Decimal {
        self.cgst + self.sgst + self.igst + self.cess
    }

    pub fn is_zero(&self) -> bool {
        self.cgst.is_zero() && self.sgst.is_zero() && self.igst.is_zero() && self.cess.is_zero()
    }
}

impl std::ops::Add for TaxAmounts {
    type Output = TaxAmounts;

    fn add(self, rhs: TaxAmounts) -> TaxAmounts {
        TaxAmounts {
            cgst: self.cgst + rhs.cgst,
            sgst: self.sgst + rhs.sgst,
            igst: self.igst + rhs.igst,
            cess: self.cess + rhs.cess,
        }
    }
}

impl std::ops::AddAssign for TaxAmounts {
    fn add_assign(&mut self, rhs: TaxAmounts) {
        *self = *self + rhs;
    }
}

/// One invoice line (Rule 46(g)–(k) fields).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// Description of goods or services.
    pub description: String,
    /// HSN code for goods / SAC code for services.
    pub hsn_sac: String,
    /// Quantity supplied.
    pub quantity: Decimal,
    /// Per-unit rate before tax.
    pub unit_rate: Decimal,
    /// GST rate percentage — one of the enumerated slabs (0/5/12/18/28).
    pub gst_rate: Decimal,
    /// Compensation cess rate percentage, if any.
    pub cess_rate: Decimal,
    /// Taxable value = quantity × unit rate, rounded to 2 dp.
    /// Set by `calculate_totals()`.
    pub taxable_value: Option<Decimal>,
    /// Line-level tax split. Set by `calculate_totals()`.
    pub tax: Option<TaxAmounts>,
}

/// Derived invoice totals — always computed, never hand-entered.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InvoiceTotals {
    /// Sum of line taxable values.
    pub taxable_value: Decimal,
    /// Sum of line-level tax splits (line-level rounding preserved).
    pub tax: TaxAmounts,
    /// taxable_value + cgst + sgst + igst + cess, exactly.
    pub grand_total: Decimal,
}

/// Whether the ledger entry is an outward or inward supply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceDirection {
    Sales,
    Purchase,
}

impl std::fmt::Display for InvoiceDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sales => write!(f, "sales"),
            Self::Purchase => write!(f, "purchase"),
        }
    }
}

/// Document kind — tax invoice, or a credit/debit note issued against one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Invoice,
    CreditNote,
    DebitNote,
}

/// GSTR-1 classification category. Derived from counterparty registration,
/// document kind, place of supply, and invoice value — never user-set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum InvoiceCategory {
    /// Supply to a registered counterparty (GSTIN present).
    B2b,
    /// Small supply to an unregistered consumer.
    B2cs,
    /// Large (> ₹2,50,000) inter-state supply to an unregistered consumer.
    B2cl,
    /// Credit/debit note against a registered counterparty.
    Cdnr,
    /// Export — non-domestic place of supply.
    Exp,
}

impl InvoiceCategory {
    /// GSTR-1 section code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::B2b => "B2B",
            Self::B2cs => "B2CS",
            Self::B2cl => "B2CL",
            Self::Cdnr => "CDNR",
            Self::Exp => "EXP",
        }
    }

    /// Parse from a GSTR-1 section code.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "B2B" => Some(Self::B2b),
            "B2CS" => Some(Self::B2cs),
            "B2CL" => Some(Self::B2cl),
            "CDNR" => Some(Self::Cdnr),
            "EXP" => Some(Self::Exp),
            _ => None,
        }
    }
}

/// Invoice lifecycle status.
///
/// `draft` → `extracted` entries may be edited or deleted; `verified` entries
/// are review-locked; `finalized` entries are immutable, reached only once
/// the invoice is included in a filed return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    Draft,
    Extracted,
    Verified,
    Finalized,
}

impl std::fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Draft => write!(f, "draft"),
            Self::Extracted => write!(f, "extracted"),
            Self::Verified => write!(f, "verified"),
            Self::Finalized => write!(f, "finalized"),
        }
    }
}

/// One ledger entry — a sales or purchase invoice of the owning business.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    /// Ledger-assigned identifier.
    pub id: String,
    pub direction: InvoiceDirection,
    /// Invoice number as printed on the document.
    pub number: String,
    pub date: NaiveDate,
    /// Counterparty GSTIN — absent for unregistered consumers.
    pub counterparty_gstin: Option<String>,
    pub counterparty_name: Option<String>,
    /// Place-of-supply state code ("27" Maharashtra, "96" foreign country).
    pub place_of_supply: String,
    pub kind: DocumentKind,
    pub lines: Vec<LineItem>,
    /// Derived totals (set by `calculate_totals()`).
    pub totals: Option<InvoiceTotals>,
    /// Derived GSTR-1 category (set on ledger ingest).
    pub category: Option<InvoiceCategory>,
    pub status: InvoiceStatus,
    /// The filing this invoice was finalized under, once `finalized`.
    pub filing_id: Option<String>,
}

impl Invoice {
    /// Taxable value, zero until totals are calculated.
    pub fn taxable_value(&self) -> Decimal {
        self.totals.map(|t| t.taxable_value).unwrap_or_default()
    }

    /// Tax split, zero until totals are calculated.
    pub fn tax_amounts(&self) -> TaxAmounts {
        self.totals.map(|t| t.tax).unwrap_or_default()
    }

    /// Grand total, zero until totals are calculated.
    pub fn grand_total(&self) -> Decimal {
        self.totals.map(|t| t.grand_total).unwrap_or_default()
    }

    /// Whether the supply is inter-state relative to the business home state.
    /// Exports (place of supply 96) are always inter-state.
    pub fn is_inter_state(&self, home_state: &str) -> bool {
        self.place_of_supply != home_state
    }

    /// Derive the GSTR-1 classification category.
    pub fn classify(&self, home_state: &str) -> InvoiceCategory {
        let registered = self.counterparty_gstin.is_some();
        if registered && matches!(self.kind, DocumentKind::CreditNote | DocumentKind::DebitNote) {
            InvoiceCategory::Cdnr
        } else if self.place_of_supply == EXPORT_STATE_CODE {
            InvoiceCategory::Exp
        } else if registered {
            InvoiceCategory::B2b
        } else if self.is_inter_state(home_state) && self.grand_total() > B2CL_THRESHOLD {
            InvoiceCategory::B2cl
        } else {
            InvoiceCategory::B2cs
        }
    }
}

/// Source return of an ingested counterparty row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ExternalSource {
    /// GSTR-2A — dynamic auto-drafted statement.
    #[serde(rename = "2A")]
    TwoA,
    /// GSTR-2B — static monthly statement.
    #[serde(rename = "2B")]
    TwoB,
}

impl std::fmt::Display for ExternalSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TwoA => write!(f, "2A"),
            Self::TwoB => write!(f, "2B"),
        }
    }
}

/// One row reported by a counterparty for a filing period, taken from an
/// uploaded GSTR-2A/2B file. Immutable once ingested — correction is by
/// re-ingesting the whole (source, period) set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalRecord {
    pub source: ExternalSource,
    pub period: super::Period,
    /// Supplier GSTIN as reported on the portal.
    pub gstin: String,
    pub invoice_number: String,
    pub invoice_date: Option<NaiveDate>,
    pub taxable_value: Decimal,
    pub tax: TaxAmounts,
}
