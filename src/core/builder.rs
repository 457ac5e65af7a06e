use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::types::*;

/// Fluent builder for draft invoices.
///
/// The builder is the validated-DTO boundary: loosely shaped upload or
/// extraction payloads are mapped onto it field by field, and the resulting
/// draft is validated and priced when it enters the ledger.
///
/// ```
/// use chrono::NaiveDate;
/// use milaan::core::*;
/// use rust_decimal_macros::dec;
///
/// let draft = InvoiceBuilder::new("INV-100", NaiveDate::from_ymd_opt(2024, 6, 15).unwrap(),
///         InvoiceDirection::Purchase)
///     .counterparty("27AAAAA0000A1Z5", "Sharma Traders")
///     .place_of_supply("27")
///     .add_line(LineItemBuilder::new("Steel rods", "7214", dec!(100), dec!(100))
///         .tax(dec!(18))
///         .build())
///     .draft();
///
/// assert_eq!(draft.number, "INV-100");
/// ```
pub struct InvoiceBuilder {
    direction: InvoiceDirection,
    number: String,
    date: NaiveDate,
    counterparty_gstin: Option<String>,
    counterparty_name: Option<String>,
    place_of_supply: String,
    kind: DocumentKind,
    lines: Vec<LineItem>,
}

impl InvoiceBuilder {
    pub fn new(number: impl Into<String>, date: NaiveDate, direction: InvoiceDirection) -> Self {
        Self {
            direction,
            number: number.into(),
            date,
            counterparty_gstin: None,
            counterparty_name: None,
            place_of_supply: String::new(),
            kind: DocumentKind::Invoice,
            lines: Vec::new(),
        }
    }

    /// Registered counterparty — GSTIN and trade name.
    pub fn counterparty(mut self, gstin: impl Into<String>, name: impl Into<String>) -> Self {
        self.counterparty_gstin = Some(gstin.into());
        self.counterparty_name = Some(name.into());
        self
    }

    /// Unregistered counterparty — name only, no GSTIN.
    pub fn consumer(mut self, name: impl Into<String>) -> Self {
        self.counterparty_name = Some(name.into());
        self
    }

    /// Place-of-supply state code ("27" Maharashtra, "96" foreign country).
    pub fn place_of_supply(mut self, state_code: impl Into<String>) -> Self {
        self.place_of_supply = state_code.into();
        self
    }

    pub fn kind(mut self, kind: DocumentKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn add_line(mut self, line: LineItem) -> Self {
        self.lines.push(line);
        self
    }

    /// Produce the draft invoice. Identity, classification, and totals are
    /// assigned when the draft enters the ledger; validation runs there too.
    pub fn draft(self) -> Invoice {
        Invoice {
            id: String::new(),
            direction: self.direction,
            number: self.number,
            date: self.date,
            counterparty_gstin: self.counterparty_gstin,
            counterparty_name: self.counterparty_name,
            place_of_supply: self.place_of_supply,
            kind: self.kind,
            lines: self.lines,
            totals: None,
            category: None,
            status: InvoiceStatus::Draft,
            filing_id: None,
        }
    }
}

/// Builder for one invoice line.
pub struct LineItemBuilder {
    description: String,
    hsn_sac: String,
    quantity: Decimal,
    unit_rate: Decimal,
    gst_rate: Decimal,
    cess_rate: Decimal,
}

impl LineItemBuilder {
    pub fn new(
        description: impl Into<String>,
        hsn_sac: impl Into<String>,
        quantity: Decimal,
        unit_rate: Decimal,
    ) -> Self {
        Self {
            description: description.into(),
            hsn_sac: hsn_sac.into(),
            quantity,
            unit_rate,
            gst_rate: Decimal::ZERO,
            cess_rate: Decimal::ZERO,
        }
    }

    /// GST slab rate for the line.
    pub fn tax(mut self, gst_rate: Decimal) -> Self {
        self.gst_rate = gst_rate;
        self
    }

    /// Compensation cess rate, if any.
    pub fn cess(mut self, cess_rate: Decimal) -> Self {
        self.cess_rate = cess_rate;
        self
    }

    pub fn build(self) -> LineItem {
        LineItem {
            description: self.description,
            hsn_sac: self.hsn_sac,
            quantity: self.quantity,
            unit_rate: self.unit_rate,
            gst_rate: self.gst_rate,
            cess_rate: self.cess_rate,
            taxable_value: None,
            tax: None,
        }
    }
}
