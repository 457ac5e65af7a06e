use super::error::{GstError, ValidationError};
use super::states;
use super::tax;
use super::types::*;

/// Structural GSTIN format check (15 characters):
/// 2-digit state code, 10-character PAN (5 letters, 4 digits, 1 letter),
/// entity code, the literal 'Z', and a check character.
///
/// Deliberately does **not** verify the checksum — only the shape.
pub fn is_valid_gstin_format(gstin: &str) -> bool {
    let bytes = gstin.as_bytes();
    // ASCII check before any slicing: the input is untrusted and a
    // multi-byte character would make byte indexing panic.
    if bytes.len() != 15 || !bytes.is_ascii() {
        return false;
    }
    let state = &gstin[..2];
    if !state.bytes().all(|b| b.is_ascii_digit()) || !states::is_known_state_code(state) {
        return false;
    }
    bytes[2..7].iter().all(u8::is_ascii_uppercase)
        && bytes[7..11].iter().all(u8::is_ascii_digit)
        && bytes[11].is_ascii_uppercase()
        && bytes[12].is_ascii_alphanumeric()
        && bytes[13] == b'Z'
        && bytes[14].is_ascii_alphanumeric()
}

/// Validate an invoice against the Rule 46 particulars the engine needs.
/// Returns all validation errors found (not just the first).
pub fn validate_invoice(invoice: &Invoice) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if invoice.number.trim().is_empty() {
        errors.push(ValidationError::with_rule(
            "number",
            "invoice number must not be empty",
            "Rule 46(b)",
        ));
    } else if invoice.number.len() > 16 {
        errors.push(ValidationError::with_rule(
            "number",
            "invoice number must not exceed 16 characters",
            "Rule 46(b)",
        ));
    }

    if let Some(gstin) = &invoice.counterparty_gstin {
        if !is_valid_gstin_format(gstin) {
            errors.push(ValidationError::with_rule(
                "counterparty_gstin",
                format!("'{gstin}' is not a structurally valid GSTIN"),
                "Rule 46(e)",
            ));
        }
    }

    if !states::is_known_state_code(&invoice.place_of_supply) {
        errors.push(ValidationError::with_rule(
            "place_of_supply",
            format!(
                "'{}' is not a known GST state code",
                invoice.place_of_supply
            ),
            "Rule 46(n)",
        ));
    }

    if invoice.lines.is_empty() {
        errors.push(ValidationError::new(
            "lines",
            "invoice must have at least one line item",
        ));
    }

    for (i, line) in invoice.lines.iter().enumerate() {
        validate_line(line, i, &mut errors);
    }

    errors
}

fn validate_line(line: &LineItem, index: usize, errors: &mut Vec<ValidationError>) {
    let prefix = format!("lines[{index}]");

    if line.description.trim().is_empty() {
        errors.push(ValidationError::new(
            format!("{prefix}.description"),
            "description must not be empty",
        ));
    }

    if line.hsn_sac.trim().is_empty() {
        errors.push(ValidationError::with_rule(
            format!("{prefix}.hsn_sac"),
            "HSN/SAC code must not be empty",
            "Rule 46(g)",
        ));
    }

    if line.quantity <= rust_decimal::Decimal::ZERO {
        errors.push(ValidationError::new(
            format!("{prefix}.quantity"),
            "quantity must be positive",
        ));
    }

    if line.unit_rate.is_sign_negative() {
        errors.push(ValidationError::new(
            format!("{prefix}.unit_rate"),
            "unit rate must not be negative",
        ));
    }

    if !tax::is_valid_rate(line.gst_rate) {
        errors.push(ValidationError::new(
            format!("{prefix}.gst_rate"),
            format!(
                "{}% is not an enumerated GST slab (0, 5, 12, 18, 28)",
                line.gst_rate
            ),
        ));
    }

    if line.cess_rate.is_sign_negative() {
        errors.push(ValidationError::new(
            format!("{prefix}.cess_rate"),
            "cess rate must not be negative",
        ));
    }
}

/// Recompute line taxable values, line taxes, and invoice totals in place.
///
/// The grand total is taxable value plus the sum of line-level tax
/// components, exactly — it is never hand-entered.
pub fn calculate_totals(invoice: &mut Invoice, home_state: &str) -> Result<(), GstError> {
    let inter_state = invoice.is_inter_state(home_state);

    let mut taxable_total = rust_decimal::Decimal::ZERO;
    let mut tax_total = TaxAmounts::ZERO;

    for line in &mut invoice.lines {
        let taxable = tax::round_half_up(line.quantity * line.unit_rate, 2);
        let line_tax = tax::compute_line_tax(taxable, line.gst_rate, line.cess_rate, inter_state)?;
        line.taxable_value = Some(taxable);
        line.tax = Some(line_tax);
        taxable_total += taxable;
        tax_total += line_tax;
    }

    invoice.totals = Some(InvoiceTotals {
        taxable_value: taxable_total,
        tax: tax_total,
        grand_total: taxable_total + tax_total.total(),
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::builder::{InvoiceBuilder, LineItemBuilder};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    #[test]
    fn gstin_format_accepts_well_formed() {
        assert!(is_valid_gstin_format("27AAAAA0000A1Z5"));
        assert!(is_valid_gstin_format("07ABCDE1234F2Z6"));
        assert!(is_valid_gstin_format("33AAACQ1234B1ZP"));
    }

    #[test]
    fn gstin_format_rejects_malformed() {
        assert!(!is_valid_gstin_format(""));
        assert!(!is_valid_gstin_format("27AAAAA0000A1Z")); // 14 chars
        assert!(!is_valid_gstin_format("27AAAAA0000A1X5")); // missing Z
        assert!(!is_valid_gstin_format("00AAAAA0000A1Z5")); // unknown state
        assert!(!is_valid_gstin_format("27aaaaa0000A1Z5")); // lowercase PAN
        assert!(!is_valid_gstin_format("27AAAAA00X0A1Z5")); // letter in digit run
    }

    #[test]
    fn gstin_format_rejects_non_ascii_without_panicking() {
        // Five 3-byte characters: 15 bytes, so the length check alone
        // would not catch it.
        assert!(!is_valid_gstin_format("अअअअअ"));
        assert!(!is_valid_gstin_format("२७AAAAA0000A1Z5"));
        assert!(!is_valid_gstin_format("27AAAAA0000A1Zé"));
    }

    #[test]
    fn totals_are_line_level_rounded_sums() {
        let mut inv = InvoiceBuilder::new("INV-9", date(), InvoiceDirection::Sales)
            .place_of_supply("27")
            .add_line(LineItemBuilder::new("Widget", "8471", dec!(3), dec!(33.33)).tax(dec!(18)).build())
            .add_line(LineItemBuilder::new("Gadget", "8517", dec!(1), dec!(0.03)).tax(dec!(18)).build())
            .draft();

        calculate_totals(&mut inv, "27").unwrap();
        let totals = inv.totals.unwrap();

        // Line 1: 99.99 taxable, cgst = round(8.9991) = 9.00
        // Line 2: 0.03 taxable, cgst = round(0.0027) = 0.00
        assert_eq!(totals.taxable_value, dec!(100.02));
        assert_eq!(totals.tax.cgst, dec!(9.00));
        assert_eq!(totals.tax.sgst, dec!(9.00));
        assert_eq!(totals.grand_total, dec!(118.02));
    }

    #[test]
    fn invalid_rate_surfaces_from_totals() {
        let mut inv = InvoiceBuilder::new("INV-10", date(), InvoiceDirection::Sales)
            .place_of_supply("27")
            .add_line(LineItemBuilder::new("Oddity", "8471", dec!(1), dec!(100)).tax(dec!(15)).build())
            .draft();

        let err = calculate_totals(&mut inv, "27").unwrap_err();
        assert_eq!(err.code(), "INVALID_RATE");
    }

    #[test]
    fn validation_collects_all_errors() {
        let mut inv = InvoiceBuilder::new("", date(), InvoiceDirection::Purchase)
            .counterparty("BOGUS", "Acme Traders")
            .place_of_supply("55")
            .draft();
        inv.lines.push(LineItem {
            description: "".into(),
            hsn_sac: "".into(),
            quantity: dec!(0),
            unit_rate: dec!(-1),
            gst_rate: dec!(3),
            cess_rate: dec!(-2),
            taxable_value: None,
            tax: None,
        });

        let errors = validate_invoice(&inv);
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert!(fields.contains(&"number"));
        assert!(fields.contains(&"counterparty_gstin"));
        assert!(fields.contains(&"place_of_supply"));
        assert!(fields.contains(&"lines[0].quantity"));
        assert!(fields.contains(&"lines[0].gst_rate"));
        assert!(fields.contains(&"lines[0].cess_rate"));
    }
}
