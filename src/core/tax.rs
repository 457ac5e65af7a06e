//! Line-level GST arithmetic.
//!
//! All monetary math uses [`rust_decimal::Decimal`] with half-up rounding to
//! two decimal places, applied per line before summation — the convention the
//! statutory return forms expect. Aggregates are always sums of already
//! rounded line taxes, never recomputed from totals.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

use super::error::GstError;
use super::types::TaxAmounts;

/// The enumerated GST rate slabs. Anything else fails with
/// [`GstError::InvalidRate`]; additional levies go through the cess rate.
pub const GST_RATE_SLABS: [Decimal; 5] = [dec!(0), dec!(5), dec!(12), dec!(18), dec!(28)];

/// Whether `rate` is one of the enumerated slabs.
pub fn is_valid_rate(rate: Decimal) -> bool {
    GST_RATE_SLABS.contains(&rate)
}

/// Round a Decimal to `dp` decimal places using half-up (commercial rounding).
pub fn round_half_up(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// Compute the tax split for one line.
///
/// Intra-state supply splits the slab evenly into CGST and SGST (`rate/2`
/// each); inter-state supply applies the full rate to IGST. Cess applies on
/// the same taxable value in either case. Each component is rounded half-up
/// to 2 dp independently.
pub fn compute_line_tax(
    taxable_value: Decimal,
    gst_rate: Decimal,
    cess_rate: Decimal,
    inter_state: bool,
) -> Result<TaxAmounts, GstError> {
    if !is_valid_rate(gst_rate) {
        return Err(GstError::InvalidRate(gst_rate));
    }
    if cess_rate.is_sign_negative() {
        return Err(GstError::InvalidRate(cess_rate));
    }

    let cess = round_half_up(taxable_value * cess_rate / dec!(100), 2);

    if inter_state {
        Ok(TaxAmounts {
            cgst: Decimal::ZERO,
            sgst: Decimal::ZERO,
            igst: round_half_up(taxable_value * gst_rate / dec!(100), 2),
            cess,
        })
    } else {
        let half = round_half_up(taxable_value * gst_rate / dec!(200), 2);
        Ok(TaxAmounts {
            cgst: half,
            sgst: half,
            igst: Decimal::ZERO,
            cess,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intra_state_splits_rate_evenly() {
        let t = compute_line_tax(dec!(10_000), dec!(18), dec!(0), false).unwrap();
        assert_eq!(t.cgst, dec!(900.00));
        assert_eq!(t.sgst, dec!(900.00));
        assert_eq!(t.igst, dec!(0));
        assert_eq!(t.cess, dec!(0.00));
        assert_eq!(t.total(), dec!(1800.00));
    }

    #[test]
    fn inter_state_applies_full_rate_to_igst() {
        let t = compute_line_tax(dec!(10_000), dec!(18), dec!(0), true).unwrap();
        assert_eq!(t.cgst, dec!(0));
        assert_eq!(t.sgst, dec!(0));
        assert_eq!(t.igst, dec!(1800.00));
    }

    #[test]
    fn cess_applies_on_top_of_slab() {
        // 28% slab + 12% cess, the aerated-drinks pattern.
        let t = compute_line_tax(dec!(1000), dec!(28), dec!(12), false).unwrap();
        assert_eq!(t.cgst, dec!(140.00));
        assert_eq!(t.sgst, dec!(140.00));
        assert_eq!(t.cess, dec!(120.00));
    }

    #[test]
    fn rounds_half_up_at_the_line() {
        // 33.30 * 5% / 2 = 0.8325 → 0.83; 0.835 would go to 0.84
        let t = compute_line_tax(dec!(33.30), dec!(5), dec!(0), false).unwrap();
        assert_eq!(t.cgst, dec!(0.83));

        let t = compute_line_tax(dec!(33.40), dec!(5), dec!(0), false).unwrap();
        assert_eq!(t.cgst, dec!(0.84)); // 0.835 rounds away from zero
    }

    #[test]
    fn zero_rate_is_a_valid_slab() {
        let t = compute_line_tax(dec!(5000), dec!(0), dec!(0), true).unwrap();
        assert!(t.is_zero());
    }

    #[test]
    fn non_slab_rates_rejected() {
        for rate in [dec!(-5), dec!(3), dec!(17.5), dec!(40)] {
            let err = compute_line_tax(dec!(1000), rate, dec!(0), false).unwrap_err();
            assert_eq!(err.code(), "INVALID_RATE", "rate {rate} should be rejected");
        }
    }

    #[test]
    fn negative_cess_rejected() {
        let err = compute_line_tax(dec!(1000), dec!(18), dec!(-1), false).unwrap_err();
        assert_eq!(err.code(), "INVALID_RATE");
    }
}
