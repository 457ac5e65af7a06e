//! Remediation suggestions derived from a reconciliation run.
//!
//! Generation is deterministic for a given result and config: same inputs,
//! same suggestions in the same order.

use std::collections::{BTreeMap, HashMap};

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::recon::matching::ReconciliationResult;
use crate::recon::risk::{RiskCategory, RiskItem};

/// Thresholds for escalating a suggestion to high priority.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestionConfig {
    /// Aggregate per-supplier ITC at risk above which the suggestion is
    /// high priority. Inferred default, not a statutory figure.
    pub materiality: Decimal,
    /// Risk score above which any single discrepancy is high priority.
    pub high_risk_cutoff: Decimal,
}

impl Default for SuggestionConfig {
    fn default() -> Self {
        Self {
            materiality: dec!(50_000),
            high_risk_cutoff: dec!(0.7),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        };
        f.write_str(s)
    }
}

/// One actionable remediation step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    /// Rupee amount riding on the action (tax for ITC items, value gap for
    /// mismatches).
    pub impact_amount: Decimal,
}

/// Derive suggestions from a reconciliation result and its risk scores.
///
/// Suggestions are ordered by priority, then impact descending, then title.
pub fn generate(
    result: &ReconciliationResult,
    risks: &[RiskItem],
    cfg: &SuggestionConfig,
) -> Vec<Suggestion> {
    let score_of: HashMap<(RiskCategory, &str), Decimal> = risks
        .iter()
        .map(|r| ((r.category, r.invoice_number.as_str()), r.score))
        .collect();
    let scored = |category: RiskCategory, number: &str| -> Decimal {
        score_of.get(&(category, number)).copied().unwrap_or(Decimal::ZERO)
    };

    let mut suggestions = Vec::new();

    // Unreported purchases, aggregated per supplier. One call to the
    // supplier covers all their missing invoices.
    let mut by_supplier: BTreeMap<&str, (Vec<&str>, Decimal, Decimal, Option<&str>)> =
        BTreeMap::new();
    let mut unregistered = Vec::new();
    for e in &result.not_in_2a {
        match e.gstin.as_deref() {
            Some(gstin) => {
                let slot = by_supplier
                    .entry(gstin)
                    .or_insert((Vec::new(), Decimal::ZERO, Decimal::ZERO, None));
                slot.0.push(&e.invoice_number);
                slot.1 += e.itc_at_risk.total();
                slot.2 = slot.2.max(scored(RiskCategory::NotIn2a, &e.invoice_number));
                if slot.3.is_none() {
                    slot.3 = e.counterparty_name.as_deref();
                }
            }
            None => unregistered.push(e),
        }
    }
    for (gstin, (numbers, itc, max_score, name)) in by_supplier {
        let supplier = name.unwrap_or("supplier");
        let priority = if itc > cfg.materiality || max_score > cfg.high_risk_cutoff {
            Priority::High
        } else {
            Priority::Medium
        };
        suggestions.push(Suggestion {
            title: format!("Contact {supplier} about unreported invoices"),
            description: format!(
                "GSTIN {gstin} has \u{20b9}{itc:.2} of ITC at risk across {} invoice(s) \
                 ({}) absent from GSTR-2A/2B. Ask the supplier to report them or defer \
                 the credit.",
                numbers.len(),
                numbers.join(", "),
            ),
            priority,
            impact_amount: itc,
        });
    }
    if !unregistered.is_empty() {
        let itc: Decimal = unregistered.iter().map(|e| e.itc_at_risk.total()).sum();
        let numbers: Vec<&str> = unregistered.iter().map(|e| e.invoice_number.as_str()).collect();
        suggestions.push(Suggestion {
            title: "Capture supplier GSTINs for unmatched purchases".into(),
            description: format!(
                "{} purchase invoice(s) ({}) have no supplier GSTIN and cannot be \
                 reconciled; \u{20b9}{itc:.2} of ITC cannot be substantiated.",
                numbers.len(),
                numbers.join(", "),
            ),
            priority: Priority::Medium,
            impact_amount: itc,
        });
    }

    for e in &result.mismatch_value {
        let gap = (e.taxable_value - e.external_taxable_value).abs();
        let priority = if scored(RiskCategory::MismatchValue, &e.invoice_number)
            > cfg.high_risk_cutoff
        {
            Priority::High
        } else {
            Priority::Medium
        };
        suggestions.push(Suggestion {
            title: format!("Verify taxable value of {}", e.invoice_number),
            description: format!(
                "Books show \u{20b9}{:.2} but GSTIN {} reported \u{20b9}{:.2} \
                 (gap \u{20b9}{gap:.2}). Confirm which side is correct and amend.",
                e.taxable_value, e.gstin, e.external_taxable_value,
            ),
            priority,
            impact_amount: gap,
        });
    }

    for e in &result.mismatch_tax {
        let gap = (e.tax.total() - e.external_tax.total()).abs();
        suggestions.push(Suggestion {
            title: format!("Reconcile tax amounts on {}", e.invoice_number),
            description: format!(
                "Taxable value agrees with GSTIN {} but tax differs by \u{20b9}{gap:.2} \
                 (books \u{20b9}{:.2}, reported \u{20b9}{:.2}). Check the rate or \
                 inter/intra-state treatment applied.",
                e.gstin,
                e.tax.total(),
                e.external_tax.total(),
            ),
            priority: Priority::Medium,
            impact_amount: gap,
        });
    }

    // Counterparty-reported invoices missing from books, grouped per GSTIN.
    let mut unbooked: BTreeMap<&str, (usize, Decimal)> = BTreeMap::new();
    for e in &result.not_in_books {
        let slot = unbooked.entry(e.gstin.as_str()).or_insert((0, Decimal::ZERO));
        slot.0 += 1;
        slot.1 += e.taxable_value;
    }
    for (gstin, (count, taxable)) in unbooked {
        suggestions.push(Suggestion {
            title: format!("Record purchases reported by GSTIN {gstin}"),
            description: format!(
                "{count} invoice(s) totalling \u{20b9}{taxable:.2} appear in GSTR-2A/2B \
                 but not in the purchase ledger. Book them or confirm they belong to a \
                 different period.",
            ),
            priority: Priority::Low,
            impact_amount: taxable,
        });
    }

    for w in &result.duplicate_warnings {
        suggestions.push(Suggestion {
            title: format!("Duplicate reporting of {}", w.invoice_number),
            description: format!(
                "GSTIN {} reported invoice {} more than once (\u{20b9}{:.2} selected, \
                 \u{20b9}{:.2} passed over). Flag to the supplier.",
                w.gstin, w.invoice_number, w.selected_taxable_value, w.duplicate_taxable_value,
            ),
            priority: Priority::Low,
            impact_amount: (w.selected_taxable_value - w.duplicate_taxable_value).abs(),
        });
    }

    suggestions.sort_by(|a, b| {
        a.priority
            .cmp(&b.priority)
            .then_with(|| b.impact_amount.cmp(&a.impact_amount))
            .then_with(|| a.title.cmp(&b.title))
    });
    suggestions
}

/// Render suggestions as a plain-text action list for review screens.
pub fn render_report(suggestions: &[Suggestion]) -> String {
    if suggestions.is_empty() {
        return "No action items. All records reconciled.\n".to_string();
    }
    let mut out = String::new();
    for (i, s) in suggestions.iter().enumerate() {
        out.push_str(&format!(
            "{}. [{}] {} (impact \u{20b9}{:.2})\n   {}\n",
            i + 1,
            s.priority,
            s.title,
            s.impact_amount,
            s.description,
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::TaxAmounts;
    use crate::recon::matching::{ReconSummary, ReconciliationResult, UnreportedEntry};
    use crate::core::Period;

    fn empty_result() -> ReconciliationResult {
        ReconciliationResult {
            period: "062024".parse::<Period>().unwrap(),
            matched: vec![],
            mismatch_value: vec![],
            mismatch_tax: vec![],
            not_in_2a: vec![],
            not_in_books: vec![],
            duplicate_warnings: vec![],
            summary: ReconSummary {
                matched: 0,
                mismatch_value: 0,
                mismatch_tax: 0,
                not_in_2a: 0,
                not_in_books: 0,
                duplicates: 0,
                potential_itc_at_risk: Decimal::ZERO,
            },
        }
    }

    fn unreported(number: &str, gstin: &str, tax: Decimal) -> UnreportedEntry {
        UnreportedEntry {
            invoice_id: format!("inv-{number}"),
            invoice_number: number.into(),
            gstin: Some(gstin.into()),
            counterparty_name: Some("Acme Traders".into()),
            taxable_value: tax * dec!(5),
            itc_at_risk: TaxAmounts {
                cgst: tax / dec!(2),
                sgst: tax / dec!(2),
                igst: Decimal::ZERO,
                cess: Decimal::ZERO,
            },
        }
    }

    #[test]
    fn supplier_itc_above_materiality_is_high_priority() {
        let mut result = empty_result();
        result.not_in_2a.push(unreported("INV-1", "27AAAAA0000A1Z5", dec!(40000)));
        result.not_in_2a.push(unreported("INV-2", "27AAAAA0000A1Z5", dec!(15000)));

        let out = generate(&result, &[], &SuggestionConfig::default());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].priority, Priority::High);
        assert_eq!(out[0].impact_amount, dec!(55000));
        assert!(out[0].description.contains("INV-1, INV-2"));
    }

    #[test]
    fn high_risk_score_escalates_below_materiality() {
        use crate::recon::risk::{RiskCategory, RiskItem};

        let mut result = empty_result();
        result.not_in_2a.push(unreported("INV-1", "27AAAAA0000A1Z5", dec!(1800)));

        // ITC well under materiality, but the scorer flags it urgent.
        let risks = vec![RiskItem {
            category: RiskCategory::NotIn2a,
            gstin: Some("27AAAAA0000A1Z5".into()),
            invoice_number: "INV-1".into(),
            book_value: dec!(9000),
            external_value: None,
            tax_exposure: dec!(1800),
            score: dec!(0.9),
        }];

        let out = generate(&result, &risks, &SuggestionConfig::default());
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].priority, Priority::High);
    }

    #[test]
    fn small_isolated_discrepancy_is_medium() {
        let mut result = empty_result();
        result.not_in_2a.push(unreported("INV-1", "27AAAAA0000A1Z5", dec!(1800)));

        let out = generate(&result, &[], &SuggestionConfig::default());
        assert_eq!(out[0].priority, Priority::Medium);
    }

    #[test]
    fn empty_result_renders_clean_report() {
        let out = generate(&empty_result(), &[], &SuggestionConfig::default());
        assert!(out.is_empty());
        assert_eq!(render_report(&out), "No action items. All records reconciled.\n");
    }

    #[test]
    fn ordering_is_priority_then_impact() {
        let mut result = empty_result();
        result.not_in_2a.push(unreported("INV-1", "27AAAAA0000A1Z5", dec!(60000)));
        result.not_in_2a.push(unreported("INV-2", "29BBBBB1111B1Z4", dec!(2000)));
        result.not_in_2a.push(unreported("INV-3", "33CCCCC2222C1Z2", dec!(9000)));

        let out = generate(&result, &[], &SuggestionConfig::default());
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].priority, Priority::High);
        assert_eq!(out[0].impact_amount, dec!(60000));
        assert_eq!(out[1].impact_amount, dec!(9000));
        assert_eq!(out[2].impact_amount, dec!(2000));
    }
}
