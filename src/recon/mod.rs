//! The reconciliation path: ingested GSTR-2A/2B records, the matching
//! engine, risk scoring, and remediation suggestions.
//!
//! Everything past ingestion is a pure derivation — matching, scoring, and
//! suggestion output are recomputed from ledger and store state, never
//! cached or mutated in place.

mod external;
pub mod matching;
pub mod risk;
pub mod suggest;

pub use external::ExternalRecordStore;
pub use matching::{
    reconcile, DuplicateWarning, PairedEntry, ReconSummary, ReconciliationResult,
    ToleranceConfig, UnbookedEntry, UnreportedEntry,
};
pub use risk::{score_result, RiskCategory, RiskConfig, RiskItem};
pub use suggest::{generate as generate_suggestions, render_report, Priority, Suggestion, SuggestionConfig};
