//! Statutory return summaries and the compliance dashboard.
//!
//! Summaries are pure derivations of ledger (and reconciliation) state:
//! generating twice against unchanged inputs yields equal output, and
//! per-line taxes are summed as computed, never recomputed from totals.

mod dashboard;
mod gstr1;
mod gstr3b;

pub use dashboard::{build_dashboard, Dashboard, DueDates};
pub use gstr1::{build_gstr1, Gstr1Summary, SectionTotals};
pub use gstr3b::{build_gstr3b, Gstr3bSummary};
