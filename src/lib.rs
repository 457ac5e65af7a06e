//! # milaan
//!
//! GST compliance engine for Indian registered businesses: invoice ledger
//! with lifecycle and audit trail, GSTR-2A/2B reconciliation with risk
//! scoring and remediation suggestions, and GSTR-1/GSTR-3B return
//! generation through a CA-review filing lifecycle.
//!
//! All monetary values use [`rust_decimal::Decimal`] — never floating point.
//! Rounding is half-up to two decimal places, applied at the line level
//! before summation, matching statutory return conventions.
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::NaiveDate;
//! use milaan::core::*;
//! use milaan::ledger::InvoiceLedger;
//! use rust_decimal_macros::dec;
//!
//! let mut ledger = InvoiceLedger::new("27AABCU9603R1ZM").unwrap();
//!
//! let draft = InvoiceBuilder::new(
//!     "INV-2024-001",
//!     NaiveDate::from_ymd_opt(2024, 6, 15).unwrap(),
//!     InvoiceDirection::Sales,
//! )
//! .counterparty("29AAAAA0000A1Z3", "Bengaluru Buyer")
//! .place_of_supply("29")
//! .add_line(
//!     LineItemBuilder::new("Consulting", "9983", dec!(10), dec!(1500))
//!         .tax(dec!(18))
//!         .build(),
//! )
//! .draft();
//!
//! let id = ledger.create(draft, "ops@acme").unwrap();
//! let invoice = ledger.get(&id).unwrap();
//!
//! // Inter-state supply: full rate as IGST.
//! assert_eq!(invoice.tax_amounts().igst, dec!(2700.00));
//! assert_eq!(invoice.grand_total(), dec!(17700.00));
//! assert_eq!(invoice.category, Some(InvoiceCategory::B2b));
//! ```
//!
//! The engine is transport-agnostic and does no I/O of its own. Mutating
//! operations take `&mut self` on the owning store, which is the
//! serialization contract: wrap each business's stores in whatever
//! synchronization the runtime provides, and per-business writes cannot
//! interleave. Reconciliation, risk scoring, and return summaries are pure
//! functions, safe to run in parallel across periods or businesses.

pub mod core;
pub mod filing;
pub mod ledger;
pub mod recon;
pub mod returns;

// Re-export core types at crate root for convenience
pub use crate::core::*;
