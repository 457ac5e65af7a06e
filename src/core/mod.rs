//! Core data model, statutory constants, and tax arithmetic.
//!
//! Foundational types for the GST compliance engine: invoices and their
//! lifecycle, filing periods, the tax calculator, and GSTIN/state-code
//! validation.

mod builder;
mod error;
mod period;
pub mod states;
pub mod tax;
mod types;
mod validation;

pub use builder::*;
pub use error::*;
pub use period::Period;
pub use states::{is_known_state_code, state_name, EXPORT_STATE_CODE};
pub use tax::{compute_line_tax, is_valid_rate, round_half_up, GST_RATE_SLABS};
pub use types::*;
pub use validation::*;
