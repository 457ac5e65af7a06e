use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::InvoiceStatus;

/// One immutable audit trail entry, appended on every invoice status
/// transition. Required for CA accountability — never edited or removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub invoice_id: String,
    /// Previous status; `None` for the creating transition.
    pub from: Option<InvoiceStatus>,
    pub to: InvoiceStatus,
    /// Who performed the action (user id, CA id, or system principal).
    pub actor: String,
    pub at: DateTime<Utc>,
}

impl AuditEntry {
    pub(crate) fn record(
        invoice_id: &str,
        from: Option<InvoiceStatus>,
        to: InvoiceStatus,
        actor: &str,
    ) -> Self {
        Self {
            invoice_id: invoice_id.to_string(),
            from,
            to,
            actor: actor.to_string(),
            at: Utc::now(),
        }
    }
}
