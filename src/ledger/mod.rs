//! The business's own invoice ledger.
//!
//! Owns sales and purchase invoices through their lifecycle
//! (`draft`/`extracted` → `verified` → `finalized`) with derived
//! classification, computed totals, and an append-only audit trail.
//!
//! Every mutating operation takes `&mut self`, which is the serialization
//! guarantee for per-business writes: callers wrap the ledger in whatever
//! synchronization their runtime needs, and two mutations can never
//! interleave within one ledger.

mod audit;

pub use audit::AuditEntry;

use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::core::{
    calculate_totals, is_known_state_code, is_valid_gstin_format, validate_invoice,
    validation_failure, GstError, Invoice, InvoiceDirection, InvoiceStatus, Period,
};
use crate::filing::Filing;

/// In-memory invoice ledger for one registered business.
#[derive(Debug, Clone)]
pub struct InvoiceLedger {
    gstin: String,
    home_state: String,
    invoices: BTreeMap<String, Invoice>,
    audit: Vec<AuditEntry>,
    next_seq: u64,
}

impl InvoiceLedger {
    /// Create a ledger for the business identified by `gstin`. The home
    /// state (for intra/inter-state determination) derives from its first
    /// two characters.
    pub fn new(gstin: impl Into<String>) -> Result<Self, GstError> {
        let gstin = gstin.into();
        if !is_valid_gstin_format(&gstin) {
            return Err(GstError::Validation(format!(
                "'{gstin}' is not a structurally valid GSTIN"
            )));
        }
        let home_state = gstin[..2].to_string();
        Ok(Self {
            gstin,
            home_state,
            invoices: BTreeMap::new(),
            audit: Vec::new(),
            next_seq: 1,
        })
    }

    pub fn gstin(&self) -> &str {
        &self.gstin
    }

    pub fn home_state(&self) -> &str {
        &self.home_state
    }

    /// Add a manually entered invoice in `draft` status.
    /// Returns the ledger-assigned id.
    pub fn create(&mut self, draft: Invoice, actor: &str) -> Result<String, GstError> {
        self.admit(draft, InvoiceStatus::Draft, actor)
    }

    /// Seed an invoice from document-intelligence output in `extracted`
    /// status. Extraction output is untrusted input and goes through the
    /// same admission checks as manual entry.
    pub fn create_extracted(&mut self, draft: Invoice, actor: &str) -> Result<String, GstError> {
        self.admit(draft, InvoiceStatus::Extracted, actor)
    }

    fn admit(
        &mut self,
        mut invoice: Invoice,
        status: InvoiceStatus,
        actor: &str,
    ) -> Result<String, GstError> {
        self.check_shape(&invoice)?;
        calculate_totals(&mut invoice, &self.home_state)?;
        invoice.category = Some(invoice.classify(&self.home_state));
        invoice.status = status;
        invoice.filing_id = None;

        let id = format!("inv-{:06}", self.next_seq);
        self.next_seq += 1;
        invoice.id = id.clone();

        self.audit.push(AuditEntry::record(&id, None, status, actor));
        info!(invoice = %id, number = %invoice.number, %status, "invoice admitted to ledger");
        self.invoices.insert(id.clone(), invoice);
        Ok(id)
    }

    /// Malformed-value checks that reject before any state change. Missing
    /// optional particulars are tolerated in a draft; they block `verify`.
    fn check_shape(&self, invoice: &Invoice) -> Result<(), GstError> {
        if let Some(gstin) = &invoice.counterparty_gstin {
            if !is_valid_gstin_format(gstin) {
                return Err(GstError::Validation(format!(
                    "counterparty_gstin: '{gstin}' is not a structurally valid GSTIN"
                )));
            }
        }
        if !is_known_state_code(&invoice.place_of_supply) {
            return Err(GstError::Validation(format!(
                "place_of_supply: '{}' is not a known GST state code",
                invoice.place_of_supply
            )));
        }
        Ok(())
    }

    /// Replace the content of a `draft`/`extracted` invoice. Identity,
    /// status, and audit history are preserved; totals and classification
    /// are recomputed.
    pub fn update(&mut self, id: &str, draft: Invoice) -> Result<(), GstError> {
        let current = self.get(id)?;
        let status = current.status;
        if !matches!(status, InvoiceStatus::Draft | InvoiceStatus::Extracted) {
            return Err(GstError::Conflict(format!(
                "invoice {id} in status '{status}' can no longer be edited"
            )));
        }

        let mut updated = draft;
        self.check_shape(&updated)?;
        calculate_totals(&mut updated, &self.home_state)?;
        updated.category = Some(updated.classify(&self.home_state));
        updated.id = id.to_string();
        updated.status = status;
        updated.filing_id = None;

        debug!(invoice = %id, "invoice updated");
        self.invoices.insert(id.to_string(), updated);
        Ok(())
    }

    /// Remove a `draft`/`extracted` invoice, returning it.
    pub fn delete(&mut self, id: &str) -> Result<Invoice, GstError> {
        let current = self.get(id)?;
        if !matches!(current.status, InvoiceStatus::Draft | InvoiceStatus::Extracted) {
            return Err(GstError::Conflict(format!(
                "invoice {id} in status '{}' can no longer be deleted",
                current.status
            )));
        }
        debug!(invoice = %id, "invoice deleted");
        Ok(self.invoices.remove(id).expect("presence checked above"))
    }

    /// Move an invoice to `verified` after explicit review. Fails if any
    /// required particular is missing or malformed.
    pub fn verify(&mut self, id: &str, actor: &str) -> Result<(), GstError> {
        let invoice = self.get(id)?;
        let from = invoice.status;
        if !matches!(from, InvoiceStatus::Draft | InvoiceStatus::Extracted) {
            return Err(GstError::InvalidTransition {
                from: from.to_string(),
                attempted: InvoiceStatus::Verified.to_string(),
            });
        }

        let errors = validate_invoice(invoice);
        if !errors.is_empty() {
            return Err(validation_failure(&errors));
        }

        self.transition(id, from, InvoiceStatus::Verified, actor);
        Ok(())
    }

    /// Move a `verified` invoice to `finalized`, binding it to a filed
    /// return. A finalized invoice is immutable.
    pub fn finalize(&mut self, id: &str, filing: &Filing, actor: &str) -> Result<(), GstError> {
        let invoice = self.get(id)?;
        let from = invoice.status;
        if from != InvoiceStatus::Verified {
            return Err(GstError::InvalidTransition {
                from: from.to_string(),
                attempted: InvoiceStatus::Finalized.to_string(),
            });
        }
        if !filing.is_filed() {
            return Err(GstError::Validation(format!(
                "invoice {id} can only be finalized under a filed return; filing {} is '{}'",
                filing.id,
                filing.status
            )));
        }

        self.transition(id, from, InvoiceStatus::Finalized, actor);
        let invoice = self.invoices.get_mut(id).expect("presence checked above");
        invoice.filing_id = Some(filing.id.clone());
        Ok(())
    }

    fn transition(&mut self, id: &str, from: InvoiceStatus, to: InvoiceStatus, actor: &str) {
        self.audit.push(AuditEntry::record(id, Some(from), to, actor));
        let invoice = self.invoices.get_mut(id).expect("caller verified presence");
        invoice.status = to;
        info!(invoice = %id, %from, %to, %actor, "invoice status transition");
    }

    pub fn get(&self, id: &str) -> Result<&Invoice, GstError> {
        self.invoices.get(id).ok_or_else(|| GstError::NotFound {
            kind: "invoice",
            id: id.to_string(),
        })
    }

    /// All invoices, in id order.
    pub fn invoices(&self) -> impl Iterator<Item = &Invoice> {
        self.invoices.values()
    }

    /// Invoices of one direction dated within the period, in id order.
    pub fn invoices_for(&self, period: Period, direction: InvoiceDirection) -> Vec<&Invoice> {
        self.invoices
            .values()
            .filter(|inv| inv.direction == direction && period.contains(inv.date))
            .collect()
    }

    pub fn sales_for(&self, period: Period) -> Vec<&Invoice> {
        self.invoices_for(period, InvoiceDirection::Sales)
    }

    pub fn purchases_for(&self, period: Period) -> Vec<&Invoice> {
        self.invoices_for(period, InvoiceDirection::Purchase)
    }

    /// Audit entries for one invoice, oldest first.
    pub fn audit_trail(&self, id: &str) -> Vec<&AuditEntry> {
        self.audit.iter().filter(|e| e.invoice_id == id).collect()
    }

    /// Full audit log, oldest first.
    pub fn audit_log(&self) -> &[AuditEntry] {
        &self.audit
    }

    /// Invoice count per lifecycle status.
    pub fn status_counts(&self) -> [(InvoiceStatus, usize); 4] {
        let mut counts = [
            (InvoiceStatus::Draft, 0),
            (InvoiceStatus::Extracted, 0),
            (InvoiceStatus::Verified, 0),
            (InvoiceStatus::Finalized, 0),
        ];
        for inv in self.invoices.values() {
            for slot in &mut counts {
                if slot.0 == inv.status {
                    slot.1 += 1;
                }
            }
        }
        counts
    }

    pub fn len(&self) -> usize {
        self.invoices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.invoices.is_empty()
    }
}
