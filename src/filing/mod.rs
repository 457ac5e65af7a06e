//! Filing lifecycle: generated return summaries moving through CA review to
//! the filed, terminal state.
//!
//! One [`Filing`] exists per (return type, period); the register enforces
//! that uniqueness, so regenerating a summary before submission updates the
//! existing row instead of creating a second one.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::core::{GstError, Period};
use crate::ledger::InvoiceLedger;
use crate::recon::ReconciliationResult;
use crate::returns::{build_gstr1, build_gstr3b, Gstr1Summary, Gstr3bSummary};

/// Which statutory return a filing covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReturnType {
    Gstr1,
    Gstr3b,
}

impl ReturnType {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Gstr1 => "GSTR1",
            Self::Gstr3b => "GSTR3B",
        }
    }
}

impl std::fmt::Display for ReturnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Gstr1 => write!(f, "GSTR-1"),
            Self::Gstr3b => write!(f, "GSTR-3B"),
        }
    }
}

/// Filing lifecycle state.
///
/// `draft` → `pending_review` → `ca_approved` → `exported` → `filed`, with
/// `ca_rejected` looping back: a rejected filing may be regenerated and
/// resubmitted. `filed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilingStatus {
    Draft,
    PendingReview,
    CaApproved,
    CaRejected,
    Exported,
    Filed,
}

impl std::fmt::Display for FilingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Draft => "draft",
            Self::PendingReview => "pending_review",
            Self::CaApproved => "ca_approved",
            Self::CaRejected => "ca_rejected",
            Self::Exported => "exported",
            Self::Filed => "filed",
        };
        f.write_str(s)
    }
}

/// The most recent CA verdict on a filing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewNote {
    pub reviewer: String,
    pub comments: String,
    pub approved: bool,
    pub at: DateTime<Utc>,
}

/// One lifecycle event, appended on every transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilingEvent {
    pub from: Option<FilingStatus>,
    pub to: FilingStatus,
    pub actor: String,
    pub note: Option<String>,
    pub at: DateTime<Utc>,
}

/// The generated summary a filing carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "return_type", rename_all = "lowercase")]
pub enum ReturnSummary {
    Gstr1(Gstr1Summary),
    Gstr3b(Gstr3bSummary),
}

impl ReturnSummary {
    /// Nil returns (no documents, no credit) are still legitimate filings.
    pub fn is_nil(&self) -> bool {
        match self {
            Self::Gstr1(s) => s.nil,
            Self::Gstr3b(s) => s.nil,
        }
    }
}

/// One return filing for a (return type, period).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filing {
    /// Register-assigned identifier, e.g. "GSTR1-062024".
    pub id: String,
    pub return_type: ReturnType,
    pub period: Period,
    pub status: FilingStatus,
    pub summary: ReturnSummary,
    /// Latest CA verdict, cleared on regeneration.
    pub review: Option<ReviewNote>,
    /// Acknowledgement Reference Number, set when filed.
    pub arn: Option<String>,
    pub filed_date: Option<NaiveDate>,
    /// Append-only lifecycle history.
    pub history: Vec<FilingEvent>,
}

impl Filing {
    pub fn is_filed(&self) -> bool {
        self.status == FilingStatus::Filed
    }
}

/// Register of filings for one business, keyed by (return type, period).
#[derive(Debug, Clone, Default)]
pub struct FilingRegister {
    filings: BTreeMap<(ReturnType, Period), Filing>,
}

impl FilingRegister {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate (or regenerate) the GSTR-1 filing for a period from current
    /// ledger state.
    ///
    /// Regeneration is only allowed while the filing is in `draft` or
    /// `ca_rejected`; once submitted, the summary under review must not
    /// shift underneath the reviewer.
    pub fn generate_gstr1(
        &mut self,
        ledger: &InvoiceLedger,
        period: Period,
        actor: &str,
    ) -> Result<&Filing, GstError> {
        let summary = ReturnSummary::Gstr1(build_gstr1(ledger, period));
        self.upsert(ReturnType::Gstr1, period, summary, actor)
    }

    /// Generate (or regenerate) the GSTR-3B filing for a period. Pass the
    /// latest reconciliation run so ITC can be claimed; without one, ITC is
    /// zero and the summary carries a warning.
    pub fn generate_gstr3b(
        &mut self,
        ledger: &InvoiceLedger,
        period: Period,
        recon: Option<&ReconciliationResult>,
        actor: &str,
    ) -> Result<&Filing, GstError> {
        let summary = ReturnSummary::Gstr3b(build_gstr3b(ledger, period, recon));
        self.upsert(ReturnType::Gstr3b, period, summary, actor)
    }

    fn upsert(
        &mut self,
        return_type: ReturnType,
        period: Period,
        summary: ReturnSummary,
        actor: &str,
    ) -> Result<&Filing, GstError> {
        let key = (return_type, period);
        if self.filings.contains_key(&key) {
            let existing = self.filings.get_mut(&key).expect("presence checked above");
            if !matches!(
                existing.status,
                FilingStatus::Draft | FilingStatus::CaRejected
            ) {
                return Err(GstError::Conflict(format!(
                    "{return_type} for {period} is '{}' and cannot be regenerated",
                    existing.status
                )));
            }
            let from = existing.status;
            existing.summary = summary;
            existing.review = None;
            existing.status = FilingStatus::Draft;
            existing
                .history
                .push(event(Some(from), FilingStatus::Draft, actor, None));
            info!(filing = %existing.id, "filing summary regenerated");
        } else {
            let id = format!("{}-{}", return_type.code(), period);
            let filing = Filing {
                id: id.clone(),
                return_type,
                period,
                status: FilingStatus::Draft,
                summary,
                review: None,
                arn: None,
                filed_date: None,
                history: vec![event(None, FilingStatus::Draft, actor, None)],
            };
            info!(filing = %id, "filing generated");
            self.filings.insert(key, filing);
        }
        Ok(&self.filings[&key])
    }

    /// Submit a draft filing for CA review. An empty summary has nothing to
    /// review and is rejected; regenerate once the period has documents.
    pub fn submit_for_review(
        &mut self,
        return_type: ReturnType,
        period: Period,
        actor: &str,
    ) -> Result<(), GstError> {
        let filing = self.get_mut(return_type, period)?;
        guard(
            filing,
            &[FilingStatus::Draft, FilingStatus::CaRejected],
            FilingStatus::PendingReview,
        )?;
        if filing.summary.is_nil() {
            return Err(GstError::Validation(format!(
                "{return_type} for {period} has an empty summary; nothing to review"
            )));
        }
        transition(filing, FilingStatus::PendingReview, actor, None);
        Ok(())
    }

    /// Record CA approval. An explicit authorization event, never a side
    /// effect of another action.
    pub fn ca_approve(
        &mut self,
        return_type: ReturnType,
        period: Period,
        reviewer: &str,
        comments: &str,
    ) -> Result<(), GstError> {
        let filing = self.get_mut(return_type, period)?;
        guard(filing, &[FilingStatus::PendingReview], FilingStatus::CaApproved)?;
        if reviewer.trim().is_empty() {
            return Err(GstError::Validation(
                "reviewer identity is required for approval".into(),
            ));
        }
        filing.review = Some(ReviewNote {
            reviewer: reviewer.to_string(),
            comments: comments.to_string(),
            approved: true,
            at: Utc::now(),
        });
        transition(
            filing,
            FilingStatus::CaApproved,
            reviewer,
            non_empty(comments),
        );
        Ok(())
    }

    /// Record CA rejection; comments are mandatory so the preparer knows
    /// what to fix. The filing loops back through regeneration.
    pub fn ca_reject(
        &mut self,
        return_type: ReturnType,
        period: Period,
        reviewer: &str,
        comments: &str,
    ) -> Result<(), GstError> {
        let filing = self.get_mut(return_type, period)?;
        guard(filing, &[FilingStatus::PendingReview], FilingStatus::CaRejected)?;
        if reviewer.trim().is_empty() {
            return Err(GstError::Validation(
                "reviewer identity is required for rejection".into(),
            ));
        }
        if comments.trim().is_empty() {
            return Err(GstError::Validation(
                "rejection comments are mandatory".into(),
            ));
        }
        filing.review = Some(ReviewNote {
            reviewer: reviewer.to_string(),
            comments: comments.to_string(),
            approved: false,
            at: Utc::now(),
        });
        transition(
            filing,
            FilingStatus::CaRejected,
            reviewer,
            Some(comments.to_string()),
        );
        Ok(())
    }

    /// Mark the approved summary as handed to the export service.
    pub fn mark_exported(
        &mut self,
        return_type: ReturnType,
        period: Period,
        actor: &str,
    ) -> Result<(), GstError> {
        let filing = self.get_mut(return_type, period)?;
        guard(filing, &[FilingStatus::CaApproved], FilingStatus::Exported)?;
        transition(filing, FilingStatus::Exported, actor, None);
        Ok(())
    }

    /// Record the portal acknowledgement. Requires an `exported` predecessor
    /// and a non-empty ARN. Terminal.
    pub fn mark_as_filed(
        &mut self,
        return_type: ReturnType,
        period: Period,
        arn: &str,
        filed_date: NaiveDate,
        actor: &str,
    ) -> Result<(), GstError> {
        let filing = self.get_mut(return_type, period)?;
        guard(filing, &[FilingStatus::Exported], FilingStatus::Filed)?;
        if arn.trim().is_empty() {
            return Err(GstError::Validation(
                "ARN is required to mark a filing as filed".into(),
            ));
        }
        filing.arn = Some(arn.trim().to_string());
        filing.filed_date = Some(filed_date);
        transition(filing, FilingStatus::Filed, actor, Some(format!("ARN {arn}")));
        Ok(())
    }

    pub fn get(&self, return_type: ReturnType, period: Period) -> Result<&Filing, GstError> {
        self.filings
            .get(&(return_type, period))
            .ok_or_else(|| GstError::NotFound {
                kind: "filing",
                id: format!("{}-{}", return_type.code(), period),
            })
    }

    fn get_mut(
        &mut self,
        return_type: ReturnType,
        period: Period,
    ) -> Result<&mut Filing, GstError> {
        self.filings
            .get_mut(&(return_type, period))
            .ok_or_else(|| GstError::NotFound {
                kind: "filing",
                id: format!("{}-{}", return_type.code(), period),
            })
    }

    /// Current status of a period's filing, if one has been generated.
    pub fn status_of(&self, return_type: ReturnType, period: Period) -> Option<FilingStatus> {
        self.filings.get(&(return_type, period)).map(|f| f.status)
    }

    /// All filings, ordered by (return type, period).
    pub fn filings(&self) -> impl Iterator<Item = &Filing> {
        self.filings.values()
    }

    /// Filings awaiting CA review, for external polling.
    pub fn pending_review_count(&self) -> usize {
        self.filings
            .values()
            .filter(|f| f.status == FilingStatus::PendingReview)
            .count()
    }

    pub fn len(&self) -> usize {
        self.filings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filings.is_empty()
    }
}

fn guard(
    filing: &Filing,
    allowed_from: &[FilingStatus],
    attempted: FilingStatus,
) -> Result<(), GstError> {
    if allowed_from.contains(&filing.status) {
        Ok(())
    } else {
        Err(GstError::InvalidTransition {
            from: filing.status.to_string(),
            attempted: attempted.to_string(),
        })
    }
}

fn transition(filing: &mut Filing, to: FilingStatus, actor: &str, note: Option<String>) {
    let from = filing.status;
    filing.status = to;
    filing.history.push(event(Some(from), to, actor, note));
    info!(filing = %filing.id, %from, %to, %actor, "filing status transition");
}

fn event(
    from: Option<FilingStatus>,
    to: FilingStatus,
    actor: &str,
    note: Option<String>,
) -> FilingEvent {
    FilingEvent {
        from,
        to,
        actor: actor.to_string(),
        note,
        at: Utc::now(),
    }
}

fn non_empty(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
