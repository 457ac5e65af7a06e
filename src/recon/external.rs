use std::collections::BTreeMap;

use tracing::info;

use crate::core::{
    is_valid_gstin_format, ExternalRecord, ExternalSource, GstError, Period, ValidationError,
    validation_failure,
};

/// Store of counterparty-reported GSTR-2A/2B rows, keyed by (source, period).
///
/// Rows are immutable once ingested; correction is by re-ingesting the whole
/// (source, period) set, which replaces the previous upload atomically —
/// either every row is accepted or the prior set is left untouched.
#[derive(Debug, Clone, Default)]
pub struct ExternalRecordStore {
    records: BTreeMap<(ExternalSource, Period), Vec<ExternalRecord>>,
}

impl ExternalRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all records for (source, period) with `rows`.
    ///
    /// Every row is validated before anything is written; a single bad row
    /// rejects the whole upload and leaves the previous set in place.
    /// Returns the number of rows stored.
    pub fn ingest(
        &mut self,
        source: ExternalSource,
        period: Period,
        rows: Vec<ExternalRecord>,
    ) -> Result<usize, GstError> {
        let mut errors = Vec::new();
        for (i, row) in rows.iter().enumerate() {
            validate_row(row, i, &mut errors);
        }
        if !errors.is_empty() {
            return Err(validation_failure(&errors));
        }

        // Stamp the slot identity onto each row so a parser slip in the
        // upload mapping cannot cross-file records.
        let rows: Vec<ExternalRecord> = rows
            .into_iter()
            .map(|mut row| {
                row.source = source;
                row.period = period;
                row
            })
            .collect();

        let count = rows.len();
        let replaced = self.records.insert((source, period), rows);
        info!(
            %source,
            %period,
            rows = count,
            replaced = replaced.map(|r| r.len()).unwrap_or(0),
            "external records ingested"
        );
        Ok(count)
    }

    /// All records for (period, source), in upload order. Empty if no file
    /// has been ingested for the slot.
    pub fn records_for(&self, period: Period, source: ExternalSource) -> &[ExternalRecord] {
        self.records
            .get(&(source, period))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Whether any upload exists for the period, from either source.
    pub fn has_upload_for(&self, period: Period) -> bool {
        self.records.contains_key(&(ExternalSource::TwoA, period))
            || self.records.contains_key(&(ExternalSource::TwoB, period))
    }
}

fn validate_row(row: &ExternalRecord, index: usize, errors: &mut Vec<ValidationError>) {
    let prefix = format!("rows[{index}]");

    if !is_valid_gstin_format(&row.gstin) {
        errors.push(ValidationError::new(
            format!("{prefix}.gstin"),
            format!("'{}' is not a structurally valid GSTIN", row.gstin),
        ));
    }

    if row.invoice_number.trim().is_empty() {
        errors.push(ValidationError::new(
            format!("{prefix}.invoice_number"),
            "invoice number must not be empty",
        ));
    }

    if row.taxable_value.is_sign_negative() {
        errors.push(ValidationError::new(
            format!("{prefix}.taxable_value"),
            "taxable value must not be negative",
        ));
    }
}
