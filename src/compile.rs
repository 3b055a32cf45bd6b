//! The period compiler: folds extracted rows into canonical per-month
//! datasets. Rows inherit their source file's classification, are
//! validated against the report schema, deduplicated last-write-wins,
//! and the resulting datasets replace whatever the store held for their
//! keys.

use std::collections::HashMap;

use chrono::Utc;
use indexmap::IndexMap;
use tracing::{info, instrument, warn};

use crate::classify::{self, Classification};
use crate::error::{ClassifyError, RejectReason};
use crate::gstin;
use crate::model::{
    CellValue, CompiledDataset, CompiledRow, DatasetKey, RawRow, RejectedRow, ReportType,
    ValidationOutcome,
};
use crate::schema;
use crate::store::DatasetStore;

/// Outcome of one compile call: which keys were rebuilt, plus row
/// accounting. Rejections carry reason codes for display; deduplicated
/// rows are a merge policy, not an error.
#[derive(Debug)]
pub struct CompileSummary {
    pub datasets: Vec<DatasetKey>,
    /// Rows that passed validation, before deduplication.
    pub accepted: usize,
    pub rejected: Vec<RejectedRow>,
    pub deduplicated: usize,
    /// Files whose name failed classification; all their rows were turned
    /// away without touching other files in the batch.
    pub file_errors: Vec<(String, ClassifyError)>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum RowKey {
    /// Identifier plus document number.
    Document(String, String),
    /// Canonical JSON of the full row, for rows without a document number.
    Fingerprint(String),
}

#[derive(Debug, Default)]
struct Bucket {
    rows: IndexMap<RowKey, CompiledRow>,
    source_files: Vec<String>,
    accepted: usize,
    rejected: usize,
    deduplicated: usize,
}

/// Compiles a batch of rows for one project. Produces one dataset per
/// distinct (financial year, report type, month) observed among accepted
/// rows; each replaces the store's previous dataset for that key
/// atomically.
#[instrument(level = "info", skip_all, fields(project = %project, rows = rows.len()))]
pub fn compile(store: &DatasetStore, project: &str, rows: &[RawRow]) -> CompileSummary {
    let mut classifications: HashMap<&str, Result<Classification, ClassifyError>> = HashMap::new();
    let mut buckets: IndexMap<DatasetKey, Bucket> = IndexMap::new();
    let mut rejected: Vec<RejectedRow> = Vec::new();
    let mut file_errors: Vec<(String, ClassifyError)> = Vec::new();

    for row in rows {
        let classification = *classifications
            .entry(row.source_file.as_str())
            .or_insert_with(|| classify::classify(&row.source_file));

        let classification = match classification {
            Ok(classification) => classification,
            Err(error) => {
                if !file_errors.iter().any(|(file, _)| file == &row.source_file) {
                    warn!(file = %row.source_file, %error, "source file not classifiable, rows rejected");
                    file_errors.push((row.source_file.clone(), error));
                }
                rejected.push(RejectedRow::new(row, RejectReason::Unclassified(error)));
                continue;
            }
        };

        let key = DatasetKey {
            project: project.to_string(),
            financial_year: classification.period.financial_year(),
            report: classification.report,
            month: classification.period.month,
        };
        let bucket = buckets.entry(key).or_default();

        match validate_row(row, classification.report) {
            ValidationOutcome::Accepted(compiled) => {
                bucket.accepted += 1;
                if !bucket.source_files.contains(&row.source_file) {
                    bucket.source_files.push(row.source_file.clone());
                }
                let dedup_key = dedup_key(&compiled, row);
                if bucket.rows.insert(dedup_key, compiled).is_some() {
                    bucket.deduplicated += 1;
                }
            }
            ValidationOutcome::Rejected(rejection) => {
                bucket.rejected += 1;
                rejected.push(rejection);
            }
        }
    }

    let mut accepted = 0;
    let mut deduplicated = 0;
    let mut datasets = Vec::new();
    for (key, bucket) in buckets {
        accepted += bucket.accepted;
        deduplicated += bucket.deduplicated;
        if bucket.rows.is_empty() {
            continue;
        }
        let dataset = CompiledDataset {
            key: key.clone(),
            rows: bucket.rows.into_values().collect(),
            source_files: bucket.source_files,
            compiled_at: Utc::now(),
            accepted: bucket.accepted,
            rejected: bucket.rejected,
            deduplicated: bucket.deduplicated,
        };
        store.replace(dataset);
        datasets.push(key);
    }

    info!(
        accepted,
        rejected = rejected.len(),
        deduplicated,
        datasets = datasets.len(),
        "compile finished"
    );

    CompileSummary {
        datasets,
        accepted,
        rejected,
        deduplicated,
        file_errors,
    }
}

/// Validates one row against its report schema.
pub fn validate_row(row: &RawRow, report: ReportType) -> ValidationOutcome {
    let schema = schema::for_report(report);

    for column in schema.required {
        if row.cell(column).is_empty() {
            return ValidationOutcome::Rejected(RejectedRow::new(
                row,
                RejectReason::MissingField((*column).to_string()),
            ));
        }
    }

    let raw_identifier = row
        .cell(schema.identifier_column)
        .key_string()
        .unwrap_or_default();
    let identifier = match gstin::validate(&raw_identifier) {
        Ok(identifier) => identifier,
        Err(reason) => {
            return ValidationOutcome::Rejected(RejectedRow::new(
                row,
                RejectReason::InvalidIdentifier {
                    value: raw_identifier,
                    reason,
                },
            ));
        }
    };

    let mut amounts = Vec::with_capacity(schema.amount_columns.len());
    for column in schema.amount_columns {
        let cell = row.cell(column);
        match cell.as_amount() {
            Some(amount) => amounts.push(amount),
            None => {
                return ValidationOutcome::Rejected(RejectedRow::new(
                    row,
                    RejectReason::MalformedAmount {
                        column: (*column).to_string(),
                        value: cell.key_string().unwrap_or_default(),
                    },
                ));
            }
        }
    }

    let document = row.cell(schema.document_column).key_string();
    let document_date = match row.cell(schema.date_column) {
        CellValue::Date(date) => Some(*date),
        _ => None,
    };

    ValidationOutcome::Accepted(CompiledRow {
        identifier: identifier.as_str().to_string(),
        document,
        document_date,
        amounts,
        source_file: row.source_file.clone(),
    })
}

fn dedup_key(compiled: &CompiledRow, row: &RawRow) -> RowKey {
    match &compiled.document {
        Some(document) => RowKey::Document(compiled.identifier.clone(), document.clone()),
        None => RowKey::Fingerprint(
            serde_json::to_string(&row.cells)
                .unwrap_or_else(|_| format!("{:?}", row.cells)),
        ),
    }
}
