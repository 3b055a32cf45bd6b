use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::RejectReason;
use crate::schema;

/// The two supported report families. The variant determines the column
/// schema applied downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReportType {
    Gstr1,
    Gstr2a,
}

impl ReportType {
    pub const ALL: [ReportType; 2] = [ReportType::Gstr1, ReportType::Gstr2a];

    /// Fixed sheet name used in uploads and in the output workbook.
    pub fn sheet_name(self) -> &'static str {
        match self {
            ReportType::Gstr1 => "GSTR1",
            ReportType::Gstr2a => "GSTR2A",
        }
    }
}

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sheet_name())
    }
}

/// The calendar month a report covers. Parsed from a filename, never
/// mutated afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilingPeriod {
    /// Calendar month, 1–12.
    pub month: u32,
    /// Four-digit calendar year.
    pub year: i32,
}

const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

impl FilingPeriod {
    /// Financial year this period falls into (April–March cycle).
    pub fn financial_year(self) -> FinancialYear {
        if self.month >= 4 {
            FinancialYear(self.year)
        } else {
            FinancialYear(self.year - 1)
        }
    }

    /// `Apr-24` style label used in summaries and sheet cells.
    pub fn label(self) -> String {
        let name = self
            .month
            .checked_sub(1)
            .and_then(|index| MONTH_NAMES.get(index as usize))
            .copied()
            .unwrap_or("???");
        format!("{}-{:02}", name, self.year.rem_euclid(100))
    }
}

impl fmt::Display for FilingPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// A twelve-month accounting cycle starting in April, identified by the
/// calendar year of its April start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FinancialYear(pub i32);

impl FinancialYear {
    /// Calendar year the cycle starts in.
    pub fn starting_year(self) -> i32 {
        self.0
    }

    /// `2024-25` style label.
    pub fn label(self) -> String {
        format!("{}-{:02}", self.0, (self.0 + 1).rem_euclid(100))
    }

    /// The twelve (month, calendar year) pairs of the cycle, April first.
    pub fn months(self) -> [(u32, i32); 12] {
        let mut out = [(0u32, 0i32); 12];
        for (index, month) in (4..=12u32).chain(1..=3).enumerate() {
            let year = if month >= 4 { self.0 } else { self.0 + 1 };
            out[index] = (month, year);
        }
        out
    }
}

impl fmt::Display for FinancialYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// A single spreadsheet cell, tagged so row validation stays exhaustive
/// and no type coercion happens silently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum CellValue {
    Text(String),
    Number(f64),
    Date(NaiveDate),
    Empty,
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Numeric reading of the cell. Empty cells count as zero; text must
    /// parse after trimming (comma thousands separators tolerated); dates
    /// never read as amounts.
    pub fn as_amount(&self) -> Option<f64> {
        match self {
            CellValue::Number(value) => Some(*value),
            CellValue::Empty => Some(0.0),
            CellValue::Text(text) => text.trim().replace(',', "").parse().ok(),
            CellValue::Date(_) => None,
        }
    }

    /// Canonical string form used for identifier and document-number
    /// columns. Whole numbers drop the trailing `.0` a float cell carries.
    pub fn key_string(&self) -> Option<String> {
        match self {
            CellValue::Text(text) => {
                let trimmed = text.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            CellValue::Number(value) => {
                if value.fract() == 0.0 {
                    Some(format!("{}", *value as i64))
                } else {
                    Some(value.to_string())
                }
            }
            CellValue::Date(date) => Some(date.to_string()),
            CellValue::Empty => None,
        }
    }
}

/// One extracted spreadsheet record: header-mapped cells plus the
/// provenance needed to classify and report on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRow {
    pub source_file: String,
    pub sheet: String,
    /// Zero-based index among the sheet's data rows.
    pub row_index: u32,
    pub cells: BTreeMap<String, CellValue>,
}

static EMPTY_CELL: CellValue = CellValue::Empty;

impl RawRow {
    pub fn cell(&self, column: &str) -> &CellValue {
        self.cells.get(column).unwrap_or(&EMPTY_CELL)
    }
}

/// A validated, schema-shaped row ready for aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledRow {
    /// Normalized registration identifier.
    pub identifier: String,
    /// Document (invoice) number, when the schema column is populated.
    pub document: Option<String>,
    pub document_date: Option<NaiveDate>,
    /// One value per schema amount column, in schema order.
    pub amounts: Vec<f64>,
    pub source_file: String,
}

/// Identity of one compiled dataset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DatasetKey {
    pub project: String,
    pub financial_year: FinancialYear,
    pub report: ReportType,
    pub month: u32,
}

impl fmt::Display for DatasetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{:02}",
            self.project, self.financial_year, self.report, self.month
        )
    }
}

/// The canonical, deduplicated row set for one project/period/report-type
/// key. Read-only once handed out; a re-compile replaces it wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledDataset {
    pub key: DatasetKey,
    pub rows: Vec<CompiledRow>,
    pub source_files: Vec<String>,
    pub compiled_at: DateTime<Utc>,
    /// Rows that passed validation, before deduplication.
    pub accepted: usize,
    pub rejected: usize,
    pub deduplicated: usize,
}

impl CompiledDataset {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// A row turned away during compilation, with enough provenance to show
/// the uploader what to fix.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedRow {
    pub source_file: String,
    pub sheet: String,
    pub row_index: u32,
    pub reason: RejectReason,
}

impl RejectedRow {
    pub fn new(row: &RawRow, reason: RejectReason) -> Self {
        Self {
            source_file: row.source_file.clone(),
            sheet: row.sheet.clone(),
            row_index: row.row_index,
            reason,
        }
    }
}

/// Per-row result of compilation.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationOutcome {
    Accepted(CompiledRow),
    Rejected(RejectedRow),
}

/// One month's slice of a report summary. Months without a compiled
/// dataset carry zero counts and totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthSummary {
    pub period: FilingPeriod,
    pub row_count: usize,
    /// One total per schema amount column, in schema order.
    pub totals: Vec<f64>,
}

impl MonthSummary {
    pub fn empty(period: FilingPeriod) -> Self {
        Self {
            period,
            row_count: 0,
            totals: vec![0.0; schema::AMOUNT_COLUMNS.len()],
        }
    }

    pub fn from_dataset(period: FilingPeriod, dataset: &CompiledDataset) -> Self {
        let mut totals = vec![0.0; schema::AMOUNT_COLUMNS.len()];
        for row in &dataset.rows {
            for (index, amount) in row.amounts.iter().enumerate() {
                if let Some(total) = totals.get_mut(index) {
                    *total += amount;
                }
            }
        }
        Self {
            period,
            row_count: dataset.rows.len(),
            totals,
        }
    }
}

/// Month-ordered (April–March) summary of one report family across a
/// financial year, plus the year total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub report: ReportType,
    pub months: Vec<MonthSummary>,
    pub total_rows: usize,
    /// Element-wise sum of the month totals.
    pub totals: Vec<f64>,
}

impl ReportSummary {
    pub fn new(report: ReportType, months: Vec<MonthSummary>) -> Self {
        let mut totals = vec![0.0; schema::AMOUNT_COLUMNS.len()];
        let mut total_rows = 0;
        for month in &months {
            total_rows += month.row_count;
            for (index, value) in month.totals.iter().enumerate() {
                if let Some(total) = totals.get_mut(index) {
                    *total += value;
                }
            }
        }
        Self {
            report,
            months,
            total_rows,
            totals,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total_rows == 0
    }
}

/// Output of one analysis run. Immutable once produced; a re-run for the
/// same (project, financial year) supersedes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub id: Uuid,
    pub project: String,
    pub financial_year: FinancialYear,
    pub generated_at: DateTime<Utc>,
    pub gstr1: ReportSummary,
    pub gstr2a: ReportSummary,
    /// Path of the formatted workbook, once written.
    pub workbook: Option<PathBuf>,
}

impl AnalysisResult {
    pub fn report(&self, report: ReportType) -> &ReportSummary {
        match report {
            ReportType::Gstr1 => &self.gstr1,
            ReportType::Gstr2a => &self.gstr2a,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn financial_year_starts_in_april() {
        assert_eq!(
            FilingPeriod { month: 4, year: 2024 }.financial_year(),
            FinancialYear(2024)
        );
        assert_eq!(
            FilingPeriod { month: 12, year: 2024 }.financial_year(),
            FinancialYear(2024)
        );
        for month in 1..=3 {
            assert_eq!(
                FilingPeriod { month, year: 2024 }.financial_year(),
                FinancialYear(2023)
            );
        }
    }

    #[test]
    fn financial_year_months_run_april_to_march() {
        let months = FinancialYear(2024).months();
        assert_eq!(months[0], (4, 2024));
        assert_eq!(months[8], (12, 2024));
        assert_eq!(months[9], (1, 2025));
        assert_eq!(months[11], (3, 2025));
    }

    #[test]
    fn labels_match_service_conventions() {
        assert_eq!(FinancialYear(2024).label(), "2024-25");
        assert_eq!(FinancialYear(1999).label(), "1999-00");
        assert_eq!(FilingPeriod { month: 4, year: 2024 }.label(), "Apr-24");
        assert_eq!(FilingPeriod { month: 1, year: 2025 }.label(), "Jan-25");
    }

    #[test]
    fn amounts_parse_after_trimming() {
        assert_eq!(CellValue::Number(12.5).as_amount(), Some(12.5));
        assert_eq!(CellValue::Empty.as_amount(), Some(0.0));
        assert_eq!(
            CellValue::Text(" 1,234.56 ".to_string()).as_amount(),
            Some(1234.56)
        );
        assert_eq!(CellValue::Text("12 lakh".to_string()).as_amount(), None);
        let date = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
        assert_eq!(CellValue::Date(date).as_amount(), None);
    }

    #[test]
    fn key_strings_drop_float_artifacts() {
        assert_eq!(
            CellValue::Number(1001.0).key_string().as_deref(),
            Some("1001")
        );
        assert_eq!(
            CellValue::Text("  INV-7 ".to_string()).key_string().as_deref(),
            Some("INV-7")
        );
        assert_eq!(CellValue::Empty.key_string(), None);
    }
}
