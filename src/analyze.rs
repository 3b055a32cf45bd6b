//! The analysis compiler: aggregates compiled per-month datasets across a
//! financial year into month-ordered summaries with year totals.

use chrono::Utc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::AnalysisError;
use crate::model::{
    AnalysisResult, DatasetKey, FilingPeriod, FinancialYear, MonthSummary, ReportSummary,
    ReportType,
};
use crate::store::DatasetStore;

/// Summarizes both report families for one project and financial year.
/// Missing months appear as zero-filled entries; only a financial year
/// with no data at all fails. A re-run supersedes the previous result, it
/// is never merged with history.
#[instrument(level = "info", skip(store), fields(project = %project, fy = %financial_year))]
pub fn analyze(
    store: &DatasetStore,
    project: &str,
    financial_year: FinancialYear,
) -> Result<AnalysisResult, AnalysisError> {
    let gstr1 = summarize(store, project, financial_year, ReportType::Gstr1);
    let gstr2a = summarize(store, project, financial_year, ReportType::Gstr2a);

    if gstr1.is_empty() && gstr2a.is_empty() {
        return Err(AnalysisError::NoData {
            project: project.to_string(),
            financial_year: financial_year.label(),
        });
    }

    info!(
        gstr1_rows = gstr1.total_rows,
        gstr2a_rows = gstr2a.total_rows,
        "analysis compiled"
    );

    Ok(AnalysisResult {
        id: Uuid::new_v4(),
        project: project.to_string(),
        financial_year,
        generated_at: Utc::now(),
        gstr1,
        gstr2a,
        workbook: None,
    })
}

fn summarize(
    store: &DatasetStore,
    project: &str,
    financial_year: FinancialYear,
    report: ReportType,
) -> ReportSummary {
    let mut months = Vec::with_capacity(12);
    for (month, year) in financial_year.months() {
        let key = DatasetKey {
            project: project.to_string(),
            financial_year,
            report,
            month,
        };
        let period = FilingPeriod { month, year };
        let summary = match store.get(&key) {
            Some(dataset) => MonthSummary::from_dataset(period, &dataset),
            None => MonthSummary::empty(period),
        };
        months.push(summary);
    }
    ReportSummary::new(report, months)
}
