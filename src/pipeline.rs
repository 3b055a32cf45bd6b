//! High-level orchestration helpers gluing extraction, compilation, and
//! analysis together for the surrounding service.

use std::path::Path;

use tracing::{debug, info, instrument};

use crate::analyze;
use crate::compile::{self, CompileSummary};
use crate::error::Result;
use crate::io::{excel_read, excel_write};
use crate::limits::Limits;
use crate::model::{AnalysisResult, FinancialYear};
use crate::store::DatasetStore;

/// Ingests one upload: extracts its rows and folds them into the store's
/// datasets. File bytes and the original filename come from the caller's
/// storage provider; the engine never addresses storage itself.
#[instrument(level = "info", skip_all, fields(project = %project, file = %filename))]
pub fn ingest(
    store: &DatasetStore,
    project: &str,
    bytes: &[u8],
    filename: &str,
    limits: &Limits,
) -> Result<CompileSummary> {
    let extraction = excel_read::extract(bytes, filename, limits)?;
    info!(
        rows = extraction.rows.len(),
        spreadsheets = extraction.spreadsheets,
        ignored = extraction.ignored,
        "upload extracted"
    );
    Ok(compile::compile(store, project, &extraction.rows))
}

/// Compiles the financial-year analysis and writes the output workbook
/// into `output_dir`, stamping the artifact path on the result.
#[instrument(level = "info", skip(store), fields(project = %project, fy = %financial_year))]
pub fn run_analysis(
    store: &DatasetStore,
    project: &str,
    financial_year: FinancialYear,
    output_dir: &Path,
) -> Result<AnalysisResult> {
    let mut analysis = analyze::analyze(store, project, financial_year)?;
    let path = output_dir.join(output_filename(&analysis));
    excel_write::write_analysis(&path, &analysis)?;
    debug!(id = %analysis.id, output = %path.display(), "analysis workbook written");
    analysis.workbook = Some(path);
    Ok(analysis)
}

/// Output naming convention carried over from the service the engine
/// backs: project, financial-year label, and a short run id.
pub fn output_filename(analysis: &AnalysisResult) -> String {
    let id = analysis.id.simple().to_string();
    format!(
        "GST_Analysis_{}_{}_{}.xlsx",
        analysis.project,
        analysis.financial_year.label(),
        &id[..8]
    )
}
