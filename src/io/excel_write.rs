use std::path::Path;

use rust_xlsxwriter::{Format, Workbook, Worksheet};

use crate::error::Result;
use crate::model::{AnalysisResult, ReportSummary};
use crate::schema;

/// Combined sheet name; the report sheets use the family names.
const SUMMARY_SHEET: &str = "Summary";

const SUMMARY_HEADERS: [&str; 7] = [
    "Month",
    "GSTR1 Rows",
    "GSTR1 Taxable Value",
    "GSTR1 Tax",
    "GSTR2A Rows",
    "GSTR2A Taxable Value",
    "GSTR2A Tax",
];

/// Writes the analysis workbook: one sheet per report family plus the
/// combined summary. Sheet names and column order are fixed so downstream
/// consumers can parse the artifact deterministically; the styling is
/// presentation only.
pub fn write_analysis(path: &Path, analysis: &AnalysisResult) -> Result<()> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    let currency = Format::new().set_num_format("#,##0.00");
    let total_currency = Format::new().set_bold().set_num_format("#,##0.00");

    write_report_sheet(&mut workbook, &analysis.gstr1, &header, &currency, &total_currency)?;
    write_report_sheet(&mut workbook, &analysis.gstr2a, &header, &currency, &total_currency)?;
    write_summary_sheet(&mut workbook, analysis, &header, &currency, &total_currency)?;

    workbook.save(path)?;
    Ok(())
}

fn write_report_sheet(
    workbook: &mut Workbook,
    report: &ReportSummary,
    header: &Format,
    currency: &Format,
    total_currency: &Format,
) -> Result<()> {
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(report.report.sheet_name())?;

    worksheet.write_string_with_format(0, 0, "Month", header)?;
    worksheet.write_string_with_format(0, 1, "Rows", header)?;
    for (index, column) in schema::AMOUNT_COLUMNS.iter().enumerate() {
        worksheet.write_string_with_format(0, (index + 2) as u16, *column, header)?;
    }

    for (offset, month) in report.months.iter().enumerate() {
        let row = (offset + 1) as u32;
        worksheet.write_string(row, 0, &month.period.label())?;
        worksheet.write_number(row, 1, month.row_count as f64)?;
        for (index, total) in month.totals.iter().enumerate() {
            worksheet.write_number_with_format(row, (index + 2) as u16, *total, currency)?;
        }
    }

    let total_row = (report.months.len() + 1) as u32;
    worksheet.write_string_with_format(total_row, 0, "Total", header)?;
    worksheet.write_number_with_format(total_row, 1, report.total_rows as f64, &Format::new().set_bold())?;
    for (index, total) in report.totals.iter().enumerate() {
        worksheet.write_number_with_format(total_row, (index + 2) as u16, *total, total_currency)?;
    }

    size_columns(worksheet, 2 + schema::AMOUNT_COLUMNS.len() as u16)?;
    Ok(())
}

fn write_summary_sheet(
    workbook: &mut Workbook,
    analysis: &AnalysisResult,
    header: &Format,
    currency: &Format,
    total_currency: &Format,
) -> Result<()> {
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SUMMARY_SHEET)?;

    for (index, name) in SUMMARY_HEADERS.iter().enumerate() {
        worksheet.write_string_with_format(0, index as u16, *name, header)?;
    }

    for (offset, (gstr1, gstr2a)) in analysis
        .gstr1
        .months
        .iter()
        .zip(analysis.gstr2a.months.iter())
        .enumerate()
    {
        let row = (offset + 1) as u32;
        worksheet.write_string(row, 0, &gstr1.period.label())?;
        worksheet.write_number(row, 1, gstr1.row_count as f64)?;
        worksheet.write_number_with_format(row, 2, schema::taxable_value(&gstr1.totals), currency)?;
        worksheet.write_number_with_format(row, 3, schema::total_tax(&gstr1.totals), currency)?;
        worksheet.write_number(row, 4, gstr2a.row_count as f64)?;
        worksheet.write_number_with_format(row, 5, schema::taxable_value(&gstr2a.totals), currency)?;
        worksheet.write_number_with_format(row, 6, schema::total_tax(&gstr2a.totals), currency)?;
    }

    let total_row = (analysis.gstr1.months.len() + 1) as u32;
    worksheet.write_string_with_format(total_row, 0, "Total", header)?;
    worksheet.write_number_with_format(total_row, 1, analysis.gstr1.total_rows as f64, &Format::new().set_bold())?;
    worksheet.write_number_with_format(
        total_row,
        2,
        schema::taxable_value(&analysis.gstr1.totals),
        total_currency,
    )?;
    worksheet.write_number_with_format(
        total_row,
        3,
        schema::total_tax(&analysis.gstr1.totals),
        total_currency,
    )?;
    worksheet.write_number_with_format(total_row, 4, analysis.gstr2a.total_rows as f64, &Format::new().set_bold())?;
    worksheet.write_number_with_format(
        total_row,
        5,
        schema::taxable_value(&analysis.gstr2a.totals),
        total_currency,
    )?;
    worksheet.write_number_with_format(
        total_row,
        6,
        schema::total_tax(&analysis.gstr2a.totals),
        total_currency,
    )?;

    size_columns(worksheet, SUMMARY_HEADERS.len() as u16)?;
    Ok(())
}

fn size_columns(worksheet: &mut Worksheet, count: u16) -> Result<()> {
    worksheet.set_column_width(0, 12)?;
    for column in 1..count {
        worksheet.set_column_width(column, 18)?;
    }
    Ok(())
}
