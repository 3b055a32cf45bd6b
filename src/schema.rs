//! Column schemas for the two report families. Column ordering is fixed
//! so the output workbook stays deterministic for downstream parsers.

use crate::model::ReportType;

/// Column layout expected of one report family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportSchema {
    /// Column holding the counterparty registration identifier.
    pub identifier_column: &'static str,
    /// Column holding the invoice/document number, when reported.
    pub document_column: &'static str,
    pub date_column: &'static str,
    /// Columns that must be present and non-empty for a row to compile.
    pub required: &'static [&'static str],
    /// Numeric columns aggregated by the analysis, in output order.
    pub amount_columns: &'static [&'static str],
}

/// Shared amount columns, in the order they appear in output sheets.
pub static AMOUNT_COLUMNS: [&str; 6] = [
    "Invoice Value",
    "Taxable Value",
    "Integrated Tax",
    "Central Tax",
    "State Tax",
    "Cess",
];

const TAXABLE_VALUE_INDEX: usize = 1;
const FIRST_TAX_INDEX: usize = 2;

static GSTR1: ReportSchema = ReportSchema {
    identifier_column: "Recipient GSTIN",
    document_column: "Invoice Number",
    date_column: "Invoice Date",
    required: &["Recipient GSTIN", "Invoice Number", "Taxable Value"],
    amount_columns: &AMOUNT_COLUMNS,
};

// Counterparty-reported rows do not always carry a document number
// (ISD/TDS style entries), so it is not required here.
static GSTR2A: ReportSchema = ReportSchema {
    identifier_column: "Supplier GSTIN",
    document_column: "Invoice Number",
    date_column: "Invoice Date",
    required: &["Supplier GSTIN", "Taxable Value"],
    amount_columns: &AMOUNT_COLUMNS,
};

pub fn for_report(report: ReportType) -> &'static ReportSchema {
    match report {
        ReportType::Gstr1 => &GSTR1,
        ReportType::Gstr2a => &GSTR2A,
    }
}

/// Taxable-value slice of a totals vector laid out in schema order.
pub fn taxable_value(totals: &[f64]) -> f64 {
    totals.get(TAXABLE_VALUE_INDEX).copied().unwrap_or(0.0)
}

/// Sum of the tax heads (integrated, central, state, cess).
pub fn total_tax(totals: &[f64]) -> f64 {
    totals.iter().skip(FIRST_TAX_INDEX).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schemas_share_the_amount_layout() {
        for report in ReportType::ALL {
            let schema = for_report(report);
            assert_eq!(schema.amount_columns, &AMOUNT_COLUMNS);
            assert!(schema.required.contains(&schema.identifier_column));
            assert!(schema.required.contains(&"Taxable Value"));
        }
        assert!(for_report(ReportType::Gstr1)
            .required
            .contains(&"Invoice Number"));
        assert!(!for_report(ReportType::Gstr2a)
            .required
            .contains(&"Invoice Number"));
    }

    #[test]
    fn totals_helpers_index_the_fixed_layout() {
        let totals = [10.0, 100.0, 5.0, 2.5, 2.5, 1.0];
        assert_eq!(taxable_value(&totals), 100.0);
        assert_eq!(total_tax(&totals), 11.0);
    }
}
