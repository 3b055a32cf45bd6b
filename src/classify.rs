//! Maps an uploaded filename to its report family and filing period.
//! Classification duck-types on substring presence, kept as an explicit
//! ordered rule list so behavior stays reproducible.

use crate::error::ClassifyError;
use crate::model::{FilingPeriod, ReportType};

/// What a filename says about its contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub report: ReportType,
    pub period: FilingPeriod,
}

/// First match wins. `R2A` comes last: counterparty uploads are commonly
/// named `<GSTIN>_<MMYYYY>_R2A` without the full family token.
const REPORT_RULES: &[(&str, ReportType)] = &[
    ("GSTR2A", ReportType::Gstr2a),
    ("GSTR1", ReportType::Gstr1),
    ("R2A", ReportType::Gstr2a),
];

/// Pure function: same filename always yields the same classification or
/// the same error. Matching is case-insensitive.
pub fn classify(filename: &str) -> Result<Classification, ClassifyError> {
    let upper = filename.to_ascii_uppercase();

    let report = REPORT_RULES
        .iter()
        .find(|(token, _)| upper.contains(token))
        .map(|(_, report)| *report)
        .ok_or(ClassifyError::UnknownReportType)?;

    let period = scan_period(&upper).ok_or(ClassifyError::UnparseablePeriod)?;

    Ok(Classification { report, period })
}

/// Scans left to right for the first six-digit MMYYYY window with a
/// month in 01–12 and a year in 1900–2100.
fn scan_period(name: &str) -> Option<FilingPeriod> {
    let bytes = name.as_bytes();
    for start in 0..bytes.len().saturating_sub(5) {
        let window = &bytes[start..start + 6];
        if !window.iter().all(u8::is_ascii_digit) {
            continue;
        }
        let month = digits_value(&window[..2]) as u32;
        let year = digits_value(&window[2..]) as i32;
        if (1..=12).contains(&month) && (1900..=2100).contains(&year) {
            return Some(FilingPeriod { month, year });
        }
    }
    None
}

fn digits_value(digits: &[u8]) -> u64 {
    digits
        .iter()
        .fold(0u64, |acc, d| acc * 10 + u64::from(d - b'0'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_outward_report() {
        let classification = classify("ABC_Ltd_GSTR1_042024.xlsx").unwrap();
        assert_eq!(classification.report, ReportType::Gstr1);
        assert_eq!(classification.period, FilingPeriod { month: 4, year: 2024 });
        assert_eq!(classification.period.financial_year().starting_year(), 2024);
    }

    #[test]
    fn classifies_inward_report_across_fy_boundary() {
        let classification = classify("XYZ_GSTR2A_032024_Data.xlsx").unwrap();
        assert_eq!(classification.report, ReportType::Gstr2a);
        assert_eq!(classification.period, FilingPeriod { month: 3, year: 2024 });
        assert_eq!(classification.period.financial_year().starting_year(), 2023);
    }

    #[test]
    fn bare_r2a_token_names_the_inward_family() {
        let classification = classify("29AABCE5725G1ZN_052024_R2A.zip").unwrap();
        assert_eq!(classification.report, ReportType::Gstr2a);
        assert_eq!(classification.period, FilingPeriod { month: 5, year: 2024 });
    }

    #[test]
    fn unknown_report_type() {
        assert_eq!(
            classify("invoice_summary.xlsx").unwrap_err(),
            ClassifyError::UnknownReportType
        );
    }

    #[test]
    fn unparseable_period() {
        assert_eq!(
            classify("GSTR1_upload.xlsx").unwrap_err(),
            ClassifyError::UnparseablePeriod
        );
        // A six-digit run that never forms a valid MMYYYY.
        assert_eq!(
            classify("GSTR1_132024.xlsx").unwrap_err(),
            ClassifyError::UnparseablePeriod
        );
    }

    #[test]
    fn first_valid_window_wins() {
        // The invalid 132024 run is passed over for the later token.
        let classification = classify("GSTR1_132024_052023.xlsx").unwrap();
        assert_eq!(classification.period, FilingPeriod { month: 5, year: 2023 });
        // Inside a longer digit run the scan still finds the token.
        let classification = classify("GSTR1_1042024.xlsx").unwrap();
        assert_eq!(classification.period, FilingPeriod { month: 4, year: 2024 });
    }

    #[test]
    fn classification_is_case_insensitive_and_stable() {
        let lower = classify("abc_gstr2a_092023.xlsx").unwrap();
        let upper = classify("ABC_GSTR2A_092023.XLSX").unwrap();
        assert_eq!(lower, upper);
        assert_eq!(lower.period, FilingPeriod { month: 9, year: 2023 });
    }
}
