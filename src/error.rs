use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Reasons a 15-character registration identifier fails validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidGstin {
    /// The identifier is not exactly 15 characters long.
    #[error("identifier must be 15 characters, got {0}")]
    Length(usize),

    /// The leading two characters are not a known state code.
    #[error("unknown state code '{0}'")]
    StateCode(String),

    /// A character is outside the class its position requires.
    #[error("character {position} must be {expected}")]
    Format {
        position: usize,
        expected: &'static str,
    },

    /// The trailing check character does not match the computed one.
    #[error("check character mismatch: expected '{expected}', found '{found}'")]
    Checksum { expected: char, found: char },
}

/// Raised when a filename cannot be mapped to a report type and period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ClassifyError {
    #[error("filename carries no known report-type token")]
    UnknownReportType,

    #[error("filename carries no parseable MMYYYY period token")]
    UnparseablePeriod,
}

/// Raised when an upload cannot be read into rows at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    /// The bytes do not parse as the format the filename promises.
    #[error("unreadable file '{filename}': {message}")]
    UnreadableFile { filename: String, message: String },

    /// An archive held no spreadsheet entries to extract.
    #[error("archive '{0}' contains no spreadsheet entries")]
    EmptyArchive(String),

    /// The upload (or an archive entry) exceeds the configured byte bound.
    #[error("file '{filename}' is {actual} bytes, over the {limit}-byte limit")]
    SizeLimit {
        filename: String,
        actual: u64,
        limit: u64,
    },

    /// Extraction would exceed the configured row bound.
    #[error("row limit of {limit} exceeded while reading '{filename}'")]
    RowLimit { filename: String, limit: usize },
}

/// Why a single row was turned away during compilation. Rejections are
/// accumulated and reported alongside accepted rows, never fatal to the
/// batch.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RejectReason {
    #[error("required column '{0}' is missing or empty")]
    MissingField(String),

    #[error("invalid identifier '{value}': {reason}")]
    InvalidIdentifier {
        value: String,
        #[source]
        reason: InvalidGstin,
    },

    #[error("column '{column}' holds non-numeric amount '{value}'")]
    MalformedAmount { column: String, value: String },

    #[error("source file could not be classified: {0}")]
    Unclassified(#[source] ClassifyError),
}

/// Raised when an analysis run has nothing to summarize.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    #[error("no compiled data for project '{project}' in financial year {financial_year}")]
    NoData {
        project: String,
        financial_year: String,
    },
}

/// Error type covering the different failure cases that can occur when the
/// engine ingests, compiles, or emits data.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Wrapper for IO failures such as writing the output workbook.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when JSON serialization of a summary fails.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Errors bubbled up from the Excel writer implementation.
    #[error("Excel write error: {0}")]
    ExcelWrite(#[from] rust_xlsxwriter::XlsxError),

    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error(transparent)]
    Classify(#[from] ClassifyError),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),
}
