use crate::domain::model::ResponseKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("{response}: request failed: {source}")]
    Http {
        response: ResponseKind,
        #[source]
        source: reqwest::Error,
    },

    #[error("{response}: API responded with HTTP {status}")]
    HttpStatus {
        response: ResponseKind,
        status: reqwest::StatusCode,
    },

    #[error("{response}: body is not valid JSON: {source}")]
    InvalidJson {
        response: ResponseKind,
        #[source]
        source: serde_json::Error,
    },

    #[error("{response}: cannot read response file '{path}': {source}")]
    ReadResponse {
        response: ResponseKind,
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{response}: field '{field}' is missing from the response")]
    MissingField {
        response: ResponseKind,
        field: String,
    },

    #[error("{response}: cannot dump as a table: {reason}")]
    MalformedRecords {
        response: ResponseKind,
        reason: String,
    },

    #[error("Sheet '{sheet}' does not exist in workbook '{workbook}'")]
    SheetNotFound { sheet: String, workbook: String },

    #[error("Workbook error: {message}")]
    Workbook { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("{stage} failed for {} response(s): {}", failures.len(), summarize(failures))]
    ResponsesFailed {
        stage: Stage,
        failures: Vec<ResponseFailure>,
    },
}

/// Pipeline phase an error was raised in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Fetch,
    Transcribe,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Fetch => f.write_str("fetch"),
            Stage::Transcribe => f.write_str("transcription"),
        }
    }
}

#[derive(Debug)]
pub struct ResponseFailure {
    pub response: ResponseKind,
    pub error: CatalogError,
}

fn summarize(failures: &[ResponseFailure]) -> String {
    failures
        .iter()
        .map(|f| f.error.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Data,
    Workbook,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl CatalogError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            CatalogError::Http { .. } | CatalogError::HttpStatus { .. } => ErrorCategory::Network,
            CatalogError::InvalidJson { .. }
            | CatalogError::ReadResponse { .. }
            | CatalogError::MissingField { .. }
            | CatalogError::MalformedRecords { .. }
            | CatalogError::SerializationError(_) => ErrorCategory::Data,
            CatalogError::SheetNotFound { .. } | CatalogError::Workbook { .. } => {
                ErrorCategory::Workbook
            }
            CatalogError::MissingConfigError { .. }
            | CatalogError::InvalidConfigValueError { .. }
            | CatalogError::ConfigValidationError { .. } => ErrorCategory::Configuration,
            CatalogError::IoError(_) => ErrorCategory::System,
            CatalogError::ResponsesFailed { stage, .. } => match stage {
                Stage::Fetch => ErrorCategory::Network,
                Stage::Transcribe => ErrorCategory::Data,
            },
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Data | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Workbook | ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            CatalogError::Http { .. } => {
                "Check network connectivity and the endpoint URL, then re-run the fetch"
            }
            CatalogError::HttpStatus { .. } => {
                "Verify the API key and query parameters for this endpoint"
            }
            CatalogError::InvalidJson { .. } | CatalogError::SerializationError(_) => {
                "Re-fetch the response; the stored body is not a JSON document"
            }
            CatalogError::ReadResponse { .. } => {
                "Run the fetch step first or fix transcribe.input_dir"
            }
            CatalogError::MissingField { .. } => {
                "Remove the field from the response configuration or re-fetch with a query \
                 that returns it"
            }
            CatalogError::MalformedRecords { .. } => {
                "Switch the response to walk mode or enable sparse_records"
            }
            CatalogError::SheetNotFound { .. } => {
                "Create the sheet in the workbook before transcribing"
            }
            CatalogError::Workbook { .. } => {
                "Make sure the workbook exists, is a valid .xlsx file and is not open elsewhere"
            }
            CatalogError::IoError(_) => "Check file permissions and available disk space",
            CatalogError::MissingConfigError { .. }
            | CatalogError::InvalidConfigValueError { .. }
            | CatalogError::ConfigValidationError { .. } => {
                "Fix the configuration file and try again"
            }
            CatalogError::ResponsesFailed { stage, .. } => match stage {
                Stage::Fetch => "Fix the failing endpoints and re-run the whole pipeline",
                Stage::Transcribe => "Fix the failing responses; the workbook was left untouched",
            },
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Network => format!("Could not fetch from the catalog API: {}", self),
            ErrorCategory::Data => format!("A response could not be transcribed: {}", self),
            ErrorCategory::Workbook => format!("The workbook could not be updated: {}", self),
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::System => format!("System error: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, CatalogError>;
