use thiserror::Error;

#[derive(Error, Debug)]
pub enum EpdIfcError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Archive error: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Template structure error in {source_name}: {message}")]
    TemplateStructureError { source_name: String, message: String },

    #[error("Template group '{group}' is missing field '{field}'")]
    MissingTemplateField { group: String, field: String },

    #[error("Unknown IFC data type: {data_type}")]
    UnknownDataType { data_type: String },

    #[error("Cannot convert '{value}' to {data_type}: {reason}")]
    ValueConversionError {
        data_type: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported construction object class: {class}")]
    UnsupportedObjectClass { class: String },

    #[error("STEP serialization error: {message}")]
    StepWriteError { message: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Io,
    Input,
    Configuration,
    Template,
    Conversion,
    Output,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ErrorSeverity {
    /// Process exit code for a failed run; `Low` counts as success.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Low => 0,
            Self::Medium => 2,
            Self::High => 1,
            Self::Critical => 3,
        }
    }
}

impl EpdIfcError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::IoError(_) => ErrorCategory::Io,
            Self::CsvError(_) | Self::SerializationError(_) => ErrorCategory::Input,
            Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. }
            | Self::UnsupportedObjectClass { .. } => ErrorCategory::Configuration,
            Self::TemplateStructureError { .. }
            | Self::MissingTemplateField { .. }
            | Self::UnknownDataType { .. } => ErrorCategory::Template,
            Self::ValueConversionError { .. } | Self::ProcessingError { .. } => {
                ErrorCategory::Conversion
            }
            Self::ZipError(_) | Self::StepWriteError { .. } => ErrorCategory::Output,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Conversion => ErrorSeverity::Medium,
            ErrorCategory::Input | ErrorCategory::Configuration | ErrorCategory::Template => {
                ErrorSeverity::High
            }
            ErrorCategory::Io | ErrorCategory::Output => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::IoError(_) => "Check that the input files exist and the output directory is writable",
            Self::CsvError(_) => "Check that the template CSV files are valid and use a header row",
            Self::SerializationError(_) => "Check that the product data file is valid JSON",
            Self::ZipError(_) => "Disable the IFCZIP archive or check free disk space",
            Self::ConfigValidationError { .. } | Self::InvalidConfigValueError { .. } => {
                "Review the configuration values and try again"
            }
            Self::MissingConfigError { .. } => {
                "Provide the missing setting, or use --demo to generate placeholder values"
            }
            Self::TemplateStructureError { .. } | Self::MissingTemplateField { .. } => {
                "Check that every template group starts with a named row and members carry the required columns"
            }
            Self::UnknownDataType { .. } => "Use an IFC4X3 defined type name such as IfcLabel or IfcMassMeasure",
            Self::ValueConversionError { .. } => "Check the product data values against the template data types",
            Self::UnsupportedObjectClass { .. } => {
                "Use IfcBuilding or an element type such as IfcBuildingElementProxyType"
            }
            Self::StepWriteError { .. } => "Check the generated values for non-finite numbers",
            Self::ProcessingError { .. } => "Re-run with --verbose to see which property failed",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::IoError(e) => format!("Could not read or write a file: {}", e),
            Self::MissingConfigError { field } => format!("Setting '{}' is required", field),
            Self::UnsupportedObjectClass { class } => {
                format!("'{}' cannot carry LCA property sets", class)
            }
            other => other.to_string(),
        }
    }

    pub(crate) fn conversion(data_type: &str, value: &str, reason: impl Into<String>) -> Self {
        Self::ValueConversionError {
            data_type: data_type.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EpdIfcError>;
