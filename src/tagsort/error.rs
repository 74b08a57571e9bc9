use thiserror::Error;

#[derive(Error, Debug)]
pub enum TagsortError {
    #[error("Malformed condition encountered: \"{0}\"")]
    MalformedCondition(String),

    #[error("Malformed condition set encountered: {0}")]
    MalformedConditionSet(String),

    #[error("Malformed filter encountered: {0}")]
    MalformedFilter(String),

    #[error("Wrong type in filter: expected a string, found {found} ({value})")]
    WrongTypeInFilter { value: String, found: &'static str },

    #[error("Completely empty movement schema")]
    EmptySchema,

    #[error("Completely empty format string{0}")]
    EmptyFormatString(String),

    #[error("Occurrence operator /#| found outside of an /ITER| operator in \"{0}\"")]
    OutsideIterOperator(String),

    #[error("Malformed format string \"{format}\": {reason}")]
    MalformedFormatString { format: String, reason: String },

    #[error("Unsupported {kind} version {found} (supported: {supported})")]
    SchemaVersionMismatch {
        kind: &'static str,
        found: String,
        supported: String,
    },

    #[error("Invalid schema: {0}")]
    Schema(String),

    #[error("Invalid regex pattern \"{pattern}\": {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TagsortError>;
