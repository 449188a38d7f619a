use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum InductionError {
    #[error("invalid configuration value for `{field}`: {message}")]
    #[diagnostic(
        code(bubble_induct::config::invalid),
        help("Span lengths must satisfy 1 <= min_len <= max_len and max_proposals must be at least 1.")
    )]
    InvalidConfig { field: &'static str, message: String },

    #[error("unknown {kind} {value:?}, expected one of: {expected}")]
    #[diagnostic(code(bubble_induct::config::unknown_policy))]
    UnknownPolicy {
        kind: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("failed to parse grouping configuration: {0}")]
    #[diagnostic(
        code(bubble_induct::config::parse),
        help("Check the TOML syntax. Unknown keys are rejected.")
    )]
    ConfigParse(#[from] toml::de::Error),

    #[error("failed to read grouping configuration from {path}: {source}")]
    #[diagnostic(code(bubble_induct::config::io))]
    ConfigIo {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type InductionResult<T> = std::result::Result<T, InductionError>;
