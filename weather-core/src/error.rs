use thiserror::Error;

/// Why a provider payload could not be turned into canonical records.
///
/// Whatever was filled in before the failure is discarded; a failed parse
/// never hands back a partial `Weather` or `Forecast`.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Not valid JSON at all.
    #[error("malformed JSON: {0}")]
    Malformed(#[from] serde_json::Error),

    /// A required object or array (e.g. `current`, `list`) is absent or has the wrong type.
    #[error("missing or invalid element '{0}'")]
    MissingAnchor(&'static str),

    /// A field the provider always supplies is absent or has the wrong type.
    #[error("missing or invalid required field '{0}'")]
    MissingRequiredField(&'static str),

    /// The provider declared a different number of items than it delivered.
    #[error("declared {declared} items, but found {actual}")]
    InconsistentCount { declared: i64, actual: usize },

    /// A nonzero precipitation amount came without anything telling rain from snow.
    #[error("precipitation amount {0} has no type")]
    AmbiguousPrecipitation(f64),

    /// The payload is the provider's own error report.
    #[error("provider reported an error: {0}")]
    ProviderError(String),

    /// The provider offers no such data.
    #[error("{0} is not supported by this provider")]
    Unsupported(&'static str),
}

pub type ParseResult<T> = Result<T, ParseError>;
