use thiserror::Error;

pub type Result<T> = std::result::Result<T, MdxError>;

#[derive(Debug, Error)]
pub enum MdxError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("config error: {0}")]
    Config(String),
    #[error("validation error: {0}")]
    Validation(String),
    #[error("unsupported comparator {comparator} for {address}")]
    UnsupportedComparator { comparator: String, address: String },
    #[error("cannot select members of {address} by property {property}: only NAME and KEY addressing are supported")]
    UnsupportedPropertyFilter { address: String, property: String },
    #[error("execution error: {0}")]
    Execution(String),
    #[error("MDX query failed: {source}\nstatement:\n{statement}")]
    QueryFailed {
        statement: String,
        #[source]
        source: anyhow::Error,
    },
}

impl MdxError {
    /// Wrap an underlying transport failure together with the statement that
    /// triggered it, so the caller can show both.
    pub fn query_failed(statement: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        MdxError::QueryFailed {
            statement: statement.into(),
            source: source.into(),
        }
    }
}
