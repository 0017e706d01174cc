//! Unified error type.

/// The error type returned by pathgate's fallible operations.
///
/// Requests that match no route, or that a filter turns away, are not errors:
/// they become `404` / `403` [`Response`](crate::Response) values. This type
/// surfaces defects in the route table, found while it is being built, and
/// I/O failures while serving.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid route pattern `{pattern}`: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("invalid callback `{0}`: expected `Name@method`")]
    InvalidCallback(String),

    #[error("route `{0}` has no callback")]
    MissingCallback(String),

    #[error("route `{pattern}` uses unregistered handler `{handler}`")]
    UnknownHandler { pattern: String, handler: String },

    #[error("config: {0}")]
    Config(#[from] toml::de::Error),
}
