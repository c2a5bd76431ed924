use thiserror::Error;

/// Errors surfaced by the library side of the observatory.
///
/// None of these ever escape the collector's recording path; they show up
/// from configuration loading, the chunking helpers and native timeline
/// adapters (whose failures the collector swallows).
#[derive(Debug, Error)]
pub enum PerfError {
    #[error("chunk size must be at least 1")]
    ZeroChunkSize,

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("cannot read config file {path}: {source}")]
    ConfigIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse config file {path}: {source}")]
    ConfigParse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("timeline has no mark named \"{0}\"")]
    UnknownMark(String),
}

pub type Result<T> = std::result::Result<T, PerfError>;
