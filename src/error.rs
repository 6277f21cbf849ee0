use thiserror::Error;

/// Failures talking to the remote file server.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("listing {url} unavailable: {source}")]
    ListingUnavailable {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("fetching {url} failed: {source}")]
    FetchFailed {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("invalid url `{url}`: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

/// Outcomes of turning file text into a `ResolvedTable` that are not a table.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("No valid data found in the file.")]
    NoDataSection,

    #[error("No valid timestamp column found in the file.")]
    UnresolvedTimestamp,

    #[error(transparent)]
    Arrow(#[from] arrow::error::ArrowError),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("unknown column `{0}`")]
    UnknownColumn(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid base url `{url}`: {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}
