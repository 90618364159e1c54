//! Errors which abort a calendar run.

use thiserror::Error;

/// The command line configuration is unusable; detected before any I/O.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("alarm spec must alternate waste type and time, got {0} tokens")]
    OddAlarmTokens(usize),
    #[error("invalid alarm time `{spec}` for `{waste_type}`, expected [-]HHMM")]
    InvalidAlarmTime { waste_type: String, spec: String },
    #[error("unknown waste type `{0}`")]
    UnknownWasteType(String),
    #[error("no waste type selected")]
    EmptySelection,
}

/// The page does not have the expected shape anymore.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("no collection date found in `{0}`")]
    MalformedDate(String),
    #[error("unknown month `{month}` in `{text}`")]
    UnknownMonth { month: String, text: String },
    #[error("`{0}` is not a valid calendar date")]
    InvalidDate(String),
    #[error("no date text for waste type `{0}`")]
    MissingDateText(String),
    #[error("no description for collection date `{0}`")]
    MissingDescription(String),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("could not retrieve {url}")]
    Retrieval {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error(transparent)]
    Parse(#[from] ParseError),
}
