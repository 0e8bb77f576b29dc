use std::io;
use std::time::Duration;

use thiserror::Error;

use crate::duration::{ParseDurationError, format_duration};

/// Errors produced while turning raw address strings into target specs.
///
/// These are fail-fast for the whole batch: nothing is probed if any address
/// fails to parse.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("neither port nor protocol is given")]
    MissingPort,
    #[error("port not given and protocol is unknown: {0:?}")]
    UnknownScheme(String),
    #[error("malformed host:port address: {0:?}")]
    MalformedHostPort(String),
    #[error("invalid poll interval: {0:?}")]
    InvalidPollInterval(String),
    #[error("address {addr:?} at position {index}: {source}")]
    InvalidAddress {
        index: usize,
        addr: String,
        #[source]
        source: Box<ParseError>,
    },
}

impl From<ParseDurationError> for ParseError {
    fn from(err: ParseDurationError) -> Self {
        ParseError::InvalidPollInterval(err.0)
    }
}

/// Terminal failure carried inside a `Failed` event.
///
/// Transient conditions (attempt timeout, connection refused) are retried
/// inside the prober and never surface here.
#[derive(Debug, Error)]
pub enum WaitError {
    /// Definitive connect error: resolution failure, network unreachable,
    /// permission denied and the like.
    #[error(transparent)]
    Connect(#[from] io::Error),
    /// The shared deadline fired while this target was still being probed.
    #[error("wait cancelled")]
    Cancelled,
    /// The one aggregate timeout failure, not tied to any target.
    #[error("exceeded timeout limit of {}", format_duration(*.0))]
    DeadlineExceeded(Duration),
}
