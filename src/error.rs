use std::io;

use thiserror::Error;

use crate::smtp::{ProtocolError, StatusCode};

/// Failure of one of the verification steps. Each step fails fast; callers
/// decide what to retry.
#[derive(Debug, Error)]
pub enum CheckError {
    /// The address does not match the grammar. No network was touched.
    #[error("invalid format")]
    BadFormat { address: String },
    /// The domain has no usable MX records, whatever the DNS cause.
    #[error("unresolvable host")]
    UnresolvableHost { domain: String },
    /// The TCP connection to the mail exchanger could not be opened.
    #[error("connection to {host} failed: {source}")]
    ConnectFailed {
        host: String,
        #[source]
        source: io::Error,
    },
    /// The server answered negatively, or the session broke mid-transaction.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

impl CheckError {
    pub(crate) fn bad_format(address: impl Into<String>) -> Self {
        Self::BadFormat {
            address: address.into(),
        }
    }

    pub(crate) fn unresolvable(domain: impl Into<String>) -> Self {
        Self::UnresolvableHost {
            domain: domain.into(),
        }
    }

    pub(crate) fn connect_failed(host: impl Into<String>, source: io::Error) -> Self {
        Self::ConnectFailed {
            host: host.into(),
            source,
        }
    }

    /// SMTP status code, available only for protocol replies.
    pub fn status_code(&self) -> Option<StatusCode> {
        match self {
            Self::Protocol(err) => err.status_code(),
            _ => None,
        }
    }

    pub fn as_protocol(&self) -> Option<&ProtocolError> {
        match self {
            Self::Protocol(err) => Some(err),
            _ => None,
        }
    }
}

/// Rejected [`CheckerConfig`](crate::CheckerConfig) construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("{0} must not contain line breaks")]
    LineBreak(&'static str),
}
