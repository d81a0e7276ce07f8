use std::net::IpAddr;

use thiserror::Error;

use crate::address::Family;

/// Errors raised while building or applying a masquerade
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("unsupported address family: {address} is not an {configured} address")]
    UnsupportedAddressFamily { address: IpAddr, configured: Family },
}

/// Result type for masquerade operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}
