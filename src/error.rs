use std::fmt::{Display, Formatter};
use std::sync::PoisonError;

use config::ConfigError;

use crate::buffer::page::PageId;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, PartialEq)]
pub enum Error {
    /// Invalid configuration, e.g. unknown replacement policy.
    Config(String),
    /// The caller broke the fix/unfix protocol or passed an invalid id.
    ContractViolation(String),
    /// The storage backend was asked for a page beyond its extent.
    OutOfBounds { page_id: PageId, num_pages: u32 },
    /// Every resident frame is pinned and the free list is empty.
    NoAvailableFrame,
    Io(String),
    Internal(String),
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Config(s) => write!(f, "configuration error: {}", s),
            Error::ContractViolation(s) => write!(f, "contract violation: {}", s),
            Error::OutOfBounds { page_id, num_pages } => {
                write!(f, "page {} out of bounds, store holds {} pages", page_id, num_pages)
            }
            Error::NoAvailableFrame => write!(f, "no available frame, all frames are pinned"),
            Error::Io(s) | Error::Internal(s) => write!(f, "{}", s),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Error::Config(err.to_string())
    }
}

impl<T> From<PoisonError<T>> for Error {
    fn from(err: PoisonError<T>) -> Self {
        Error::Internal(err.to_string())
    }
}

impl From<log::SetLoggerError> for Error {
    fn from(err: log::SetLoggerError) -> Self {
        Error::Internal(err.to_string())
    }
}
