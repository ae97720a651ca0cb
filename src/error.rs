//! Unified error types for the HomeLink host driver.
//!
//! Every failure on the serial link is one of three kinds: the line is not
//! open, the platform reported an I/O fault, or the board did not answer in
//! time.  All three are absorbed at the transport boundary and surface to
//! sessions as a [`LinkError`] value, never as a panic.

use core::fmt;
use std::io;

use crate::config::ConfigError;

// ---------------------------------------------------------------------------
// Link errors
// ---------------------------------------------------------------------------

/// Failure of a single exchange on the serial link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkError {
    /// The transport is closed; no I/O was attempted.
    NotOpen,
    /// The platform rejected a read, write or open.
    Io(io::ErrorKind),
    /// No response within the bounded wait.
    Timeout,
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotOpen => write!(f, "line not open"),
            Self::Io(kind) => write!(f, "I/O failure: {kind}"),
            Self::Timeout => write!(f, "no response within timeout"),
        }
    }
}

impl std::error::Error for LinkError {}

impl From<io::Error> for LinkError {
    fn from(e: io::Error) -> Self {
        if e.kind() == io::ErrorKind::TimedOut {
            Self::Timeout
        } else {
            Self::Io(e.kind())
        }
    }
}

impl From<serialport::Error> for LinkError {
    fn from(e: serialport::Error) -> Self {
        match e.kind() {
            serialport::ErrorKind::NoDevice => Self::Io(io::ErrorKind::NotFound),
            serialport::ErrorKind::InvalidInput => Self::Io(io::ErrorKind::InvalidInput),
            serialport::ErrorKind::Io(kind) => Self::Io(kind),
            _ => Self::Io(io::ErrorKind::Other),
        }
    }
}

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation in the crate funnels into this type.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// A serial exchange failed.
    Link(LinkError),
    /// Configuration is invalid or could not be loaded.
    Config(ConfigError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Link(e) => write!(f, "link: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<LinkError> for Error {
    fn from(e: LinkError) -> Self {
        Self::Link(e)
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
