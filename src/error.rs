//! Startup error type.
//!
//! Everything in here is fatal before the listener is bound. Errors inside a
//! health-check run never reach this type; they become failed outcomes.

use std::fmt;
use std::io;

use crate::config::ConfigError;
use crate::flannel::FlannelError;

#[derive(Debug)]
pub enum Error {
    /// Environment configuration is incomplete or malformed.
    Config(ConfigError),
    /// The flannel env file is missing or unusable.
    Flannel(FlannelError),
    /// The outbound HTTP client could not be built.
    HttpClient(reqwest::Error),
    /// Binding or serving the listener failed.
    Io(io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(e) => write!(f, "{}", e),
            Error::Flannel(e) => write!(f, "{}", e),
            Error::HttpClient(e) => write!(f, "failed to build http client: {}", e),
            Error::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Config(e) => Some(e),
            Error::Flannel(e) => Some(e),
            Error::HttpClient(e) => Some(e),
            Error::Io(e) => Some(e),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<FlannelError> for Error {
    fn from(e: FlannelError) -> Self {
        Error::Flannel(e)
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::HttpClient(e)
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(e)
    }
}
