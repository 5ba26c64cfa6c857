//! Turns arbitrary failures into the `"Error Code: .. Error Message: .."`
//! line shown to users.
//!
//! # Design
//! A failure contributes zero, one or two positional detail values. With two
//! values the first is the code and the second the message; with one value
//! only the message is known; with none both fall back to fixed text.
//! Rendering never fails, so callers can embed the result in any message.

use std::error::Error;
use std::fmt;
use std::io;

use crate::error::TransportError;

pub const CODE_UNAVAILABLE: &str = "Error code unavailable";
pub const UNKNOWN_ERROR: &str =
    "Unknown error occurred. Please check the asset configuration and/or action parameters.";

/// The positional details extracted from a failure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorDetail {
    pub code: Option<String>,
    pub message: Option<String>,
}

impl ErrorDetail {
    /// Build from positional values; values past the second are ignored.
    pub fn from_values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut values = values.into_iter().map(Into::into);
        match (values.next(), values.next()) {
            (Some(code), Some(message)) => ErrorDetail {
                code: Some(code),
                message: Some(message),
            },
            (Some(message), None) => ErrorDetail {
                code: None,
                message: Some(message),
            },
            _ => ErrorDetail::default(),
        }
    }

    /// Inspect `err` and its source chain.
    ///
    /// An OS-level I/O error anywhere in the chain yields `(errno, description)`.
    /// Otherwise the error's own display text is the single value, unless it
    /// is blank.
    pub fn from_error(err: &(dyn Error + 'static)) -> Self {
        let mut current = Some(err);
        while let Some(e) = current {
            if let Some(detail) = e.downcast_ref::<io::Error>().and_then(os_detail) {
                return detail;
            }
            current = e.source();
        }

        let text = err.to_string();
        if text.trim().is_empty() {
            ErrorDetail::default()
        } else {
            ErrorDetail::from_values([text])
        }
    }
}

impl From<&TransportError> for ErrorDetail {
    fn from(err: &TransportError) -> Self {
        match err {
            TransportError::Http(ureq::Error::Io(io)) | TransportError::Io(io) => {
                os_detail(io).unwrap_or_else(|| ErrorDetail::from_error(io))
            }
            TransportError::Http(other) => ErrorDetail::from_error(other),
        }
    }
}

impl fmt::Display for ErrorDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Error Code: {}. Error Message: {}",
            self.code.as_deref().unwrap_or(CODE_UNAVAILABLE),
            self.message.as_deref().unwrap_or(UNKNOWN_ERROR)
        )
    }
}

/// Shorthand for `ErrorDetail::from_error(err).to_string()`.
pub fn normalize(err: &(dyn Error + 'static)) -> String {
    ErrorDetail::from_error(err).to_string()
}

/// Double every brace so server text survives later `{}` templating.
pub fn escape_braces(text: &str) -> String {
    text.replace('{', "{{").replace('}', "}}")
}

fn os_detail(err: &io::Error) -> Option<ErrorDetail> {
    let code = err.raw_os_error()?;
    let text = err.to_string();
    let suffix = format!(" (os error {code})");
    let message = text.strip_suffix(&suffix).unwrap_or(&text).to_string();
    Some(ErrorDetail::from_values([code.to_string(), message]))
}
