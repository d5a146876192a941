//! Transport payload decoding errors.
//!
//! ```rust
//! use etransport::{TransportError, TransportErrorKind};
//!
//! let error = TransportError::missing_choice(2);
//! assert_eq!(error.kind, TransportErrorKind::MissingChoice);
//! ```

use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    InvalidPayload,
    MissingChoice,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn invalid_payload(message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::InvalidPayload, message)
    }

    pub fn missing_choice(index: usize) -> Self {
        Self::new(
            TransportErrorKind::MissingChoice,
            format!("completion has no choice at index {index}"),
        )
    }
}

impl Display for TransportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl Error for TransportError {}

impl From<serde_json::Error> for TransportError {
    fn from(value: serde_json::Error) -> Self {
        Self::invalid_payload(value.to_string())
    }
}
