use std::fmt;

use crate::message::PendingMessage;

/// Terminal signals raised by the validation lifecycle.
///
/// Both variants propagate out of this crate to the framework's error
/// boundary, which pattern-matches on them to decide how to respond.
/// Rendering and response concerns are deliberately not part of this crate.
#[derive(Debug)]
pub enum Error {
    /// The object's authorization predicate returned `false`.
    ///
    /// Raised before any validator is built or any rule runs; there is no
    /// payload beyond the denial itself.
    AuthorizationDenied,
    /// Rule evaluation ran and at least one rule failed.
    ValidationFailed(FailedValidation),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::AuthorizationDenied => write!(f, "Authorization denied"),
            Error::ValidationFailed(failed) => write!(f, "Validation failed: {}", failed),
        }
    }
}

impl std::error::Error for Error {}

impl From<FailedValidation> for Error {
    fn from(failed: FailedValidation) -> Self {
        Error::ValidationFailed(failed)
    }
}

/// The payload of a validation failure: the pending messages the run
/// collected, in the order rules reported them.
#[derive(Debug)]
pub struct FailedValidation {
    /// The collected pending messages.
    pub messages: Vec<PendingMessage>,
}

impl FailedValidation {
    /// Creates a failure payload from collected messages.
    pub fn new(messages: Vec<PendingMessage>) -> Self {
        Self { messages }
    }
}

impl fmt::Display for FailedValidation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} pending message(s)", self.messages.len())
    }
}

impl std::error::Error for FailedValidation {}
