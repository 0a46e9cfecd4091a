//! Classification of errors raised by the managed backend.
//!
//! Adapters build a [`BackendFailure`] from whatever the transport returned
//! (PostgREST error body, SQLSTATE) and classify it once. Only the resulting
//! tagged variants cross into the domain.

/// SQLSTATE raised by the limit procedures when a hard check fails.
pub const LIMIT_EXCEEDED_CODE: &str = "PL001";

/// Message prefix used by procedures that predate [`LIMIT_EXCEEDED_CODE`].
pub const LEGACY_LIMIT_PREFIX: &str = "PACKAGE_LIMIT_EXCEEDED:";

/// Raw error reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendFailure {
    /// Structured error code, when the backend supplied one.
    pub code: Option<String>,
    /// Error message as sent by the backend.
    pub message: String,
}

/// Outcome of [`BackendFailure::classify`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendFailureKind {
    /// The backend refused the action for quota reasons.
    LimitExceeded {
        /// User-facing detail with any transport prefix removed.
        detail: String,
    },
    /// Any other backend error.
    Other {
        /// Original message.
        message: String,
    },
}

impl BackendFailure {
    /// Build a failure from a code and message.
    pub fn new(code: Option<String>, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Decide whether the failure is a quota refusal.
    ///
    /// The structured code wins. Without it, a message carrying
    /// [`LEGACY_LIMIT_PREFIX`] is still treated as a refusal. In both cases the
    /// prefix is removed once and surrounding whitespace trimmed.
    #[must_use]
    pub fn classify(self) -> BackendFailureKind {
        let coded = self.code.as_deref() == Some(LIMIT_EXCEEDED_CODE);
        match strip_legacy_prefix(&self.message) {
            Some(detail) => BackendFailureKind::LimitExceeded { detail },
            None if coded => BackendFailureKind::LimitExceeded {
                detail: self.message.trim().to_owned(),
            },
            None => BackendFailureKind::Other {
                message: self.message,
            },
        }
    }
}

fn strip_legacy_prefix(message: &str) -> Option<String> {
    message
        .split_once(LEGACY_LIMIT_PREFIX)
        .map(|(_, rest)| rest.trim().to_owned())
}
