//! Typed quota refusal surfaced to callers.

use super::{ActionType, PackageLimits};

/// Raised when a user's package does not permit another resource.
///
/// `Display` yields only the human readable message so the edge can show it
/// verbatim; the structured fields let clients render their own wording.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct PackageLimitError {
    /// Human readable explanation, never carrying a transport prefix.
    pub message: String,
    /// Dimension that hit its limit.
    pub action_type: ActionType,
    /// Resources held at refusal time, when known.
    pub current_count: Option<u32>,
    /// Effective maximum, when known.
    pub max_allowed: Option<u32>,
    /// Name of the user's package, when known.
    pub package_name: Option<String>,
}

impl PackageLimitError {
    /// Refusal with only a message and dimension.
    ///
    /// A blank message is replaced by [`Self::generic_message`].
    pub fn new(message: impl Into<String>, action_type: ActionType) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            Self::generic_message(action_type)
        } else {
            message
        };
        Self {
            message,
            action_type,
            current_count: None,
            max_allowed: None,
            package_name: None,
        }
    }

    /// Refusal for a user without any active subscription.
    pub fn no_active_package(action_type: ActionType) -> Self {
        Self::new("No active package found for this user", action_type)
    }

    /// Generic wording used when the backend sends no message.
    pub fn generic_message(action_type: ActionType) -> String {
        format!("Package limit reached for {action_type}")
    }

    /// Fill counts and package name from a limits snapshot.
    #[must_use]
    pub fn with_snapshot(mut self, limits: &PackageLimits) -> Self {
        self.current_count = Some(limits.current_count);
        self.max_allowed = Some(limits.max_allowed);
        self.package_name = Some(limits.package_name.clone());
        self
    }

    /// Build a refusal from a row that does not allow the action.
    ///
    /// Prefers the backend message and falls back to generic wording.
    pub fn from_limits(limits: &PackageLimits, action_type: ActionType) -> Self {
        let message = limits.error_message.clone().unwrap_or_default();
        Self::new(message, action_type).with_snapshot(limits)
    }
}
