//! Quota dimensions a package can limit.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Resource dimension checked against a package maximum.
///
/// The wire form (RPC `p_action_type`, JSON, URL segments) is the lowercase
/// plural name. Visits have no dimension of their own and are counted against
/// [`ActionType::Pets`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    /// Client records owned by the specialist.
    Clients,
    /// Pets across all clients.
    Pets,
    /// Offered services.
    Services,
    /// Declared specialisations.
    Specializations,
}

impl ActionType {
    /// Every dimension, in display order.
    pub const ALL: [Self; 4] = [
        Self::Clients,
        Self::Pets,
        Self::Services,
        Self::Specializations,
    ];

    /// Wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Clients => "clients",
            Self::Pets => "pets",
            Self::Services => "services",
            Self::Specializations => "specializations",
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when text does not name a known [`ActionType`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown action type: {value}")]
pub struct ParseActionTypeError {
    /// The rejected input.
    pub value: String,
}

impl FromStr for ActionType {
    type Err = ParseActionTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|action| action.as_str() == s)
            .ok_or_else(|| ParseActionTypeError {
                value: s.to_owned(),
            })
    }
}
