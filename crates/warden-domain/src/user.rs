//! User domain types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Lifecycle status of a user account.
///
/// Wire and storage format: `"ACTIVATED"` / `"DEACTIVATED"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserStatus {
    Activated,
    Deactivated,
}

impl UserStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Activated => "ACTIVATED",
            Self::Deactivated => "DEACTIVATED",
        }
    }

    /// The other status. Used by the activate/deactivate toggle.
    pub fn toggled(self) -> Self {
        match self {
            Self::Activated => Self::Deactivated,
            Self::Deactivated => Self::Activated,
        }
    }
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown user status: {0}")]
pub struct UnknownUserStatus(pub String);

impl FromStr for UserStatus {
    type Err = UnknownUserStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ACTIVATED" => Ok(Self::Activated),
            "DEACTIVATED" => Ok(Self::Deactivated),
            other => Err(UnknownUserStatus(other.to_owned())),
        }
    }
}
