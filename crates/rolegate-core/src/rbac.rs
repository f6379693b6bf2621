//! Role registry and permission matrix.
//!
//! The role vocabulary is closed: three roles, eight capabilities, and a total
//! matrix fixed at compile time. Nothing here touches storage or performs IO.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Identity class determining default access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Admin,
    Viewer,
    Guest,
}

/// One atomic permission over the two document sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Capability {
    ViewAccounts,
    EditAccounts,
    DeleteAccounts,
    AddAccounts,
    ViewFiles,
    EditFiles,
    DeleteFiles,
    AddFiles,
}

/// All capabilities, in matrix order.
pub const ALL_CAPABILITIES: [Capability; 8] = [
    Capability::ViewAccounts,
    Capability::EditAccounts,
    Capability::DeleteAccounts,
    Capability::AddAccounts,
    Capability::ViewFiles,
    Capability::EditFiles,
    Capability::DeleteFiles,
    Capability::AddFiles,
];

/// The permission matrix: Role x Capability -> bool.
///
/// Total by construction — the match is exhaustive over both enums, so a new
/// role or capability cannot be added without extending every row.
pub const fn allows(role: Role, cap: Capability) -> bool {
    use Capability::*;
    match role {
        Role::Admin => true,
        Role::Viewer => matches!(cap, ViewAccounts | ViewFiles | AddFiles),
        Role::Guest => matches!(cap, ViewFiles),
    }
}

impl Role {
    /// The matrix row for this role.
    pub fn capabilities(self) -> Vec<Capability> {
        ALL_CAPABILITIES
            .into_iter()
            .filter(|cap| allows(self, *cap))
            .collect()
    }

    /// Lowercase wire/storage token for this role.
    pub const fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Viewer => "viewer",
            Role::Guest => "guest",
        }
    }

    /// True only for the three enumerated tokens. Unknown input is `false`,
    /// never an error.
    pub fn is_valid(token: &str) -> bool {
        matches!(token, "admin" | "viewer" | "guest")
    }

    /// Lenient parse for values read back from storage: an unrecognized token
    /// degrades to `Guest` so a bad stored value can never block reads.
    pub fn from_stored(token: &str) -> Role {
        token.parse().unwrap_or(Role::Guest)
    }
}

impl FromStr for Role {
    type Err = crate::PortalError;

    /// Strict parse for caller input; unknown tokens are the caller's error.
    fn from_str(token: &str) -> Result<Self, Self::Err> {
        match token {
            "admin" => Ok(Role::Admin),
            "viewer" => Ok(Role::Viewer),
            "guest" => Ok(Role::Guest),
            other => Err(crate::PortalError::InvalidRole(other.to_string())),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Role {
    /// Deserializes with the same fallback as [`Role::from_stored`]: records
    /// persisted with an out-of-vocabulary role come back as `Guest`.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let token = String::deserialize(deserializer)?;
        Ok(Role::from_stored(&token))
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::Guest
    }
}
