use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Role vocabulary as persisted in `user_roles.role` and
/// `approval_requests.requested_role`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoredRole {
    SuperAdmin,
    Admin,
    Staff,
    Student,
    Parent,
    Support,
}

/// UI-facing role exposed on a resolved session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DisplayRole {
    SuperAdmin,
    Admin,
    Faculty,
    Student,
    Parent,
    Support,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown role: {0}")]
pub struct UnknownRole(pub String);

impl StoredRole {
    pub const ALL: [StoredRole; 6] = [
        StoredRole::SuperAdmin,
        StoredRole::Admin,
        StoredRole::Staff,
        StoredRole::Student,
        StoredRole::Parent,
        StoredRole::Support,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SuperAdmin => "super_admin",
            Self::Admin => "admin",
            Self::Staff => "staff",
            Self::Student => "student",
            Self::Parent => "parent",
            Self::Support => "support",
        }
    }

    /// Fixed mapping to the display vocabulary. Total over the enum; there is
    /// no fallback role.
    pub fn display_role(self) -> DisplayRole {
        match self {
            Self::SuperAdmin => DisplayRole::SuperAdmin,
            Self::Admin => DisplayRole::Admin,
            Self::Staff => DisplayRole::Faculty,
            Self::Student => DisplayRole::Student,
            Self::Parent => DisplayRole::Parent,
            Self::Support => DisplayRole::Support,
        }
    }

    /// Only the first registrant of an institution creates it
    pub fn creates_institution(self) -> bool {
        matches!(self, Self::SuperAdmin)
    }
}

impl FromStr for StoredRole {
    type Err = UnknownRole;

    /// Exact match only. Case variants and whitespace are not accepted.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        StoredRole::ALL
            .into_iter()
            .find(|role| role.as_str() == value)
            .ok_or_else(|| UnknownRole(value.to_owned()))
    }
}

impl fmt::Display for StoredRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl DisplayRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SuperAdmin => "SuperAdmin",
            Self::Admin => "Admin",
            Self::Faculty => "Faculty",
            Self::Student => "Student",
            Self::Parent => "Parent",
            Self::Support => "Support",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Self::SuperAdmin => "Super Admin",
            Self::Admin => "Admin",
            Self::Faculty => "Faculty/Staff",
            Self::Student => "Student",
            Self::Parent => "Parent",
            Self::Support => "Support",
        }
    }

    /// Roles allowed to decide approval requests
    pub fn can_review_approvals(&self) -> bool {
        matches!(self, Self::SuperAdmin | Self::Admin)
    }
}

impl fmt::Display for DisplayRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
