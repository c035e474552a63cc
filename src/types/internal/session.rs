use crate::types::db::ApprovalStatus;

use super::roles::DisplayRole;

/// Application user produced by the session role resolver
#[derive(Debug, Clone, PartialEq)]
pub struct AppUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: DisplayRole,
    pub created_at: i64,
    pub approval_status: ApprovalStatus,
    pub is_verified: bool,
    pub organization_id: Option<String>,
    pub department: Option<String>,
}

/// Why a present identity session did not yield an application user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionDenial {
    ProfileMissing,
    PendingApproval,
    Rejected,
    NoRoleAssigned,
    InvalidRole,
}

impl SessionDenial {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ProfileMissing => "profile_missing",
            Self::PendingApproval => "pending_approval",
            Self::Rejected => "rejected",
            Self::NoRoleAssigned => "no_role_assigned",
            Self::InvalidRole => "invalid_role",
        }
    }
}

/// Outcome of one resolution cycle
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub user: Option<AppUser>,
    pub approval_status: Option<ApprovalStatus>,
    pub denial: Option<SessionDenial>,
}

impl SessionState {
    /// No identity session at all
    pub fn anonymous() -> Self {
        Self {
            user: None,
            approval_status: None,
            denial: None,
        }
    }

    pub fn denied(approval_status: Option<ApprovalStatus>, denial: SessionDenial) -> Self {
        Self {
            user: None,
            approval_status,
            denial: Some(denial),
        }
    }

    pub fn granted(user: AppUser) -> Self {
        Self {
            approval_status: Some(user.approval_status),
            user: Some(user),
            denial: None,
        }
    }
}

/// How sessions are resolved. Chosen at startup from configuration and
/// handed to the resolver; there is no process-wide toggle.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthMode {
    Live,
    /// Any present session resolves to this user without touching storage
    FixturedForDevelopment(AppUser),
}

impl AuthMode {
    /// Fixture user used when `AUTH_MODE=fixture`
    pub fn development_fixture() -> Self {
        AuthMode::FixturedForDevelopment(AppUser {
            id: "00000000-0000-0000-0000-000000000001".to_owned(),
            name: "Development Admin".to_owned(),
            email: "admin@demo.com".to_owned(),
            role: DisplayRole::Admin,
            created_at: 0,
            approval_status: ApprovalStatus::Approved,
            is_verified: true,
            organization_id: None,
            department: None,
        })
    }

    pub fn is_live(&self) -> bool {
        matches!(self, AuthMode::Live)
    }
}
