use std::str::FromStr;
use std::sync::Arc;

use sea_orm::ConnectionTrait;

use crate::errors::InternalError;
use crate::stores::{ProfileStore, RoleStore};
use crate::types::db::ApprovalStatus;
use crate::types::internal::{AppUser, AuthMode, SessionDenial, SessionState, StoredRole};

/// Turns an identity session into an application user
///
/// Fails closed: any missing or unreadable piece yields no user. Only an
/// approved profile with a recognised primary role is granted.
pub struct SessionRoleResolver {
    auth_mode: AuthMode,
    profile_store: Arc<ProfileStore>,
    role_store: Arc<RoleStore>,
}

impl SessionRoleResolver {
    pub fn new(
        auth_mode: AuthMode,
        profile_store: Arc<ProfileStore>,
        role_store: Arc<RoleStore>,
    ) -> Self {
        Self {
            auth_mode,
            profile_store,
            role_store,
        }
    }

    pub fn auth_mode(&self) -> &AuthMode {
        &self.auth_mode
    }

    pub async fn resolve(
        &self,
        conn: &impl ConnectionTrait,
        user_id: Option<&str>,
    ) -> Result<SessionState, InternalError> {
        // Step 1: No identity session
        let Some(user_id) = user_id else {
            return Ok(SessionState::anonymous());
        };

        if let AuthMode::FixturedForDevelopment(fixture) = &self.auth_mode {
            tracing::debug!("Fixture session granted for {}", user_id);
            return Ok(SessionState::granted(fixture.clone()));
        }

        // Step 2: Profile
        let Some(profile) = self.profile_store.find_by_user_id(conn, user_id).await? else {
            tracing::warn!("Session for {} has no profile", user_id);
            return Ok(SessionState::denied(None, SessionDenial::ProfileMissing));
        };

        // Step 3-4: Approval gate
        let approval_status = profile.approval_status.unwrap_or_default();
        match approval_status {
            ApprovalStatus::Approved => {}
            ApprovalStatus::Pending => {
                return Ok(SessionState::denied(
                    Some(approval_status),
                    SessionDenial::PendingApproval,
                ));
            }
            ApprovalStatus::Rejected => {
                return Ok(SessionState::denied(
                    Some(approval_status),
                    SessionDenial::Rejected,
                ));
            }
        }

        // Step 5: Primary role
        let Some(stored_role) = self.role_store.primary_role(conn, user_id).await? else {
            tracing::warn!("Approved user {} has no role assignment", user_id);
            return Ok(SessionState::denied(None, SessionDenial::NoRoleAssigned));
        };

        // Step 6: Role vocabulary
        let role = match StoredRole::from_str(&stored_role) {
            Ok(role) => role.display_role(),
            Err(_) => {
                tracing::warn!("User {} has unrecognised role '{}'", user_id, stored_role);
                return Ok(SessionState::denied(None, SessionDenial::InvalidRole));
            }
        };

        // Step 7: Application user
        Ok(SessionState::granted(AppUser {
            id: profile.user_id,
            name: profile.full_name,
            email: profile.email,
            role,
            created_at: profile.created_at,
            approval_status,
            is_verified: profile.is_verified,
            organization_id: profile.organization_id,
            department: profile.department,
        }))
    }
}
