use poem_openapi::Object;
use serde::{Deserialize, Serialize};

use crate::coordinators::RegistrationRequest;
use crate::types::internal::{AppUser, SessionState};

/// Registration form
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub full_name: String,
    pub email: String,
    pub password: String,

    /// One of super_admin, admin, staff, student, parent, support
    pub role: String,

    /// Created by a super_admin, joined by everyone else
    pub institution_code: String,

    pub department: Option<String>,

    /// Display name when a super_admin creates the institution
    pub institution_name: Option<String>,
}

impl From<RegisterRequest> for RegistrationRequest {
    fn from(body: RegisterRequest) -> Self {
        Self {
            full_name: body.full_name,
            email: body.email,
            password: body.password,
            role: body.role,
            institution_code: body.institution_code,
            department: body.department,
            institution_name: body.institution_name,
        }
    }
}

#[derive(Object, Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub success: bool,
    pub user_id: String,
    pub approval_status: String,
}

/// Request model for user login
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Resolved application user
#[derive(Object, Debug, Clone, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: String,
    pub name: String,
    pub email: String,

    /// SuperAdmin, Admin, Faculty, Student, Parent or Support
    pub role: String,

    /// Epoch milliseconds
    pub created_at: i64,
    pub approval_status: String,
    pub is_verified: bool,
    pub organization_id: Option<String>,
    pub department: Option<String>,
}

impl From<AppUser> for SessionUser {
    fn from(user: AppUser) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role.as_str().to_owned(),
            created_at: user.created_at,
            approval_status: user.approval_status.as_str().to_owned(),
            is_verified: user.is_verified,
            organization_id: user.organization_id,
            department: user.department,
        }
    }
}

/// `user` is present only for approved accounts with a valid role
#[derive(Object, Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    pub user: Option<SessionUser>,
    pub approval_status: Option<String>,
}

impl From<SessionState> for SessionResponse {
    fn from(state: SessionState) -> Self {
        Self {
            approval_status: state.approval_status.map(|s| s.as_str().to_owned()),
            user: state.user.map(SessionUser::from),
        }
    }
}

/// Response model containing the access token and resolved session
#[derive(Object, Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    /// JWT access token for API authentication
    pub access_token: String,

    /// Token type (always "Bearer")
    pub token_type: String,

    /// Number of seconds until the access token expires
    pub expires_in: i64,

    pub session: SessionResponse,
}

#[derive(Object, Debug, Serialize, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}
