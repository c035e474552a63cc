// Stores layer - Data access, one store per table
pub mod account_store;
pub mod approval_store;
pub mod audit_store;
pub mod organization_store;
pub mod otp_store;
pub mod profile_store;
pub mod role_store;

pub use account_store::AccountStore;
pub use approval_store::{ApprovalStore, PendingApproval};
pub use audit_store::AuditStore;
pub use organization_store::{NewOrganization, OrganizationStore};
pub use otp_store::{NewOtp, OtpStore};
pub use profile_store::{NewProfile, ProfileStore};
pub use role_store::RoleStore;
