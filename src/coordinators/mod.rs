// Coordinators layer - Workflow orchestration
//
// Coordinators handle workflow orchestration by composing provider and store
// operations for specific API endpoints and CLI commands. They own
// transaction boundaries and audit logging.

pub mod approval_coordinator;
pub mod demo_seed_coordinator;
pub mod otp_coordinator;
pub mod registration_coordinator;
pub mod session_coordinator;

#[cfg(test)]
mod registration_coordinator_test;
#[cfg(test)]
mod session_coordinator_test;

pub use approval_coordinator::{ApprovalCoordinator, ApprovalDecision};
pub use demo_seed_coordinator::{DemoSeedCoordinator, SeededAccount};
pub use otp_coordinator::OtpCoordinator;
pub use registration_coordinator::{
    RegistrationCoordinator, RegistrationOutcome, RegistrationRequest,
};
pub use session_coordinator::{LoginOutcome, SessionCoordinator};
