// Providers layer - Work performers and business logic
//
// Providers contain business logic and provide composable operations that
// coordinators can orchestrate. Operations that touch storage take the
// connection (or open transaction) from the caller.

pub mod crypto_provider;
pub mod email_provider;
pub mod identity_provider;
pub mod input_validation;
pub mod institution_directory;
pub mod otp_provider;
pub mod password_policy_provider;
pub mod session_role_resolver;
pub mod token_provider;


pub use crypto_provider::CryptoProvider;
pub use email_provider::{DisabledEmailSender, EmailMessage, EmailSender, ResendEmailSender};
pub use identity_provider::IdentityProvider;
pub use institution_directory::InstitutionDirectory;
pub use otp_provider::{IssuedOtp, OtpProvider};
pub use password_policy_provider::PasswordPolicyProvider;
pub use session_role_resolver::SessionRoleResolver;
pub use token_provider::TokenProvider;
