// Errors layer - Error type definitions
pub mod api;
pub mod internal;
pub mod kind;

// Re-exports for convenience
pub use api::{AdminError, AuthError};
pub use internal::InternalError;
pub use kind::ErrorKind;
