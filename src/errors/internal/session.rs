use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Authentication required")]
    Unauthenticated,

    /// The identity session exists but the resolver denied an application user
    #[error("Session has no application role ({reason})")]
    NoApplicationRole { reason: &'static str },
}
