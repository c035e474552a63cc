use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegistrationError {
    #[error("An account with this email already exists")]
    EmailAlreadyRegistered { email: String },

    /// A write after account creation failed; the whole registration was
    /// rolled back
    #[error("Registration failed while creating {stage}; no account was kept")]
    ProfileSetupFailed {
        stage: &'static str,
        #[source]
        source: Box<super::InternalError>,
    },
}
