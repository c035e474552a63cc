use thiserror::Error;

#[derive(Error, Debug)]
pub enum InstitutionError {
    #[error("Invalid institution code")]
    NotFound { code: String },

    #[error("Institution code '{code}' is already taken")]
    CodeTaken { code: String },
}
