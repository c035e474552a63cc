use crate::errors::internal::PasswordPolicyError;

const MAX_PASSWORD_LENGTH: usize = 128;

/// Password strength rules applied before any account write
///
/// Checks run in a fixed order and stop at the first failure:
/// length, uppercase, lowercase, digit, special character.
#[derive(Debug, Clone)]
pub struct PasswordPolicyProvider {
    min_length: usize,
    max_length: usize,
}

impl PasswordPolicyProvider {
    pub fn new(min_length: usize) -> Self {
        Self {
            min_length,
            max_length: MAX_PASSWORD_LENGTH,
        }
    }

    pub fn min_length(&self) -> usize {
        self.min_length
    }

    pub fn validate(&self, password: &str) -> Result<(), PasswordPolicyError> {
        let length = password.chars().count();
        if length < self.min_length {
            return Err(PasswordPolicyError::TooShort(self.min_length));
        }
        if length > self.max_length {
            return Err(PasswordPolicyError::TooLong(self.max_length));
        }
        if !password.chars().any(char::is_uppercase) {
            return Err(PasswordPolicyError::MissingUppercase);
        }
        if !password.chars().any(char::is_lowercase) {
            return Err(PasswordPolicyError::MissingLowercase);
        }
        if !password.chars().any(|c| c.is_ascii_digit()) {
            return Err(PasswordPolicyError::MissingDigit);
        }
        if !password.chars().any(|c| !c.is_alphanumeric() && !c.is_whitespace()) {
            return Err(PasswordPolicyError::MissingSpecial);
        }
        Ok(())
    }
}

impl Default for PasswordPolicyProvider {
    fn default() -> Self {
        Self::new(12)
    }
}
