//! Input shape checks shared by registration, OTP and login
use std::str::FromStr;

use crate::errors::internal::ValidationError;
use crate::types::internal::StoredRole;

const MAX_EMAIL_LENGTH: usize = 255;
const MAX_FULL_NAME_LENGTH: usize = 100;
const MAX_INSTITUTION_CODE_LENGTH: usize = 64;

/// Trim and lower-case an email after checking it looks like `a@b.c`
pub fn normalize_email(email: &str) -> Result<String, ValidationError> {
    let email = email.trim().to_lowercase();
    if email.len() > MAX_EMAIL_LENGTH || email.chars().any(char::is_whitespace) {
        return Err(ValidationError::EmailInvalid);
    }

    let mut parts = email.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(ValidationError::EmailInvalid);
    };
    // Some dot in the domain needs a character on each side
    let has_inner_dot = domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len());
    if local.is_empty() || !has_inner_dot {
        return Err(ValidationError::EmailInvalid);
    }

    Ok(email)
}

pub fn validate_full_name(full_name: &str) -> Result<String, ValidationError> {
    let full_name = full_name.trim();
    if full_name.is_empty() {
        return Err(ValidationError::FullName("Full name is required".to_owned()));
    }
    if full_name.chars().count() > MAX_FULL_NAME_LENGTH {
        return Err(ValidationError::FullName(format!(
            "Full name must be less than {} characters",
            MAX_FULL_NAME_LENGTH
        )));
    }
    if !full_name
        .chars()
        .all(|c| c.is_alphabetic() || c.is_whitespace() || matches!(c, '.' | '\'' | '-'))
    {
        return Err(ValidationError::FullName(
            "Full name can only contain letters, spaces, hyphens, apostrophes and periods"
                .to_owned(),
        ));
    }
    Ok(full_name.to_owned())
}

/// Trim and lower-case an institution code
pub fn normalize_institution_code(code: &str) -> Result<String, ValidationError> {
    let code = code.trim().to_lowercase();
    if code.is_empty() {
        return Err(ValidationError::InstitutionCode("is required".to_owned()));
    }
    if code.len() > MAX_INSTITUTION_CODE_LENGTH {
        return Err(ValidationError::InstitutionCode(format!(
            "must be at most {} characters",
            MAX_INSTITUTION_CODE_LENGTH
        )));
    }
    if !code
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InstitutionCode(
            "may only contain letters, digits, '-' and '_'".to_owned(),
        ));
    }
    Ok(code)
}

/// Exactly six ASCII digits
pub fn validate_otp_format(otp: &str) -> Result<(), ValidationError> {
    if otp.len() == 6 && otp.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(ValidationError::OtpFormat)
    }
}

/// Comma-separated stored role names, e.g. `student,staff`
///
/// Blank input means no filter.
pub fn parse_role_filter(raw: Option<&str>) -> Result<Option<Vec<StoredRole>>, ValidationError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let roles = raw
        .split(',')
        .map(str::trim)
        .filter(|role| !role.is_empty())
        .map(|role| StoredRole::from_str(role).map_err(|e| ValidationError::UnknownRole(e.0)))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(if roles.is_empty() { None } else { Some(roles) })
}
