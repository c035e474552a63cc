use argon2::password_hash::SaltString;
use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version};
use hmac::{Hmac, Mac};
use rand::Rng;
use sha2::Sha256;

use crate::errors::InternalError;

type HmacSha256 = Hmac<Sha256>;

/// Password hashing, OTP generation and OTP digests
///
/// The server pepper is the Argon2 secret for passwords and the HMAC key for
/// stored OTP digests, so neither can be checked offline from a database
/// dump alone.
pub struct CryptoProvider {
    pepper: String,
}

impl CryptoProvider {
    pub fn new(pepper: impl Into<String>) -> Self {
        Self {
            pepper: pepper.into(),
        }
    }

    fn argon2(&self) -> Result<Argon2<'_>, InternalError> {
        Argon2::new_with_secret(
            self.pepper.as_bytes(),
            Algorithm::Argon2id,
            Version::V0x13,
            Params::default(),
        )
        .map_err(|e| InternalError::crypto("argon2_init", e.to_string()))
    }

    /// Argon2id hash in PHC string format
    pub fn hash_password(&self, password: &str) -> Result<String, InternalError> {
        let salt = SaltString::generate(&mut rand_core::OsRng);
        let hash = self
            .argon2()?
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| InternalError::crypto("password_hash", e.to_string()))?;
        Ok(hash.to_string())
    }

    pub fn verify_password(&self, password_hash: &str, password: &str) -> Result<bool, InternalError> {
        let parsed = PasswordHash::new(password_hash)
            .map_err(|e| InternalError::parse("password_hash", e.to_string()))?;

        match self.argon2()?.verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(InternalError::crypto("password_verify", e.to_string())),
        }
    }

    /// Uniformly random six-digit code
    pub fn generate_otp_code(&self) -> String {
        rand::rng().random_range(100_000..=999_999u32).to_string()
    }

    /// Hex HMAC-SHA256 of an OTP code keyed with the pepper
    pub fn otp_digest(&self, code: &str) -> Result<String, InternalError> {
        let mut mac = HmacSha256::new_from_slice(self.pepper.as_bytes())
            .map_err(|e| InternalError::crypto("otp_digest", e.to_string()))?;
        mac.update(code.as_bytes());
        Ok(format!("{:x}", mac.finalize().into_bytes()))
    }

    /// Compare a presented code against a stored digest without early exit
    pub fn otp_matches(&self, code: &str, stored_digest: &str) -> Result<bool, InternalError> {
        let presented = self.otp_digest(code)?;
        let (a, b) = (presented.as_bytes(), stored_digest.as_bytes());
        if a.len() != b.len() {
            return Ok(false);
        }
        Ok(a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0)
    }

    /// 20-character password for seeded demo accounts
    ///
    /// Always contains an upper, a lower, a digit and a symbol so it passes
    /// the password policy.
    pub fn generate_secure_password(&self) -> String {
        const UPPER: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ";
        const LOWER: &[u8] = b"abcdefghijkmnopqrstuvwxyz";
        const DIGITS: &[u8] = b"23456789";
        const SYMBOLS: &[u8] = b"!@#$%^&*-_=+?";
        const LENGTH: usize = 20;

        let mut rng = rand::rng();
        let mut pick = |set: &[u8]| set[rng.random_range(0..set.len())] as char;

        let mut chars: Vec<char> = vec![pick(UPPER), pick(LOWER), pick(DIGITS), pick(SYMBOLS)];
        let all: Vec<u8> = [UPPER, LOWER, DIGITS, SYMBOLS].concat();
        while chars.len() < LENGTH {
            chars.push(pick(&all));
        }

        let mut rng = rand::rng();
        for i in (1..chars.len()).rev() {
            let j = rng.random_range(0..=i);
            chars.swap(i, j);
        }
        chars.into_iter().collect()
    }
}

impl std::fmt::Debug for CryptoProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CryptoProvider")
            .field("pepper", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn crypto() -> CryptoProvider {
        CryptoProvider::new("test-pepper-for-unit-tests")
    }

    #[test]
    fn test_password_hash_round_trip() {
        let crypto = crypto();
        let hash = crypto.hash_password("Correct-Horse-9").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(crypto.verify_password(&hash, "Correct-Horse-9").unwrap());
        assert!(!crypto.verify_password(&hash, "correct-horse-9").unwrap());
    }

    #[test]
    fn test_pepper_is_part_of_the_hash() {
        let hash = crypto().hash_password("Correct-Horse-9").unwrap();
        let other = CryptoProvider::new("a-different-pepper-value");

        assert!(!other.verify_password(&hash, "Correct-Horse-9").unwrap());
    }

    #[test]
    fn test_otp_codes_are_six_digits_in_range() {
        let crypto = crypto();
        for _ in 0..1000 {
            let code = crypto.generate_otp_code();
            assert_eq!(code.len(), 6);
            let value: u32 = code.parse().unwrap();
            assert!((100_000..=999_999).contains(&value));
        }
    }

    #[test]
    fn test_otp_digest_matches_only_same_code() {
        let crypto = crypto();
        let digest = crypto.otp_digest("123456").unwrap();

        assert_eq!(digest.len(), 64);
        assert!(crypto.otp_matches("123456", &digest).unwrap());
        assert!(!crypto.otp_matches("123457", &digest).unwrap());
        assert!(!CryptoProvider::new("other-pepper-0000").otp_matches("123456", &digest).unwrap());
    }

    #[test]
    fn test_generated_password_has_every_class() {
        let password = crypto().generate_secure_password();

        assert_eq!(password.chars().count(), 20);
        assert!(password.chars().any(|c| c.is_ascii_uppercase()));
        assert!(password.chars().any(|c| c.is_ascii_lowercase()));
        assert!(password.chars().any(|c| c.is_ascii_digit()));
        assert!(password.chars().any(|c| !c.is_alphanumeric()));
    }
}
