use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use skal_shared::errors::{AppError, ErrorCode};

pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::internal(format!("password hashing failed: {e}")))
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| AppError::internal(format!("invalid password hash: {e}")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

pub fn validate_password(password: &str) -> Result<(), AppError> {
    if password.len() < 6 {
        return Err(AppError::new(
            ErrorCode::PasswordTooWeak,
            "password must be at least 6 characters",
        ));
    }
    if password.len() > 64 {
        return Err(AppError::new(
            ErrorCode::PasswordTooWeak,
            "password must be at most 64 characters",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_round_trip() {
        let hash = hash_password("glogg123").unwrap();
        assert!(verify_password("glogg123", &hash).unwrap());
        assert!(!verify_password("mead456", &hash).unwrap());
    }

    #[test]
    fn hashes_are_salted() {
        let a = hash_password("glogg123").unwrap();
        let b = hash_password("glogg123").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn password_length_policy() {
        assert!(validate_password("short").is_err());
        assert!(validate_password("longer").is_ok());
        assert!(validate_password(&"x".repeat(65)).is_err());
        assert!(validate_password(&"x".repeat(64)).is_ok());
    }
}
