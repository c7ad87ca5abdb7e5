use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use skal_shared::errors::{AppError, ErrorCode};
use skal_shared::types::{ActionClaims, Claims, TokenPurpose};

pub fn create_access_token(user_id: Uuid, secret: &str, ttl_secs: i64) -> Result<String, AppError> {
    let claims = Claims::new(user_id, ttl_secs);
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::internal(format!("JWT encoding failed: {e}")))
}

/// Signs a single-purpose token for the verification and password-reset
/// emails. The bearer proves the capability; nothing else is read from it.
pub fn create_action_token(
    user_id: Uuid,
    purpose: TokenPurpose,
    secret: &str,
    ttl_secs: i64,
) -> Result<String, AppError> {
    let claims = ActionClaims::new(user_id, purpose, ttl_secs);
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::internal(format!("JWT encoding failed: {e}")))
}

pub fn verify_action_token(
    token: &str,
    expected: TokenPurpose,
    secret: &str,
) -> Result<Uuid, AppError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;

    let data = decode::<ActionClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
            AppError::new(ErrorCode::TokenExpired, "token has expired")
        }
        _ => AppError::new(ErrorCode::TokenInvalid, format!("invalid token: {e}")),
    })?;

    if data.claims.purpose != expected {
        return Err(AppError::new(
            ErrorCode::TokenInvalid,
            format!("token was issued for {}", data.claims.purpose),
        ));
    }

    Ok(data.claims.sub)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn action_token_round_trip() {
        let user = Uuid::new_v4();
        let token = create_action_token(user, TokenPurpose::VerifyEmail, SECRET, 600).unwrap();
        let sub = verify_action_token(&token, TokenPurpose::VerifyEmail, SECRET).unwrap();
        assert_eq!(sub, user);
    }

    #[test]
    fn purpose_mismatch_rejected() {
        let token =
            create_action_token(Uuid::new_v4(), TokenPurpose::ResetPassword, SECRET, 600).unwrap();
        assert!(verify_action_token(&token, TokenPurpose::VerifyEmail, SECRET).is_err());
    }

    #[test]
    fn wrong_secret_rejected() {
        let token =
            create_action_token(Uuid::new_v4(), TokenPurpose::VerifyEmail, SECRET, 600).unwrap();
        assert!(verify_action_token(&token, TokenPurpose::VerifyEmail, "other-secret").is_err());
    }

    #[test]
    fn expired_token_rejected() {
        // jsonwebtoken applies default leeway, so expire well in the past
        let token =
            create_action_token(Uuid::new_v4(), TokenPurpose::VerifyEmail, SECRET, -600).unwrap();
        let err = verify_action_token(&token, TokenPurpose::VerifyEmail, SECRET).unwrap_err();
        match err {
            AppError::Known { code, .. } => assert_eq!(code, ErrorCode::TokenExpired),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
