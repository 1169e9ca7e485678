use crate::models::Claims;
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::Error};
use std::time::Duration;
use uuid::Uuid;

/// Seconds of clock skew accepted past `exp`.
const LEEWAY: u64 = 60;

fn now() -> usize {
    Utc::now().timestamp().max(0) as usize
}

/// Issues the short-lived token that authorises clock actions for one user.
pub fn generate_clock_token(
    user_id: u64,
    username: String,
    secret: &str,
    ttl: usize,
) -> Result<String, Error> {
    let claims = Claims {
        user_id,
        sub: username,
        exp: now() + ttl,
        jti: Uuid::new_v4().to_string(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// How long a token issued with `ttl` can still pass [`verify_token`].
pub fn accepted_for(ttl: usize) -> Duration {
    Duration::from_secs(ttl as u64 + LEEWAY)
}

pub fn verify_token(token: &str, secret: &str) -> Result<Claims, String> {
    let mut validation = Validation::default();
    validation.leeway = LEEWAY;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_round_trip() {
        let token = generate_clock_token(4, "jdoe".into(), "s3cret", 60).unwrap();
        let claims = verify_token(&token, "s3cret").unwrap();
        assert_eq!(claims.user_id, 4);
        assert_eq!(claims.sub, "jdoe");
        assert!(!claims.jti.is_empty());
    }

    #[test]
    fn each_token_gets_its_own_id() {
        let a = generate_clock_token(4, "jdoe".into(), "s3cret", 60).unwrap();
        let b = generate_clock_token(4, "jdoe".into(), "s3cret", 60).unwrap();
        assert_ne!(
            verify_token(&a, "s3cret").unwrap().jti,
            verify_token(&b, "s3cret").unwrap().jti
        );
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = generate_clock_token(4, "jdoe".into(), "s3cret", 60).unwrap();
        assert!(verify_token(&token, "other").is_err());
    }
}
