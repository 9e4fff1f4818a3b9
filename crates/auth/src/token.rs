//! Signed credential issue/validation (HS256 JWT).

use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use corebank_core::{DomainError, DomainResult, UserId};

use crate::user::{Role, User};

/// Claims embedded in an issued credential.
///
/// `iat`/`exp` are unix seconds, the numeric form the verifier checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the principal's email.
    pub sub: String,
    /// Principal id, so handlers can skip an email lookup.
    pub uid: UserId,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    /// Expiry as a timestamp (drives revocation-entry eviction).
    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp, 0).single().unwrap_or_else(Utc::now)
    }
}

/// Issues signed credentials for authenticated principals.
pub trait TokenIssuer: Send + Sync {
    fn issue(&self, user: &User) -> DomainResult<String>;
}

/// Validates a presented credential and returns its claims.
///
/// Validation here covers signature and time window only; revocation is the
/// caller's job (consult the [`crate::RevocationSet`] first).
pub trait TokenValidator: Send + Sync {
    fn validate(&self, token: &str) -> DomainResult<Claims>;
}

/// HS256 signer/verifier sharing one secret.
pub struct Hs256TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl Hs256TokenCodec {
    /// `ttl` bounds every issued credential's lifetime.
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
        }
    }
}

impl TokenIssuer for Hs256TokenCodec {
    fn issue(&self, user: &User) -> DomainResult<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.email.clone(),
            uid: user.id,
            role: user.role,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| DomainError::internal(format!("token signing failed: {e}")))
    }
}

impl TokenValidator for Hs256TokenCodec {
    fn validate(&self, token: &str) -> DomainResult<Claims> {
        let validation = Validation::new(Algorithm::HS256);
        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|_| DomainError::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_user(email: &str, role: Role) -> User {
        let now = Utc::now();
        User {
            id: UserId::new(),
            email: email.to_string(),
            password_hash: String::new(),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            phone_number: "+15550000000".to_string(),
            role,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn issued_tokens_validate_and_carry_identity() {
        let codec = Hs256TokenCodec::new(b"test-secret", Duration::minutes(10));
        let user = test_user("alice@example.com", Role::Admin);

        let token = codec.issue(&user).unwrap();
        let claims = codec.validate(&token).unwrap();

        assert_eq!(claims.sub, "alice@example.com");
        assert_eq!(claims.uid, user.id);
        assert_eq!(claims.role, Role::Admin);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn wrong_secret_is_unauthorized() {
        let codec = Hs256TokenCodec::new(b"secret-a", Duration::minutes(10));
        let other = Hs256TokenCodec::new(b"secret-b", Duration::minutes(10));
        let token = codec.issue(&test_user("a@example.com", Role::User)).unwrap();

        assert_eq!(other.validate(&token).unwrap_err(), DomainError::Unauthorized);
    }

    #[test]
    fn expired_tokens_are_rejected() {
        // negative ttl puts exp in the past immediately
        let codec = Hs256TokenCodec::new(b"test-secret", Duration::minutes(-10));
        let token = codec.issue(&test_user("a@example.com", Role::User)).unwrap();

        assert_eq!(codec.validate(&token).unwrap_err(), DomainError::Unauthorized);
    }

    #[test]
    fn garbage_tokens_are_rejected() {
        let codec = Hs256TokenCodec::new(b"test-secret", Duration::minutes(10));
        assert_eq!(
            codec.validate("not.a.jwt").unwrap_err(),
            DomainError::Unauthorized
        );
    }
}
