use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::{
    config::MAX_SESSION_TTL_HOURS,
    error::Result,
    models::{Flash, FlashKind, User},
};

/// Lifetime of a flash token; it only has to survive one redirect
const FLASH_TTL_SECONDS: i64 = 60;

#[derive(Debug, Serialize, Deserialize)]
struct SessionClaims {
    sub: i64,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Serialize, Deserialize)]
struct FlashClaims {
    kind: FlashKind,
    message: String,
    exp: i64,
}

/// Signs and verifies the session and flash cookies
pub struct AuthService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    session_ttl: Duration,
}

impl AuthService {
    pub fn new(secret: &str, session_ttl_hours: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            session_ttl: Duration::hours(session_ttl_hours.clamp(1, MAX_SESSION_TTL_HOURS)),
        }
    }

    pub fn session_ttl_seconds(&self) -> i64 {
        self.session_ttl.num_seconds()
    }

    /// Issue a session token for `user`
    pub fn issue_session(&self, user: &User) -> Result<String> {
        let now = Utc::now();
        let claims = SessionClaims {
            sub: user.id,
            iat: now.timestamp(),
            exp: (now + self.session_ttl).timestamp(),
        };

        Ok(encode(&Header::default(), &claims, &self.encoding_key)?)
    }

    /// User id carried by a valid, unexpired session token
    pub fn read_session(&self, token: &str) -> Option<i64> {
        match decode::<SessionClaims>(token, &self.decoding_key, &Validation::default()) {
            Ok(data) => Some(data.claims.sub),
            Err(err) => {
                tracing::debug!("Rejected session token: {}", err);
                None
            }
        }
    }

    pub fn encode_flash(&self, flash: &Flash) -> Result<String> {
        let claims = FlashClaims {
            kind: flash.kind,
            message: flash.message.clone(),
            exp: Utc::now().timestamp() + FLASH_TTL_SECONDS,
        };

        Ok(encode(&Header::default(), &claims, &self.encoding_key)?)
    }

    pub fn decode_flash(&self, token: &str) -> Option<Flash> {
        decode::<FlashClaims>(token, &self.decoding_key, &Validation::default())
            .ok()
            .map(|data| Flash::new(data.claims.kind, data.claims.message))
    }
}

/// Hash a password into an Argon2id PHC string
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::encode_b64(&rand::random::<[u8; 16]>())?;
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

pub fn verify_password(password: &str, password_hash: &str) -> bool {
    match PasswordHash::new(password_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(err) => {
            tracing::error!("Stored password hash is unreadable: {}", err);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    fn user(id: i64) -> User {
        User {
            id,
            name: "Test User".to_string(),
            email: "test@example.com".to_string(),
            password_hash: String::new(),
            role: Role::Customer,
        }
    }

    #[test]
    fn password_hash_verifies_only_the_original_password() {
        let hash = hash_password("s3cret").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("s3cret", &hash));
        assert!(!verify_password("wrong", &hash));
        assert!(!verify_password("s3cret", "not-a-phc-string"));
    }

    #[test]
    fn session_token_carries_user_id() {
        let auth = AuthService::new("test-secret", 24);
        let token = auth.issue_session(&user(42)).unwrap();
        assert_eq!(auth.read_session(&token), Some(42));
    }

    #[test]
    fn session_ttl_is_kept_in_range() {
        assert_eq!(AuthService::new("test-secret", 0).session_ttl_seconds(), 3600);
        assert_eq!(
            AuthService::new("test-secret", i64::MAX).session_ttl_seconds(),
            MAX_SESSION_TTL_HOURS * 3600
        );
    }

    #[test]
    fn session_signed_with_other_secret_is_rejected() {
        let issuer = AuthService::new("secret-a", 24);
        let verifier = AuthService::new("secret-b", 24);
        let token = issuer.issue_session(&user(1)).unwrap();
        assert_eq!(verifier.read_session(&token), None);
    }

    #[test]
    fn flash_token_is_not_a_session() {
        let auth = AuthService::new("test-secret", 24);
        let flash = Flash::new(FlashKind::Success, "Welcome back!");
        let token = auth.encode_flash(&flash).unwrap();
        assert_eq!(auth.decode_flash(&token), Some(flash));
        assert_eq!(auth.read_session(&token), None);
    }
}
