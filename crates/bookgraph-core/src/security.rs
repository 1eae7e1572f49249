use argon2::{
    password_hash::{rand_core::OsRng, SaltString},
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::{Account, AccountId, AuthConfig};

#[derive(Error, Debug)]
pub enum SecurityError {
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Token generation failed: {0}")]
    TokenGeneration(String),
    #[error("Malformed token: {0}")]
    MalformedToken(String),
    #[error("Password hashing failed: {0}")]
    Hashing(String),
}

/// Claims embedded in a login token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenClaims {
    pub sub: String,
    pub username: String,
    pub iat: i64,
    pub exp: i64,
}

impl TokenClaims {
    pub fn account_id(&self) -> Result<AccountId, SecurityError> {
        Uuid::parse_str(&self.sub).map_err(|e| SecurityError::MalformedToken(e.to_string()))
    }
}

/// Signs and validates HS256 login tokens.
pub struct JwtManager {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl JwtManager {
    pub fn new(config: &AuthConfig) -> Result<Self, SecurityError> {
        let secret = config
            .jwt_secret
            .as_ref()
            .ok_or_else(|| SecurityError::TokenGeneration("jwt secret not configured".into()))?;
        let bytes = secret.expose_secret().as_bytes();
        Ok(Self {
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
            ttl: Duration::hours(config.token_ttl_hours as i64),
        })
    }

    pub fn create_token(&self, account: &Account) -> Result<String, SecurityError> {
        let now = Utc::now();
        let claims = TokenClaims {
            sub: account.id.to_string(),
            username: account.username.clone(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| SecurityError::TokenGeneration(e.to_string()))
    }

    pub fn validate_token(&self, token: &str) -> Result<TokenClaims, SecurityError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;

        decode::<TokenClaims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| SecurityError::MalformedToken(e.to_string()))
    }
}

/// Argon2 password hashing for account credentials.
#[derive(Default)]
pub struct CredentialHasher {
    argon2: Argon2<'static>,
}

impl CredentialHasher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hash(&self, password: &str) -> Result<String, SecurityError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| SecurityError::Hashing(e.to_string()))
    }

    pub fn verify(&self, password: &str, hash: &str) -> Result<(), SecurityError> {
        let parsed = PasswordHash::new(hash).map_err(|e| SecurityError::Hashing(e.to_string()))?;
        self.argon2
            .verify_password(password.as_bytes(), &parsed)
            .map_err(|_| SecurityError::InvalidCredentials)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NewAccount;
    use secrecy::SecretString;

    fn config(secret: &str) -> AuthConfig {
        AuthConfig {
            jwt_secret: Some(SecretString::from(secret.to_string())),
            token_ttl_hours: 1,
        }
    }

    fn account() -> Account {
        NewAccount {
            username: "mluukkai".into(),
            password_hash: String::new(),
            favorite_genre: "refactoring".into(),
        }
        .into_account()
    }

    #[test]
    fn token_round_trips_account_identity() {
        let manager = JwtManager::new(&config("a-test-secret-that-is-long-enough!!")).unwrap();
        let account = account();

        let token = manager.create_token(&account).unwrap();
        let claims = manager.validate_token(&token).unwrap();

        assert_eq!(claims.username, "mluukkai");
        assert_eq!(claims.account_id().unwrap(), account.id);
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let signer = JwtManager::new(&config("a-test-secret-that-is-long-enough!!")).unwrap();
        let verifier = JwtManager::new(&config("another-secret-that-is-long-enough!")).unwrap();

        let token = signer.create_token(&account()).unwrap();
        assert!(matches!(
            verifier.validate_token(&token),
            Err(SecurityError::MalformedToken(_))
        ));
    }

    #[test]
    fn missing_secret_is_an_error() {
        let config = AuthConfig {
            jwt_secret: None,
            token_ttl_hours: 1,
        };
        assert!(JwtManager::new(&config).is_err());
    }

    #[test]
    fn password_hash_verifies_only_the_hashed_password() {
        let hasher = CredentialHasher::new();
        let hash = hasher.hash("correct horse").unwrap();

        assert!(hasher.verify("correct horse", &hash).is_ok());
        assert!(matches!(
            hasher.verify("secret", &hash),
            Err(SecurityError::InvalidCredentials)
        ));
    }
}
