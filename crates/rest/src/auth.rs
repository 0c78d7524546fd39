//! Session tokens and credential verification.
//!
//! Sessions are stateless HS256 JWTs. The claims carry the user id and the
//! principal tokens computed at login, so authorization decisions never go
//! back to storage during a request.

use argon2::password_hash::PasswordHash;
use argon2::{Argon2, PasswordVerifier};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use lectern_persistence::auth::{Principal, PrincipalToken};

use crate::error::RestError;

/// Minimum length of the signing secret in bytes.
const MIN_SECRET_LEN: usize = 32;

/// JWT claims for a Lectern session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id (login name).
    pub sub: String,
    /// Principal tokens in their wire form.
    pub principals: Vec<String>,
    /// Issued-at, seconds since the epoch.
    pub iat: u64,
    /// Expiry, seconds since the epoch.
    pub exp: u64,
}

/// Issues and verifies session tokens.
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl_secs: u64,
}

impl TokenService {
    /// Creates a token service from a signing secret.
    ///
    /// Short secrets are refused: HS256 with a guessable key is worse than
    /// no authentication at all.
    pub fn new(secret: &str, ttl_secs: u64) -> Result<Self, RestError> {
        if secret.len() < MIN_SECRET_LEN {
            return Err(RestError::Internal(format!(
                "JWT secret must be at least {MIN_SECRET_LEN} bytes"
            )));
        }
        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
            ttl_secs,
        })
    }

    /// Issues a token for an authenticated principal.
    pub fn issue(&self, principal: &Principal) -> Result<String, RestError> {
        let now = jsonwebtoken::get_current_timestamp();
        let claims = Claims {
            sub: principal.userid.clone(),
            principals: principal.tokens.iter().map(|t| t.to_string()).collect(),
            iat: now,
            exp: now + self.ttl_secs,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| RestError::Internal(format!("failed to sign token: {e}")))
    }

    /// Verifies a token and rebuilds the principal from its claims.
    pub fn verify(&self, token: &str) -> Result<Principal, RestError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation)
            .map_err(|_| RestError::unauthorized("invalid or expired token"))?;

        let mut tokens = Vec::with_capacity(data.claims.principals.len());
        for raw in &data.claims.principals {
            let token: PrincipalToken = raw
                .parse()
                .map_err(|_| RestError::unauthorized("malformed principal token"))?;
            tokens.push(token);
        }
        Ok(Principal::new(data.claims.sub, tokens))
    }
}

/// Verifies a password against the stored credential.
///
/// Credentials are stored as PHC-formatted Argon2 hashes. Anything that does
/// not parse as a hash is treated as a legacy plaintext credential and
/// compared directly; imports from older systems still work that way.
pub fn verify_credentials(password: &str, stored: &str) -> bool {
    match PasswordHash::new(stored) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => stored == password,
    }
}

/// Hashes a password for storage, PHC format.
pub fn hash_credentials(password: &str) -> Result<String, RestError> {
    use argon2::PasswordHasher;
    use argon2::password_hash::{SaltString, rand_core::OsRng};

    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| RestError::Internal(format!("failed to hash password: {e}")))
}
