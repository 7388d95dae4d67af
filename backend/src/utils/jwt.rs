//! JWT token utilities for authentication and account lifecycle emails.
//!
//! Three kinds of token are issued, each with its own secret and lifetime:
//! session tokens (7 days), registration tokens carrying a pending account
//! (10 minutes) and password reset tokens (10 minutes). A token signed for one
//! purpose never verifies for another.

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::models::RegistrationIntent;
use crate::config::Config;

/// Session token lifetime.
pub const SESSION_TOKEN_TTL_SECS: i64 = 7 * 24 * 60 * 60;
/// Account activation link lifetime.
pub const REGISTRATION_TOKEN_TTL_SECS: i64 = 10 * 60;
/// Password reset link lifetime.
pub const RESET_TOKEN_TTL_SECS: i64 = 10 * 60;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("invalid token")]
    Invalid,
    #[error("token signing failed: {0}")]
    Signing(String),
}

/// Claims carried by a session token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SessionClaims {
    /// User ID
    pub sub: String,
    pub exp: usize,
    pub iat: usize,
}

/// Claims carried by an account activation token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RegistrationClaims {
    #[serde(flatten)]
    pub intent: RegistrationIntent,
    pub exp: usize,
    pub iat: usize,
}

/// Claims carried by a password reset token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ResetClaims {
    /// Display name of the user the link was issued for.
    pub name: String,
    pub exp: usize,
    pub iat: usize,
}

impl SessionClaims {
    pub fn user_id(&self) -> &str {
        &self.sub
    }
}

struct SigningKey {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl SigningKey {
    fn from_secret(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }
}

/// Issues and verifies the three token kinds.
pub struct TokenService {
    session: SigningKey,
    registration: SigningKey,
    reset: SigningKey,
    validation: Validation,
}

impl TokenService {
    pub fn new(session_secret: &str, registration_secret: &str, reset_secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            session: SigningKey::from_secret(session_secret),
            registration: SigningKey::from_secret(registration_secret),
            reset: SigningKey::from_secret(reset_secret),
            validation,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            &config.jwt_secret,
            &config.jwt_account_activation,
            &config.jwt_reset_password,
        )
    }

    /// Issues a session token for an authenticated user.
    pub fn issue_session(&self, user_id: &str) -> Result<String, TokenError> {
        let (iat, exp) = window(SESSION_TOKEN_TTL_SECS);
        let claims = SessionClaims {
            sub: user_id.to_string(),
            exp,
            iat,
        };
        sign(&claims, &self.session)
    }

    /// Issues an activation token that carries the whole pending account.
    pub fn issue_registration(&self, intent: &RegistrationIntent) -> Result<String, TokenError> {
        let (iat, exp) = window(REGISTRATION_TOKEN_TTL_SECS);
        let claims = RegistrationClaims {
            intent: intent.clone(),
            exp,
            iat,
        };
        sign(&claims, &self.registration)
    }

    /// Issues a password reset token for the named user.
    pub fn issue_reset(&self, display_name: &str) -> Result<String, TokenError> {
        let (iat, exp) = window(RESET_TOKEN_TTL_SECS);
        let claims = ResetClaims {
            name: display_name.to_string(),
            exp,
            iat,
        };
        sign(&claims, &self.reset)
    }

    pub fn verify_session(&self, token: &str) -> Result<SessionClaims, TokenError> {
        self.verify(token, &self.session)
    }

    pub fn verify_registration(&self, token: &str) -> Result<RegistrationClaims, TokenError> {
        self.verify(token, &self.registration)
    }

    pub fn verify_reset(&self, token: &str) -> Result<ResetClaims, TokenError> {
        self.verify(token, &self.reset)
    }

    fn verify<C: DeserializeOwned>(&self, token: &str, key: &SigningKey) -> Result<C, TokenError> {
        decode::<C>(token, &key.decoding, &self.validation)
            .map(|token_data| token_data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            })
    }
}

fn window(ttl_secs: i64) -> (usize, usize) {
    let now = Utc::now();
    let exp = now + Duration::seconds(ttl_secs);
    (now.timestamp() as usize, exp.timestamp() as usize)
}

fn sign<C: Serialize>(claims: &C, key: &SigningKey) -> Result<String, TokenError> {
    encode(&Header::new(Algorithm::HS256), claims, &key.encoding)
        .map_err(|e| TokenError::Signing(e.to_string()))
}
