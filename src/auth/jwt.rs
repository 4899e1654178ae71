use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Which flow a token may be redeemed by. Serialized as the `type` claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenPurpose {
    Access,
    Refresh,
    Verify,
    Reset,
}

impl TokenPurpose {
    pub fn lifetime(self) -> Duration {
        match self {
            TokenPurpose::Access => Duration::minutes(15),
            TokenPurpose::Refresh => Duration::days(7),
            TokenPurpose::Verify => Duration::hours(24),
            TokenPurpose::Reset => Duration::hours(1),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user_id
    #[serde(rename = "type")]
    pub purpose: TokenPurpose,
    pub jti: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn user_id(&self) -> Result<Uuid, TokenError> {
        Uuid::parse_str(&self.sub).map_err(|_| TokenError::Invalid)
    }
}

#[derive(Error, Debug)]
pub enum TokenError {
    #[error("Invalid or expired token")]
    Invalid,

    #[error("Failed to sign token: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
}

/// Signs and verifies the four token classes.
///
/// Refresh tokens use their own secret; access, verify and reset tokens share
/// the access secret and are told apart only by their purpose claim.
#[derive(Clone)]
pub struct TokenIssuer {
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
    validation: Validation,
}

impl TokenIssuer {
    pub fn new(access_secret: &str, refresh_secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            access_encoding: EncodingKey::from_secret(access_secret.as_bytes()),
            access_decoding: DecodingKey::from_secret(access_secret.as_bytes()),
            refresh_encoding: EncodingKey::from_secret(refresh_secret.as_bytes()),
            refresh_decoding: DecodingKey::from_secret(refresh_secret.as_bytes()),
            validation,
        }
    }

    /// Create access token (short-lived, 15 minutes)
    pub fn issue_access(&self, user_id: Uuid) -> Result<String, TokenError> {
        self.issue(user_id, TokenPurpose::Access, TokenPurpose::Access.lifetime())
    }

    /// Create refresh token (long-lived, 7 days). The caller must register it.
    pub fn issue_refresh(&self, user_id: Uuid) -> Result<String, TokenError> {
        self.issue(user_id, TokenPurpose::Refresh, TokenPurpose::Refresh.lifetime())
    }

    pub fn issue_verify(&self, user_id: Uuid) -> Result<String, TokenError> {
        self.issue(user_id, TokenPurpose::Verify, TokenPurpose::Verify.lifetime())
    }

    pub fn issue_reset(&self, user_id: Uuid) -> Result<String, TokenError> {
        self.issue(user_id, TokenPurpose::Reset, TokenPurpose::Reset.lifetime())
    }

    /// Verify signature, expiry and purpose, and extract the claims.
    pub fn verify(&self, token: &str, expected: TokenPurpose) -> Result<Claims, TokenError> {
        let claims = decode::<Claims>(token, self.decoding_key(expected), &self.validation)
            .map(|data| data.claims)
            .map_err(|_| TokenError::Invalid)?;

        if claims.purpose != expected {
            return Err(TokenError::Invalid);
        }

        Ok(claims)
    }

    pub(crate) fn issue(
        &self,
        user_id: Uuid,
        purpose: TokenPurpose,
        lifetime: Duration,
    ) -> Result<String, TokenError> {
        let now = Utc::now();
        let expiration = now + lifetime;

        let nonce = match purpose {
            TokenPurpose::Reset => Some(hex::encode(rand::thread_rng().gen::<[u8; 32]>())),
            _ => None,
        };

        let claims = Claims {
            sub: user_id.to_string(),
            purpose,
            jti: Uuid::new_v4().to_string(),
            nonce,
            iat: now.timestamp(),
            exp: expiration.timestamp(),
        };

        Ok(encode(
            &Header::new(Algorithm::HS256),
            &claims,
            self.encoding_key(purpose),
        )?)
    }

    fn encoding_key(&self, purpose: TokenPurpose) -> &EncodingKey {
        match purpose {
            TokenPurpose::Refresh => &self.refresh_encoding,
            _ => &self.access_encoding,
        }
    }

    fn decoding_key(&self, purpose: TokenPurpose) -> &DecodingKey {
        match purpose {
            TokenPurpose::Refresh => &self.refresh_decoding,
            _ => &self.access_decoding,
        }
    }
}
