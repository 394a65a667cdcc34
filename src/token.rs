use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Fixed lifetime of every identity token.
pub const TOKEN_TTL_DAYS: i64 = 5;

/// IdentityClaims
///
/// The flat identity payload a client asks to have signed. `email` is the only
/// field the server relies on; every other top-level field is carried verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentityClaims {
    pub email: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl IdentityClaims {
    pub fn for_email(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            extra: Map::new(),
        }
    }
}

/// Claims
///
/// The signed JWT payload: the identity plus issue/expiry timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    #[serde(flatten)]
    pub identity: IdentityClaims,
    /// Expiration Time (exp), seconds since the epoch.
    pub exp: i64,
    /// Issued At (iat), seconds since the epoch.
    pub iat: i64,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    /// Bad signature or malformed token.
    #[error("invalid token")]
    Invalid,
    #[error("token expired")]
    Expired,
    #[error("failed to sign token: {0}")]
    Signing(String),
}

/// TokenService
///
/// Issues and verifies HS256 identity tokens with a fixed five day lifetime.
/// Stateless: nothing is persisted, every request re-verifies.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenService {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::default();
        validation.validate_exp = true;
        // No clock tolerance: a token is dead the second `exp` passes.
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Signs `identity` with an expiry five days from now.
    pub fn issue(&self, identity: IdentityClaims) -> Result<String, TokenError> {
        self.issue_at(identity, Utc::now())
    }

    /// Signs `identity` as if issued at `issued_at`.
    pub fn issue_at(
        &self,
        mut identity: IdentityClaims,
        issued_at: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        // Timestamps are always server-assigned.
        identity.extra.remove("exp");
        identity.extra.remove("iat");

        let claims = Claims {
            identity,
            iat: issued_at.timestamp(),
            exp: (issued_at + Duration::days(TOKEN_TTL_DAYS)).timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Verifies signature and expiry, returning the decoded identity.
    pub fn verify(&self, token: &str) -> Result<IdentityClaims, TokenError> {
        match decode::<Claims>(token, &self.decoding_key, &self.validation) {
            Ok(data) => Ok(data.claims.identity),
            Err(e) => match e.kind() {
                ErrorKind::ExpiredSignature => Err(TokenError::Expired),
                _ => Err(TokenError::Invalid),
            },
        }
    }
}
