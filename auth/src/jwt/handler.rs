use chrono::Duration;
use chrono::Utc;
use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;
use serde::Deserialize;
use serde::Serialize;

use super::claims::Claims;
use super::claims::TokenPurpose;
use super::errors::JwtError;

/// JWT token handler for issuing and parsing purpose-tagged tokens.
///
/// Uses HS256 (HMAC with SHA-256). Tokens are stateless: validity is decided
/// by the signature and the embedded timestamps alone.
pub struct JwtHandler {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
}

impl JwtHandler {
    /// Create a new JWT handler with a secret key.
    ///
    /// # Arguments
    /// * `secret` - Secret key for signing tokens (should be stored securely)
    ///
    /// # Security Notes
    /// - The secret should be at least 256 bits (32 bytes) for HS256
    /// - Store secrets in environment variables or secure vaults, never in code
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm: Algorithm::HS256,
        }
    }

    /// Encode claims into a signed token.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed
    pub fn encode<T: Serialize>(&self, claims: &T) -> Result<String, JwtError> {
        let header = Header::new(self.algorithm);

        encode(&header, claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingFailed(e.to_string()))
    }

    /// Decode a token and check its signature and time bounds.
    ///
    /// `exp`, `nbf` and `sub` are required; no clock leeway is granted.
    ///
    /// # Errors
    /// * `TokenExpired` - `exp` has passed
    /// * `TokenNotYetValid` - `nbf` is in the future
    /// * `DecodingFailed` - Signature invalid or claims malformed
    pub fn decode<T: for<'de> Deserialize<'de>>(&self, token: &str) -> Result<T, JwtError> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;
        validation.validate_nbf = true;
        validation.set_required_spec_claims(&["exp", "nbf", "sub"]);

        decode::<T>(token, &self.decoding_key, &validation)
            .map(|token_data| token_data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::TokenExpired,
                ErrorKind::ImmatureSignature => JwtError::TokenNotYetValid,
                _ => JwtError::DecodingFailed(e.to_string()),
            })
    }

    /// Issue a token for `subject` valid for `ttl` from now.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed
    pub fn issue(
        &self,
        subject: &str,
        purpose: TokenPurpose,
        ttl: Duration,
    ) -> Result<String, JwtError> {
        self.encode(&Claims::new(subject, purpose, ttl))
    }

    /// Verify a token issued for `expected` and return its claims.
    ///
    /// # Errors
    /// * `WrongPurpose` - Token is valid but belongs to another flow
    /// * `TokenExpired` - Current time is at or past `exp`
    /// * `TokenNotYetValid` - Current time is before `nbf`
    /// * `DecodingFailed` - Signature invalid or claims malformed
    pub fn verify(&self, token: &str, expected: TokenPurpose) -> Result<Claims, JwtError> {
        let claims: Claims = self.decode(token)?;

        if claims.purpose != expected {
            return Err(JwtError::WrongPurpose {
                expected,
                actual: claims.purpose,
            });
        }

        let now = Utc::now().timestamp();
        if claims.is_premature(now) {
            return Err(JwtError::TokenNotYetValid);
        }
        if claims.is_expired(now) {
            return Err(JwtError::TokenExpired);
        }

        Ok(claims)
    }

    /// Parse a token issued for `expected` and return its subject.
    ///
    /// Every rejection reason collapses to `None`.
    pub fn parse(&self, token: &str, expected: TokenPurpose) -> Option<String> {
        self.verify(token, expected).ok().map(|claims| claims.sub)
    }
}
