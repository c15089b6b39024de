use chrono::Duration;

use crate::jwt::JwtError;
use crate::jwt::JwtHandler;
use crate::jwt::TokenPurpose;
use crate::password::PasswordError;
use crate::password::PasswordHasher;

/// Time-to-live of each token purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenLifetimes {
    pub access: Duration,
    pub refresh: Duration,
    pub register: Duration,
    pub password_reset: Duration,
}

impl TokenLifetimes {
    pub fn for_purpose(&self, purpose: TokenPurpose) -> Duration {
        match purpose {
            TokenPurpose::Access => self.access,
            TokenPurpose::Refresh => self.refresh,
            TokenPurpose::Register => self.register,
            TokenPurpose::PasswordReset => self.password_reset,
        }
    }
}

impl Default for TokenLifetimes {
    fn default() -> Self {
        Self {
            access: Duration::days(7),
            refresh: Duration::days(28),
            register: Duration::hours(24),
            password_reset: Duration::hours(24),
        }
    }
}

/// Access and refresh token issued together for one subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Authentication operation errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthenticationError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("JWT error: {0}")]
    JwtError(#[from] JwtError),
}

/// Authentication coordinator combining password hashing and token handling.
///
/// Owns the signing secret, the hashing cost and the per-purpose token
/// lifetimes so callers never pick a TTL themselves.
pub struct Authenticator {
    password_hasher: PasswordHasher,
    jwt_handler: JwtHandler,
    lifetimes: TokenLifetimes,
    dummy_hash: String,
}

impl Authenticator {
    /// Create a new authenticator.
    ///
    /// # Arguments
    /// * `jwt_secret` - Secret key for JWT signing
    /// * `hash_cost` - Argon2 time cost for new password digests
    /// * `lifetimes` - TTL of each token purpose
    ///
    /// # Errors
    /// * `InvalidParameters` - Hash cost rejected by Argon2
    pub fn new(
        jwt_secret: &[u8],
        hash_cost: u32,
        lifetimes: TokenLifetimes,
    ) -> Result<Self, PasswordError> {
        let password_hasher = PasswordHasher::with_cost(hash_cost)?;
        let dummy_hash = password_hasher.hash("dummy-password-for-unknown-accounts")?;

        Ok(Self {
            password_hasher,
            jwt_handler: JwtHandler::new(jwt_secret),
            lifetimes,
            dummy_hash,
        })
    }

    pub fn lifetimes(&self) -> &TokenLifetimes {
        &self.lifetimes
    }

    /// Hash a password for storage.
    ///
    /// # Errors
    /// * `HashingFailed` - Hashing operation failed
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        self.password_hasher.hash(password)
    }

    /// Check a plaintext password against a stored digest.
    pub fn verify_password(&self, password: &str, stored_hash: &str) -> bool {
        self.password_hasher.verify(password, stored_hash)
    }

    /// Run a full verification against a fixed digest and discard the result.
    ///
    /// Used when no account matches, so the rejection costs the same as a
    /// wrong password on a real account.
    pub fn verify_missing_user(&self, password: &str) {
        let _ = self.password_hasher.verify(password, &self.dummy_hash);
    }

    /// Issue a token for `subject` with the configured lifetime of `purpose`.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token generation failed
    pub fn issue_token(&self, subject: &str, purpose: TokenPurpose) -> Result<String, JwtError> {
        self.jwt_handler
            .issue(subject, purpose, self.lifetimes.for_purpose(purpose))
    }

    /// Issue a fresh access and refresh token for `subject`.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token generation failed
    pub fn issue_token_pair(&self, subject: &str) -> Result<TokenPair, JwtError> {
        Ok(TokenPair {
            access_token: self.issue_token(subject, TokenPurpose::Access)?,
            refresh_token: self.issue_token(subject, TokenPurpose::Refresh)?,
        })
    }

    /// Parse a token issued for `expected` and return its subject.
    pub fn parse_token(&self, token: &str, expected: TokenPurpose) -> Option<String> {
        self.jwt_handler.parse(token, expected)
    }

    /// Verify credentials and issue a token pair.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Password does not match the stored digest
    /// * `JwtError` - Token generation failed
    pub fn authenticate(
        &self,
        password: &str,
        stored_hash: &str,
        subject: &str,
    ) -> Result<TokenPair, AuthenticationError> {
        if !self.verify_password(password, stored_hash) {
            return Err(AuthenticationError::InvalidCredentials);
        }

        Ok(self.issue_token_pair(subject)?)
    }
}
