use std::fmt;

use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Flow a token was issued for.
///
/// Each token carries exactly one purpose and is only accepted by the flow
/// expecting it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TokenPurpose {
    Access,
    Refresh,
    Register,
    PasswordReset,
}

impl TokenPurpose {
    pub const ALL: [TokenPurpose; 4] = [
        TokenPurpose::Access,
        TokenPurpose::Refresh,
        TokenPurpose::Register,
        TokenPurpose::PasswordReset,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TokenPurpose::Access => "access",
            TokenPurpose::Refresh => "refresh",
            TokenPurpose::Register => "register",
            TokenPurpose::PasswordReset => "password-reset",
        }
    }
}

impl fmt::Display for TokenPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Claim set signed into every token.
///
/// Session tokens use the user identifier as subject; registration and
/// password-reset tokens use the target email.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Subject (user identifier or email)
    pub sub: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Not before (Unix timestamp)
    pub nbf: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    pub purpose: TokenPurpose,
}

impl Claims {
    /// Build claims issued now and expiring after `ttl`.
    pub fn new(subject: impl ToString, purpose: TokenPurpose, ttl: Duration) -> Self {
        Self::issued_at(subject, purpose, Utc::now().timestamp(), ttl)
    }

    /// Build claims for an explicit issue time.
    pub fn issued_at(
        subject: impl ToString,
        purpose: TokenPurpose,
        issued_at: i64,
        ttl: Duration,
    ) -> Self {
        Self {
            sub: subject.to_string(),
            iat: issued_at,
            nbf: issued_at,
            exp: issued_at + ttl.num_seconds(),
            purpose,
        }
    }

    /// Expired once the current time reaches `exp`.
    pub fn is_expired(&self, current_timestamp: i64) -> bool {
        current_timestamp >= self.exp
    }

    pub fn is_premature(&self, current_timestamp: i64) -> bool {
        current_timestamp < self.nbf
    }
}
