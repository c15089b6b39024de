//! Authentication utilities library
//!
//! Provides the credential and token primitives used by the user service:
//! - Password hashing (Argon2id, configurable cost)
//! - Purpose-tagged JWT issuing and parsing
//! - Authentication coordination with per-purpose token lifetimes
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify("my_password", &hash));
//! assert!(!hasher.verify("not_my_password", &hash));
//! ```
//!
//! ## Purpose-tagged Tokens
//! ```
//! use auth::{JwtHandler, TokenPurpose};
//! use chrono::Duration;
//!
//! let handler = JwtHandler::new(b"secret_key_at_least_32_bytes_long!");
//! let token = handler.issue("user123", TokenPurpose::Refresh, Duration::hours(1)).unwrap();
//!
//! assert_eq!(handler.parse(&token, TokenPurpose::Refresh), Some("user123".to_string()));
//! assert_eq!(handler.parse(&token, TokenPurpose::Access), None);
//! ```
//!
//! ## Complete Authentication Flow
//! ```
//! use auth::{Authenticator, TokenLifetimes, TokenPurpose};
//!
//! let auth = Authenticator::new(
//!     b"secret_key_at_least_32_bytes_long!",
//!     1,
//!     TokenLifetimes::default(),
//! )
//! .unwrap();
//!
//! // Register: hash password
//! let hash = auth.hash_password("password123").unwrap();
//!
//! // Login: verify and issue a token pair
//! let pair = auth.authenticate("password123", &hash, "user123").unwrap();
//!
//! // Validate the access half
//! let subject = auth.parse_token(&pair.access_token, TokenPurpose::Access);
//! assert_eq!(subject.as_deref(), Some("user123"));
//! ```

pub mod authenticator;
pub mod jwt;
pub mod password;

// Re-export commonly used items
pub use authenticator::AuthenticationError;
pub use authenticator::Authenticator;
pub use authenticator::TokenLifetimes;
pub use authenticator::TokenPair;
pub use jwt::Claims;
pub use jwt::JwtError;
pub use jwt::JwtHandler;
pub use jwt::TokenPurpose;
pub use password::PasswordError;
pub use password::PasswordHasher;
