//! Authentication: JWT session tokens and password hashing.
//!
//! The API layer issues a token at login and verifies it on every
//! protected route; the domain layer only ever sees the resolved
//! [`common::UserId`] and pre-hashed passwords.

mod error;
mod jwt;
mod password;

pub use error::{AuthError, AuthResult};
pub use jwt::{Claims, JwtConfig, JwtManager, TokenIssuer};
pub use password::{hash_password, verify_password};

/// Default token expiration in hours.
pub const DEFAULT_JWT_EXPIRATION_HOURS: u64 = 24;

/// Default token issuer.
pub const DEFAULT_JWT_ISSUER: &str = "kava-backend";
