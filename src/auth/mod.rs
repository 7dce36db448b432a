//! JWT bearer authentication
//!
//! Tokens are HS256-signed with a key derived from the configured secret and
//! validated for issuer, audience, lifetime (zero clock skew) and signature.
//! Every accepted token is then re-checked against the user's current
//! security stamp, subject to the configured validation interval.

pub mod claims;
pub mod events;
pub mod handler;
pub mod password;
pub mod security_stamp;
pub mod token;

pub use claims::Claims;
pub use events::{ApiBearerEvents, ChallengeContext, JwtBearerEvents};
pub use handler::{bearer_token, default_challenge, AuthFailure, AuthenticateResult, JwtBearerHandler};
pub use password::{hash_password, verify_password, PasswordError};
pub use security_stamp::{SecurityStampValidator, StampCheck};
pub use token::{SymmetricSecurityKey, TokenError, TokenIssuer, TokenValidationParameters};
