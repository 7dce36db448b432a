//! Bearer token signing and validation.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use std::fmt;
use uuid::Uuid;

use super::claims::Claims;
use crate::config::JwtConfig;
use crate::models::{LoginResponse, User};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("The token is expired")]
    Expired,
    #[error("The token is not valid yet")]
    NotYetValid,
    #[error("The issuer is invalid")]
    InvalidIssuer,
    #[error("The audience is invalid")]
    InvalidAudience,
    #[error("The signature is invalid")]
    InvalidSignature,
    #[error("The token is malformed: {0}")]
    Malformed(String),
    #[error("Failed to sign token: {0}")]
    Signing(String),
}

impl TokenError {
    /// Short label for metrics
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Expired => "expired",
            Self::NotYetValid => "not_yet_valid",
            Self::InvalidIssuer => "invalid_issuer",
            Self::InvalidAudience => "invalid_audience",
            Self::InvalidSignature => "invalid_signature",
            Self::Malformed(_) => "malformed",
            Self::Signing(_) => "signing",
        }
    }
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::InvalidSignature => Self::InvalidSignature,
            ErrorKind::InvalidIssuer => Self::InvalidIssuer,
            ErrorKind::InvalidAudience => Self::InvalidAudience,
            ErrorKind::ExpiredSignature => Self::Expired,
            ErrorKind::ImmatureSignature => Self::NotYetValid,
            _ => Self::Malformed(err.to_string()),
        }
    }
}

/// HMAC key derived from the UTF-8 bytes of the configured secret.
#[derive(Clone)]
pub struct SymmetricSecurityKey {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl SymmetricSecurityKey {
    pub fn from_secret(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Sign arbitrary claims with HS256.
    pub fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }
}

impl fmt::Debug for SymmetricSecurityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SymmetricSecurityKey(***)")
    }
}

/// Declarative validation policy applied to every presented token.
///
/// Issuer, audience, lifetime and signing key are all validated. Lifetime is
/// checked against an explicit clock so the skew boundary is exact.
#[derive(Debug, Clone)]
pub struct TokenValidationParameters {
    pub valid_issuer: String,
    pub valid_audience: String,
    pub clock_skew: Duration,
    pub signing_key: SymmetricSecurityKey,
}

impl TokenValidationParameters {
    pub fn from_config(config: &JwtConfig) -> Self {
        Self {
            valid_issuer: config.issuer.clone(),
            valid_audience: config.audience.clone(),
            clock_skew: Duration::zero(),
            signing_key: SymmetricSecurityKey::from_secret(&config.secret),
        }
    }

    fn jwt_validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.valid_issuer]);
        validation.set_audience(&[&self.valid_audience]);
        validation.set_required_spec_claims(&["exp", "nbf", "iss", "aud", "sub"]);
        // lifetime is checked in validate_at
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.leeway = 0;
        validation
    }

    pub fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        self.validate_at(token, Utc::now())
    }

    pub fn validate_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        let data = decode::<Claims>(token, &self.signing_key.decoding, &self.jwt_validation())?;
        let claims = data.claims;

        let now = now.timestamp();
        let skew = self.clock_skew.num_seconds();
        if claims.nbf > now + skew {
            return Err(TokenError::NotYetValid);
        }
        // valid through the exp second itself
        if claims.exp < now - skew {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }
}

/// Issues tokens that satisfy [`TokenValidationParameters`].
#[derive(Debug, Clone)]
pub struct TokenIssuer {
    issuer: String,
    audience: String,
    lifetime: Duration,
    signing_key: SymmetricSecurityKey,
}

impl TokenIssuer {
    pub fn new(parameters: &TokenValidationParameters, lifetime: Duration) -> Self {
        Self {
            issuer: parameters.valid_issuer.clone(),
            audience: parameters.valid_audience.clone(),
            lifetime,
            signing_key: parameters.signing_key.clone(),
        }
    }

    pub fn issue(&self, user: &User) -> Result<LoginResponse, TokenError> {
        self.issue_at(user, Utc::now())
    }

    pub fn issue_at(&self, user: &User, now: DateTime<Utc>) -> Result<LoginResponse, TokenError> {
        let expires_at = now + self.lifetime;
        let claims = Claims {
            sub: user.id.to_string(),
            unique_name: user.username.clone(),
            ss: user.security_stamp.clone(),
            jti: Uuid::new_v4().to_string(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        Ok(LoginResponse {
            token: self.signing_key.sign(&claims)?,
            token_type: "Bearer".to_string(),
            expires_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_TOKEN_ISSUER;
    use chrono::TimeZone;

    const SECRET: &str = "unit-test-secret-that-is-long-enough!!";

    fn parameters() -> TokenValidationParameters {
        TokenValidationParameters::from_config(&JwtConfig {
            secret: SECRET.to_string(),
            issuer: DEFAULT_TOKEN_ISSUER.to_string(),
            audience: DEFAULT_TOKEN_ISSUER.to_string(),
            token_lifetime_minutes: 60,
        })
    }

    fn claims_at(now: DateTime<Utc>, exp: DateTime<Utc>) -> Claims {
        Claims {
            sub: Uuid::new_v4().to_string(),
            unique_name: "clerk".to_string(),
            ss: "STAMP".to_string(),
            jti: Uuid::new_v4().to_string(),
            iss: DEFAULT_TOKEN_ISSUER.to_string(),
            aud: DEFAULT_TOKEN_ISSUER.to_string(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
            exp: exp.timestamp(),
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.timestamp_opt(1_800_000_000, 0).unwrap()
    }

    #[test]
    fn test_round_trip_with_issuer() {
        let params = parameters();
        let user = User {
            id: Uuid::new_v4(),
            username: "clerk".to_string(),
            password_hash: String::new(),
            security_stamp: "STAMP".to_string(),
            created_at: now(),
        };
        let issued = TokenIssuer::new(&params, Duration::minutes(5))
            .issue_at(&user, now())
            .unwrap();
        let claims = params.validate_at(&issued.token, now()).unwrap();
        assert_eq!(claims.sub, user.id.to_string());
        assert_eq!(claims.ss, "STAMP");
        assert_eq!(issued.expires_at, now() + Duration::minutes(5));
        assert_eq!(issued.token_type, "Bearer");
    }

    #[test]
    fn test_expiry_boundary_has_no_grace() {
        let params = parameters();
        let token = params
            .signing_key
            .sign(&claims_at(now() - Duration::minutes(10), now()))
            .unwrap();

        // valid until exactly now
        assert!(params.validate_at(&token, now()).is_ok());
        // one second later it is expired
        assert_eq!(
            params.validate_at(&token, now() + Duration::seconds(1)),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn test_not_before_is_enforced() {
        let params = parameters();
        let mut claims = claims_at(now(), now() + Duration::minutes(10));
        claims.nbf = (now() + Duration::seconds(1)).timestamp();
        let token = params.signing_key.sign(&claims).unwrap();

        assert_eq!(
            params.validate_at(&token, now()),
            Err(TokenError::NotYetValid)
        );
    }

    #[test]
    fn test_issuer_mismatch_rejected_despite_valid_signature() {
        let params = parameters();
        let mut claims = claims_at(now(), now() + Duration::minutes(10));
        claims.iss = "someoneElse".to_string();
        let token = params.signing_key.sign(&claims).unwrap();

        assert_eq!(
            params.validate_at(&token, now()),
            Err(TokenError::InvalidIssuer)
        );
    }

    #[test]
    fn test_audience_mismatch_rejected_despite_valid_signature() {
        let params = parameters();
        let mut claims = claims_at(now(), now() + Duration::minutes(10));
        claims.aud = "otherAudience".to_string();
        let token = params.signing_key.sign(&claims).unwrap();

        assert_eq!(
            params.validate_at(&token, now()),
            Err(TokenError::InvalidAudience)
        );
    }

    #[test]
    fn test_wrong_key_rejected() {
        let params = parameters();
        let other = SymmetricSecurityKey::from_secret("a-completely-different-secret-value!!");
        let token = other
            .sign(&claims_at(now(), now() + Duration::minutes(10)))
            .unwrap();

        assert_eq!(
            params.validate_at(&token, now()),
            Err(TokenError::InvalidSignature)
        );
    }

    #[test]
    fn test_garbage_is_malformed() {
        let params = parameters();
        assert!(matches!(
            params.validate_at("not.a.jwt", now()),
            Err(TokenError::Malformed(_))
        ));
    }

    #[test]
    fn test_debug_hides_key() {
        let rendered = format!("{:?}", parameters());
        assert!(!rendered.contains(SECRET));
    }
}
