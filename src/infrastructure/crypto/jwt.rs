//! JWT issuing and verification for user sessions

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::SecurityConfig;
use crate::domain::User;

pub const ISSUER: &str = "bootcamp-service";

/// JWT configuration
#[derive(Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub expiration_hours: i64,
    pub issuer: String,
}

impl JwtConfig {
    pub fn new(secret: impl Into<String>, expiration_hours: i64) -> Self {
        Self {
            secret: secret.into(),
            expiration_hours,
            issuer: ISSUER.to_string(),
        }
    }
}

impl From<&SecurityConfig> for JwtConfig {
    fn from(security: &SecurityConfig) -> Self {
        Self::new(security.jwt_secret.clone(), security.jwt_expiration_hours)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TokenClaims {
    /// User id
    pub sub: String,
    pub name: String,
    pub role: String,
    pub exp: i64,
    pub iat: i64,
    pub iss: String,
}

impl TokenClaims {
    pub fn for_user(user: &User, config: &JwtConfig) -> Self {
        let now = Utc::now();
        let exp = now + Duration::hours(config.expiration_hours);

        Self {
            sub: user.id.clone(),
            name: user.name.clone(),
            role: user.role.as_str().to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            iss: config.issuer.clone(),
        }
    }
}

/// Signed token for `user`
pub fn create_token(user: &User, config: &JwtConfig) -> Result<String, jsonwebtoken::errors::Error> {
    encode(
        &Header::default(),
        &TokenClaims::for_user(user, config),
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Verify signature, expiry and issuer, returning the claims
pub fn verify_token(
    token: &str,
    config: &JwtConfig,
) -> Result<TokenClaims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::default();
    validation.set_issuer(&[&config.issuer]);

    let token_data = decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserRole;

    fn user() -> User {
        User {
            id: "u1".into(),
            name: "Jane".into(),
            email: "jane@example.com".into(),
            role: UserRole::Publisher,
            password_hash: String::new(),
            reset_password_token: None,
            reset_password_expire: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn round_trip() {
        let config = JwtConfig::new("secret", 1);
        let token = create_token(&user(), &config).unwrap();
        let claims = verify_token(&token, &config).unwrap();
        assert_eq!(claims.sub, "u1");
        assert_eq!(claims.role, "publisher");
        assert_eq!(claims.iss, ISSUER);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = create_token(&user(), &JwtConfig::new("secret", 1)).unwrap();
        assert!(verify_token(&token, &JwtConfig::new("other", 1)).is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let config = JwtConfig::new("secret", -2);
        let token = create_token(&user(), &config).unwrap();
        assert!(verify_token(&token, &config).is_err());
    }
}
