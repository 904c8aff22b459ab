use super::config::JwtConfig;
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Access token lifetime in seconds (15 minutes)
pub const ACCESS_TOKEN_TTL: i64 = 900;

/// Claims carried by access tokens
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String,   // User ID
    pub email: String,
    pub name: String,
    pub exp: i64,
    pub iat: i64,
    pub jti: String,
}

/// HS256 token verification against a shared secret.
///
/// Tokens are issued by the external auth service; this side only verifies
/// them. [`JwtAuth::create_access_token`] exists for tooling and tests.
#[derive(Clone)]
pub struct JwtAuth {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl JwtAuth {
    pub fn new(config: &JwtConfig) -> Self {
        let secret = config.secret.as_bytes();
        tracing::info!("JWT auth initialized");

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    pub fn create_access_token(&self, user_id: &str, email: &str, name: &str) -> eyre::Result<String> {
        self.create_token(user_id, email, name, ACCESS_TOKEN_TTL)
    }

    /// Sign a token with an explicit lifetime; a negative TTL yields an expired token.
    pub fn create_token(
        &self,
        user_id: &str,
        email: &str,
        name: &str,
        ttl_seconds: i64,
    ) -> eyre::Result<String> {
        let now = Utc::now();
        let claims = JwtClaims {
            sub: user_id.to_string(),
            email: email.to_string(),
            name: name.to_string(),
            exp: (now + Duration::seconds(ttl_seconds)).timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?;
        Ok(token)
    }

    /// Check signature and expiry, then decode the claims
    pub fn verify_token(&self, token: &str) -> eyre::Result<JwtClaims> {
        let token_data = decode::<JwtClaims>(token, &self.decoding, &self.validation)?;
        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-that-is-long-enough-for-hs256";

    fn auth() -> JwtAuth {
        JwtAuth::new(&JwtConfig::new(SECRET))
    }

    #[test]
    fn test_issued_token_verifies() {
        let auth = auth();
        let token = auth
            .create_access_token("65f1c0ffee0000000000beef", "ada@example.com", "ada")
            .unwrap();

        let claims = auth.verify_token(&token).unwrap();
        assert_eq!(claims.sub, "65f1c0ffee0000000000beef");
        assert_eq!(claims.email, "ada@example.com");
        assert_eq!(claims.exp - claims.iat, ACCESS_TOKEN_TTL);
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let auth = auth();
        let token = auth.create_token("u1", "ada@example.com", "ada", -3600).unwrap();
        assert!(auth.verify_token(&token).is_err());
    }

    #[test]
    fn test_token_signed_with_other_secret_is_rejected() {
        let other = JwtAuth::new(&JwtConfig::new("a-completely-different-secret-value-123"));
        let token = other.create_access_token("u1", "ada@example.com", "ada").unwrap();
        assert!(auth().verify_token(&token).is_err());
    }

    #[test]
    fn test_garbage_token_is_rejected() {
        assert!(auth().verify_token("not.a.jwt").is_err());
    }
}
