use crate::config::Config;
use crate::error::AppError;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Represents the claims encoded within a JWT (JSON Web Token).
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject of the token, the user's id.
    pub sub: i32,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: usize,
    /// Expiration timestamp (seconds since epoch).
    pub exp: usize,
}

/// Issues and parses HS256 tokens signed with a shared secret.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: chrono::Duration,
}

impl TokenService {
    pub fn new(secret: &str, ttl: chrono::Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    /// Fails if the configured TTL is not a positive, representable duration.
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        Ok(Self::new(&config.jwt_secret, config.token_ttl()?))
    }

    /// Generates a token for `user_id` that expires after the configured TTL.
    ///
    /// Returns `AppError::InternalServerError` if encoding fails.
    pub fn generate_token(&self, user_id: i32) -> Result<String, AppError> {
        let now = chrono::Utc::now();
        let expiration = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| AppError::InternalServerError("token expiry overflow".into()))?;

        let claims = Claims {
            sub: user_id,
            iat: now.timestamp() as usize,
            exp: expiration.timestamp() as usize,
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::InternalServerError(format!("Failed to generate token: {}", e)))
    }

    /// Verifies the signature and expiry of `token` and decodes its claims.
    ///
    /// Returns `AppError::Unauthorized` if the token is malformed, its signature is invalid,
    /// or it has expired.
    pub fn verify_token(&self, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))
    }

    /// Returns the user id carried by a valid token.
    pub fn parse_token(&self, token: &str) -> Result<i32, AppError> {
        self.verify_token(token).map(|claims| claims.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test_secret_for_tokens";

    fn service() -> TokenService {
        TokenService::new(SECRET, chrono::Duration::hours(12))
    }

    #[test]
    fn test_token_generation_and_verification() {
        let tokens = service();
        let token = tokens.generate_token(1).unwrap();
        let claims = tokens.verify_token(&token).unwrap();
        assert_eq!(claims.sub, 1);
        assert!(claims.exp > claims.iat);
        assert_eq!(tokens.parse_token(&token).unwrap(), 1);
    }

    #[test]
    fn test_token_expiration() {
        let issued = chrono::Utc::now() - chrono::Duration::hours(3);
        let claims_expired = Claims {
            sub: 2,
            iat: issued.timestamp() as usize,
            exp: (issued + chrono::Duration::hours(1)).timestamp() as usize,
        };
        let expired_token = encode(
            &Header::default(),
            &claims_expired,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        match service().verify_token(&expired_token) {
            Err(AppError::Unauthorized(msg)) => {
                assert!(msg.contains("Invalid token: ExpiredSignature"));
            }
            Ok(_) => panic!("Token should have been invalid due to expiration"),
            Err(e) => panic!("Unexpected error type for expired token: {:?}", e),
        }
    }

    #[test]
    fn test_invalid_token_signature() {
        let other = TokenService::new("a_completely_different_secret", chrono::Duration::hours(1));
        let token = other.generate_token(3).unwrap();

        match service().verify_token(&token) {
            Err(AppError::Unauthorized(msg)) => {
                assert!(msg.contains("Invalid token: InvalidSignature"));
            }
            Ok(_) => panic!("Token should have been invalid due to signature mismatch"),
            Err(e) => panic!("Unexpected error type for invalid signature: {:?}", e),
        }
    }

    #[test]
    fn test_malformed_token() {
        assert!(matches!(
            service().parse_token("not-a-jwt"),
            Err(AppError::Unauthorized(_))
        ));
    }

    fn config_with_ttl(hours: i64) -> Config {
        Config {
            database_url: "postgres://test".into(),
            server_port: 8000,
            server_host: "127.0.0.1".into(),
            jwt_secret: SECRET.into(),
            token_ttl_hours: hours,
            db_max_connections: 1,
            db_query_timeout_secs: 1,
        }
    }

    #[test]
    fn test_from_config_rejects_unusable_ttl() {
        assert!(TokenService::from_config(&config_with_ttl(9_000_000_000_000_000)).is_err());
        assert!(TokenService::from_config(&config_with_ttl(0)).is_err());

        let tokens = TokenService::from_config(&config_with_ttl(1)).unwrap();
        let claims = tokens.verify_token(&tokens.generate_token(8).unwrap()).unwrap();
        assert_eq!(claims.exp - claims.iat, 3600);
    }
}
