/// JWT token creation and validation
///
/// Issues two token kinds, both signed with HS256:
///
/// - **Access tokens** (24 hours): sent as `Authorization: Bearer <token>`
///   on every API request
/// - **Refresh tokens** (30 days): exchanged at `/api/auth/refresh` for a
///   fresh access token
///
/// # Claims
///
/// | claim        | content                                  |
/// |--------------|------------------------------------------|
/// | `sub`        | user id                                  |
/// | `iss`        | `"todolist"`                             |
/// | `iat`        | issued-at (unix seconds)                 |
/// | `exp`        | expiry (unix seconds)                    |
/// | `nbf`        | not-before (unix seconds)                |
/// | `token_type` | `"access"` or `"refresh"`                |

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Token issuer embedded in and required from every token
const ISSUER: &str = "todolist";

/// Access token lifetime in hours
const ACCESS_TOKEN_HOURS: i64 = 24;

/// Refresh token lifetime in days
const REFRESH_TOKEN_DAYS: i64 = 30;

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Token creation failed
    #[error("Failed to create token: {0}")]
    CreationFailed(String),

    /// Token validation failed (bad signature, malformed, wrong issuer)
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Token is of the wrong type for this operation
    #[error("Wrong token type: expected {expected}, got {actual}")]
    WrongTokenType { expected: String, actual: String },
}

/// The kind of token being issued or expected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenType {
    Access,
    Refresh,
}

impl TokenType {
    fn as_str(&self) -> &'static str {
        match self {
            TokenType::Access => "access",
            TokenType::Refresh => "refresh",
        }
    }

    fn lifetime(&self) -> Duration {
        match self {
            TokenType::Access => Duration::hours(ACCESS_TOKEN_HOURS),
            TokenType::Refresh => Duration::days(REFRESH_TOKEN_DAYS),
        }
    }
}

/// JWT claims carried by every token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id the token was issued to
    pub sub: i64,
    /// Token issuer
    pub iss: String,
    /// Issued-at timestamp (unix seconds)
    pub iat: i64,
    /// Expiry timestamp (unix seconds)
    pub exp: i64,
    /// Not-before timestamp (unix seconds)
    pub nbf: i64,
    /// "access" or "refresh"
    pub token_type: String,
}

/// Creates a signed token of the given type for a user
///
/// # Errors
///
/// Returns `JwtError::CreationFailed` if signing fails.
pub fn create_token(user_id: i64, token_type: TokenType, secret: &str) -> Result<String, JwtError> {
    let now = Utc::now();
    let expiry = now + token_type.lifetime();

    let claims = Claims {
        sub: user_id,
        iss: ISSUER.to_string(),
        iat: now.timestamp(),
        exp: expiry.timestamp(),
        nbf: now.timestamp(),
        token_type: token_type.as_str().to_string(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| JwtError::CreationFailed(e.to_string()))
}

/// Validates a token's signature, expiry and issuer, returning its claims
///
/// # Errors
///
/// Returns `JwtError::Expired` for expired tokens and
/// `JwtError::InvalidToken` for everything else.
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let mut validation = Validation::default();
    validation.set_issuer(&[ISSUER]);

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
        _ => JwtError::InvalidToken(e.to_string()),
    })?;

    Ok(token_data.claims)
}

/// Validates a token and requires it to be an access token
pub fn validate_access_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let claims = validate_token(token, secret)?;
    require_token_type(&claims, TokenType::Access)?;
    Ok(claims)
}

/// Validates a token and requires it to be a refresh token
pub fn validate_refresh_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let claims = validate_token(token, secret)?;
    require_token_type(&claims, TokenType::Refresh)?;
    Ok(claims)
}

/// Exchanges a valid refresh token for a new access token
///
/// # Errors
///
/// Fails if the refresh token is invalid, expired, or not a refresh token.
pub fn refresh_access_token(refresh_token: &str, secret: &str) -> Result<String, JwtError> {
    let claims = validate_refresh_token(refresh_token, secret)?;
    create_token(claims.sub, TokenType::Access, secret)
}

fn require_token_type(claims: &Claims, expected: TokenType) -> Result<(), JwtError> {
    if claims.token_type == expected.as_str() {
        Ok(())
    } else {
        Err(JwtError::WrongTokenType {
            expected: expected.as_str().to_string(),
            actual: claims.token_type.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-for-jwt-unit-tests-only";

    #[test]
    fn test_create_and_validate_access_token() {
        let token = create_token(42, TokenType::Access, SECRET).expect("Creation should succeed");
        let claims = validate_access_token(&token, SECRET).expect("Validation should succeed");

        assert_eq!(claims.sub, 42);
        assert_eq!(claims.iss, "todolist");
        assert_eq!(claims.token_type, "access");
    }

    #[test]
    fn test_create_and_validate_refresh_token() {
        let token = create_token(7, TokenType::Refresh, SECRET).expect("Creation should succeed");
        let claims = validate_refresh_token(&token, SECRET).expect("Validation should succeed");

        assert_eq!(claims.sub, 7);
        assert_eq!(claims.token_type, "refresh");
    }

    #[test]
    fn test_access_token_rejected_as_refresh() {
        let token = create_token(1, TokenType::Access, SECRET).expect("Creation should succeed");
        let result = validate_refresh_token(&token, SECRET);

        assert!(matches!(result, Err(JwtError::WrongTokenType { .. })));
    }

    #[test]
    fn test_refresh_token_rejected_as_access() {
        let token = create_token(1, TokenType::Refresh, SECRET).expect("Creation should succeed");
        let result = validate_access_token(&token, SECRET);

        assert!(matches!(result, Err(JwtError::WrongTokenType { .. })));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = create_token(1, TokenType::Access, SECRET).expect("Creation should succeed");
        let result = validate_token(&token, "a-completely-different-secret");

        assert!(matches!(result, Err(JwtError::InvalidToken(_))));
    }

    #[test]
    fn test_garbage_token_rejected() {
        let result = validate_token("not.a.jwt", SECRET);
        assert!(matches!(result, Err(JwtError::InvalidToken(_))));
    }

    #[test]
    fn test_refresh_flow_produces_valid_access_token() {
        let refresh =
            create_token(99, TokenType::Refresh, SECRET).expect("Creation should succeed");
        let access = refresh_access_token(&refresh, SECRET).expect("Refresh should succeed");
        let claims = validate_access_token(&access, SECRET).expect("Validation should succeed");

        assert_eq!(claims.sub, 99);
    }

    #[test]
    fn test_access_token_cannot_be_refreshed() {
        let access = create_token(1, TokenType::Access, SECRET).expect("Creation should succeed");
        let result = refresh_access_token(&access, SECRET);

        assert!(matches!(result, Err(JwtError::WrongTokenType { .. })));
    }

    #[test]
    fn test_token_lifetimes() {
        let access = create_token(1, TokenType::Access, SECRET).expect("Creation should succeed");
        let refresh = create_token(1, TokenType::Refresh, SECRET).expect("Creation should succeed");

        let access_claims = validate_token(&access, SECRET).expect("Validation should succeed");
        let refresh_claims = validate_token(&refresh, SECRET).expect("Validation should succeed");

        let access_lifetime = access_claims.exp - access_claims.iat;
        let refresh_lifetime = refresh_claims.exp - refresh_claims.iat;

        assert_eq!(access_lifetime, 24 * 3600);
        assert_eq!(refresh_lifetime, 30 * 24 * 3600);
        assert!(refresh_lifetime > access_lifetime);
    }
}
