use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::entities::user::{self, UserRole};
use crate::errors::ServiceError;
use crate::AppState;

/// Claim structure for JWT tokens
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,      // Subject (user ID)
    pub username: String, // Login name, for display and logging
    pub role: String,     // Single role; the app has no finer permissions
    pub jti: String,      // JWT ID (unique identifier for this token)
    pub iat: i64,         // Issued at time
    pub exp: i64,         // Expiration time
    pub nbf: i64,         // Not valid before time
    pub iss: String,      // Issuer
    pub aud: String,      // Audience
}

/// Authenticated user data extracted from the JWT token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub user_id: i32,
    pub username: String,
    pub role: UserRole,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// Admins may act on everything; technicians only on their own records.
    pub fn can_modify_user(&self, target_user_id: i32) -> bool {
        self.is_admin() || self.user_id == target_user_id
    }
}

/// Authentication configuration
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub jwt_audience: String,
    pub token_expiration: Duration,
}

impl AuthConfig {
    pub fn from_app_config(cfg: &AppConfig) -> Self {
        Self {
            jwt_secret: cfg.jwt_secret.clone(),
            jwt_issuer: cfg.auth_issuer.clone(),
            jwt_audience: cfg.auth_audience.clone(),
            token_expiration: Duration::from_secs(cfg.jwt_expiration_secs),
        }
    }
}

/// Issued token together with its metadata, as returned by the login endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// Authentication service that handles token issuance and validation
#[derive(Debug, Clone)]
pub struct AuthService {
    config: AuthConfig,
}

impl AuthService {
    pub fn new(config: AuthConfig) -> Self {
        Self { config }
    }

    /// Generate a JWT token for a user
    pub fn issue_token(&self, user: &user::Model) -> Result<TokenResponse, ServiceError> {
        let now = Utc::now();
        let exp = now
            + ChronoDuration::from_std(self.config.token_expiration).map_err(|_| {
                ServiceError::InternalError("Invalid token duration".to_string())
            })?;

        let claims = Claims {
            sub: user.id.to_string(),
            username: user.username.clone(),
            role: user.role.clone(),
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            nbf: now.timestamp(),
            iss: self.config.jwt_issuer.clone(),
            aud: self.config.jwt_audience.clone(),
        };

        let access_token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|e| ServiceError::InternalError(format!("Failed to create token: {}", e)))?;

        Ok(TokenResponse {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: self.config.token_expiration.as_secs() as i64,
        })
    }

    /// Validate a JWT token and extract the claims
    pub fn validate_token(&self, token: &str) -> Result<Claims, ServiceError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.config.jwt_issuer]);
        validation.set_audience(&[&self.config.jwt_audience]);

        let claims = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &validation,
        )
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                ServiceError::Unauthorized("Token has expired".to_string())
            }
            _ => ServiceError::Unauthorized("Invalid token".to_string()),
        })?
        .claims;

        Ok(claims)
    }

    /// Resolve validated claims into an [`AuthUser`]
    pub fn auth_user_from_claims(&self, claims: &Claims) -> Result<AuthUser, ServiceError> {
        let user_id: i32 = claims
            .sub
            .parse()
            .map_err(|_| ServiceError::Unauthorized("Invalid token subject".to_string()))?;

        let role = claims.role.parse().unwrap_or_default();

        Ok(AuthUser {
            user_id,
            username: claims.username.clone(),
            role,
        })
    }
}

/// Hash a plaintext password using Argon2id with a random salt.
///
/// Returns the PHC-formatted hash string (includes algorithm, params, salt,
/// and hash).
pub fn hash_password(password: &str) -> Result<String, ServiceError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| ServiceError::InternalError(format!("Failed to hash password: {}", e)))?;
    Ok(hash.to_string())
}

/// Verify a plaintext password against a stored PHC-formatted Argon2id hash.
///
/// Returns `Ok(true)` if the password matches, `Ok(false)` if it does not.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, ServiceError> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| ServiceError::InternalError(format!("Stored password hash invalid: {}", e)))?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(ServiceError::InternalError(format!(
            "Password verification failed: {}",
            e
        ))),
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ServiceError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ServiceError::Unauthorized("Missing authorization header".to_string()))?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ServiceError::Unauthorized("Invalid authorization scheme".to_string()))?;

        let claims = state.auth.validate_token(token)?;
        state.auth.auth_user_from_claims(&claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn test_auth_service() -> AuthService {
        AuthService::new(AuthConfig {
            jwt_secret: "kQ3vb81zR7mXw0pLcY5sHnJ2dT9fGuE4aN6oWiB_xVrZ".to_string(),
            jwt_issuer: "upkeep-api".to_string(),
            jwt_audience: "upkeep-auth".to_string(),
            token_expiration: Duration::from_secs(3600),
        })
    }

    fn test_user() -> user::Model {
        user::Model {
            id: 7,
            username: "somchai".to_string(),
            password_hash: "unused".to_string(),
            role: "admin".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn token_round_trip() {
        let auth = test_auth_service();
        let token = auth.issue_token(&test_user()).expect("token issuance");
        assert_eq!(token.token_type, "Bearer");
        assert_eq!(token.expires_in, 3600);

        let claims = auth
            .validate_token(&token.access_token)
            .expect("validation");
        assert_eq!(claims.sub, "7");
        assert_eq!(claims.username, "somchai");

        let auth_user = auth.auth_user_from_claims(&claims).expect("claims resolve");
        assert_eq!(auth_user.user_id, 7);
        assert!(auth_user.is_admin());
    }

    #[test]
    fn token_from_other_secret_is_rejected() {
        let auth = test_auth_service();
        let other = AuthService::new(AuthConfig {
            jwt_secret: "a_completely_different_secret_value_0123456789ab".to_string(),
            jwt_issuer: "upkeep-api".to_string(),
            jwt_audience: "upkeep-auth".to_string(),
            token_expiration: Duration::from_secs(3600),
        });

        let token = other.issue_token(&test_user()).expect("token issuance");
        assert!(auth.validate_token(&token.access_token).is_err());
    }

    #[test]
    fn unknown_role_degrades_to_unspecified() {
        let auth = test_auth_service();
        let mut user = test_user();
        user.role = "supervisor".to_string();

        let token = auth.issue_token(&user).expect("token issuance");
        let claims = auth.validate_token(&token.access_token).expect("validation");
        let auth_user = auth.auth_user_from_claims(&claims).expect("claims resolve");

        assert_eq!(auth_user.role, UserRole::Unspecified);
        assert!(!auth_user.is_admin());
    }

    #[test]
    fn password_hash_and_verify() {
        let hash = hash_password("correct-horse-battery-staple").expect("hashing");
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("correct-horse-battery-staple", &hash).expect("verify"));
        assert!(!verify_password("wrong-password", &hash).expect("verify"));
    }

    #[test]
    fn technician_can_only_modify_self() {
        let user = AuthUser {
            user_id: 3,
            username: "tech".to_string(),
            role: UserRole::Technician,
        };
        assert!(user.can_modify_user(3));
        assert!(!user.can_modify_user(4));
    }
}
