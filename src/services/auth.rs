use std::future::{ready, Ready};

use actix_web::{dev::Payload, http::header, web, FromRequest, HttpRequest};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::ApiError;
use crate::routes::AppState;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Authentication token is missing")]
    MissingToken,

    #[error("Invalid or expired token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),

    #[error("You are not allowed to perform this action")]
    Forbidden,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Teacher,
    Admin,
}

/// Token payload issued by the account service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Account id; a teacher's account id is their teacher form id
    pub id: String,
    pub email: String,
    pub role: Role,
    pub exp: usize,
}

/// HS256 token verifier
#[derive(Clone)]
pub struct JwtVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    pub fn new(secret: &str) -> Self {
        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let data = decode::<Claims>(token, &self.key, &self.validation)?;
        Ok(data.claims)
    }
}

/// Caller identity taken from `Authorization: Bearer <token>`
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub Claims);

impl AuthenticatedUser {
    pub fn claims(&self) -> &Claims {
        &self.0
    }

    pub fn require_role(&self, role: Role) -> Result<&Claims, AuthError> {
        if self.0.role == role {
            Ok(&self.0)
        } else {
            Err(AuthError::Forbidden)
        }
    }
}

fn bearer_token(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

fn authenticate(req: &HttpRequest) -> Result<AuthenticatedUser, ApiError> {
    let token = bearer_token(req).ok_or(AuthError::MissingToken)?;

    let state = req
        .app_data::<web::Data<AppState>>()
        .ok_or_else(|| ApiError::Internal("application state is not configured".to_string()))?;

    let claims = state.verifier.verify(token).map_err(|e| {
        tracing::debug!("Rejected token on {}: {}", req.path(), e);
        e
    })?;

    Ok(AuthenticatedUser(claims))
}

impl FromRequest for AuthenticatedUser {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn token_for(role: Role, secret: &str, exp: usize) -> String {
        let claims = Claims {
            id: "user-1".to_string(),
            email: "user@example.com".to_string(),
            role,
            exp,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn future_exp() -> usize {
        (chrono::Utc::now().timestamp() + 3600) as usize
    }

    #[test]
    fn test_verify_valid_token() {
        let verifier = JwtVerifier::new("secret");
        let claims = verifier
            .verify(&token_for(Role::Teacher, "secret", future_exp()))
            .unwrap();

        assert_eq!(claims.id, "user-1");
        assert_eq!(claims.role, Role::Teacher);
    }

    #[test]
    fn test_verify_rejects_wrong_secret() {
        let verifier = JwtVerifier::new("secret");
        let result = verifier.verify(&token_for(Role::Student, "other", future_exp()));
        assert!(matches!(result, Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn test_verify_rejects_expired() {
        let verifier = JwtVerifier::new("secret");
        let expired = (chrono::Utc::now().timestamp() - 3600) as usize;
        assert!(verifier.verify(&token_for(Role::Student, "secret", expired)).is_err());
    }

    #[test]
    fn test_require_role() {
        let user = AuthenticatedUser(Claims {
            id: "a".to_string(),
            email: "a@example.com".to_string(),
            role: Role::Student,
            exp: future_exp(),
        });

        assert!(user.require_role(Role::Student).is_ok());
        assert!(matches!(user.require_role(Role::Admin), Err(AuthError::Forbidden)));
    }

    #[test]
    fn test_bearer_token_parsing() {
        let req = actix_web::test::TestRequest::default()
            .insert_header((header::AUTHORIZATION, "Bearer abc.def"))
            .to_http_request();
        assert_eq!(bearer_token(&req), Some("abc.def"));

        let req = actix_web::test::TestRequest::default()
            .insert_header((header::AUTHORIZATION, "Basic abc"))
            .to_http_request();
        assert_eq!(bearer_token(&req), None);
    }
}
