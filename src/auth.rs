//! Bearer-token identity for customer and operator requests

use std::future::{ready, Ready};

use actix_web::dev::Payload;
use actix_web::{web, FromRequest, HttpRequest};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::domain::access::{Requester, Role};
use crate::errors::AppError;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    #[serde(rename = "userId")]
    pub user_id: i32,
    #[serde(default)]
    pub role: Role,
    /// Expiration (Unix timestamp seconds)
    pub exp: usize,
    /// Issued at (Unix timestamp seconds)
    pub iat: usize,
}

#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub jwt_secret: String,
    /// When set, `PUT /orders/{id}/status` needs an operator or admin token.
    pub require_operator_for_status: bool,
}

const JWT_EXPIRY_HOURS: i64 = 24;

pub fn create_token(
    user_id: i32,
    role: Role,
    secret: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now();
    let claims = Claims {
        user_id,
        role,
        exp: (now + chrono::Duration::hours(JWT_EXPIRY_HOURS)).timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

pub fn verify_token(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    jsonwebtoken::decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
}

/// Caller identity taken from `Authorization: Bearer <jwt>`.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedUser(pub Requester);

impl AuthenticatedUser {
    pub fn user_id(&self) -> i32 {
        self.0.user_id
    }
}

fn authenticate(req: &HttpRequest) -> Result<AuthenticatedUser, AppError> {
    let settings = req
        .app_data::<web::Data<AuthSettings>>()
        .ok_or_else(|| AppError::Internal("auth settings not registered".to_string()))?;

    let header = req
        .headers()
        .get(actix_web::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("no token".to_string()))?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Unauthorized("no token".to_string()))?;

    let claims = verify_token(token, &settings.jwt_secret).map_err(|e| {
        log::debug!("JWT validation failed: {}", e);
        AppError::Unauthorized("token failed".to_string())
    })?;

    Ok(AuthenticatedUser(Requester {
        user_id: claims.user_id,
        role: claims.role,
    }))
}

impl FromRequest for AuthenticatedUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

#[cfg(test)]
mod tests {
    use actix_web::test::TestRequest;

    use super::*;

    const SECRET: &str = "test-secret";

    fn request_with(header: Option<String>) -> HttpRequest {
        let mut req = TestRequest::default().app_data(web::Data::new(AuthSettings {
            jwt_secret: SECRET.to_string(),
            require_operator_for_status: false,
        }));
        if let Some(value) = header {
            req = req.insert_header(("Authorization", value));
        }
        req.to_http_request()
    }

    #[test]
    fn valid_token_yields_requester() {
        let token = create_token(7, Role::Customer, SECRET).unwrap();
        let user = authenticate(&request_with(Some(format!("Bearer {token}")))).unwrap();
        assert_eq!(user.user_id(), 7);
        assert_eq!(user.0.role, Role::Customer);
    }

    #[test]
    fn operator_role_survives_roundtrip() {
        let token = create_token(1, Role::Operator, SECRET).unwrap();
        let claims = verify_token(&token, SECRET).unwrap();
        assert_eq!(claims.role, Role::Operator);
    }

    #[test]
    fn missing_header_is_unauthorized() {
        let err = authenticate(&request_with(None)).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[test]
    fn non_bearer_scheme_is_unauthorized() {
        let err = authenticate(&request_with(Some("Basic abc".to_string()))).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let token = create_token(7, Role::Customer, "other").unwrap();
        let err = authenticate(&request_with(Some(format!("Bearer {token}")))).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }
}
