use axum::{
    extract::Request,
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use uuid::Uuid;

use crate::auth::{Claims, Role};
use crate::config;
use crate::error::ApiError;

/// Authenticated caller context extracted from the bearer token
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub role: Role,
    pub email: String,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            role: claims.role,
            email: claims.email,
        }
    }
}

/// JWT authentication middleware that validates tokens and injects the
/// caller context as a request extension.
pub async fn jwt_auth_middleware(
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_token(&headers).map_err(ApiError::unauthorized)?;
    let claims = validate_jwt(&token).map_err(ApiError::unauthorized)?;

    let auth_user = AuthUser::from(claims);
    request.extensions_mut().insert(auth_user);

    Ok(next.run(request).await)
}

/// Admin gate, layered after `jwt_auth_middleware` on `/api/admin` routes.
pub async fn require_admin(request: Request, next: Next) -> Result<Response, ApiError> {
    let auth_user = request
        .extensions()
        .get::<AuthUser>()
        .ok_or_else(|| ApiError::unauthorized("Missing authentication context"))?;

    if !auth_user.is_admin() {
        return Err(ApiError::forbidden("Admin role required"));
    }

    Ok(next.run(request).await)
}

/// Extract the credential from the Authorization header, falling back to the
/// `token` cookie the web client sets.
fn extract_token(headers: &HeaderMap) -> Result<String, String> {
    if let Some(auth_header) = headers.get("authorization").or_else(|| headers.get("Authorization")) {
        let auth_str = auth_header
            .to_str()
            .map_err(|_| "Invalid Authorization header format".to_string())?;

        if let Some(token) = auth_str.strip_prefix("Bearer ") {
            if token.trim().is_empty() {
                return Err("Empty bearer token".to_string());
            }
            return Ok(token.to_string());
        }
        return Err("Authorization header must use Bearer token format".to_string());
    }

    if let Some(cookie_header) = headers.get("cookie") {
        let cookies = cookie_header
            .to_str()
            .map_err(|_| "Invalid Cookie header".to_string())?;
        for pair in cookies.split(';') {
            if let Some(token) = pair.trim().strip_prefix("token=") {
                if !token.is_empty() {
                    return Ok(token.to_string());
                }
            }
        }
    }

    Err("Missing Authorization header".to_string())
}

/// Validate JWT token and extract claims
fn validate_jwt(token: &str) -> Result<Claims, String> {
    let secret = &config::config().security.jwt_secret;

    if secret.is_empty() {
        return Err("JWT secret not configured".to_string());
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let validation = Validation::default();

    let token_data = decode::<Claims>(token, &decoding_key, &validation)
        .map_err(|e| format!("Invalid token: {}", e))?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn bearer_header_wins() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer abc"));
        headers.insert("cookie", HeaderValue::from_static("token=def"));
        assert_eq!(extract_token(&headers).unwrap(), "abc");
    }

    #[test]
    fn cookie_fallback() {
        let mut headers = HeaderMap::new();
        headers.insert("cookie", HeaderValue::from_static("theme=dark; token=def"));
        assert_eq!(extract_token(&headers).unwrap(), "def");
    }

    #[test]
    fn missing_credential_is_rejected() {
        assert!(extract_token(&HeaderMap::new()).is_err());
    }

    #[test]
    fn malformed_scheme_is_rejected() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Basic abc"));
        assert!(extract_token(&headers).is_err());
    }

    #[test]
    fn round_trip_through_validation() {
        let claims = crate::auth::Claims::new(
            uuid::Uuid::new_v4(),
            crate::auth::Role::Admin,
            "admin@example.com".into(),
        );
        let token = crate::auth::generate_jwt(claims).unwrap();
        let decoded = validate_jwt(&token).unwrap();
        assert_eq!(decoded.role, crate::auth::Role::Admin);
    }
}
