use axum::{
    extract::Request,
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::auth::{validate_jwt, Claims, Role};
use crate::error::ApiError;

/// Authenticated caller extracted from the JWT
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthUser {
    pub id: Uuid,
    pub username: String,
    pub role: Role,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// The owner filter for device queries: admins see everything
    pub fn owner_scope(&self) -> Option<Uuid> {
        if self.is_admin() {
            None
        } else {
            Some(self.id)
        }
    }
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.id,
            username: claims.username,
            role: claims.role,
        }
    }
}

/// JWT authentication middleware that validates tokens and injects `AuthUser`
pub async fn jwt_auth_middleware(headers: HeaderMap, mut request: Request, next: Next) -> Result<Response, ApiError> {
    let token = extract_jwt_from_headers(&headers).map_err(ApiError::unauthorized)?;
    let claims = validate_jwt(&token)?;

    let auth_user = AuthUser::from(claims);
    tracing::debug!("Authenticated {} ({})", auth_user.username, auth_user.role);
    request.extensions_mut().insert(auth_user);

    Ok(next.run(request).await)
}

/// Rejects non-admin callers; must run after `jwt_auth_middleware`
pub async fn require_admin(request: Request, next: Next) -> Result<Response, ApiError> {
    let auth_user = request
        .extensions()
        .get::<AuthUser>()
        .ok_or_else(|| ApiError::unauthorized("JWT authentication required"))?;

    if !auth_user.is_admin() {
        tracing::warn!("User '{}' attempted an admin-only operation", auth_user.username);
        return Err(ApiError::forbidden("Forbidden: Admin access required."));
    }

    Ok(next.run(request).await)
}

/// Extract JWT token from Authorization header
fn extract_jwt_from_headers(headers: &HeaderMap) -> Result<String, String> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| "Missing Authorization header".to_string())?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    if let Some(token) = auth_str.strip_prefix("Bearer ") {
        if token.trim().is_empty() {
            return Err("Empty JWT token".to_string());
        }
        Ok(token.trim().to_string())
    } else {
        Err("Authorization header must use Bearer token format".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn extracts_bearer_token() {
        assert_eq!(extract_jwt_from_headers(&headers("Bearer abc.def")).unwrap(), "abc.def");
        assert!(extract_jwt_from_headers(&headers("Bearer   ")).is_err());
        assert!(extract_jwt_from_headers(&headers("Basic dXNlcg==")).is_err());
        assert!(extract_jwt_from_headers(&HeaderMap::new()).is_err());
    }

    #[test]
    fn owner_scope_by_role() {
        let id = Uuid::new_v4();
        let admin = AuthUser { id, username: "root".into(), role: Role::Admin };
        let user = AuthUser { id, username: "u".into(), role: Role::User };
        assert_eq!(admin.owner_scope(), None);
        assert_eq!(user.owner_scope(), Some(id));
    }
}
