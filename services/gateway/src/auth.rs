use crate::error::AppError;
use crate::state::AppState;
use axum::{extract::FromRequestParts, http::request::Parts};
use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use types::ids::UserId;
use types::principal::{Principal, Role};
use uuid::Uuid;

/// Bearer-token claims issued by the auth service
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user's id
    pub sub: Uuid,
    pub exp: usize,
    /// Administrative override powers
    #[serde(default)]
    pub admin: bool,
}

/// Extractor resolving the request to an authenticated [`Principal`].
///
/// The engine trusts bidder and seller identities only from this
/// extractor, never from request payloads.
pub struct AuthenticatedPrincipal(pub Principal);

impl FromRequestParts<AppState> for AuthenticatedPrincipal {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("Authorization")
            .ok_or_else(|| AppError::Unauthorized("Missing authentication credentials".into()))?;
        let auth_str = auth_header
            .to_str()
            .map_err(|_| AppError::Unauthorized("Invalid header string".into()))?;
        let token = auth_str
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Unauthorized("Expected bearer token".into()))?;

        // In a full deployment the decoding key rotates through a
        // keystore; here it comes from process configuration.
        let key = DecodingKey::from_secret(state.jwt_secret.as_bytes());
        let token_data = decode::<Claims>(token, &key, &Validation::default())
            .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))?;

        let role = if token_data.claims.admin {
            Role::Admin
        } else {
            Role::User
        };
        Ok(AuthenticatedPrincipal(Principal {
            id: UserId::from_uuid(token_data.claims.sub),
            role,
        }))
    }
}
