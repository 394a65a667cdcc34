use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::Response,
};

use crate::{
    error::AppError,
    repository::RepositoryState,
    token::{IdentityClaims, TokenError, TokenService},
};

/// AuthUser
///
/// The verified identity of the caller, decoded from the bearer token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The email the token was issued for. Identity is the email, not a surrogate key.
    pub email: String,
    pub claims: IdentityClaims,
}

/// AuthUser Extractor Implementation
///
/// Makes `AuthUser` usable as a handler argument. When the identity gate has
/// already run, the identity it attached to the request is reused. Otherwise the
/// token is verified here:
/// 1. `Authorization` header missing or not `Bearer <token>` → `Unauthorized` (401).
/// 2. Signature, format or expiry check fails → `InvalidToken` (401).
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    TokenService: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(user.clone());
        }

        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or(AppError::Unauthorized)?;

        let tokens = TokenService::from_ref(state);
        let claims = tokens.verify(token).map_err(|e| {
            match e {
                TokenError::Expired => tracing::debug!("rejected expired token"),
                _ => tracing::warn!("rejected invalid token"),
            }
            AppError::InvalidToken
        })?;

        Ok(AuthUser {
            email: claims.email.clone(),
            claims,
        })
    }
}

/// require_identity
///
/// Identity gate. Verifies the bearer token and attaches the resulting `AuthUser`
/// to the request for everything downstream. Rejection ends the request.
pub async fn require_identity(user: AuthUser, mut request: Request, next: Next) -> Response {
    request.extensions_mut().insert(user);
    next.run(request).await
}

/// require_admin
///
/// Admin gate. Looks the caller up by email and demands `role == "admin"`. Must
/// be layered inside `require_identity`; the identity is reused, not re-verified.
/// A denial is terminal: the handler never runs.
pub async fn require_admin(
    State(repo): State<RepositoryState>,
    user: AuthUser,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let is_admin = repo
        .find_user_by_email(&user.email)
        .await?
        .is_some_and(|stored| stored.is_admin());

    if !is_admin {
        tracing::warn!(email = %user.email, "admin access denied");
        return Err(AppError::Forbidden);
    }

    Ok(next.run(request).await)
}

/// Rejects a caller asking about any email other than their own.
pub fn ensure_same_email(user: &AuthUser, email: &str) -> Result<(), AppError> {
    if user.email == email {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}
