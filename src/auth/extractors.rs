use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;

use crate::{
    auth::jwt::JwtKeys,
    error::ApiError,
    state::AppState,
    users::repo_types::{Role, User},
};

/// The authentication guard. Extracts and verifies the bearer token and
/// yields the signed user id. Does not touch the database; role is resolved
/// separately by [`AdminUser`] where an endpoint requires it.
#[derive(Debug)]
pub struct CurrentUser(pub i64);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);

        let auth_header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(ApiError::InvalidToken)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .or_else(|| auth_header.strip_prefix("bearer "))
            .ok_or(ApiError::InvalidToken)?;

        let claims = keys.verify(token).map_err(|_| {
            warn!("invalid or expired token");
            ApiError::InvalidToken
        })?;

        Ok(CurrentUser(claims.sub))
    }
}

/// Decides whether a resolved role satisfies the endpoint's requirement.
/// No identity at all fails closed; the role guard must never run as if
/// the auth guard had succeeded.
pub(crate) fn check_role(resolved: Option<Role>, required: Role) -> Result<(), ApiError> {
    match resolved {
        Some(role) if role == required => Ok(()),
        _ => Err(ApiError::Forbidden),
    }
}

/// The role guard for ADMIN-only endpoints, composed explicitly on top of
/// [`CurrentUser`]: verify the token first, then fetch the user row to pick
/// up the current role (a stale token does not carry one).
pub struct AdminUser(pub i64);

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(user_id) = CurrentUser::from_request_parts(parts, state).await?;

        let resolved = User::find_by_id(&state.db, user_id)
            .await?
            .map(|u| u.role);
        check_role(resolved, Role::Admin)?;

        Ok(AdminUser(user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header::AUTHORIZATION, Request, StatusCode};

    #[test]
    fn check_role_allows_matching_admin() {
        assert!(check_role(Some(Role::Admin), Role::Admin).is_ok());
    }

    #[test]
    fn check_role_denies_plain_user() {
        let err = check_role(Some(Role::User), Role::Admin).unwrap_err();
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn check_role_fails_closed_without_identity() {
        let err = check_role(None, Role::Admin).unwrap_err();
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
    }

    fn parts_with_header(value: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/");
        if let Some(v) = value {
            builder = builder.header(AUTHORIZATION, v);
        }
        let (parts, _) = builder.body(()).expect("request builds").into_parts();
        parts
    }

    #[tokio::test]
    async fn current_user_resolves_signed_id() {
        let state = AppState::fake();
        let token = JwtKeys::from_ref(&state).sign(99).expect("sign");
        let mut parts = parts_with_header(Some(&format!("Bearer {token}")));
        let CurrentUser(id) = CurrentUser::from_request_parts(&mut parts, &state)
            .await
            .expect("valid token accepted");
        assert_eq!(id, 99);
    }

    #[tokio::test]
    async fn current_user_rejects_missing_header() {
        let state = AppState::fake();
        let mut parts = parts_with_header(None);
        let err = CurrentUser::from_request_parts(&mut parts, &state)
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn current_user_rejects_non_bearer_scheme() {
        let state = AppState::fake();
        let mut parts = parts_with_header(Some("Basic dXNlcjpwdw=="));
        let err = CurrentUser::from_request_parts(&mut parts, &state)
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn current_user_rejects_tampered_token() {
        let state = AppState::fake();
        let token = JwtKeys::from_ref(&state).sign(99).expect("sign");
        let mut tampered = token.clone();
        let last = tampered.pop().expect("token non-empty");
        tampered.push(if last == 'A' { 'B' } else { 'A' });
        let mut parts = parts_with_header(Some(&format!("Bearer {tampered}")));
        let err = CurrentUser::from_request_parts(&mut parts, &state)
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }
}
