use axum::extract::FromRef;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};

use crate::{
    auth::{
        dto::{LoginResponse, RefreshResponse},
        jwt::JwtKeys,
        password::{hash_password, verify_password},
    },
    error::ApiError,
    state::AppState,
    users::repo_types::User,
};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Hash on the blocking pool; bcrypt at cost 12 takes on the order of
/// hundreds of milliseconds and must not stall the event loop.
pub async fn hash_password_blocking(plain: String) -> Result<String, ApiError> {
    let hash = tokio::task::spawn_blocking(move || hash_password(&plain))
        .await
        .map_err(anyhow::Error::from)??;
    Ok(hash)
}

/// Credential check and token issuance.
///
/// An unknown email and a wrong password produce the same
/// `InvalidCredentials` rejection so responses never reveal which emails
/// are registered.
pub async fn login(state: &AppState, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
    let user = match User::find_by_email(&state.db, email).await? {
        Some(u) => u,
        None => {
            warn!(email = %email, "login unknown email");
            return Err(ApiError::InvalidCredentials);
        }
    };

    let password = password.to_owned();
    let stored_hash = user.password_hash.clone();
    let ok = tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash))
        .await
        .map_err(anyhow::Error::from)?;

    if !ok {
        warn!(email = %email, user_id = %user.id, "login invalid password");
        return Err(ApiError::InvalidCredentials);
    }

    let access_token = JwtKeys::from_ref(state).sign(user.id)?;
    info!(user_id = %user.id, "user logged in");

    Ok(LoginResponse {
        id: user.id,
        name: user.name,
        role: user.role,
        access_token,
    })
}

/// Reissue a token for an already-authenticated user. The store is
/// consulted again so a user deleted since issuance is turned away; the
/// old token stays valid until its own expiry.
pub async fn refresh_token(state: &AppState, user_id: i64) -> Result<RefreshResponse, ApiError> {
    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    let access_token = JwtKeys::from_ref(state).sign(user.id)?;
    info!(user_id = %user.id, "token refreshed");

    Ok(RefreshResponse { access_token })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_addresses() {
        assert!(is_valid_email("admin@example.com"));
        assert!(is_valid_email("a.b+c@sub.domain.org"));
    }

    #[test]
    fn rejects_malformed_addresses() {
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("missing@tld"));
        assert!(!is_valid_email("two@@example.com"));
        assert!(!is_valid_email("spaces in@example.com"));
    }
}
