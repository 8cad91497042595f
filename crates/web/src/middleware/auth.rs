//! Authentication extractors.
//!
//! Provides extractors for requiring a signed-in user (and optionally the
//! admin role) in route handlers.
//!
//! `RequireAuth` and `RequireAdmin` reload the user row on every request, so
//! a deleted account loses access immediately and role changes apply on the
//! next page load.

use axum::{
    extract::{FromRequestParts, OriginalUri},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::db::UserRepository;
use crate::error::AppError;
use crate::models::{CurrentUser, User, session::keys};
use crate::state::AppState;

/// Extractor that requires a signed-in user.
///
/// If nobody is signed in, HTML requests are redirected to `/signin` with a
/// `next` parameter pointing back at the requested page.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireAuth(user): RequireAuth) -> impl IntoResponse {
///     format!("Hello, {}!", user.display_name())
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

/// Error returned when authentication is required but the user is not signed in.
#[derive(Debug)]
pub enum AuthRejection {
    /// Redirect to the sign-in page, remembering where to return.
    RedirectToSignin(String),
    /// Unauthorized response (missing session layer).
    Unauthorized,
    /// Signed in without the admin role.
    Forbidden,
    /// The user row could not be loaded.
    Error(AppError),
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToSignin(next) => Redirect::to(&signin_url(&next)).into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
            Self::Forbidden => {
                AppError::Forbidden("Only admins can access this page".to_string()).into_response()
            }
            Self::Error(err) => err.into_response(),
        }
    }
}

impl From<AppError> for AuthRejection {
    fn from(err: AppError) -> Self {
        Self::Error(err)
    }
}

/// Sign-in URL that returns to `next` afterwards.
fn signin_url(next: &str) -> String {
    if next.is_empty() || next == "/" {
        "/signin".to_string()
    } else {
        format!("/signin?next={}", urlencoding::encode(next))
    }
}

/// Path and query of the request, before nested routers strip their prefix.
fn requested_path(parts: &Parts) -> String {
    let uri = parts
        .extensions
        .get::<OriginalUri>()
        .map_or(&parts.uri, |original| &original.0);
    uri.path_and_query()
        .map_or(uri.path(), axum::http::uri::PathAndQuery::as_str)
        .to_string()
}

/// Bring the session copy of a user in line with their database row.
///
/// Returns `None` when the row is gone.
fn reconcile(session_user: &CurrentUser, row: Option<&User>) -> Option<CurrentUser> {
    let row = row?;
    if row.id != session_user.id {
        return None;
    }
    Some(CurrentUser::from(row))
}

/// Read the current user from the session and re-check it against the database.
async fn current_user(parts: &Parts, state: &AppState) -> Result<CurrentUser, AuthRejection> {
    let session = parts
        .extensions
        .get::<Session>()
        .ok_or(AuthRejection::Unauthorized)?;

    let Some(session_user) = session
        .get::<CurrentUser>(keys::CURRENT_USER)
        .await
        .ok()
        .flatten()
    else {
        return Err(AuthRejection::RedirectToSignin(requested_path(parts)));
    };

    let row = UserRepository::new(state.pool())
        .get_by_id(session_user.id)
        .await
        .map_err(AppError::from)?;

    let Some(user) = reconcile(&session_user, row.as_ref()) else {
        tracing::info!(user_id = %session_user.id, "Signed-in user no longer exists");
        if let Err(e) = session.flush().await {
            tracing::error!(error = %e, "Failed to flush session of deleted user");
        }
        return Err(AuthRejection::RedirectToSignin(requested_path(parts)));
    };

    if user != session_user
        && let Err(e) = session.insert(keys::CURRENT_USER, &user).await
    {
        tracing::error!(error = %e, "Failed to refresh session user");
    }

    Ok(user)
}

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = current_user(parts, state).await?;
        Ok(Self(user))
    }
}

/// Extractor that requires a signed-in admin.
///
/// Redirects to sign-in when nobody is signed in, and answers 403 Forbidden
/// when a member asks for an admin page.
pub struct RequireAdmin(pub CurrentUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = current_user(parts, state).await?;
        if !user.is_admin() {
            tracing::warn!(user_id = %user.id, path = %parts.uri.path(), "Member denied admin page");
            return Err(AuthRejection::Forbidden);
        }
        Ok(Self(user))
    }
}

/// Extractor that optionally gets the current user.
///
/// Unlike `RequireAuth`, this does not reject the request if nobody is signed
/// in, and it trusts the session copy without a database round trip. It only
/// picks redirects and headers for public pages.
pub struct OptionalAuth(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = match parts.extensions.get::<Session>() {
            Some(session) => session
                .get::<CurrentUser>(keys::CURRENT_USER)
                .await
                .ok()
                .flatten(),
            None => None,
        };

        Ok(Self(user))
    }
}

/// Helper to set the current user in the session.
///
/// Cycles the session ID first so a pre-login session cannot be fixated.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(keys::CURRENT_USER, user).await
}

/// Helper to clear the current user from the session (sign-out).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use plooma_core::{Email, Role, UserId};

    use super::*;

    fn session_user() -> CurrentUser {
        CurrentUser {
            id: UserId::new(7),
            email: Email::parse("ada@example.com").unwrap(),
            full_name: "Ada".to_string(),
            role: Role::Admin,
        }
    }

    fn row(id: i32, full_name: &str, role: Role) -> User {
        User {
            id: UserId::new(id),
            email: Email::parse("ada@example.com").unwrap(),
            full_name: full_name.to_string(),
            role,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_deleted_user_is_signed_out() {
        assert_eq!(reconcile(&session_user(), None), None);
    }

    #[test]
    fn test_row_for_other_user_is_rejected() {
        let other = row(8, "Ada", Role::Admin);
        assert_eq!(reconcile(&session_user(), Some(&other)), None);
    }

    #[test]
    fn test_role_and_name_come_from_row() {
        let demoted = row(7, "Ada Lovelace", Role::Member);
        let user = reconcile(&session_user(), Some(&demoted)).unwrap();
        assert_eq!(user.role, Role::Member);
        assert_eq!(user.full_name, "Ada Lovelace");
        assert!(!user.is_admin());
    }

    #[test]
    fn test_unchanged_row_matches_session() {
        let same = row(7, "Ada", Role::Admin);
        assert_eq!(reconcile(&session_user(), Some(&same)), Some(session_user()));
    }

    #[test]
    fn test_signin_url_keeps_next() {
        assert_eq!(signin_url("/"), "/signin");
        assert_eq!(
            signin_url("/dashboard/projects?q=web site"),
            "/signin?next=%2Fdashboard%2Fprojects%3Fq%3Dweb%20site"
        );
    }

    #[test]
    fn test_rejection_statuses() {
        assert_eq!(
            AuthRejection::Unauthorized.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthRejection::Forbidden.into_response().status(),
            StatusCode::FORBIDDEN
        );
        let redirect = AuthRejection::RedirectToSignin("/profile".into()).into_response();
        assert_eq!(redirect.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            redirect.headers().get("location").map(|v| v.to_str().ok()),
            Some(Some("/signin?next=%2Fprofile"))
        );
    }
}
