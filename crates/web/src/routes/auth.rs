//! Authentication route handlers.
//!
//! Email + password sign-up, sign-in and sign-out. A successful sign-up or
//! sign-in stores the user in the session and lands on the role dashboard.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use plooma_core::Role;

use crate::error::{clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::flash::{Flash, MessageQuery, error_message, safe_redirect};
use crate::middleware::{OptionalAuth, clear_current_user, set_current_user};
use crate::models::{CurrentUser, User};
use crate::services::auth::{AuthError, AuthService};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Sign-up form data.
#[derive(Debug, Deserialize)]
pub struct SignupForm {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub role: Option<String>,
}

/// Sign-in form data.
#[derive(Debug, Deserialize)]
pub struct SigninForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub next: Option<String>,
}

/// Query parameters for the sign-in page.
#[derive(Debug, Deserialize)]
pub struct SigninQuery {
    pub next: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Role option on the sign-up form.
#[derive(Debug, Clone)]
pub struct RoleOption {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

/// Sign-up page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/signup.html")]
pub struct SignupTemplate {
    pub flash: Flash,
    pub full_name: String,
    pub email: String,
    pub roles: Vec<RoleOption>,
}

/// Sign-in page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/signin.html")]
pub struct SigninTemplate {
    pub flash: Flash,
    pub email: String,
    pub next: String,
}

fn role_options(selected: Role, allow_admin: bool) -> Vec<RoleOption> {
    Role::ALL
        .iter()
        .filter(|role| allow_admin || !role.is_admin())
        .map(|role| RoleOption {
            value: role.as_str(),
            label: if role.is_admin() { "Admin" } else { "Member" },
            selected: *role == selected,
        })
        .collect()
}

/// Flash code for an auth failure.
pub(crate) const fn error_code(err: &AuthError) -> &'static str {
    match err {
        AuthError::InvalidCredentials => "credentials",
        AuthError::UserAlreadyExists => "email_taken",
        AuthError::WeakPassword(_) => "weak_password",
        AuthError::InvalidEmail(_) => "invalid_email",
        AuthError::MissingField(_) => "missing_fields",
        AuthError::Repository(_) | AuthError::PasswordHash => "unexpected",
    }
}

/// Store the user in the session and tag Sentry events with them.
async fn start_session(
    session: &Session,
    user: &User,
) -> Result<(), tower_sessions::session::Error> {
    set_current_user(session, &CurrentUser::from(user)).await?;
    set_sentry_user(&user.id, Some(user.email.as_str()));
    Ok(())
}

// =============================================================================
// Sign-up Routes
// =============================================================================

/// Display the sign-up page.
pub async fn signup_page(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    Query(query): Query<MessageQuery>,
) -> Response {
    if let Some(user) = user {
        return Redirect::to(user.role.dashboard_path()).into_response();
    }

    SignupTemplate {
        flash: Flash::from_query(&query),
        full_name: String::new(),
        email: String::new(),
        roles: role_options(Role::Member, state.config().allow_admin_signup),
    }
    .into_response()
}

/// Handle sign-up form submission.
#[instrument(skip(state, session, form), fields(email = %form.email))]
pub async fn signup(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<SignupForm>,
) -> Response {
    let allow_admin = state.config().allow_admin_signup;
    let role = form
        .role
        .as_deref()
        .and_then(|r| r.parse::<Role>().ok())
        .unwrap_or_default();

    let rerender = |code: &str| {
        SignupTemplate {
            flash: Flash {
                error: error_message(code),
                success: None,
            },
            full_name: form.full_name.clone(),
            email: form.email.clone(),
            roles: role_options(role, allow_admin),
        }
        .into_response()
    };

    if role.is_admin() && !allow_admin {
        tracing::warn!("Admin sign-up attempted while disabled");
        return rerender("admin_signup_disabled");
    }

    if form.full_name.trim().is_empty() || form.email.trim().is_empty() || form.password.is_empty()
    {
        return rerender("missing_fields");
    }

    let user = match AuthService::new(state.pool())
        .register(&form.full_name, &form.email, &form.password, role)
        .await
    {
        Ok(user) => user,
        Err(e) => {
            tracing::warn!("Sign-up failed: {e}");
            return rerender(error_code(&e));
        }
    };

    if let Err(e) = start_session(&session, &user).await {
        tracing::error!("Failed to set session: {e}");
        return Redirect::to("/signin?error=session").into_response();
    }

    Redirect::to(user.role.dashboard_path()).into_response()
}

// =============================================================================
// Sign-in Routes
// =============================================================================

/// Display the sign-in page.
pub async fn signin_page(
    OptionalAuth(user): OptionalAuth,
    Query(query): Query<MessageQuery>,
    Query(signin): Query<SigninQuery>,
) -> Response {
    if let Some(user) = user {
        return Redirect::to(user.role.dashboard_path()).into_response();
    }

    SigninTemplate {
        flash: Flash::from_query(&query),
        email: String::new(),
        next: safe_redirect(signin.next.as_deref())
            .unwrap_or_default()
            .to_string(),
    }
    .into_response()
}

/// Handle sign-in form submission.
#[instrument(skip(state, session, form), fields(email = %form.email))]
pub async fn signin(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<SigninForm>,
) -> Response {
    let next = safe_redirect(form.next.as_deref()).map(ToString::to_string);

    let user = match AuthService::new(state.pool())
        .login(&form.email, &form.password)
        .await
    {
        Ok(user) => user,
        Err(e) => {
            tracing::warn!("Sign-in failed: {e}");
            return SigninTemplate {
                flash: Flash {
                    error: error_message(error_code(&e)),
                    success: None,
                },
                email: form.email,
                next: next.unwrap_or_default(),
            }
            .into_response();
        }
    };

    if let Err(e) = start_session(&session, &user).await {
        tracing::error!("Failed to set session: {e}");
        return Redirect::to("/signin?error=session").into_response();
    }

    tracing::info!(user_id = %user.id, "User signed in");
    let target = next.unwrap_or_else(|| user.role.dashboard_path().to_string());
    Redirect::to(&target).into_response()
}

// =============================================================================
// Sign-out Route
// =============================================================================

/// Handle sign-out.
pub async fn signout(session: Session) -> impl IntoResponse {
    if let Err(e) = clear_current_user(&session).await {
        tracing::error!("Failed to clear session: {e}");
    }
    clear_sentry_user();

    Redirect::to("/signin?success=signed_out")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_options_hide_admin_when_disabled() {
        let options = role_options(Role::Member, false);
        assert_eq!(options.len(), 1);
        assert_eq!(options.first().map(|o| o.value), Some("member"));

        let options = role_options(Role::Admin, true);
        assert_eq!(options.len(), 2);
        assert!(options.iter().any(|o| o.value == "admin" && o.selected));
    }

    #[test]
    fn test_error_codes_have_banners() {
        let errors = [
            AuthError::InvalidCredentials,
            AuthError::UserAlreadyExists,
            AuthError::WeakPassword(String::new()),
            AuthError::MissingField("email"),
            AuthError::PasswordHash,
        ];
        for err in &errors {
            assert!(error_message(error_code(err)).is_some(), "{err:?}");
        }
        assert_eq!(
            error_message(error_code(&AuthError::InvalidCredentials)),
            Some("Invalid login credentials")
        );
    }
}
