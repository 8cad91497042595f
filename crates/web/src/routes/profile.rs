//! Profile route handlers.
//!
//! These routes require authentication.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::db::UserRepository;
use crate::filters;
use crate::flash::{Flash, MessageQuery};
use crate::middleware::RequireAuth;
use crate::models::{CurrentUser, session::keys};
use crate::state::AppState;

use super::breadcrumbs::{Crumb, trail};
use super::dashboard::UserView;

/// Profile form data.
#[derive(Debug, Deserialize)]
pub struct ProfileForm {
    #[serde(default)]
    pub full_name: String,
}

/// Profile page template.
#[derive(Template, WebTemplate)]
#[template(path = "profile/edit.html")]
pub struct ProfileTemplate {
    pub user: UserView,
    pub crumbs: Vec<Crumb>,
    pub flash: Flash,
    pub full_name: String,
    pub email: String,
    pub role: &'static str,
}

/// Display the profile page.
#[instrument(skip(current, state))]
pub async fn show(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
    Query(query): Query<MessageQuery>,
) -> impl IntoResponse {
    // Prefer the stored name over the session copy.
    let full_name = match UserRepository::new(state.pool()).get_by_id(current.id).await {
        Ok(Some(user)) => user.full_name,
        Ok(None) => current.full_name.clone(),
        Err(e) => {
            tracing::error!("Failed to fetch profile: {e}");
            current.full_name.clone()
        }
    };

    ProfileTemplate {
        user: UserView::from(&current),
        crumbs: trail("/profile", None),
        flash: Flash::from_query(&query),
        full_name,
        email: current.email.to_string(),
        role: current.role.as_str(),
    }
}

/// Update the signed-in user's full name.
#[instrument(skip(current, state, session, form))]
pub async fn update(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<ProfileForm>,
) -> impl IntoResponse {
    let full_name = form.full_name.trim();
    if full_name.is_empty() {
        return Redirect::to("/profile?error=full_name");
    }

    match UserRepository::new(state.pool())
        .update_full_name(current.id, full_name)
        .await
    {
        Ok(user) => {
            if let Err(e) = session
                .insert(keys::CURRENT_USER, CurrentUser::from(&user))
                .await
            {
                tracing::error!("Failed to refresh session user: {e}");
            }
            Redirect::to("/profile?success=profile_updated")
        }
        Err(e) => {
            tracing::error!("Failed to update profile: {e}");
            Redirect::to("/profile?error=update_profile")
        }
    }
}
