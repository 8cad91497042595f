//! Landing page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::response::IntoResponse;

use crate::filters;
use crate::middleware::OptionalAuth;

/// A landing page feature card.
#[derive(Debug, Clone, Copy)]
pub struct Feature {
    pub title: &'static str,
    pub description: &'static str,
}

/// Feature cards under "Why Choose Plooma?".
pub const FEATURES: [Feature; 3] = [
    Feature {
        title: "Task Management",
        description: "Organize and track tasks effortlessly.",
    },
    Feature {
        title: "Team Collaboration",
        description: "Assign tasks and work together.",
    },
    Feature {
        title: "Real-time Updates",
        description: "Stay updated with instant notifications.",
    },
];

/// Landing page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub features: &'static [Feature],
    /// Dashboard link for a signed-in visitor.
    pub dashboard_path: Option<&'static str>,
}

/// Display the landing page.
pub async fn home(OptionalAuth(user): OptionalAuth) -> impl IntoResponse {
    HomeTemplate {
        features: &FEATURES,
        dashboard_path: user.map(|u| u.role.dashboard_path()),
    }
}
