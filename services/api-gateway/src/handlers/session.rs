use axum::{response::Json, Extension};
use orderdesk_models::{Capability, Role, Session};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct SessionView {
    pub user_id: Uuid,
    pub display_name: Option<String>,
    pub role: Option<Role>,
    pub capabilities: Vec<Capability>,
    pub is_admin: bool,
    pub can_edit: bool,
}

impl From<&Session> for SessionView {
    fn from(session: &Session) -> Self {
        Self {
            user_id: session.user_id,
            display_name: session.profile.as_ref().and_then(|p| p.display_name()),
            role: session.role(),
            capabilities: session.capabilities().to_vec(),
            is_admin: session.is_admin(),
            can_edit: session.can_edit(),
        }
    }
}

/// Who the caller is and what the UI should offer them.
pub async fn current_session(Extension(session): Extension<Session>) -> Json<SessionView> {
    Json(SessionView::from(&session))
}
