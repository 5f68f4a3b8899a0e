use std::collections::HashMap;

use async_trait::async_trait;
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use orderdesk_models::{Profile, Session};
use orderdesk_utils::{AuthConfig, OrderDeskError};

use crate::{middleware::ApiError, AppState};

/// Maps a bearer token to the session it belongs to.
#[async_trait]
pub trait SessionResolver: Send + Sync {
    async fn resolve(&self, token: &str) -> Option<Session>;
}

/// Sessions declared in configuration, keyed by token.
pub struct StaticSessionResolver {
    sessions: HashMap<String, Session>,
}

impl StaticSessionResolver {
    pub fn from_config(config: &AuthConfig) -> Self {
        let sessions = config
            .sessions
            .iter()
            .map(|entry| {
                // A user without a role has no profile and therefore no capabilities.
                let profile = entry.role.map(|role| Profile {
                    id: entry.user_id,
                    first_name: entry.first_name.clone(),
                    last_name: entry.last_name.clone(),
                    role,
                    agent_id: entry.agent_id,
                });
                (entry.token.clone(), Session::new(entry.user_id, profile))
            })
            .collect();

        Self { sessions }
    }
}

#[async_trait]
impl SessionResolver for StaticSessionResolver {
    async fn resolve(&self, token: &str) -> Option<Session> {
        self.sessions.get(token).cloned()
    }
}

pub async fn auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok());

    let token = match auth_header {
        Some(header) => header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| OrderDeskError::authentication("Invalid authorization header format"))?,
        None => return Err(OrderDeskError::authentication("Missing authorization header").into()),
    };

    let session = state
        .sessions
        .resolve(token)
        .await
        .ok_or_else(|| OrderDeskError::authentication("Invalid token"))?;

    tracing::debug!(user_id = %session.user_id, role = ?session.role(), "Authenticated request");
    request.extensions_mut().insert(session);

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use orderdesk_models::Role;
    use orderdesk_utils::StaticSessionConfig;
    use uuid::Uuid;

    fn entry(token: &str, role: Option<Role>) -> StaticSessionConfig {
        StaticSessionConfig {
            token: token.to_string(),
            user_id: Uuid::new_v4(),
            first_name: Some("Ada".to_string()),
            last_name: None,
            role,
            agent_id: None,
        }
    }

    #[tokio::test]
    async fn test_static_resolver() {
        let resolver = StaticSessionResolver::from_config(&AuthConfig {
            sessions: vec![entry("admin-token", Some(Role::Admin)), entry("no-profile", None)],
        });

        let admin = resolver.resolve("admin-token").await.unwrap();
        assert!(admin.is_admin());
        assert_eq!(admin.profile.unwrap().display_name().as_deref(), Some("Ada"));

        let bare = resolver.resolve("no-profile").await.unwrap();
        assert!(bare.profile.is_none());
        assert!(bare.capabilities().is_empty());

        assert!(resolver.resolve("unknown").await.is_none());
    }
}
