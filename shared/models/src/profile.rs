//! Profiles, roles and session capabilities.
//!
//! Access decisions are made against a [`Session`] value handed to each
//! operation, never against process-wide flags.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Viewer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Viewer => "viewer",
        }
    }

    pub fn capabilities(&self) -> &'static [Capability] {
        match self {
            Self::Admin => &Capability::ALL,
            Self::Viewer => &[Capability::ViewOrders],
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    ViewOrders,
    EditOrders,
    ImportOrders,
}

impl Capability {
    pub const ALL: [Capability; 3] = [
        Capability::ViewOrders,
        Capability::EditOrders,
        Capability::ImportOrders,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ViewOrders => "view_orders",
            Self::EditOrders => "edit_orders",
            Self::ImportOrders => "import_orders",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Application-level user record, distinct from the authentication identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Role,
    pub agent_id: Option<Uuid>,
}

impl Profile {
    pub fn display_name(&self) -> Option<String> {
        let parts: Vec<&str> = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("forbidden: missing capability '{capability}'")]
pub struct AccessDenied {
    pub capability: Capability,
}

/// An authenticated user together with the profile fetched for them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: Uuid,
    pub profile: Option<Profile>,
}

impl Session {
    pub fn new(user_id: Uuid, profile: Option<Profile>) -> Self {
        Self { user_id, profile }
    }

    pub fn role(&self) -> Option<Role> {
        self.profile.as_ref().map(|profile| profile.role)
    }

    pub fn capabilities(&self) -> &'static [Capability] {
        self.role().map(|role| role.capabilities()).unwrap_or(&[])
    }

    pub fn can(&self, capability: Capability) -> bool {
        self.capabilities().contains(&capability)
    }

    pub fn require(&self, capability: Capability) -> Result<(), AccessDenied> {
        if self.can(capability) {
            Ok(())
        } else {
            Err(AccessDenied { capability })
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role() == Some(Role::Admin)
    }

    pub fn can_edit(&self) -> bool {
        self.can(Capability::EditOrders)
    }
}
