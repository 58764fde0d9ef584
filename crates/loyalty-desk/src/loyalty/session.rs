//! Operator sessions and the request context threaded through service
//! calls.
//!
//! Upstream admin payloads carry roles either as a bare string or as an
//! object with a `name` field. Both shapes normalize to [`Role`] exactly
//! once, at the ingestion boundary; nothing downstream re-derives role
//! shapes.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

/// Normalized operator role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Staff,
    Viewer,
}

impl Role {
    pub const fn label(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Staff => "staff",
            Role::Viewer => "viewer",
        }
    }

    /// Whether this role may file and browse claims.
    pub const fn can_manage_claims(self) -> bool {
        matches!(self, Role::Admin | Role::Staff)
    }
}

/// Unrecognized role name at the ingestion boundary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role '{0}'")]
pub struct RoleParseError(String);

impl FromStr for Role {
    type Err = RoleParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "admin" | "administrator" => Ok(Role::Admin),
            "staff" | "operator" => Ok(Role::Staff),
            "viewer" | "readonly" => Ok(Role::Viewer),
            _ => Err(RoleParseError(value.trim().to_string())),
        }
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RoleShape {
            Name(String),
            Object { name: String },
        }

        let name = match RoleShape::deserialize(deserializer)? {
            RoleShape::Name(name) => name,
            RoleShape::Object { name } => name,
        };
        name.parse().map_err(D::Error::custom)
    }
}

/// Everything a service call needs to know about who is asking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    pub operator: String,
    pub role: Role,
    pub issued_at: DateTime<Utc>,
}

/// Token-to-context store created at process start and torn down on
/// shutdown. Handlers look contexts up here and pass them along explicitly
/// instead of reading ambient globals.
#[derive(Debug, Default)]
pub struct SessionProvider {
    sessions: Mutex<HashMap<String, RequestContext>>,
}

impl SessionProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a token for an operator, replacing any prior session on the
    /// same token.
    pub fn issue(
        &self,
        token: impl Into<String>,
        operator: impl Into<String>,
        role: Role,
    ) -> RequestContext {
        let context = RequestContext {
            operator: operator.into(),
            role,
            issued_at: Utc::now(),
        };
        self.sessions
            .lock()
            .expect("session mutex poisoned")
            .insert(token.into(), context.clone());
        context
    }

    pub fn authenticate(&self, token: &str) -> Option<RequestContext> {
        self.sessions
            .lock()
            .expect("session mutex poisoned")
            .get(token)
            .cloned()
    }

    /// Drop a single session (logout). Reports whether the token existed.
    pub fn revoke(&self, token: &str) -> bool {
        self.sessions
            .lock()
            .expect("session mutex poisoned")
            .remove(token)
            .is_some()
    }

    /// Drop every session; the shutdown half of the provider lifecycle.
    pub fn teardown(&self) {
        self.sessions
            .lock()
            .expect("session mutex poisoned")
            .clear();
    }
}
