//! Caller identity forwarded by the identity proxy in front of the portal.
//!
//! Handlers build a [`Session`] from request headers once and pass it down explicitly;
//! nothing below the router reads request context directly.

use std::fmt;

use axum::http::HeaderMap;
use serde::Serialize;

use crate::workflows::approvals::domain::ParticipantId;

pub const PARTICIPANT_HEADER: &str = "x-hai-participant-id";
pub const ROLE_HEADER: &str = "x-hai-role";
const AUTHORIZATION_HEADER: &str = "authorization";

/// Portal roles, ordered from least to most privileged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Viewer,
    Operator,
    Admin,
}

impl Role {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "viewer" | "member" => Some(Self::Viewer),
            "operator" => Some(Self::Operator),
            "admin" | "administrator" => Some(Self::Admin),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Viewer => "Viewer",
            Self::Operator => "Operator",
            Self::Admin => "Administrator",
        }
    }
}

/// Actions the portal gates by role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PortalAction {
    ViewRules,
    TestRules,
    EditRules,
}

impl PortalAction {
    pub const fn all() -> [Self; 3] {
        [Self::ViewRules, Self::TestRules, Self::EditRules]
    }

    pub const fn required_role(self) -> Role {
        match self {
            Self::ViewRules => Role::Viewer,
            Self::TestRules => Role::Operator,
            Self::EditRules => Role::Admin,
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub participant_id: ParticipantId,
    pub role: Role,
    access_token: Option<String>,
}

impl Session {
    pub fn new(participant_id: ParticipantId, role: Role) -> Self {
        Self {
            participant_id,
            role,
            access_token: None,
        }
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    pub fn from_headers(headers: &HeaderMap) -> Result<Self, SessionError> {
        let participant = header_str(headers, PARTICIPANT_HEADER)?
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or(SessionError::MissingParticipant)?;

        let role = match header_str(headers, ROLE_HEADER)? {
            Some(raw) => {
                Role::parse(raw).ok_or_else(|| SessionError::UnknownRole(raw.to_string()))?
            }
            None => Role::Viewer,
        };

        let access_token = match header_str(headers, AUTHORIZATION_HEADER)? {
            Some(raw) => {
                let token = raw
                    .strip_prefix("Bearer ")
                    .or_else(|| raw.strip_prefix("bearer "))
                    .map(str::trim)
                    .filter(|token| !token.is_empty())
                    .ok_or(SessionError::MalformedHeader(AUTHORIZATION_HEADER))?;
                Some(token.to_string())
            }
            None => None,
        };

        Ok(Self {
            participant_id: ParticipantId(participant.to_string()),
            role,
            access_token,
        })
    }

    pub fn permitted_actions(&self) -> Vec<PortalAction> {
        PortalAction::all()
            .into_iter()
            .filter(|action| has_permission(self, action.required_role()))
            .collect()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("participant_id", &self.participant_id)
            .field("role", &self.role)
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

pub fn has_permission(session: &Session, required: Role) -> bool {
    session.role >= required
}

fn header_str<'a>(
    headers: &'a HeaderMap,
    name: &'static str,
) -> Result<Option<&'a str>, SessionError> {
    match headers.get(name) {
        Some(value) => value
            .to_str()
            .map(Some)
            .map_err(|_| SessionError::MalformedHeader(name)),
        None => Ok(None),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("missing x-hai-participant-id header")]
    MissingParticipant,
    #[error("unknown portal role '{0}'")]
    UnknownRole(String),
    #[error("malformed {0} header")]
    MalformedHeader(&'static str),
}

/// Serializable view of the caller for the portal UI.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub participant_id: ParticipantId,
    pub role: Role,
    pub role_label: &'static str,
    pub permitted_actions: Vec<PortalAction>,
}

impl From<&Session> for SessionView {
    fn from(session: &Session) -> Self {
        Self {
            participant_id: session.participant_id.clone(),
            role: session.role,
            role_label: session.role.label(),
            permitted_actions: session.permitted_actions(),
        }
    }
}
