use serde::Serialize;

use crate::{PrincipalId, UserProfile};

/// Explicit per-request identity: who is signed in and whether they are
/// privileged.
///
/// Built once by the transport layer (token + profile lookup) and passed to
/// every call site that needs it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    principal_id: PrincipalId,
    email: String,
    privileged: bool,
}

impl Session {
    pub fn new(principal_id: PrincipalId, email: impl Into<String>, privileged: bool) -> Self {
        Self {
            principal_id,
            email: email.into(),
            privileged,
        }
    }

    pub fn from_profile(profile: &UserProfile) -> Self {
        Self::new(profile.id, profile.email.clone(), profile.is_admin)
    }

    pub fn principal_id(&self) -> PrincipalId {
        self.principal_id
    }

    pub fn is_privileged(&self) -> bool {
        self.privileged
    }
}
