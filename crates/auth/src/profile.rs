use serde::{Deserialize, Serialize};

use crate::PrincipalId;

/// Per-principal record kept by the identity directory.
///
/// Created on first sign-in with `is_admin = false`; only an admin can flip
/// the flag afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: PrincipalId,
    pub email: String,
    pub is_admin: bool,
}

impl UserProfile {
    pub fn first_sign_in(id: PrincipalId, email: impl Into<String>) -> Self {
        Self {
            id,
            email: email.into(),
            is_admin: false,
        }
    }

    /// Copy with the admin flag inverted.
    pub fn toggled(&self) -> Self {
        Self {
            is_admin: !self.is_admin,
            ..self.clone()
        }
    }
}
