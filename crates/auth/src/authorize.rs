use thiserror::Error;

use crate::Session;

/// Things a signed-in session can ask to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Browse, add, edit, delete, change status, upload images.
    ManageInventory,
    /// Aggregate statistics and the admin sales-history tab.
    ViewStats,
    /// List users and toggle their admin flag.
    ManageUsers,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::ManageInventory => "inventory.manage",
            Action::ViewStats => "admin.stats",
            Action::ManageUsers => "admin.users",
        }
    }

    fn requires_privilege(&self) -> bool {
        !matches!(self, Action::ManageInventory)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: '{0}' requires admin privileges")]
    Forbidden(&'static str),
}

/// Authorize a session for an action.
///
/// - No IO
/// - No panics
/// - Any signed-in session may manage inventory; admin actions need the flag
pub fn authorize(session: &Session, action: Action) -> Result<(), AuthzError> {
    if action.requires_privilege() && !session.is_privileged() {
        tracing::debug!(
            principal_id = %session.principal_id(),
            action = action.as_str(),
            "authorization denied"
        );
        return Err(AuthzError::Forbidden(action.as_str()));
    }
    Ok(())
}
