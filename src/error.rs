//! Error types and the fixed texts shown to callers.
//!
//! Only [`MenuError::NotFound`] aborts a render. Everything else (empty
//! menus, pages that cannot be shrunk under the channel limit, unresolved
//! placeholders) degrades inside the rendered text.

use thiserror::Error;

/// Line rendered in place of the item list when a node has no children.
pub const NO_ITEMS_MESSAGE: &str = "No items available";

/// Default message shown when a node's kill policy ends the session.
pub const KILL_MESSAGE: &str = "Your session has been terminated.";

/// Default message returned when a session or path reaches its end.
pub const NODE_END_MESSAGE: &str = "Thank you for using this service.";

/// Shown instead of a page when the menu tree cannot be resolved.
pub const SERVICE_UNAVAILABLE: &str = "Service temporarily unavailable. Please try again later.";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MenuError {
    #[error("node '{node}' not found in menu tree for session {address}")]
    NotFound { address: String, node: String },
}

impl MenuError {
    /// Text to send back to the caller instead of a page.
    pub fn user_message(&self) -> &'static str {
        match self {
            MenuError::NotFound { .. } => SERVICE_UNAVAILABLE,
        }
    }
}

pub type Result<T> = std::result::Result<T, MenuError>;
