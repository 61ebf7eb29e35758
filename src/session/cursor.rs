//! Pagination cursors keyed by session address and node name.

use std::collections::HashMap;

/// Cursor positions for any number of (session, node) pairs.
///
/// Unknown pairs read as 0. The store does no locking; callers serialize
/// requests per session.
#[derive(Debug, Clone, Default)]
pub struct CursorStore {
    cursors: HashMap<(String, String), usize>,
}

impl CursorStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, address: &str, node: &str) -> usize {
        self.cursors
            .get(&(address.to_string(), node.to_string()))
            .copied()
            .unwrap_or(0)
    }

    /// Store the cursor after a render
    pub fn commit(&mut self, address: &str, node: &str, cursor: usize) {
        self.cursors
            .insert((address.to_string(), node.to_string()), cursor);
    }

    /// Reset a node so its next render starts from the first page
    pub fn release(&mut self, address: &str, node: &str) {
        self.cursors.remove(&(address.to_string(), node.to_string()));
    }

    /// Forget every cursor of a session
    pub fn release_session(&mut self, address: &str) {
        self.cursors.retain(|(a, _), _| a != address);
    }

    pub fn len(&self) -> usize {
        self.cursors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cursors.is_empty()
    }
}
