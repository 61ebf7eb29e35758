//! Per-node termination hooks.
//!
//! A node decides whether a session must be killed when it is entered and
//! what to say when a session or path ends there. Behavior is attached as
//! optional callbacks so two nodes of the same type can end sessions
//! differently.

use std::fmt;
use std::sync::Arc;

use crate::error::{KILL_MESSAGE, NODE_END_MESSAGE};

/// Session-scoped values handed to policy hooks and variable resolution.
pub type SessionData = std::collections::BTreeMap<String, toml::Value>;

/// Decides whether the session should be killed at this node.
pub type KillPredicate = Arc<dyn Fn(&SessionData) -> bool + Send + Sync>;

/// Produces the message shown when the session ends at this node.
pub type EndHandler = Arc<dyn Fn(&SessionData) -> String + Send + Sync>;

/// Kill / end-of-session behavior for a node.
#[derive(Clone, Default)]
pub struct TerminationPolicy {
    kill_when: Option<KillPredicate>,
    kill_message: Option<String>,
    on_end: Option<EndHandler>,
}

impl TerminationPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Kill the session whenever `predicate` holds for the session data.
    pub fn kill_when<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&SessionData) -> bool + Send + Sync + 'static,
    {
        self.kill_when = Some(Arc::new(predicate));
        self
    }

    /// Kill the session when `key` holds a truthy value.
    ///
    /// Truthy means `true`, a non-zero number or a non-empty string/array/table.
    pub fn kill_if_set(self, key: impl Into<String>) -> Self {
        let key = key.into();
        self.kill_when(move |data| data.get(&key).map(is_truthy).unwrap_or(false))
    }

    pub fn with_kill_message(mut self, message: impl Into<String>) -> Self {
        self.kill_message = Some(message.into());
        self
    }

    pub fn on_end<F>(mut self, handler: F) -> Self
    where
        F: Fn(&SessionData) -> String + Send + Sync + 'static,
    {
        self.on_end = Some(Arc::new(handler));
        self
    }

    /// Fixed end message, ignoring session data.
    pub fn with_end_message(self, message: impl Into<String>) -> Self {
        let message = message.into();
        self.on_end(move |_| message.clone())
    }

    pub fn should_kill(&self, data: &SessionData) -> bool {
        self.kill_when.as_ref().map(|f| f(data)).unwrap_or(false)
    }

    pub fn kill_message(&self) -> &str {
        self.kill_message.as_deref().unwrap_or(KILL_MESSAGE)
    }

    pub fn end_message(&self, data: &SessionData) -> String {
        match &self.on_end {
            Some(handler) => handler(data),
            None => NODE_END_MESSAGE.to_string(),
        }
    }
}

impl fmt::Debug for TerminationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TerminationPolicy")
            .field("kill_when", &self.kill_when.is_some())
            .field("kill_message", &self.kill_message)
            .field("on_end", &self.on_end.is_some())
            .finish()
    }
}

fn is_truthy(value: &toml::Value) -> bool {
    match value {
        toml::Value::Boolean(b) => *b,
        toml::Value::Integer(i) => *i != 0,
        toml::Value::Float(f) => *f != 0.0,
        toml::Value::String(s) => !s.is_empty(),
        toml::Value::Array(a) => !a.is_empty(),
        toml::Value::Table(t) => !t.is_empty(),
        toml::Value::Datetime(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_never_kill() {
        let policy = TerminationPolicy::new();
        let data = SessionData::new();
        assert!(!policy.should_kill(&data));
        assert_eq!(policy.kill_message(), KILL_MESSAGE);
        assert_eq!(policy.end_message(&data), NODE_END_MESSAGE);
    }

    #[test]
    fn test_kill_if_set() {
        let policy = TerminationPolicy::new()
            .kill_if_set("blocked")
            .with_kill_message("Account blocked");

        let mut data = SessionData::new();
        assert!(!policy.should_kill(&data));

        data.insert("blocked".to_string(), toml::Value::Boolean(false));
        assert!(!policy.should_kill(&data));

        data.insert("blocked".to_string(), toml::Value::Boolean(true));
        assert!(policy.should_kill(&data));
        assert_eq!(policy.kill_message(), "Account blocked");
    }

    #[test]
    fn test_end_handler_reads_session_data() {
        let policy = TerminationPolicy::new().on_end(|data| {
            let amount = data
                .get("amount")
                .and_then(|v| v.as_integer())
                .unwrap_or(0);
            format!("You bought {} of airtime", amount)
        });

        let mut data = SessionData::new();
        data.insert("amount".to_string(), toml::Value::Integer(500));
        assert_eq!(policy.end_message(&data), "You bought 500 of airtime");
    }
}
