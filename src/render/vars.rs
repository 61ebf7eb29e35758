//! Template variable substitution for rendered pages.
//!
//! Placeholders are written `{key}`. Resolution never fails a render:
//! anything that cannot be resolved is left in the text unchanged.

use std::collections::HashMap;

use crate::menu::SessionData;

/// Rewrites placeholder tokens using session-scoped values.
pub trait VariableResolver {
    fn substitute(&self, text: &str, address: &str) -> String;
}

impl<F> VariableResolver for F
where
    F: Fn(&str, &str) -> String,
{
    fn substitute(&self, text: &str, address: &str) -> String {
        self(text, address)
    }
}

/// Leaves text untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoVars;

impl VariableResolver for NoVars {
    fn substitute(&self, text: &str, _address: &str) -> String {
        text.to_string()
    }
}

/// Resolves `{key}` from values stored per session address.
#[derive(Debug, Clone, Default)]
pub struct SessionVars {
    values: HashMap<String, SessionData>,
}

impl SessionVars {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, address: &str, key: impl Into<String>, value: toml::Value) {
        self.values
            .entry(address.to_string())
            .or_default()
            .insert(key.into(), value);
    }

    /// Replace all values for a session
    pub fn set_all(&mut self, address: &str, data: SessionData) {
        self.values.insert(address.to_string(), data);
    }

    /// Drop everything stored for a session
    pub fn clear(&mut self, address: &str) {
        self.values.remove(address);
    }
}

impl VariableResolver for SessionVars {
    fn substitute(&self, text: &str, address: &str) -> String {
        match self.values.get(address) {
            Some(data) => replace_placeholders(text, data),
            None => text.to_string(),
        }
    }
}

/// Replace `{key}` tokens with values from `data`.
pub fn replace_placeholders(text: &str, data: &SessionData) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        match after.find('}') {
            Some(end) => {
                let key = &after[..end];
                match data.get(key).filter(|_| is_key(key)) {
                    Some(value) => out.push_str(&value_text(value)),
                    None => {
                        out.push('{');
                        out.push_str(key);
                        out.push('}');
                    }
                }
                rest = &after[end + 1..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

fn is_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.' || c == '-')
}

fn value_text(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data() -> SessionData {
        let mut data = SessionData::new();
        data.insert("name".into(), toml::Value::String("Amina".into()));
        data.insert("balance".into(), toml::Value::Integer(1500));
        data
    }

    #[test]
    fn test_replace_known_keys() {
        assert_eq!(
            replace_placeholders("Hi {name}, balance {balance}", &data()),
            "Hi Amina, balance 1500"
        );
    }

    #[test]
    fn test_unresolved_pass_through() {
        let d = data();
        assert_eq!(replace_placeholders("Hi {nobody}", &d), "Hi {nobody}");
        assert_eq!(replace_placeholders("open { brace", &d), "open { brace");
        assert_eq!(replace_placeholders("{}", &d), "{}");
        assert_eq!(replace_placeholders("{{name}}", &d), "{{name}}");
    }

    #[test]
    fn test_session_vars_scoped_by_address() {
        let mut vars = SessionVars::new();
        vars.set("a", "name", toml::Value::String("Amina".into()));
        vars.set("b", "name", toml::Value::String("Brian".into()));

        assert_eq!(vars.substitute("Hi {name}", "a"), "Hi Amina");
        assert_eq!(vars.substitute("Hi {name}", "b"), "Hi Brian");
        assert_eq!(vars.substitute("Hi {name}", "c"), "Hi {name}");

        vars.clear("a");
        assert_eq!(vars.substitute("Hi {name}", "a"), "Hi {name}");
    }

    #[test]
    fn test_closure_resolver() {
        let upper = |text: &str, _: &str| text.to_uppercase();
        assert_eq!(upper.substitute("menu", "addr"), "MENU");
        assert_eq!(NoVars.substitute("{x}", "addr"), "{x}");
    }
}
