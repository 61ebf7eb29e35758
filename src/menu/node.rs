//! MenuNode - a single entry in a menu tree

use std::collections::BTreeMap;

use super::policy::TerminationPolicy;

/// Opaque application annotations attached to a node.
pub type Extensions = BTreeMap<String, toml::Value>;

/// A node in the menu tree.
///
/// Nodes hold data only. Their structure is fixed once the tree is built;
/// pagination state lives in the session's cursor store, never here.
#[derive(Debug, Clone)]
pub struct MenuNode {
    name: String,
    parent: Option<String>,
    title: String,
    displayed_title: Option<String>,
    title_prefix: Option<String>,
    title_suffix: Option<String>,
    children: Vec<String>,
    children_alias: Option<String>,
    page_size: Option<usize>,
    multi_select: bool,
    multi_select_child: Option<String>,
    allow_duplicate: bool,
    id: Option<String>,
    extensions: Extensions,
    policy: TerminationPolicy,
}

impl MenuNode {
    /// Create a node. `parent` is `None` for the root.
    pub fn new(name: impl Into<String>, title: impl Into<String>, parent: Option<&str>) -> Self {
        Self {
            name: name.into(),
            parent: parent.map(str::to_string),
            title: title.into(),
            displayed_title: None,
            title_prefix: None,
            title_suffix: None,
            children: Vec::new(),
            children_alias: None,
            page_size: None,
            multi_select: false,
            multi_select_child: None,
            allow_duplicate: false,
            id: None,
            extensions: Extensions::new(),
            policy: TerminationPolicy::default(),
        }
    }

    /// Create a root node
    pub fn root(name: impl Into<String>, title: impl Into<String>) -> Self {
        Self::new(name, title, None)
    }

    pub fn with_children<I, S>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.children = children.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_displayed_title(mut self, title: impl Into<String>) -> Self {
        self.displayed_title = Some(title.into());
        self
    }

    pub fn with_title_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.title_prefix = Some(prefix.into());
        self
    }

    pub fn with_title_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.title_suffix = Some(suffix.into());
        self
    }

    /// Noun used by the More line instead of "items".
    pub fn with_children_alias(mut self, alias: impl Into<String>) -> Self {
        self.children_alias = Some(alias.into());
        self
    }

    /// Cap items per page for this node. Zero means "use the default".
    pub fn with_page_size(mut self, size: usize) -> Self {
        self.page_size = if size > 0 { Some(size) } else { None };
        self
    }

    /// Accept several delimiter-separated picks, continuing at `next`.
    pub fn with_multi_select(mut self, next: Option<&str>) -> Self {
        self.multi_select = true;
        self.multi_select_child = next.map(str::to_string);
        self
    }

    pub fn with_allow_duplicate(mut self, allow: bool) -> Self {
        self.allow_duplicate = allow;
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_extension(mut self, key: impl Into<String>, value: toml::Value) -> Self {
        self.extensions.insert(key.into(), value);
        self
    }

    pub fn with_policy(mut self, policy: TerminationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Append a child during tree assembly unless it is already listed.
    pub(crate) fn push_child(&mut self, child: String) {
        if !self.children.contains(&child) {
            self.children.push(child);
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Title line shown above the items.
    ///
    /// `displayed_title` wins outright; otherwise the title is wrapped as
    /// `prefix-title-suffix`, leaving out whichever parts are unset.
    pub fn display_title(&self) -> String {
        if let Some(ref displayed) = self.displayed_title {
            return displayed.clone();
        }
        let mut out = String::new();
        if let Some(ref prefix) = self.title_prefix {
            out.push_str(prefix);
            out.push('-');
        }
        out.push_str(&self.title);
        if let Some(ref suffix) = self.title_suffix {
            out.push('-');
            out.push_str(suffix);
        }
        out
    }

    pub fn children(&self) -> &[String] {
        &self.children
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Child name at a 1-based menu position.
    pub fn child_at(&self, position: usize) -> Option<&str> {
        position
            .checked_sub(1)
            .and_then(|i| self.children.get(i))
            .map(String::as_str)
    }

    pub fn children_alias(&self) -> Option<&str> {
        self.children_alias.as_deref()
    }

    pub fn page_size(&self) -> Option<usize> {
        self.page_size
    }

    pub fn is_multi_select(&self) -> bool {
        self.multi_select
    }

    pub fn multi_select_child(&self) -> Option<&str> {
        self.multi_select_child.as_deref()
    }

    pub fn allows_duplicate(&self) -> bool {
        self.allow_duplicate
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn extension(&self, key: &str) -> Option<&toml::Value> {
        self.extensions.get(key)
    }

    pub fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    pub fn policy(&self) -> &TerminationPolicy {
        &self.policy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_title() {
        let node = MenuNode::new("loans", "Loans", Some("main"));
        assert_eq!(node.display_title(), "Loans");

        let node = node.with_title_prefix("Bank").with_title_suffix("2024");
        assert_eq!(node.display_title(), "Bank-Loans-2024");

        let node = node.with_displayed_title("Choose a loan");
        assert_eq!(node.display_title(), "Choose a loan");
    }

    #[test]
    fn test_prefix_only() {
        let node = MenuNode::root("main", "Menu").with_title_prefix("MTN");
        assert_eq!(node.display_title(), "MTN-Menu");
        assert!(node.is_root());
    }

    #[test]
    fn test_child_at_is_one_based() {
        let node = MenuNode::root("main", "Menu").with_children(["a", "b", "c"]);
        assert_eq!(node.child_at(0), None);
        assert_eq!(node.child_at(1), Some("a"));
        assert_eq!(node.child_at(3), Some("c"));
        assert_eq!(node.child_at(4), None);
    }

    #[test]
    fn test_children_keep_insertion_order() {
        let node = MenuNode::root("main", "Menu").with_children(["z", "a", "m"]);
        assert_eq!(node.children(), ["z", "a", "m"]);
        assert!(node.has_children());
    }

    #[test]
    fn test_zero_page_size_falls_back() {
        let node = MenuNode::root("main", "Menu").with_page_size(0);
        assert_eq!(node.page_size(), None);
        let node = node.with_page_size(3);
        assert_eq!(node.page_size(), Some(3));
    }

    #[test]
    fn test_extensions_are_opaque() {
        let node = MenuNode::root("main", "Menu")
            .with_id("m-1")
            .with_extension("product_code", toml::Value::String("AIR".into()));
        assert_eq!(node.id(), Some("m-1"));
        assert_eq!(
            node.extension("product_code").and_then(|v| v.as_str()),
            Some("AIR")
        );
        assert!(node.extension("missing").is_none());
    }
}
