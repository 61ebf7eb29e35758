//! Menu tree assembly and lookup.
//!
//! Trees are assembled once, validated, and then shared read-only between
//! sessions. A tree can be built in code with [`TreeBuilder`] or read from a
//! TOML file:
//!
//! ```toml
//! [[node]]
//! name = "main"
//! title = "Welcome {name}"
//!
//! [[node]]
//! name = "airtime"
//! parent = "main"
//! title = "Buy airtime"
//! page_size = 3
//! ```

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use super::node::MenuNode;
use super::policy::TerminationPolicy;
use crate::error::{MenuError, Result};

/// Resolves nodes by name within a session's tree.
pub trait MenuRegistry {
    fn resolve(&self, address: &str, name: &str) -> Result<Arc<MenuNode>>;
}

impl<T: MenuRegistry + ?Sized> MenuRegistry for Arc<T> {
    fn resolve(&self, address: &str, name: &str) -> Result<Arc<MenuNode>> {
        (**self).resolve(address, name)
    }
}

#[derive(Error, Debug)]
pub enum TreeError {
    #[error("duplicate node name '{0}'")]
    DuplicateNode(String),

    #[error("node '{node}' has unknown parent '{parent}'")]
    UnknownParent { node: String, parent: String },

    #[error("node '{node}' references unknown child '{child}'")]
    UnknownChild { node: String, child: String },

    #[error("node '{0}' has no parent but the tree already has a root")]
    MultipleRoots(String),

    #[error("root node '{node}' has parent '{parent}'")]
    RootHasParent { node: String, parent: String },

    #[error("node '{node}' lists child '{child}' more than once")]
    DuplicateChild { node: String, child: String },

    #[error("tree definition has no root node")]
    NoRoot,

    #[error("Failed to read tree file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse tree definition: {0}")]
    Parse(#[from] toml::de::Error),
}

/// An immutable, validated menu tree.
#[derive(Debug, Clone)]
pub struct MenuTree {
    root: String,
    nodes: HashMap<String, Arc<MenuNode>>,
}

impl MenuTree {
    pub fn root(&self) -> Arc<MenuNode> {
        // The root is checked into `nodes` by the builder.
        self.nodes[&self.root].clone()
    }

    pub fn root_name(&self) -> &str {
        &self.root
    }

    pub fn get(&self, name: &str) -> Option<&Arc<MenuNode>> {
        self.nodes.get(name)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Parse a tree from TOML text. The first node is the root.
    pub fn from_toml_str(content: &str) -> std::result::Result<Self, TreeError> {
        let file: TreeFile = toml::from_str(content)?;
        let mut defs = file.nodes.into_iter();

        let root_def = defs.next().ok_or(TreeError::NoRoot)?;
        let mut builder = TreeBuilder::new(root_def.into_node());
        for def in defs {
            builder = builder.add(def.into_node());
        }
        builder.build()
    }

    /// Load a tree definition file
    pub fn load(path: &Path) -> std::result::Result<Self, TreeError> {
        let content = fs::read_to_string(path).map_err(|source| TreeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }
}

impl MenuRegistry for MenuTree {
    fn resolve(&self, address: &str, name: &str) -> Result<Arc<MenuNode>> {
        self.nodes
            .get(name)
            .cloned()
            .ok_or_else(|| MenuError::NotFound {
                address: address.to_string(),
                node: name.to_string(),
            })
    }
}

/// Collects nodes and wires them into a [`MenuTree`].
///
/// Every non-root node is appended to its parent's children in the order it
/// was added, after any children the parent listed explicitly.
pub struct TreeBuilder {
    nodes: Vec<MenuNode>,
}

impl TreeBuilder {
    pub fn new(root: MenuNode) -> Self {
        Self { nodes: vec![root] }
    }

    pub fn add(mut self, node: MenuNode) -> Self {
        self.nodes.push(node);
        self
    }

    pub fn build(self) -> std::result::Result<MenuTree, TreeError> {
        if let Some(parent) = self.nodes[0].parent() {
            return Err(TreeError::RootHasParent {
                node: self.nodes[0].name().to_string(),
                parent: parent.to_string(),
            });
        }

        let mut index: HashMap<String, usize> = HashMap::new();
        for (i, node) in self.nodes.iter().enumerate() {
            if index.insert(node.name().to_string(), i).is_some() {
                return Err(TreeError::DuplicateNode(node.name().to_string()));
            }
            if i > 0 && node.is_root() {
                return Err(TreeError::MultipleRoots(node.name().to_string()));
            }
            let mut listed = HashSet::new();
            for child in node.children() {
                if !listed.insert(child.as_str()) {
                    return Err(TreeError::DuplicateChild {
                        node: node.name().to_string(),
                        child: child.clone(),
                    });
                }
            }
        }

        let mut nodes = self.nodes;
        for i in 1..nodes.len() {
            let name = nodes[i].name().to_string();
            let parent = nodes[i].parent().unwrap_or_default().to_string();
            match index.get(&parent) {
                Some(&p) => nodes[p].push_child(name),
                None => return Err(TreeError::UnknownParent { node: name, parent }),
            }
        }

        let names: HashSet<&str> = nodes.iter().map(MenuNode::name).collect();
        for node in &nodes {
            let referenced = node
                .children()
                .iter()
                .map(String::as_str)
                .chain(node.multi_select_child());
            for child in referenced {
                if !names.contains(child) {
                    return Err(TreeError::UnknownChild {
                        node: node.name().to_string(),
                        child: child.to_string(),
                    });
                }
            }
        }

        let root = nodes[0].name().to_string();
        debug!("built menu tree '{}' with {} nodes", root, nodes.len());
        Ok(MenuTree {
            root,
            nodes: nodes
                .into_iter()
                .map(|node| (node.name().to_string(), Arc::new(node)))
                .collect(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct TreeFile {
    #[serde(rename = "node", default)]
    nodes: Vec<NodeDef>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct NodeDef {
    name: String,
    title: String,
    parent: Option<String>,
    #[serde(default)]
    children: Vec<String>,
    displayed_title: Option<String>,
    title_prefix: Option<String>,
    title_suffix: Option<String>,
    children_alias: Option<String>,
    page_size: Option<usize>,
    #[serde(default)]
    multi_select: bool,
    multi_select_child: Option<String>,
    #[serde(default)]
    allow_duplicate: bool,
    id: Option<String>,
    kill_if: Option<String>,
    kill_message: Option<String>,
    end_message: Option<String>,
    #[serde(default)]
    extensions: BTreeMap<String, toml::Value>,
}

impl NodeDef {
    fn into_node(self) -> MenuNode {
        let mut node = MenuNode::new(self.name, self.title, self.parent.as_deref())
            .with_children(self.children)
            .with_allow_duplicate(self.allow_duplicate);
        if let Some(title) = self.displayed_title {
            node = node.with_displayed_title(title);
        }
        if let Some(prefix) = self.title_prefix {
            node = node.with_title_prefix(prefix);
        }
        if let Some(suffix) = self.title_suffix {
            node = node.with_title_suffix(suffix);
        }
        if let Some(alias) = self.children_alias {
            node = node.with_children_alias(alias);
        }
        if let Some(size) = self.page_size {
            node = node.with_page_size(size);
        }
        if self.multi_select {
            node = node.with_multi_select(self.multi_select_child.as_deref());
        }
        if let Some(id) = self.id {
            node = node.with_id(id);
        }
        for (key, value) in self.extensions {
            node = node.with_extension(key, value);
        }

        let mut policy = TerminationPolicy::new();
        if let Some(key) = self.kill_if {
            policy = policy.kill_if_set(key);
        }
        if let Some(message) = self.kill_message {
            policy = policy.with_kill_message(message);
        }
        if let Some(message) = self.end_message {
            policy = policy.with_end_message(message);
        }
        node.with_policy(policy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::menu::SessionData;

    fn sample() -> MenuTree {
        TreeBuilder::new(MenuNode::root("main", "Main"))
            .add(MenuNode::new("airtime", "Airtime", Some("main")))
            .add(MenuNode::new("data", "Data", Some("main")))
            .add(MenuNode::new("bundles", "Bundles", Some("data")))
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder_wires_children_in_order() {
        let tree = sample();
        assert_eq!(tree.node_count(), 4);
        assert_eq!(tree.root().children(), ["airtime", "data"]);
        assert_eq!(tree.get("data").unwrap().children(), ["bundles"]);
        assert!(tree.get("bundles").unwrap().children().is_empty());
    }

    #[test]
    fn test_explicit_children_come_first() {
        let tree = TreeBuilder::new(MenuNode::root("main", "Main").with_children(["b"]))
            .add(MenuNode::new("a", "A", Some("main")))
            .add(MenuNode::new("b", "B", Some("main")))
            .build()
            .unwrap();
        assert_eq!(tree.root().children(), ["b", "a"]);
    }

    #[test]
    fn test_resolve_not_found() {
        let tree = sample();
        assert_eq!(tree.resolve("addr", "data").unwrap().title(), "Data");
        let err = tree.resolve("addr", "nope").unwrap_err();
        assert_eq!(
            err,
            MenuError::NotFound {
                address: "addr".into(),
                node: "nope".into()
            }
        );
    }

    #[test]
    fn test_build_rejects_bad_trees() {
        let dup = TreeBuilder::new(MenuNode::root("main", "Main"))
            .add(MenuNode::new("main", "Again", Some("main")))
            .build();
        assert!(matches!(dup, Err(TreeError::DuplicateNode(n)) if n == "main"));

        let orphan = TreeBuilder::new(MenuNode::root("main", "Main"))
            .add(MenuNode::new("x", "X", Some("ghost")))
            .build();
        assert!(matches!(orphan, Err(TreeError::UnknownParent { .. })));

        let two_roots = TreeBuilder::new(MenuNode::root("main", "Main"))
            .add(MenuNode::root("other", "Other"))
            .build();
        assert!(matches!(two_roots, Err(TreeError::MultipleRoots(_))));

        let dangling =
            TreeBuilder::new(MenuNode::root("main", "Main").with_children(["ghost"])).build();
        assert!(matches!(dangling, Err(TreeError::UnknownChild { .. })));

        let rooted_elsewhere = TreeBuilder::new(MenuNode::new("main", "Main", Some("elsewhere")))
            .add(MenuNode::new("a", "A", Some("main")))
            .build();
        assert!(matches!(
            rooted_elsewhere,
            Err(TreeError::RootHasParent { ref node, ref parent })
                if node == "main" && parent == "elsewhere"
        ));

        let repeated = TreeBuilder::new(MenuNode::root("main", "Main").with_children(["a", "a"]))
            .add(MenuNode::new("a", "A", Some("main")))
            .build();
        assert!(matches!(
            repeated,
            Err(TreeError::DuplicateChild { ref child, .. }) if child == "a"
        ));
    }

    #[test]
    fn test_from_toml_str() {
        let tree = MenuTree::from_toml_str(
            r#"
            [[node]]
            name = "main"
            title = "Welcome"

            [[node]]
            name = "shop"
            parent = "main"
            title = "Shop"
            page_size = 2
            children_alias = "products"
            multi_select = true
            multi_select_child = "checkout"
            kill_if = "blocked"
            kill_message = "Blocked"
            end_message = "Bye"
            extensions = { category = "retail" }

            [[node]]
            name = "checkout"
            parent = "main"
            title = "Checkout"
            "#,
        )
        .unwrap();

        assert_eq!(tree.root_name(), "main");
        assert_eq!(tree.root().children(), ["shop", "checkout"]);

        let shop = tree.get("shop").unwrap();
        assert_eq!(shop.page_size(), Some(2));
        assert_eq!(shop.children_alias(), Some("products"));
        assert!(shop.is_multi_select());
        assert_eq!(shop.multi_select_child(), Some("checkout"));
        assert_eq!(shop.extension("category").and_then(|v| v.as_str()), Some("retail"));
        assert_eq!(shop.policy().kill_message(), "Blocked");
        assert_eq!(shop.policy().end_message(&SessionData::new()), "Bye");
    }

    #[test]
    fn test_from_toml_errors() {
        assert!(matches!(MenuTree::from_toml_str(""), Err(TreeError::NoRoot)));
        assert!(matches!(
            MenuTree::from_toml_str("[[node]]\nname = \"a\"\ntitle = \"A\"\nparent = \"b\"\n"),
            Err(TreeError::RootHasParent { .. })
        ));
        assert!(matches!(
            MenuTree::from_toml_str("[[node]]\nname = \"a\"\n"),
            Err(TreeError::Parse(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let err = MenuTree::load(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, TreeError::Io { .. }));
    }
}
