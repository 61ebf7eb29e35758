//! ussd-pager - paginated menus for character-limited channels
//!
//! Renders a tree of menu nodes into successive text pages for channels
//! such as USSD, where every response has a hard character limit and no
//! state survives between round trips except what the server keeps.
//!
//! # Modules
//!
//! - **menu**: menu nodes, termination hooks, tree assembly and lookup
//! - **render**: the pagination engine and template variable resolution
//! - **session**: per-session cursors and input handling
//! - **config**: channel settings and the TOML config file
//! - **error**: error types and fixed user-facing messages
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use ussd_pager::config::ChannelConfig;
//! use ussd_pager::menu::{MenuNode, TreeBuilder};
//! use ussd_pager::session::Session;
//!
//! let tree = TreeBuilder::new(MenuNode::root("main", "Welcome"))
//!     .add(MenuNode::new("balance", "Check balance", Some("main")))
//!     .build()
//!     .unwrap();
//!
//! let mut session = Session::with_tree("256700000001", Arc::new(tree), ChannelConfig::default());
//! assert_eq!(session.start().text(), "Welcome\n1.Check balance\n0.Exit");
//! ```

pub mod config;
pub mod error;
pub mod menu;
pub mod render;
pub mod session;

pub use config::{ChannelConfig, Config};
pub use error::MenuError;
pub use menu::{MenuNode, MenuRegistry, MenuTree, TerminationPolicy, TreeBuilder};
pub use render::{Fit, Page, Pager, VariableResolver};
pub use session::{CursorStore, Reply, Session};
