//! Menu tree model.
//!
//! - **node**: `MenuNode`, the immutable tree entity
//! - **policy**: per-node kill and end-of-session hooks
//! - **tree**: tree assembly, TOML loading and the `MenuRegistry` contract
//!
//! ```text
//! MenuTree
//! └── MenuNode (root, parent = None)
//!     ├── MenuNode
//!     └── MenuNode
//!         └── ...
//! ```

pub mod node;
pub mod policy;
pub mod tree;

pub use node::{Extensions, MenuNode};
pub use policy::{EndHandler, KillPredicate, SessionData, TerminationPolicy};
pub use tree::{MenuRegistry, MenuTree, TreeBuilder, TreeError};
