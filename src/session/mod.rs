//! Per-session state.
//!
//! - **cursor**: pagination cursors keyed by (session address, node name)
//! - **navigator**: `Session`, turning caller input into replies
//!
//! # Architecture
//!
//! ```text
//! Session
//! ├── MenuRegistry (shared, read-only tree)
//! ├── CursorStore  (this session's cursors)
//! ├── SessionData  (values for hooks and placeholders)
//! └── Pager        (renders one page per request)
//! ```

pub mod cursor;
pub mod navigator;

pub use cursor::CursorStore;
pub use navigator::{Reply, Session};
