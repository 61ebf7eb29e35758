//! Page rendering.
//!
//! - **pager**: the pagination engine (shrink-to-fit page rendering)
//! - **vars**: the `VariableResolver` contract and reference resolvers

pub mod pager;
pub mod vars;

pub use pager::{Affordances, Fit, Page, Pager};
pub use vars::{NoVars, SessionVars, VariableResolver};
