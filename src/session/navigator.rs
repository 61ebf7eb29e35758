//! Session - one caller's walk through a menu tree
//!
//! Maps each inbound request to a reply: numbered picks enter children,
//! `00` pages forward, `#` goes back, `0` exits. Pagination state is kept in
//! the session's own [`CursorStore`], so trees can be shared freely.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::config::ChannelConfig;
use crate::error::MenuError;
use crate::menu::{MenuNode, MenuRegistry, MenuTree, SessionData};
use crate::render::pager::{Affordances, Page, Pager, BACK_INPUT, EXIT_INPUT, MORE_INPUT};
use crate::render::vars::{replace_placeholders, VariableResolver};

use super::cursor::CursorStore;

/// Response to a single request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Show the text and wait for more input
    Continue(String),
    /// Show the text and close the session
    End(String),
}

impl Reply {
    pub fn text(&self) -> &str {
        match self {
            Reply::Continue(text) | Reply::End(text) => text,
        }
    }

    pub fn is_end(&self) -> bool {
        matches!(self, Reply::End(_))
    }
}

/// Resolves placeholders from the session's own data.
struct DataVars<'a>(&'a SessionData);

impl VariableResolver for DataVars<'_> {
    fn substitute(&self, text: &str, _address: &str) -> String {
        replace_placeholders(text, self.0)
    }
}

/// A single caller's traversal state.
///
/// Requests must be fed in order; `&mut self` keeps one in flight at a time.
pub struct Session {
    address: String,
    registry: Arc<dyn MenuRegistry + Send + Sync>,
    root: String,
    channel: ChannelConfig,
    cursors: CursorStore,
    data: SessionData,
    /// Node names from the root to the current node
    path: Vec<String>,
    /// Cursor the current page was rendered from
    page_start: usize,
    page: Option<Page>,
    ended: bool,
}

impl Session {
    /// Create a session over any registry, starting at `root`.
    pub fn new(
        address: impl Into<String>,
        registry: Arc<dyn MenuRegistry + Send + Sync>,
        root: impl Into<String>,
        channel: ChannelConfig,
    ) -> Self {
        Self {
            address: address.into(),
            registry,
            root: root.into(),
            channel,
            cursors: CursorStore::new(),
            data: SessionData::new(),
            path: Vec::new(),
            page_start: 0,
            page: None,
            ended: false,
        }
    }

    /// Create a session over a shared tree
    pub fn with_tree(
        address: impl Into<String>,
        tree: Arc<MenuTree>,
        channel: ChannelConfig,
    ) -> Self {
        let root = tree.root_name().to_string();
        Self::new(address, tree, root, channel)
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn data(&self) -> &SessionData {
        &self.data
    }

    /// Values visible to kill predicates, end hooks and `{key}` placeholders
    pub fn data_mut(&mut self) -> &mut SessionData {
        &mut self.data
    }

    pub fn path(&self) -> &[String] {
        &self.path
    }

    pub fn current(&self) -> Option<&str> {
        self.path.last().map(String::as_str)
    }

    /// The page most recently sent
    pub fn page(&self) -> Option<&Page> {
        self.page.as_ref()
    }

    pub fn is_ended(&self) -> bool {
        self.ended
    }

    /// Begin (or restart) the session at the root.
    pub fn start(&mut self) -> Reply {
        info!("session {} started", self.address);
        self.cursors.release_session(&self.address);
        self.path.clear();
        self.page = None;
        self.ended = false;
        match self.registry.resolve(&self.address, &self.root) {
            Ok(root) => self.enter(root),
            Err(e) => self.fail(e),
        }
    }

    /// Handle one line of caller input.
    pub fn respond(&mut self, input: &str) -> Reply {
        let name = match self.path.last() {
            Some(name) if !self.ended => name.clone(),
            _ => return self.start(),
        };
        let current = match self.registry.resolve(&self.address, &name) {
            Ok(node) => node,
            Err(e) => return self.fail(e),
        };
        let input = input.trim();

        if input == EXIT_INPUT && self.channel.enable_exit {
            let message = current.policy().end_message(&self.data);
            return self.finish(message);
        }
        if input == BACK_INPUT && !current.is_root() {
            return self.back(&current);
        }
        if input == MORE_INPUT && self.shown(Affordances::MORE) {
            return self.show(current);
        }
        let delimiter = self.channel.multi_select_delimiter.as_str();
        if current.is_multi_select() && !delimiter.is_empty() && input.contains(delimiter) {
            return self.multi_select(current, input);
        }
        match input.parse::<usize>() {
            Ok(position) => self.select(current, position),
            Err(_) => {
                warn!("session {}: unrecognized input {:?}", self.address, input);
                self.redisplay(current)
            }
        }
    }

    fn shown(&self, affordance: Affordances) -> bool {
        self.page
            .as_ref()
            .map(|page| page.affordances.contains(affordance))
            .unwrap_or(false)
    }

    fn on_screen(&self, position: usize) -> bool {
        self.page
            .as_ref()
            .map(|page| page.shows_position(position))
            .unwrap_or(false)
    }

    fn enter(&mut self, node: Arc<MenuNode>) -> Reply {
        if node.policy().should_kill(&self.data) {
            info!("session {} killed at '{}'", self.address, node.name());
            let message = node.policy().kill_message().to_string();
            return self.finish(message);
        }
        if !node.has_children() && !self.path.is_empty() {
            let message = node.policy().end_message(&self.data);
            self.path.push(node.name().to_string());
            return self.finish(message);
        }

        self.path.push(node.name().to_string());
        self.cursors.release(&self.address, node.name());
        self.show(node)
    }

    fn back(&mut self, current: &MenuNode) -> Reply {
        self.cursors.release(&self.address, current.name());
        self.path.pop();
        let parent = match self.current() {
            Some(name) => name.to_string(),
            None => return self.start(),
        };
        match self.registry.resolve(&self.address, &parent) {
            Ok(parent) => {
                self.cursors.release(&self.address, parent.name());
                self.show(parent)
            }
            Err(e) => self.fail(e),
        }
    }

    fn select(&mut self, current: Arc<MenuNode>, position: usize) -> Reply {
        let name = match current.child_at(position).map(str::to_string) {
            Some(name) if self.on_screen(position) => name,
            _ => {
                warn!("session {}: option {} not on screen", self.address, position);
                return self.redisplay(current);
            }
        };

        let child = match self.registry.resolve(&self.address, &name) {
            Ok(child) => child,
            Err(e) => return self.fail(e),
        };
        if self.path.contains(&name) && !child.allows_duplicate() {
            warn!("session {}: '{}' already in path", self.address, name);
            return self.redisplay(current);
        }

        self.data
            .insert(current.name().to_string(), toml::Value::String(name));
        self.enter(child)
    }

    fn multi_select(&mut self, current: Arc<MenuNode>, input: &str) -> Reply {
        let delimiter = self.channel.multi_select_delimiter.clone();
        let mut picks = Vec::new();
        for part in input.split(delimiter.as_str()) {
            let child = part
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|&p| self.on_screen(p))
                .and_then(|p| current.child_at(p))
                .map(str::to_string);
            match child {
                Some(name) => picks.push(toml::Value::String(name)),
                None => {
                    warn!("session {}: bad multi-select input {:?}", self.address, input);
                    return self.redisplay(current);
                }
            }
        }

        self.data
            .insert(current.name().to_string(), toml::Value::Array(picks));
        match current.multi_select_child() {
            Some(next) => match self.registry.resolve(&self.address, next) {
                Ok(node) => self.enter(node),
                Err(e) => self.fail(e),
            },
            None => {
                let message = current.policy().end_message(&self.data);
                self.finish(message)
            }
        }
    }

    fn redisplay(&mut self, current: Arc<MenuNode>) -> Reply {
        self.cursors
            .commit(&self.address, current.name(), self.page_start);
        self.show(current)
    }

    fn show(&mut self, node: Arc<MenuNode>) -> Reply {
        self.page_start = self.cursors.get(&self.address, node.name());
        let vars = DataVars(&self.data);
        let pager = Pager::new(&self.address, &self.channel, &*self.registry, &vars);
        match pager.render_and_commit(&node, &mut self.cursors) {
            Ok(page) => {
                let text = page.text.clone();
                self.page = Some(page);
                Reply::Continue(text)
            }
            Err(e) => self.fail(e),
        }
    }

    fn fail(&mut self, e: MenuError) -> Reply {
        error!("session {}: {}", self.address, e);
        self.finish(e.user_message().to_string())
    }

    fn finish(&mut self, message: String) -> Reply {
        info!("session {} ended", self.address);
        self.ended = true;
        self.page = None;
        self.cursors.release_session(&self.address);
        Reply::End(message)
    }
}
