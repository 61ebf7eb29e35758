//! Pagination engine.
//!
//! Renders one screen of a node's children under a hard character budget.
//! A page is laid out as
//!
//! ```text
//! <title>
//! <idx+1>.<child title>
//! ...
//! 0.Exit              (if exit is enabled)
//! #.Back              (unless the node is the root)
//! 00.More(<n> items)  (if children remain after this page)
//! ```
//!
//! joined by the channel separator. Line widths vary with titles, numbering
//! and resolved variables, so the page is rendered, measured and re-rendered
//! with one item fewer until it fits.

use std::ops::Range;

use bitflags::bitflags;
use tracing::{debug, warn};

use crate::config::ChannelConfig;
use crate::error::{Result, NO_ITEMS_MESSAGE};
use crate::menu::{MenuNode, MenuRegistry};
use crate::render::vars::VariableResolver;
use crate::session::CursorStore;

pub const EXIT_LINE: &str = "0.Exit";
pub const BACK_LINE: &str = "#.Back";

/// Input selecting the Exit line.
pub const EXIT_INPUT: &str = "0";
/// Input selecting the Back line.
pub const BACK_INPUT: &str = "#";
/// Input selecting the More line.
pub const MORE_INPUT: &str = "00";

bitflags! {
    /// Navigational lines present on a rendered page.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Affordances: u8 {
        const EXIT = 1 << 0;
        const BACK = 1 << 1;
        const MORE = 1 << 2;
    }
}

/// Whether a page respects the channel limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fit {
    /// Within the limit.
    Fits,
    /// Still over the limit with the fewest items a page can hold.
    /// Sent as is: best effort, may exceed the nominal limit.
    Unshrinkable,
}

/// One rendered screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// Final text after variable substitution
    pub text: String,
    /// Children shown, as offsets into the node's child list
    pub window: Range<usize>,
    /// Cursor to store for the next request (the window end)
    pub cursor: usize,
    /// No children remain after this page
    pub last_page: bool,
    pub affordances: Affordances,
    pub fit: Fit,
}

impl Page {
    /// Length in characters, the unit the channel limit is measured in.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    /// Whether a 1-based menu position was listed on this page.
    pub fn shows_position(&self, position: usize) -> bool {
        position > self.window.start && position <= self.window.end
    }
}

/// Renders pages for one session.
pub struct Pager<'a> {
    address: &'a str,
    channel: &'a ChannelConfig,
    registry: &'a dyn MenuRegistry,
    resolver: &'a dyn VariableResolver,
}

impl<'a> Pager<'a> {
    pub fn new(
        address: &'a str,
        channel: &'a ChannelConfig,
        registry: &'a dyn MenuRegistry,
        resolver: &'a dyn VariableResolver,
    ) -> Self {
        Self {
            address,
            channel,
            registry,
            resolver,
        }
    }

    /// Render the page of `node` starting at `cursor`.
    ///
    /// Fails only when a child on the page cannot be resolved; nothing is
    /// rendered in that case.
    pub fn render(&self, node: &MenuNode, cursor: usize) -> Result<Page> {
        let total = node.children().len();
        let idx = cursor.min(total);
        if idx != cursor {
            warn!(
                "cursor {} past end of '{}' ({} children), clamping",
                cursor,
                node.name(),
                total
            );
        }

        let per_page = node.page_size().unwrap_or(self.channel.page_size).max(1);
        let margin = total - idx;
        let window_end0 = idx + margin.min(per_page);

        let mut titles = Vec::with_capacity(window_end0 - idx);
        for name in &node.children()[idx..window_end0] {
            let child = self.registry.resolve(self.address, name)?;
            titles.push(child.title().to_string());
        }

        // An unfinished node always shows at least one item so the cursor advances.
        let floor = if idx < total { idx + 1 } else { idx };
        let limit = self.channel.char_limit;
        let mut window_end = window_end0;

        let (text, affordances, fit) = loop {
            let (raw, affordances) = self.compose(node, &titles, idx, window_end);
            let text = self.resolver.substitute(&raw, self.address);
            let len = text.chars().count();

            if len <= limit {
                break (text, affordances, Fit::Fits);
            }
            if window_end <= floor {
                warn!(
                    "page {}..{} of '{}' is {} chars, over the {} limit at minimum size",
                    idx, window_end, node.name(), len, limit
                );
                break (text, affordances, Fit::Unshrinkable);
            }
            debug!(
                "page {}..{} of '{}' is {} chars (limit {}), shrinking",
                idx, window_end, node.name(), len, limit
            );
            window_end -= 1;
        };

        Ok(Page {
            text,
            window: idx..window_end,
            cursor: window_end,
            last_page: window_end == total,
            affordances,
            fit,
        })
    }

    /// Render from the stored cursor and commit the new one.
    pub fn render_and_commit(&self, node: &MenuNode, cursors: &mut CursorStore) -> Result<Page> {
        let cursor = cursors.get(self.address, node.name());
        let page = self.render(node, cursor)?;
        cursors.commit(self.address, node.name(), page.cursor);
        debug!(
            "session {} node '{}' cursor {} -> {}",
            self.address,
            node.name(),
            cursor,
            page.cursor
        );
        Ok(page)
    }

    fn compose(
        &self,
        node: &MenuNode,
        titles: &[String],
        idx: usize,
        window_end: usize,
    ) -> (String, Affordances) {
        let sep = self.channel.separator.as_str();
        let total = node.children().len();
        let mut text = node.display_title();
        let mut affordances = Affordances::empty();

        if total == 0 {
            text.push_str(sep);
            text.push_str(NO_ITEMS_MESSAGE);
        } else {
            for (offset, title) in titles[..window_end - idx].iter().enumerate() {
                text.push_str(sep);
                text.push_str(&format!("{}.{}", idx + offset + 1, title));
            }
        }

        if self.channel.enable_exit {
            text.push_str(sep);
            text.push_str(EXIT_LINE);
            affordances |= Affordances::EXIT;
        }
        if !node.is_root() {
            text.push_str(sep);
            text.push_str(BACK_LINE);
            affordances |= Affordances::BACK;
        }
        if window_end < total {
            let noun = node.children_alias().unwrap_or("items");
            text.push_str(sep);
            text.push_str(&format!("{}.More({} {})", MORE_INPUT, total - window_end, noun));
            affordances |= Affordances::MORE;
        }

        (text, affordances)
    }
}
