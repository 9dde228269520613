//! Render snapshot handed to the host surface.
//!
//! The controller never touches a concrete UI toolkit. After every state
//! change it builds a [`PopupView`] and passes it to the injected
//! [`RenderTarget`]; the host draws it and feeds user input back as
//! [`crate::SelectEvent`]s.

use crate::node::NodeKey;

/// Surface that displays the popup.
pub trait RenderTarget {
    /// Make the popup visible.
    fn show(&mut self);
    /// Hide the popup.
    fn hide(&mut self);
    /// Replace the displayed content.
    fn render(&mut self, view: &PopupView);
}

impl<T: RenderTarget + ?Sized> RenderTarget for Box<T> {
    fn show(&mut self) {
        (**self).show();
    }

    fn hide(&mut self) {
        (**self).hide();
    }

    fn render(&mut self, view: &PopupView) {
        (**self).render(view);
    }
}

/// Everything needed to draw the popup once.
#[derive(Debug, Clone, PartialEq)]
pub struct PopupView {
    pub title: String,
    pub fixed_header: bool,
    /// `None` when search is disabled.
    pub search: Option<SearchBox>,
    pub tabs: Vec<LevelTab>,
    pub rows: Vec<OptionRow>,
    pub mode: ViewMode,
}

impl PopupView {
    /// Row currently highlighted, if any.
    pub fn highlighted_row(&self) -> Option<usize> {
        self.rows.iter().position(|row| row.highlighted)
    }

    /// Tab of the level being browsed.
    pub fn active_tab(&self) -> Option<&LevelTab> {
        self.tabs.iter().find(|tab| tab.active)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    /// Rows are the choices of one level.
    Browse { level: usize },
    /// Rows are search hits.
    Search,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchBox {
    pub placeholder: String,
    pub term: String,
}

impl SearchBox {
    /// The clear button is offered only for a non-blank term.
    pub fn clearable(&self) -> bool {
        !self.term.trim().is_empty()
    }
}

/// One level tab.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelTab {
    pub level: usize,
    pub caption: String,
    /// Label of the node chosen on this level.
    pub chosen: Option<String>,
    pub active: bool,
}

/// One entry of the option list.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionRow {
    pub key: Option<NodeKey>,
    pub label: String,
    /// Ancestor labels of a search hit, joined with ` / `.
    pub context: Option<String>,
    pub has_children: bool,
    pub highlighted: bool,
}

/// Target that keeps the last snapshot and counts calls.
///
/// Useful for tests and for hosts that poll the snapshot from their own
/// draw loop.
#[derive(Debug, Default, Clone)]
pub struct RecordingTarget {
    visible: bool,
    shows: usize,
    hides: usize,
    renders: usize,
    last: Option<PopupView>,
}

impl RecordingTarget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn show_count(&self) -> usize {
        self.shows
    }

    pub fn hide_count(&self) -> usize {
        self.hides
    }

    pub fn render_count(&self) -> usize {
        self.renders
    }

    pub fn last_view(&self) -> Option<&PopupView> {
        self.last.as_ref()
    }
}

impl RenderTarget for RecordingTarget {
    fn show(&mut self) {
        self.visible = true;
        self.shows += 1;
    }

    fn hide(&mut self) {
        self.visible = false;
        self.hides += 1;
    }

    fn render(&mut self, view: &PopupView) {
        log::trace!("recording popup view with {} rows", view.rows.len());
        self.renders += 1;
        self.last = Some(view.clone());
    }
}
