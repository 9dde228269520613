//! Cascading multi-level selector.
//!
//! A fixed-depth forest of [`OptionNode`]s is browsed one level at a time:
//! picking a node on level `N` shows its children on level `N + 1`, and a
//! pick on the deepest level (or on a leaf) completes the selection and
//! hands the chosen root-to-leaf path to a callback.
//!
//! The crate is split into a toolkit-free core and a popup controller:
//!
//! - [`OptionTree`] validates and indexes the options.
//! - [`SelectionMachine`] tracks the selected path, the browsed level, the
//!   leaf search overlay and preselection.
//! - [`CascadeSelect`] adds the open/closed lifecycle and the delayed level
//!   advance, and renders [`PopupView`] snapshots into a [`RenderTarget`].

mod advance;
mod config;
mod error;
mod node;
mod preselect;
mod render;
mod search;
mod selection;
mod tree;
mod widget;

pub use config::SelectConfig;
pub use error::{Error, Result};
pub use node::{NodeKey, OptionNode, SelectionKey};
pub use preselect::resolve_path;
pub use render::{
    LevelTab, OptionRow, PopupView, RecordingTarget, RenderTarget, SearchBox,
    ViewMode,
};
pub use search::{SearchState, search_leaves};
pub use selection::{LevelView, Phase, SelectionMachine, Transition};
pub use tree::{FlattenedNode, IndexPath, OptionTree, first_child_depth};
pub use widget::{CascadeSelect, SelectClient, SelectEvent};
