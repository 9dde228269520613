//! [`iced`] front-end for the `cascade-select` popup.
//!
//! This crate is split into two layers:
//! - [`ViewCell`], a [`cascade_select::RenderTarget`] that stores the latest
//!   popup snapshot;
//! - [`PickerView`], a builder that turns that snapshot into an `iced`
//!   element and maps user input back to [`cascade_select::SelectEvent`]s.
//!
//! The recommended flow:
//! 1. own a `CascadeSelect<ViewCell>` in your app state;
//! 2. draw `select.target().snapshot()` with [`PickerView`];
//! 3. forward the produced events to `CascadeSelect::update`, plus a
//!    periodic `Tick` while `next_deadline()` is set.
//!
//! See `examples/job_picker.rs` for a complete runnable example.
//!
//! # Quick Example
//!
//! ```no_run
//! use cascade_select::{CascadeSelect, SelectEvent};
//! use cascade_ui_picker::{PickerView, ViewCell};
//! use iced::Element;
//! use iced::widget::text;
//!
//! #[derive(Debug, Clone)]
//! enum Message {
//!     Picker(SelectEvent),
//! }
//!
//! fn view(select: &CascadeSelect<ViewCell>) -> Element<'_, Message> {
//!     match select.target().snapshot() {
//!         Some(popup) => PickerView::new(popup)
//!             .on_event(Message::Picker)
//!             .view(),
//!         None => text("closed").into(),
//!     }
//! }
//! ```

mod cell;
mod view;

pub use cell::ViewCell;
pub use view::{OptionRowContext, PickerView};
