use cascade_select::{PopupView, RenderTarget};

/// Render target that keeps the latest popup snapshot for an `iced` view
/// function.
///
/// The snapshot is only exposed while the popup is shown.
#[derive(Debug, Default, Clone)]
pub struct ViewCell {
    visible: bool,
    latest: Option<PopupView>,
}

impl ViewCell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Snapshot to draw, `None` while hidden.
    pub fn snapshot(&self) -> Option<&PopupView> {
        if self.visible {
            self.latest.as_ref()
        } else {
            None
        }
    }
}

impl RenderTarget for ViewCell {
    fn show(&mut self) {
        self.visible = true;
    }

    fn hide(&mut self) {
        self.visible = false;
        self.latest = None;
    }

    fn render(&mut self, view: &PopupView) {
        log::trace!("picker snapshot updated: {} rows", view.rows.len());
        self.latest = Some(view.clone());
    }
}
