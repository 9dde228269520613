use std::time::Instant;

use crate::advance::AdvanceTimer;
use crate::config::SelectConfig;
use crate::error::Result;
use crate::node::{NodeKey, OptionNode};
use crate::render::{
    LevelTab, OptionRow, PopupView, RenderTarget, SearchBox, ViewMode,
};
use crate::selection::{LevelView, SelectionMachine, Transition};
use crate::tree::OptionTree;

type CompletionCallback = Box<dyn FnMut(&[OptionNode]) + 'static>;

/// User interaction and timer input understood by [`CascadeSelect`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectEvent {
    Open,
    Close,
    Reset,
    /// A row of the displayed list was pressed.
    OptionPressed { row: usize },
    /// A level tab was pressed.
    CategoryPressed { level: usize },
    SearchChanged { term: String },
    SearchCleared,
    /// Clock input driving the level advance delay.
    Tick { now: Instant },
}

/// Optional host hooks. Every method defaults to doing nothing.
pub trait SelectClient {
    fn popup_opened(&mut self) {}

    fn popup_closed(&mut self) {}

    fn searched(&mut self, _term: &str, _hits: &[&OptionNode]) {}
}

/// Cascading selection popup controller.
///
/// Owns the selection state, the open/closed lifecycle and the pending
/// level advance, and pushes a [`PopupView`] to the render target after
/// every change.
pub struct CascadeSelect<R> {
    config: SelectConfig,
    machine: SelectionMachine,
    target: R,
    on_complete: CompletionCallback,
    client: Option<Box<dyn SelectClient + 'static>>,
    timer: AdvanceTimer,
    search_input: String,
    is_open: bool,
}

impl<R: RenderTarget> CascadeSelect<R> {
    /// Validate the options tree and build a closed popup.
    ///
    /// `config.preselect` is applied right away so
    /// [`CascadeSelect::selected_items`] reflects it before the first open.
    pub fn new(
        roots: Vec<OptionNode>,
        config: SelectConfig,
        on_complete: impl FnMut(&[OptionNode]) + 'static,
        target: R,
    ) -> Result<Self> {
        let tree = OptionTree::with_max_depth(
            roots,
            config.selection_key,
            config.max_depth,
        )?;
        let mut machine = SelectionMachine::new(tree);
        if let Some(key) = config.preselect.as_ref() {
            if !machine.preselect(key) {
                log::warn!("preselection {key} is not a leaf of the tree");
            }
        }

        Ok(Self {
            timer: AdvanceTimer::new(config.advance_delay),
            config,
            machine,
            target,
            on_complete: Box::new(on_complete),
            client: None,
            search_input: String::new(),
            is_open: false,
        })
    }

    /// Attach a client that receives lifecycle and search callbacks.
    pub fn set_client<C>(&mut self, client: C)
    where
        C: SelectClient + 'static,
    {
        self.client = Some(Box::new(client));
    }

    /// Remove the currently attached client.
    pub fn take_client(&mut self) -> Option<Box<dyn SelectClient + 'static>> {
        self.client.take()
    }

    pub fn config(&self) -> &SelectConfig {
        &self.config
    }

    pub fn machine(&self) -> &SelectionMachine {
        &self.machine
    }

    pub fn target(&self) -> &R {
        &self.target
    }

    pub fn target_mut(&mut self) -> &mut R {
        &mut self.target
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    /// Copy of the current selection.
    pub fn selected_items(&self) -> Vec<OptionNode> {
        self.machine.selected_items()
    }

    /// When the pending level advance is due, if one is waiting.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timer.deadline()
    }

    /// Open with the configured preselection.
    pub fn open(&mut self) {
        let preselect = self.config.preselect.clone();
        self.open_with(preselect.as_ref());
    }

    /// Open on the path leading to `preselect`, or on the default selection
    /// when it is `None` or cannot be found.
    pub fn open_with(&mut self, preselect: Option<&NodeKey>) {
        if self.is_open {
            return;
        }

        self.timer.cancel();
        self.search_input.clear();
        match preselect {
            Some(target) => {
                if !self.machine.preselect(target) {
                    log::warn!("preselection {target} not found, opening on defaults");
                    self.machine.reset();
                }
            },
            None => self.machine.reset(),
        }

        self.is_open = true;
        log::debug!("cascade popup opened");
        self.target.show();
        self.render();
        if let Some(client) = self.client.as_mut() {
            client.popup_opened();
        }
    }

    /// Hide the popup, dropping any pending advance and the search term.
    pub fn close(&mut self) {
        if !self.is_open {
            return;
        }

        self.timer.cancel();
        self.machine.clear_search();
        self.search_input.clear();
        self.is_open = false;
        log::debug!("cascade popup closed");
        self.target.hide();
        if let Some(client) = self.client.as_mut() {
            client.popup_closed();
        }
    }

    /// Return to the default selection.
    pub fn reset(&mut self) {
        self.timer.cancel();
        self.machine.reset();
        self.search_input.clear();
        self.render();
    }

    /// Apply one event.
    pub fn update(&mut self, event: SelectEvent) {
        match event {
            SelectEvent::Open => self.open(),
            SelectEvent::Close => self.close(),
            SelectEvent::Reset => self.reset(),
            SelectEvent::OptionPressed { row } => {
                self.press_option(row, Instant::now())
            },
            SelectEvent::CategoryPressed { level } => {
                self.press_category(level)
            },
            SelectEvent::SearchChanged { term } => self.change_search(term),
            SelectEvent::SearchCleared => self.change_search(String::new()),
            SelectEvent::Tick { now } => self.tick(now),
        }
    }

    /// Snapshot of what the popup shows right now.
    pub fn view(&self) -> PopupView {
        let tree = self.machine.tree();
        let selection_key = tree.selection_key();
        let chosen = self.machine.selected_items();
        let active_level = self.machine.active_level();

        let tabs = (0..self.machine.depth())
            .map(|level| LevelTab {
                level,
                caption: self.config.level_label(level),
                chosen: chosen.get(level).map(|node| node.label().to_owned()),
                active: level == active_level,
            })
            .collect();

        let (rows, mode) = match self.machine.current_view() {
            LevelView::Browse {
                level,
                choices,
                highlighted,
            } => {
                let highlighted = self
                    .timer
                    .pending()
                    .filter(|pending| pending.level == level)
                    .map(|pending| pending.row)
                    .or(highlighted);
                let rows = choices
                    .iter()
                    .enumerate()
                    .map(|(index, node)| OptionRow {
                        key: selection_key.key_of(node).cloned(),
                        label: node.label().to_owned(),
                        context: None,
                        has_children: !node.is_leaf(),
                        highlighted: highlighted == Some(index),
                    })
                    .collect();
                (rows, ViewMode::Browse { level })
            },
            LevelView::Search { hits, .. } => {
                let rows = hits
                    .iter()
                    .map(|hit| {
                        let ancestors = &hit.path[..hit.path.len() - 1];
                        let context = tree
                            .nodes_along(ancestors)
                            .iter()
                            .map(|node| node.label())
                            .collect::<Vec<_>>()
                            .join(" / ");
                        OptionRow {
                            key: selection_key.key_of(hit.node).cloned(),
                            label: hit.node.label().to_owned(),
                            context: (!context.is_empty()).then_some(context),
                            has_children: false,
                            highlighted: false,
                        }
                    })
                    .collect();
                (rows, ViewMode::Search)
            },
        };

        let search = self.config.search_enabled.then(|| SearchBox {
            placeholder: self.config.search_placeholder.clone(),
            term: self.search_input.clone(),
        });

        PopupView {
            title: self.config.title.clone(),
            fixed_header: self.config.fixed_header,
            search,
            tabs,
            rows,
            mode,
        }
    }

    fn press_option(&mut self, row: usize, now: Instant) {
        if !self.is_open {
            log::trace!("option press ignored: popup closed");
            return;
        }

        if self.machine.search_state().is_searching() {
            self.timer.cancel();
            let result = self.machine.select_search_result(row);
            self.apply(result);
            return;
        }

        let level = self.machine.active_level();
        let choices = self.machine.current_level_choices(level).len();
        if row >= choices {
            log::warn!("option press ignored: row {row} of {choices} on level {level}");
            return;
        }

        if self.timer.is_immediate() || self.machine.is_terminal_pick(level, row)
        {
            self.timer.cancel();
            let result = self.machine.select_at_level(level, row);
            self.apply(result);
        } else {
            self.timer.schedule(level, row, now);
            self.render();
        }
    }

    fn press_category(&mut self, level: usize) {
        if !self.is_open {
            return;
        }

        self.timer.cancel();
        if let Err(err) = self.machine.navigate_to_category(level) {
            log::warn!("category press ignored: {err}");
            return;
        }
        if !self.machine.search_state().is_searching() {
            self.search_input.clear();
        }
        self.render();
    }

    fn change_search(&mut self, term: String) {
        if !self.is_open {
            return;
        }
        if !self.config.search_enabled {
            log::warn!("search input ignored: search is disabled");
            return;
        }

        self.timer.cancel();
        self.search_input = term;
        self.machine.search(&self.search_input);

        if let Some(client) = self.client.as_mut() {
            let state = self.machine.search_state();
            let hits = state.hits(self.machine.tree());
            let nodes: Vec<&OptionNode> =
                hits.iter().map(|hit| hit.node).collect();
            client.searched(state.term(), &nodes);
        }

        self.render();
    }

    fn tick(&mut self, now: Instant) {
        let Some(pending) = self.timer.take_due(now) else {
            return;
        };
        if !self.is_open || pending.level != self.machine.active_level() {
            log::debug!("stale advance on level {} dropped", pending.level);
            return;
        }

        let result = self.machine.select_at_level(pending.level, pending.row);
        self.apply(result);
    }

    fn apply(&mut self, result: Result<Transition>) {
        match result {
            Ok(Transition::Advanced { .. }) => self.render(),
            Ok(Transition::Completed(items)) => self.complete(items),
            Ok(Transition::Ignored) => {},
            Err(err) => log::warn!("pick ignored: {err}"),
        }
    }

    fn complete(&mut self, items: Vec<OptionNode>) {
        (self.on_complete)(&items);
        self.close();
        self.machine.restart();
    }

    fn render(&mut self) {
        if !self.is_open {
            return;
        }
        let view = self.view();
        self.target.render(&view);
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::{Duration, Instant};

    use super::{CascadeSelect, SelectClient, SelectEvent};
    use crate::config::SelectConfig;
    use crate::error::Error;
    use crate::node::{NodeKey, OptionNode, SelectionKey};
    use crate::render::{RecordingTarget, ViewMode};

    type Completions = Rc<RefCell<Vec<Vec<String>>>>;

    fn roots() -> Vec<OptionNode> {
        vec![
            OptionNode::new(1, "Office").with_children(vec![
                OptionNode::new(11, "Admin").with_children(vec![
                    OptionNode::new(111, "Clerk"),
                    OptionNode::new(112, "Receptionist"),
                ]),
                OptionNode::new(12, "Finance").with_children(vec![
                    OptionNode::new(121, "Accountant"),
                ]),
            ]),
            OptionNode::new(2, "Transport").with_children(vec![
                OptionNode::new(21, "Road").with_children(vec![
                    OptionNode::new(211, "Truck driver"),
                ]),
            ]),
        ]
    }

    fn widget(
        config: SelectConfig,
    ) -> (CascadeSelect<RecordingTarget>, Completions) {
        let completions: Completions = Rc::default();
        let sink = Rc::clone(&completions);
        let widget = CascadeSelect::new(
            roots(),
            config,
            move |items: &[OptionNode]| {
                sink.borrow_mut().push(
                    items.iter().map(|node| node.label().to_owned()).collect(),
                );
            },
            RecordingTarget::new(),
        )
        .expect("widget should build");
        (widget, completions)
    }

    fn immediate() -> SelectConfig {
        SelectConfig::new(SelectionKey::Id).with_advance_delay(Duration::ZERO)
    }

    fn labels(widget: &CascadeSelect<RecordingTarget>) -> Vec<String> {
        widget
            .target()
            .last_view()
            .expect("a view should be rendered")
            .rows
            .iter()
            .map(|row| row.label.clone())
            .collect()
    }

    #[test]
    fn given_empty_tree_when_built_then_construction_fails() {
        let result = CascadeSelect::new(
            Vec::new(),
            immediate(),
            |_: &[OptionNode]| {},
            RecordingTarget::new(),
        );
        assert!(matches!(result, Err(Error::EmptyTree)));
    }

    #[test]
    fn given_closed_widget_when_opened_then_roots_are_rendered() {
        let (mut widget, _) = widget(immediate().with_level_labels(["Sector"]));

        widget.update(SelectEvent::Open);

        let target = widget.target();
        assert!(target.is_visible());
        let view = target.last_view().expect("view should be rendered");
        assert_eq!(view.title, "Please select");
        assert_eq!(view.mode, ViewMode::Browse { level: 0 });
        assert_eq!(view.tabs.len(), 3);
        assert_eq!(view.tabs[0].caption, "Sector");
        assert_eq!(view.tabs[1].caption, "Level 2");
        assert_eq!(view.tabs[0].chosen.as_deref(), Some("Office"));
        assert_eq!(view.highlighted_row(), Some(0));
        assert_eq!(labels(&widget), vec!["Office", "Transport"]);
    }

    #[test]
    fn given_leaf_press_when_completed_then_callback_fires_once() {
        let (mut widget, completions) = widget(immediate());
        widget.open();

        widget.update(SelectEvent::OptionPressed { row: 1 });
        assert_eq!(labels(&widget), vec!["Road"]);
        widget.update(SelectEvent::OptionPressed { row: 0 });
        widget.update(SelectEvent::OptionPressed { row: 0 });
        widget.update(SelectEvent::OptionPressed { row: 0 });

        assert_eq!(
            completions.borrow().as_slice(),
            &[vec![
                String::from("Transport"),
                String::from("Road"),
                String::from("Truck driver"),
            ]]
        );
        assert!(!widget.is_open());
        assert!(!widget.target().is_visible());
        assert_eq!(widget.machine().active_level(), 0);
        assert_eq!(widget.selected_items().len(), 3);
    }

    #[test]
    fn given_delay_when_branch_pressed_then_advance_waits_for_tick() {
        let (mut widget, _) = widget(
            SelectConfig::new(SelectionKey::Id)
                .with_advance_delay(Duration::from_millis(250)),
        );
        widget.open();

        widget.update(SelectEvent::OptionPressed { row: 1 });

        let view = widget.target().last_view().expect("view");
        assert_eq!(view.mode, ViewMode::Browse { level: 0 });
        assert_eq!(view.highlighted_row(), Some(1));
        let deadline = widget.next_deadline().expect("advance is pending");

        widget.update(SelectEvent::Tick {
            now: deadline - Duration::from_millis(1),
        });
        assert_eq!(widget.machine().active_level(), 0);

        widget.update(SelectEvent::Tick { now: deadline });
        assert_eq!(widget.machine().active_level(), 1);
        assert_eq!(labels(&widget), vec!["Road"]);
        assert!(widget.next_deadline().is_none());
    }

    #[test]
    fn given_pending_advance_when_closed_then_it_is_never_applied() {
        let (mut widget, _) = widget(
            SelectConfig::new(SelectionKey::Id)
                .with_advance_delay(Duration::from_millis(250)),
        );
        widget.open();
        widget.update(SelectEvent::OptionPressed { row: 1 });

        widget.update(SelectEvent::Close);
        widget.update(SelectEvent::Open);
        widget.update(SelectEvent::Tick {
            now: Instant::now() + Duration::from_secs(5),
        });

        assert_eq!(widget.machine().active_level(), 0);
        assert_eq!(widget.machine().selected_path(), &[0]);
    }

    #[test]
    fn given_leaf_press_with_delay_then_completion_is_immediate() {
        let (mut widget, completions) = widget(
            SelectConfig::new(SelectionKey::Id)
                .with_advance_delay(Duration::from_millis(250))
                .with_preselect(112),
        );
        widget.open();

        widget.update(SelectEvent::OptionPressed { row: 0 });

        assert_eq!(completions.borrow().len(), 1);
        assert_eq!(completions.borrow()[0][2], "Clerk");
    }

    #[test]
    fn given_search_term_when_hit_pressed_then_consistent_path_completes() {
        let (mut widget, completions) = widget(immediate());
        widget.open();

        widget.update(SelectEvent::SearchChanged {
            term: String::from("DRIVER"),
        });
        let view = widget.target().last_view().expect("view");
        assert_eq!(view.mode, ViewMode::Search);
        assert_eq!(view.rows.len(), 1);
        assert_eq!(view.rows[0].context.as_deref(), Some("Transport / Road"));
        assert!(view.search.as_ref().is_some_and(|search| search.clearable()));

        widget.update(SelectEvent::OptionPressed { row: 0 });

        assert_eq!(
            completions.borrow()[0],
            vec!["Transport", "Road", "Truck driver"]
        );
    }

    #[test]
    fn given_search_when_cleared_then_browsing_resumes() {
        let (mut widget, _) = widget(immediate());
        widget.open();
        widget.update(SelectEvent::SearchChanged {
            term: String::from("a"),
        });

        widget.update(SelectEvent::SearchCleared);

        let view = widget.target().last_view().expect("view");
        assert_eq!(view.mode, ViewMode::Browse { level: 0 });
        assert_eq!(labels(&widget), vec!["Office", "Transport"]);
    }

    #[test]
    fn given_disabled_search_when_typed_then_input_is_ignored() {
        let (mut widget, _) = widget(immediate().with_search_enabled(false));
        widget.open();

        widget.update(SelectEvent::SearchChanged {
            term: String::from("clerk"),
        });

        let view = widget.target().last_view().expect("view");
        assert!(view.search.is_none());
        assert_eq!(view.mode, ViewMode::Browse { level: 0 });
    }

    #[test]
    fn given_preselect_when_opened_then_leaf_siblings_are_shown() {
        let (mut widget, _) =
            widget(immediate().with_preselect(NodeKey::from(112)));

        widget.open();

        let view = widget.target().last_view().expect("view");
        assert_eq!(view.mode, ViewMode::Browse { level: 2 });
        assert_eq!(labels(&widget), vec!["Clerk", "Receptionist"]);
        assert_eq!(view.highlighted_row(), Some(1));
        assert_eq!(
            view.active_tab().and_then(|tab| tab.chosen.as_deref()),
            Some("Receptionist")
        );
    }

    #[test]
    fn given_unknown_preselect_when_opened_then_defaults_are_shown() {
        let (mut widget, _) = widget(immediate());

        widget.open_with(Some(&NodeKey::from("nope")));

        assert_eq!(widget.machine().selected_path(), &[0]);
        assert_eq!(widget.machine().active_level(), 0);
    }

    #[test]
    fn given_category_press_when_open_then_level_view_switches() {
        let (mut widget, _) = widget(immediate());
        widget.open();
        widget.update(SelectEvent::OptionPressed { row: 0 });
        widget.update(SelectEvent::OptionPressed { row: 1 });

        widget.update(SelectEvent::CategoryPressed { level: 1 });

        let view = widget.target().last_view().expect("view");
        assert_eq!(view.mode, ViewMode::Browse { level: 1 });
        assert_eq!(view.highlighted_row(), Some(1));

        widget.update(SelectEvent::CategoryPressed { level: 7 });
        assert_eq!(widget.machine().active_level(), 1);
    }

    #[test]
    fn given_closed_widget_when_events_arrive_then_nothing_happens() {
        let (mut widget, completions) = widget(immediate());

        widget.update(SelectEvent::OptionPressed { row: 0 });
        widget.update(SelectEvent::SearchChanged {
            term: String::from("x"),
        });
        widget.update(SelectEvent::CategoryPressed { level: 1 });

        assert_eq!(widget.target().render_count(), 0);
        assert!(completions.borrow().is_empty());
        assert_eq!(widget.machine().active_level(), 0);
    }

    #[test]
    fn given_client_when_lifecycle_runs_then_hooks_are_called() {
        struct Counter {
            log: Rc<RefCell<Vec<String>>>,
        }

        impl SelectClient for Counter {
            fn popup_opened(&mut self) {
                self.log.borrow_mut().push(String::from("open"));
            }

            fn popup_closed(&mut self) {
                self.log.borrow_mut().push(String::from("close"));
            }

            fn searched(&mut self, term: &str, hits: &[&OptionNode]) {
                self.log
                    .borrow_mut()
                    .push(format!("search {term} {}", hits.len()));
            }
        }

        let log: Rc<RefCell<Vec<String>>> = Rc::default();
        let (mut widget, _) = widget(immediate());
        widget.set_client(Counter {
            log: Rc::clone(&log),
        });

        widget.open();
        widget.update(SelectEvent::SearchChanged {
            term: String::from("er"),
        });
        widget.close();

        assert_eq!(
            log.borrow().as_slice(),
            &["open", "search er 2", "close"]
        );
        assert!(widget.take_client().is_some());
    }

    #[test]
    fn given_progress_when_reset_then_default_selection_returns() {
        let (mut widget, _) = widget(immediate());
        widget.open();
        widget.update(SelectEvent::OptionPressed { row: 1 });

        widget.update(SelectEvent::Reset);

        assert_eq!(widget.machine().selected_path(), &[0]);
        assert_eq!(labels(&widget), vec!["Office", "Transport"]);
    }
}
