use crate::error::{Error, Result};
use crate::node::{NodeKey, OptionNode};
use crate::search::SearchState;
use crate::tree::{FlattenedNode, IndexPath, OptionTree};

/// Where the selection flow currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// The given level is being browsed.
    Browsing(usize),
    /// A full path was chosen; no further picks are accepted until
    /// [`SelectionMachine::restart`].
    Completed,
}

/// Outcome of a pick.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// The pick was recorded and browsing moved to `level`.
    Advanced { level: usize },
    /// The pick finished the selection; carries the chosen nodes.
    Completed(Vec<OptionNode>),
    /// The machine was already completed.
    Ignored,
}

/// Choices offered by the current view.
#[derive(Debug)]
pub enum LevelView<'a> {
    Browse {
        level: usize,
        choices: &'a [OptionNode],
        highlighted: Option<usize>,
    },
    Search {
        term: &'a str,
        hits: Vec<FlattenedNode<'a>>,
    },
}

/// Cascading selection state over a validated [`OptionTree`].
///
/// The selected path is kept as sibling indices, so every entry is a child
/// of the entry before it.
#[derive(Debug, Clone)]
pub struct SelectionMachine {
    pub(crate) tree: OptionTree,
    pub(crate) path: IndexPath,
    pub(crate) active_level: usize,
    pub(crate) completed: bool,
    pub(crate) search: SearchState,
    pub(crate) level_before_search: Option<usize>,
}

impl SelectionMachine {
    /// Start browsing level `0` with the first root as the default pick.
    pub fn new(tree: OptionTree) -> Self {
        Self {
            tree,
            path: vec![0],
            active_level: 0,
            completed: false,
            search: SearchState::default(),
            level_before_search: None,
        }
    }

    pub fn tree(&self) -> &OptionTree {
        &self.tree
    }

    pub fn depth(&self) -> usize {
        self.tree.depth()
    }

    pub fn phase(&self) -> Phase {
        if self.completed {
            Phase::Completed
        } else {
            Phase::Browsing(self.active_level)
        }
    }

    pub fn active_level(&self) -> usize {
        self.active_level
    }

    /// Sibling indices of the current selection.
    pub fn selected_path(&self) -> &[usize] {
        &self.path
    }

    /// Copy of the currently selected nodes, root first.
    pub fn selected_items(&self) -> Vec<OptionNode> {
        self.tree
            .nodes_along(&self.path)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Index of the node chosen on `level`, if any.
    pub fn highlighted(&self, level: usize) -> Option<usize> {
        self.path.get(level).copied()
    }

    /// Roots on level `0`, otherwise the children of the node chosen one
    /// level up. Empty when that ancestor has not been chosen.
    pub fn current_level_choices(&self, level: usize) -> &[OptionNode] {
        if level == 0 {
            return self.tree.roots();
        }
        if self.path.len() < level {
            return &[];
        }
        self.tree.children_at(&self.path[..level])
    }

    /// What the popup should list right now.
    pub fn current_view(&self) -> LevelView<'_> {
        if self.search.is_searching() {
            return LevelView::Search {
                term: self.search.term(),
                hits: self.search.hits(&self.tree),
            };
        }

        LevelView::Browse {
            level: self.active_level,
            choices: self.current_level_choices(self.active_level),
            highlighted: self.highlighted(self.active_level),
        }
    }

    /// Whether picking `index` on `level` would finish the selection.
    pub fn is_terminal_pick(&self, level: usize, index: usize) -> bool {
        if level + 1 >= self.depth() {
            return true;
        }
        self.current_level_choices(level)
            .get(index)
            .is_some_and(OptionNode::is_leaf)
    }

    /// Pick the `index`-th choice on `level`.
    pub fn select_at_level(
        &mut self,
        level: usize,
        index: usize,
    ) -> Result<Transition> {
        if self.completed {
            log::debug!("pick on level {level} ignored: already completed");
            return Ok(Transition::Ignored);
        }
        self.check_active(level)?;

        self.backfill(level);
        if index >= self.current_level_choices(level).len() {
            return Err(Error::NotAChoice { level, index });
        }

        Ok(self.commit(level, index))
    }

    /// Pick the choice on `level` addressed by `key` under the tree's
    /// selection key.
    pub fn select_key_at_level(
        &mut self,
        level: usize,
        key: &NodeKey,
    ) -> Result<Transition> {
        if self.completed {
            return Ok(Transition::Ignored);
        }
        self.check_active(level)?;

        self.backfill(level);
        let choices = self.current_level_choices(level);
        let Some(index) = self.tree.position_in(choices, key) else {
            return Err(Error::UnknownKey {
                level,
                key: key.clone(),
            });
        };

        Ok(self.commit(level, index))
    }

    /// Switch browsing to `level` without discarding deeper picks.
    ///
    /// Leaves an active search, and fills missing ancestors with their
    /// first child so the level always has something highlighted.
    pub fn navigate_to_category(&mut self, level: usize) -> Result<()> {
        let depth = self.depth();
        if level >= depth {
            return Err(Error::LevelOutOfRange { level, depth });
        }
        if self.search.is_searching() {
            self.search.clear();
            self.level_before_search = None;
        } else if level == self.active_level {
            return Ok(());
        }

        self.active_level = level;
        self.backfill(level);
        log::debug!("browsing level {level}");
        Ok(())
    }

    /// Leave the completed phase and browse level `0` again. The last
    /// selection stays readable.
    pub fn restart(&mut self) {
        self.completed = false;
        self.active_level = 0;
        self.search.clear();
        self.level_before_search = None;
    }

    /// Back to the default selection: the first root on level `0`.
    pub fn reset(&mut self) {
        self.path = vec![0];
        self.restart();
    }

    fn check_active(&self, level: usize) -> Result<()> {
        let depth = self.depth();
        if level >= depth {
            return Err(Error::LevelOutOfRange { level, depth });
        }
        if level != self.active_level {
            return Err(Error::LevelMismatch {
                requested: level,
                active: self.active_level,
            });
        }
        Ok(())
    }

    /// Fill the path up to and including `level` with first-child
    /// defaults, stopping at a leaf.
    fn backfill(&mut self, level: usize) {
        while self.path.len() <= level {
            if self.tree.children_at(&self.path).is_empty() {
                break;
            }
            self.path.push(0);
        }
    }

    pub(crate) fn commit(&mut self, level: usize, index: usize) -> Transition {
        self.path.truncate(level);
        self.path.push(index);

        let is_leaf = self
            .tree
            .node_at(&self.path)
            .is_none_or(OptionNode::is_leaf);
        if is_leaf || level + 1 == self.depth() {
            self.completed = true;
            self.active_level = level;
            self.search.clear();
            self.level_before_search = None;
            let items = self.selected_items();
            log::debug!("selection completed with {} nodes", items.len());
            return Transition::Completed(items);
        }

        self.active_level = level + 1;
        self.path.push(0);
        log::debug!("advanced to level {}", self.active_level);
        Transition::Advanced {
            level: self.active_level,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::SelectionKey;

    fn machine() -> SelectionMachine {
        let roots = vec![
            OptionNode::new(1, "A").with_children(vec![
                OptionNode::new(11, "A1").with_children(vec![
                    OptionNode::new(111, "A1x"),
                    OptionNode::new(112, "A1y"),
                ]),
                OptionNode::new(12, "A2").with_children(vec![
                    OptionNode::new(121, "A2x"),
                ]),
            ]),
            OptionNode::new(2, "B").with_children(vec![
                OptionNode::new(21, "B1").with_children(vec![
                    OptionNode::new(211, "B1x"),
                ]),
            ]),
        ];
        let tree = OptionTree::new(roots, SelectionKey::Id)
            .expect("fixture tree should be valid");
        SelectionMachine::new(tree)
    }

    fn labels(nodes: &[OptionNode]) -> Vec<&str> {
        nodes.iter().map(OptionNode::label).collect()
    }

    #[test]
    fn given_new_machine_when_inspected_then_first_root_is_default() {
        let machine = machine();

        assert_eq!(machine.phase(), Phase::Browsing(0));
        assert_eq!(labels(&machine.selected_items()), vec!["A"]);
        assert_eq!(labels(machine.current_level_choices(0)), vec!["A", "B"]);
        assert_eq!(machine.highlighted(0), Some(0));
    }

    #[test]
    fn given_branch_pick_when_selected_then_next_level_is_seeded() {
        let mut machine = machine();

        let transition =
            machine.select_at_level(0, 1).expect("pick should succeed");

        assert_eq!(transition, Transition::Advanced { level: 1 });
        assert_eq!(machine.phase(), Phase::Browsing(1));
        assert_eq!(labels(&machine.selected_items()), vec!["B", "B1"]);
        assert_eq!(labels(machine.current_level_choices(1)), vec!["B1"]);
    }

    #[test]
    fn given_pick_on_deepest_level_when_selected_then_completes() {
        let mut machine = machine();
        machine.select_at_level(0, 0).expect("level 0");
        machine.select_at_level(1, 1).expect("level 1");

        let transition = machine.select_at_level(2, 0).expect("level 2");

        match transition {
            Transition::Completed(items) => {
                assert_eq!(labels(&items), vec!["A", "A2", "A2x"]);
            },
            other => panic!("expected completion, got {other:?}"),
        }
        assert_eq!(machine.phase(), Phase::Completed);
    }

    #[test]
    fn given_completed_machine_when_picked_again_then_ignored() {
        let mut machine = machine();
        machine.select_at_level(0, 0).expect("level 0");
        machine.select_at_level(1, 0).expect("level 1");
        machine.select_at_level(2, 1).expect("level 2");

        let again = machine.select_at_level(2, 1).expect("ignored pick");

        assert_eq!(again, Transition::Ignored);
        assert_eq!(labels(&machine.selected_items()), vec!["A", "A1", "A1y"]);
    }

    #[test]
    fn given_wrong_level_when_picked_then_level_mismatch() {
        let mut machine = machine();

        let err = machine
            .select_at_level(1, 0)
            .expect_err("level 1 is not active");

        assert!(matches!(
            err,
            Error::LevelMismatch {
                requested: 1,
                active: 0
            }
        ));
        assert_eq!(machine.selected_path(), &[0]);
    }

    #[test]
    fn given_index_past_choices_when_picked_then_not_a_choice() {
        let mut machine = machine();

        let err = machine.select_at_level(0, 9).expect_err("no such choice");

        assert!(matches!(err, Error::NotAChoice { level: 0, index: 9 }));
    }

    #[test]
    fn given_key_when_picked_then_resolved_among_current_choices() {
        let mut machine = machine();
        machine.select_at_level(0, 0).expect("level 0");

        let transition = machine
            .select_key_at_level(1, &NodeKey::from(12))
            .expect("key pick");

        assert_eq!(transition, Transition::Advanced { level: 2 });
        assert_eq!(labels(&machine.selected_items()), vec!["A", "A2", "A2x"]);

        let err = machine
            .select_key_at_level(2, &NodeKey::from(211))
            .expect_err("211 belongs to another branch");
        assert!(matches!(err, Error::UnknownKey { level: 2, .. }));
    }

    #[test]
    fn given_deeper_level_when_category_pressed_then_missing_ancestors_backfill()
    {
        let mut machine = machine();

        machine.navigate_to_category(2).expect("navigate");

        assert_eq!(machine.active_level(), 2);
        assert_eq!(machine.selected_path(), &[0, 0, 0]);
        assert_eq!(labels(machine.current_level_choices(2)), vec!["A1x", "A1y"]);
    }

    #[test]
    fn given_ancestor_tab_when_pressed_then_deeper_picks_are_kept() {
        let mut machine = machine();
        machine.select_at_level(0, 0).expect("level 0");
        machine.select_at_level(1, 1).expect("level 1");

        machine.navigate_to_category(0).expect("navigate");

        assert_eq!(machine.active_level(), 0);
        assert_eq!(machine.highlighted(0), Some(0));
        assert_eq!(machine.selected_path(), &[0, 1, 0]);

        let transition = machine.select_at_level(0, 1).expect("re-pick root");
        assert_eq!(transition, Transition::Advanced { level: 1 });
        assert_eq!(machine.selected_path(), &[1, 0]);
    }

    #[test]
    fn given_same_level_when_category_pressed_then_nothing_changes() {
        let mut machine = machine();
        machine.navigate_to_category(0).expect("no-op");
        assert_eq!(machine.selected_path(), &[0]);

        assert!(matches!(
            machine.navigate_to_category(3),
            Err(Error::LevelOutOfRange { level: 3, depth: 3 })
        ));
    }

    #[test]
    fn given_missing_ancestor_when_choices_requested_then_empty() {
        let machine = machine();
        assert!(machine.current_level_choices(2).is_empty());
    }

    #[test]
    fn given_leaf_or_last_level_when_checked_then_pick_is_terminal() {
        let mut machine = machine();
        assert!(!machine.is_terminal_pick(0, 0));
        machine.navigate_to_category(2).expect("navigate");
        assert!(machine.is_terminal_pick(2, 0));
    }

    #[test]
    fn given_unset_ancestors_when_deepest_level_picked_then_defaults_backfill()
    {
        let mut machine = machine();
        machine.search("zz");
        assert_eq!(machine.active_level(), 2);
        assert_eq!(machine.selected_path(), &[0]);

        let transition = machine.select_at_level(2, 1).expect("level 2");

        match transition {
            Transition::Completed(items) => {
                assert_eq!(labels(&items), vec!["A", "A1", "A1y"]);
            },
            other => panic!("expected completion, got {other:?}"),
        }
        assert_eq!(machine.selected_path(), &[0, 0, 1]);
        assert!(!machine.search_state().is_searching());
    }

    #[test]
    fn given_completed_machine_when_restarted_then_selection_is_kept() {
        let mut machine = machine();
        machine.select_at_level(0, 1).expect("level 0");
        machine.select_at_level(1, 0).expect("level 1");
        machine.select_at_level(2, 0).expect("level 2");

        machine.restart();

        assert_eq!(machine.phase(), Phase::Browsing(0));
        assert_eq!(labels(&machine.selected_items()), vec!["B", "B1", "B1x"]);

        machine.reset();
        assert_eq!(labels(&machine.selected_items()), vec!["A"]);
    }
}
