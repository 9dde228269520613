use crate::node::{NodeKey, OptionNode, SelectionKey};
use crate::selection::SelectionMachine;
use crate::tree::{IndexPath, OptionTree};

/// Root-to-leaf index path of the first leaf addressed by `target`.
///
/// The walk descends into children before testing anything, stops at the
/// first hit and never goes deeper than the tree depth. Inner nodes are not
/// matched.
pub fn resolve_path(tree: &OptionTree, target: &NodeKey) -> Option<IndexPath> {
    let mut reversed = Vec::with_capacity(tree.depth());
    let found = find_leaf(
        tree.roots(),
        target,
        tree.selection_key(),
        tree.depth(),
        &mut reversed,
    );
    if !found {
        return None;
    }

    reversed.reverse();
    Some(reversed)
}

fn find_leaf(
    nodes: &[OptionNode],
    target: &NodeKey,
    selection_key: SelectionKey,
    remaining: usize,
    reversed: &mut IndexPath,
) -> bool {
    if remaining == 0 {
        return false;
    }

    for (index, node) in nodes.iter().enumerate() {
        let found = if node.is_leaf() {
            selection_key.matches(node, target)
        } else {
            find_leaf(
                node.children(),
                target,
                selection_key,
                remaining - 1,
                reversed,
            )
        };

        if found {
            reversed.push(index);
            return true;
        }
    }

    false
}

impl SelectionMachine {
    /// Seed the selection with the path leading to `target`.
    ///
    /// On success the deepest level is active, so its list shows the
    /// target's siblings with the target highlighted. Returns `false` and
    /// leaves the state untouched when nothing matches.
    pub fn preselect(&mut self, target: &NodeKey) -> bool {
        let Some(path) = resolve_path(&self.tree, target) else {
            log::debug!("preselection {target} not found");
            return false;
        };

        self.active_level = path.len().saturating_sub(1);
        self.path = path;
        self.completed = false;
        self.search.clear();
        self.level_before_search = None;
        log::debug!("preselected {target} at level {}", self.active_level);
        true
    }
}
