use crate::error::{Error, Result};
use crate::selection::{SelectionMachine, Transition};
use crate::tree::{FlattenedNode, IndexPath, OptionTree};

/// Transient search overlay. While `is_searching` the result list replaces
/// the per-level view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchState {
    term: String,
    is_searching: bool,
    results: Vec<IndexPath>,
}

impl SearchState {
    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn is_searching(&self) -> bool {
        self.is_searching
    }

    /// Index paths of the matching leaves.
    pub fn results(&self) -> &[IndexPath] {
        &self.results
    }

    /// Resolve the results against `tree`.
    pub fn hits<'a>(&self, tree: &'a OptionTree) -> Vec<FlattenedNode<'a>> {
        self.results
            .iter()
            .filter_map(|path| {
                let node = tree.node_at(path)?;
                Some(FlattenedNode {
                    depth: path.len().saturating_sub(1),
                    node,
                    path: path.clone(),
                })
            })
            .collect()
    }

    pub(crate) fn clear(&mut self) {
        self.term.clear();
        self.is_searching = false;
        self.results.clear();
    }
}

/// Leaves whose label contains `term`, ignoring case, in depth-first order.
///
/// Inner nodes are never matched themselves. Leaves sharing an id across
/// branches are all reported.
pub fn search_leaves(tree: &OptionTree, term: &str) -> Vec<IndexPath> {
    let needle = term.to_lowercase();
    tree.leaves()
        .into_iter()
        .filter(|entry| entry.node.label_contains(&needle))
        .map(|entry| entry.path)
        .collect()
}

impl SelectionMachine {
    pub fn search_state(&self) -> &SearchState {
        &self.search
    }

    /// Update the overlay for a new search box value.
    ///
    /// A blank term leaves search mode and returns to the level that was
    /// browsed before the search started. Any other term pins browsing to
    /// the deepest level.
    pub fn search(&mut self, term: &str) -> &SearchState {
        let term = term.trim();
        if term.is_empty() {
            self.clear_search();
            return &self.search;
        }

        if !self.search.is_searching {
            self.level_before_search = Some(self.active_level);
        }

        self.search.results = search_leaves(&self.tree, term);
        self.search.term = term.to_owned();
        self.search.is_searching = true;
        self.active_level = self.depth() - 1;
        log::debug!(
            "search {term:?} matched {} leaves",
            self.search.results.len()
        );

        &self.search
    }

    /// Drop the overlay and restore the level browsed before it.
    pub fn clear_search(&mut self) {
        if let Some(level) = self.level_before_search.take() {
            self.active_level = level;
        }
        self.search.clear();
    }

    /// Pick the `index`-th search result as a deepest-level choice.
    ///
    /// The result may live under any branch, so the ancestors are taken
    /// from the result itself rather than from the current path.
    pub fn select_search_result(&mut self, index: usize) -> Result<Transition> {
        if self.completed {
            return Ok(Transition::Ignored);
        }
        if !self.search.is_searching {
            return Err(Error::NotSearching);
        }
        let Some(mut path) = self.search.results.get(index).cloned() else {
            return Err(Error::NoSuchResult { index });
        };
        let Some(leaf) = path.pop() else {
            return Err(Error::NoSuchResult { index });
        };

        let level = path.len();
        self.path = path;
        self.search.clear();
        self.level_before_search = None;
        self.active_level = level;

        Ok(self.commit(level, leaf))
    }
}
