//! Immutable ordered tuple of trees of strictly decreasing heights, the
//! log's current state.
//!
//! `add` is a carry-style equal-height merge loop, the same shape as
//! incrementing a binary counter. A forest is only ever grown by returning
//! a *new* `Forest`; nothing here ever mutates an existing value.

use crate::error::{Error, Result};
use crate::hash::{hash_forest, Hash};
use crate::tree::Tree;

/// An immutable ordered tuple of trees of strictly decreasing heights.
#[derive(Debug, Clone)]
pub struct Forest {
    trees: Vec<Tree>,
}

impl Forest {
    /// The forest with no trees: cardinality 0, root `H_forest()` (the
    /// `EMPTY:` sentinel).
    pub fn empty() -> Forest {
        Forest { trees: Vec::new() }
    }

    /// Build a forest from a tuple of trees already in tallest-to-shortest
    /// order. Rejects any tuple whose heights are not strictly decreasing:
    /// this is the forest's canonicity invariant, and it is enforced
    /// unconditionally, with no escape hatch for deferred merges.
    pub fn from_trees(trees: Vec<Tree>) -> Result<Forest> {
        for pair in trees.windows(2) {
            if pair[0].height() <= pair[1].height() {
                return Err(Error::NonCanonicalForest);
            }
        }
        Ok(Forest { trees })
    }

    /// The trees making up this forest, tallest first.
    pub fn trees(&self) -> &[Tree] {
        &self.trees
    }

    /// `H_forest(root(T1), ..., root(Tk))`, or the `EMPTY:` sentinel if the
    /// forest has no trees.
    pub fn root(&self) -> Hash {
        let roots: Vec<Hash> = self.trees.iter().map(Tree::root).collect();
        hash_forest(roots.iter())
    }

    /// Total number of entries ever added: the sum of each tree's
    /// cardinality.
    pub fn cardinality(&self) -> usize {
        self.trees.iter().map(Tree::cardinality).sum()
    }

    /// Insert one entry, returning a new forest. `entry` must be exactly 32
    /// bytes.
    ///
    /// Carry insertion: build a height-1 tree from `entry`, then repeatedly
    /// merge with the rightmost (shortest) existing tree while heights
    /// match, exactly a binary carry-propagation, which is why the forest
    /// always holds at most `ceil(log2(n+1))` trees.
    #[tracing::instrument(level = "debug", skip_all, fields(cardinality = self.cardinality()))]
    pub fn add(&self, entry: &[u8]) -> Result<Forest> {
        if entry.len() != 32 {
            return Err(Error::InvalidEntryLength(entry.len()));
        }
        let mut buf = [0u8; 32];
        buf.copy_from_slice(entry);

        let mut trees = self.trees.clone();
        let mut acc = Tree::singleton(buf);
        while let Some(last) = trees.last() {
            if last.height() == acc.height() {
                let older = trees.pop().expect("trees is non-empty in this branch");
                acc = older.merge(&acc)?;
            } else {
                break;
            }
        }
        trees.push(acc);
        Forest::from_trees(trees)
    }

    /// Insert many entries in order, equivalent to (but more convenient
    /// than) calling [`Forest::add`] once per entry. Each entry must be
    /// exactly 32 bytes.
    pub fn add_all<'a>(&self, entries: impl IntoIterator<Item = &'a [u8]>) -> Result<Forest> {
        let mut forest = self.clone();
        for entry in entries {
            forest = forest.add(entry)?;
        }
        Ok(forest)
    }

    /// Find the first tree (in tallest-to-shortest scan order) containing
    /// `entry` as an exact leaf match, returning its index and the matching
    /// leaf bytes. Multiset semantics: stops at the first match, per
    /// `spec.md` §4.4.
    pub(crate) fn locate(&self, entry: &Hash) -> Option<(usize, Hash)> {
        for (idx, tree) in self.trees.iter().enumerate() {
            if tree.cardinality() == 0 {
                continue;
            }
            let (found, _path) = tree.find_left(entry);
            if &found == entry {
                return Some((idx, found));
            }
        }
        None
    }
}

impl Default for Forest {
    fn default() -> Self {
        Forest::empty()
    }
}
