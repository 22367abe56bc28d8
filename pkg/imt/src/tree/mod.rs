use crate::{empty_leaf_hash, event::TreeEvent, hash_cache::NoopHashCache, Element, Leaf};
use static_assertions::const_assert_eq;

mod insert;
mod iter;
mod proof;
mod rebuild;
mod snapshot;

pub use iter::SortedLeaves;
pub use proof::Proof;
pub use snapshot::TreeSnapshot;

#[cfg(any(test, feature = "proptest"))]
pub mod proptest;

/// The number of leaf slots in an [`IndexedTree`]
pub const CAPACITY: usize = 32;

/// The depth of a full [`IndexedTree`]
pub const MAX_TREE_DEPTH: usize = CAPACITY.trailing_zeros() as usize;

const_assert_eq!(CAPACITY, 1 << MAX_TREE_DEPTH);

/// Whether the cached nodes of an [`IndexedTree`] agree with its leaves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
pub enum State {
    /// The cached nodes and root are up to date
    Clean,
    /// Leaves have changed since the last rebuild
    Dirty,
}

/// A fixed-capacity, append-only indexed Merkle tree
///
/// Leaves are written to slots `0, 1, 2, ...` in insertion order, and the `next_idx`/`next_key`
/// fields of each [`Leaf`] thread a sorted linked list through them.
///
/// ```rust
/// # use imt::*;
/// let mut tree = IndexedTree::<NoopHashCache>::new();
///
/// tree.insert_leaf(20, Element::new(1)).unwrap();
/// tree.insert_leaf(10, Element::new(2)).unwrap();
/// tree.insert_leaf(30, Element::new(3)).unwrap();
///
/// assert_eq!(tree.len(), 3);
/// assert_eq!(tree.sorted_keys(), vec![10, 20, 30]);
/// ```
///
/// The internal nodes are cached in a buffer of `CAPACITY - 1` elements, and recomputed whenever
/// the tree is [`Dirty`][State::Dirty] and something reads them.
#[derive(Debug, Clone)]
pub struct IndexedTree<C = NoopHashCache> {
    leaves: [Leaf; CAPACITY],
    leaf_hashes: [Element; CAPACITY],
    /// Level `l` (1-based) position `p` lives at `node_offset(l, p)`
    nodes: [Element; CAPACITY - 1],
    num_leaves: usize,
    /// The slot holding the smallest key, if the tree is not empty
    head: usize,
    root: Element,
    state: State,
    cache: C,
    events: Vec<TreeEvent>,
}

impl<C> PartialEq for IndexedTree<C> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.leaves() == other.leaves()
    }
}

impl<C> Eq for IndexedTree<C> {}

impl<C: Default> Default for IndexedTree<C> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<C> IndexedTree<C> {
    /// Create a new, empty tree
    ///
    /// ```rust
    /// # use imt::*;
    /// let mut tree = IndexedTree::<NoopHashCache>::new();
    ///
    /// assert!(tree.is_empty());
    /// assert_eq!(tree.root(), empty_leaf_hash());
    /// ```
    #[inline]
    #[must_use]
    pub fn new() -> Self
    where
        C: Default,
    {
        Self::new_with_cache(C::default())
    }

    /// Create a new, empty tree which uses `cache` to compute node hashes
    #[must_use]
    pub fn new_with_cache(cache: C) -> Self {
        let empty = empty_leaf_hash();

        Self {
            leaves: [Leaf::default(); CAPACITY],
            leaf_hashes: [empty; CAPACITY],
            nodes: [Element::ZERO; CAPACITY - 1],
            num_leaves: 0,
            head: 0,
            root: empty,
            state: State::Clean,
            cache,
            events: Vec::new(),
        }
    }

    /// The hash cache used by this tree
    #[inline]
    #[must_use]
    pub fn cache(&self) -> &C {
        &self.cache
    }

    /// The number of leaves in the tree
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.num_leaves
    }

    /// Whether the tree has no leaves
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.num_leaves == 0
    }

    /// Whether every leaf slot is in use
    #[inline]
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.num_leaves == CAPACITY
    }

    /// The number of leaves that can still be inserted
    ///
    /// ```rust
    /// # use imt::*;
    /// let mut tree = IndexedTree::<NoopHashCache>::new();
    /// assert_eq!(tree.remaining_capacity(), CAPACITY);
    ///
    /// tree.insert_leaf(1, Element::ONE).unwrap();
    /// assert_eq!(tree.remaining_capacity(), CAPACITY - 1);
    /// ```
    #[inline]
    #[must_use]
    pub fn remaining_capacity(&self) -> usize {
        CAPACITY - self.num_leaves
    }

    /// The depth of the smallest complete binary tree that holds every leaf
    ///
    /// This is `ceil(log2(len))`, or 0 for a tree with at most one leaf.
    ///
    /// ```rust
    /// # use imt::*;
    /// let mut tree = imt! { 1 => 1 };
    /// assert_eq!(tree.depth(), 0);
    ///
    /// tree.insert_leaf(2, Element::new(2)).unwrap();
    /// assert_eq!(tree.depth(), 1);
    ///
    /// tree.insert_leaf(3, Element::new(3)).unwrap();
    /// assert_eq!(tree.depth(), 2);
    /// ```
    #[inline]
    #[must_use]
    pub fn depth(&self) -> usize {
        depth_for(self.num_leaves)
    }

    /// Whether the cached nodes are up to date
    #[inline]
    #[must_use]
    pub fn state(&self) -> State {
        self.state
    }

    /// The leaf in slot `idx`, if that slot is in use
    #[inline]
    #[must_use]
    pub fn leaf(&self, idx: usize) -> Option<&Leaf> {
        self.leaves().get(idx)
    }

    /// Every leaf, in slot (insertion) order
    #[inline]
    #[must_use]
    pub fn leaves(&self) -> &[Leaf] {
        &self.leaves[..self.num_leaves]
    }

    /// Every key, in sorted order
    #[must_use]
    pub fn sorted_keys(&self) -> Vec<u64> {
        self.sorted_leaves().map(|(_, leaf)| leaf.key).collect()
    }

    /// Take every event recorded since the last call
    ///
    /// ```rust
    /// # use imt::*;
    /// let mut tree = IndexedTree::<NoopHashCache>::new();
    /// tree.insert_leaf(1, Element::new(2)).unwrap();
    ///
    /// let events = tree.drain_events();
    /// let names: Vec<_> = events.iter().map(TreeEvent::name).collect();
    /// assert_eq!(names, ["Rebuilt", "LeafInserted"]);
    ///
    /// assert!(tree.drain_events().is_empty());
    /// ```
    pub fn drain_events(&mut self) -> Vec<TreeEvent> {
        std::mem::take(&mut self.events)
    }

    /// Events recorded since the last [`drain_events`][Self::drain_events]
    #[inline]
    #[must_use]
    pub fn pending_events(&self) -> &[TreeEvent] {
        &self.events
    }

    pub(crate) fn record(&mut self, event: TreeEvent) {
        tracing::debug!(event = event.name(), ?event, "tree event");
        self.events.push(event);
    }

    /// The hash stored in slot `idx`, or the empty leaf hash for an unused slot
    fn leaf_hash(&self, idx: usize) -> Element {
        match idx < self.num_leaves {
            true => self.leaf_hashes[idx],
            false => empty_leaf_hash(),
        }
    }
}

/// `ceil(log2(num_leaves))`, with 0 and 1 both giving 0
pub(crate) fn depth_for(num_leaves: usize) -> usize {
    num_leaves.next_power_of_two().trailing_zeros() as usize
}

/// The position in the node buffer of the node at `level` (1-based, `1..=MAX_TREE_DEPTH`) and
/// `position` (counted from the left)
///
/// Level 1 takes the first `CAPACITY / 2` slots, level 2 the next `CAPACITY / 4`, and so on, so
/// the single node at level [`MAX_TREE_DEPTH`] is the last slot.
pub(crate) const fn node_offset(level: usize, position: usize) -> usize {
    CAPACITY - (CAPACITY >> (level - 1)) + position
}

/// Convert a slot index to the `u32` used in leaves and proofs
#[allow(clippy::cast_possible_truncation)]
pub(crate) const fn slot(idx: usize) -> u32 {
    // slots are below CAPACITY, which fits in a u32
    idx as u32
}

const_assert_eq!(node_offset(MAX_TREE_DEPTH, 0), CAPACITY - 2);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn depth_is_ceil_log2() {
        let depths: Vec<_> = [0, 1, 2, 3, 4, 5, 8, 9, 16, 17, 32]
            .into_iter()
            .map(depth_for)
            .collect();

        assert_eq!(depths, [0, 0, 1, 2, 2, 3, 3, 4, 4, 5, 5]);
    }

    #[test]
    fn node_regions_are_disjoint_and_fill_the_buffer() {
        let mut seen = [false; CAPACITY - 1];

        for level in 1..=MAX_TREE_DEPTH {
            for position in 0..(CAPACITY >> level) {
                let offset = node_offset(level, position);
                assert!(!seen[offset], "offset {offset} used twice");
                seen[offset] = true;
            }
        }

        assert!(seen.iter().all(|used| *used));
    }

    #[test]
    fn new_tree_is_clean_and_empty() {
        let mut tree = IndexedTree::<NoopHashCache>::new();

        assert_eq!(tree.state(), State::Clean);
        assert_eq!(tree.len(), 0);
        assert_eq!(tree.depth(), 0);
        assert!(tree.leaves().is_empty());
        assert!(tree.leaf(0).is_none());
        assert_eq!(tree.root(), empty_leaf_hash());
        assert!(!tree.root().is_zero());
    }

    #[test]
    fn trees_with_the_same_leaves_are_equal() {
        let a = crate::imt! { 5 => 1, 2 => 3 };
        let b = crate::imt! { 5 => 1, 2 => 3 };
        let c = crate::imt! { 2 => 3, 5 => 1 };

        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
