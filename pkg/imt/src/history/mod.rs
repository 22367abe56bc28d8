use std::collections::HashMap;

use borsh::{BorshDeserialize, BorshSerialize};
use zk_primitives::Element;

use crate::{
    event::TreeEvent,
    hash_cache::{HashCache, NoopHashCache},
    tree::{depth_for, slot},
    Error, IndexedTree, Proof, Result, TreeSnapshot,
};

mod clock;

pub use clock::{Clock, FixedClock, SystemClock};

/// A record of a root the tree once had
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, BorshSerialize, BorshDeserialize)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HistoricalRoot {
    /// The root
    pub root: Element,
    /// The number of leaves in the tree when it had this root
    pub leaf_count: u32,
    /// When the root was first seen, in seconds since the unix epoch
    pub timestamp: u64,
    /// The leaf whose insertion produced this root
    pub leaf_idx: u32,
}

/// An [`IndexedTree`] that remembers every root it has had
///
/// Every insert goes through this type, and each new root is appended to an ordered log. A root
/// that is already in the log is not stored again.
///
/// The log starts with a sentinel entry for the root `0`, which is **not** the root of an empty
/// tree (that is [`empty_leaf_hash`]).
///
/// ```rust
/// # use imt::*;
/// let mut history = HistoricalTree::<NoopHashCache, FixedClock>::with_clock(FixedClock::new(7));
///
/// let (_, root) = history.insert_leaf(1, Element::new(2)).unwrap();
///
/// assert_eq!(history.total_historical_roots(), 2);
/// assert!(history.is_historical_root(root));
/// assert_eq!(history.latest_historical_root().unwrap().root, root);
/// assert_eq!(history.historical_root_data(root).unwrap().timestamp, 7);
/// ```
///
/// [`empty_leaf_hash`]: crate::empty_leaf_hash
#[derive(Debug, Clone)]
pub struct HistoricalTree<C = NoopHashCache, K = SystemClock> {
    tree: IndexedTree<C>,
    clock: K,
    log: Vec<HistoricalRoot>,
    /// Position of each root in `log`
    positions: HashMap<Element, usize>,
}

impl<C: HashCache + Default, K: Clock + Default> Default for HistoricalTree<C, K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: HashCache, K: Clock> HistoricalTree<C, K> {
    /// Create an empty tree, with only the sentinel entry in its log
    #[must_use]
    pub fn new() -> Self
    where
        C: Default,
        K: Default,
    {
        Self::with_clock(K::default())
    }

    /// Create an empty tree which timestamps its roots with `clock`
    #[must_use]
    pub fn with_clock(clock: K) -> Self
    where
        C: Default,
    {
        Self::from_tree(IndexedTree::new(), clock)
    }

    /// Start tracking the history of an existing tree
    ///
    /// The log is seeded with the sentinel entry and, if the tree has leaves, its current root.
    pub fn from_tree(tree: IndexedTree<C>, clock: K) -> Self {
        let mut history = Self {
            tree,
            clock,
            log: Vec::new(),
            positions: HashMap::new(),
        };

        history.store_historical_root(Element::ZERO, 0, 0);

        if let Some(last) = history.tree.len().checked_sub(1) {
            let root = history.tree.root();
            history.store_historical_root(root, slot(last + 1), slot(last));
        }

        history
    }

    /// Insert a leaf, and record the new root
    ///
    /// See [`IndexedTree::insert_leaf`]
    pub fn insert_leaf(&mut self, key: u64, value: Element) -> Result<(u32, Element)> {
        let (leaf_idx, root, _) = self.insert_leaf_with_history(key, value)?;
        Ok((leaf_idx, root))
    }

    /// Insert a leaf, and record the new root
    ///
    /// Also returns whether the root was added to the log, which is `false` only if the same
    /// root was already there.
    pub fn insert_leaf_with_history(
        &mut self,
        key: u64,
        value: Element,
    ) -> Result<(u32, Element, bool)> {
        let (leaf_idx, root) = self.tree.insert_leaf(key, value)?;
        let leaf_count = slot(self.tree.len());
        let stored = self.store_historical_root(root, leaf_count, leaf_idx);

        Ok((leaf_idx, root, stored))
    }

    /// Append `root` to the log, unless it is already there
    fn store_historical_root(&mut self, root: Element, leaf_count: u32, leaf_idx: u32) -> bool {
        if self.positions.contains_key(&root) {
            return false;
        }

        let timestamp = self.clock.now();
        let entry = HistoricalRoot {
            root,
            leaf_count,
            timestamp,
            leaf_idx,
        };

        self.positions.insert(root, self.log.len());
        self.log.push(entry);

        self.tree.record(TreeEvent::HistoricalRootStored {
            root,
            leaf_count,
            timestamp,
            leaf_idx,
        });

        true
    }

    /// The current root of the tree
    pub fn root(&mut self) -> Element {
        self.tree.root()
    }

    /// See [`IndexedTree::generate_proof`]
    pub fn generate_proof(&mut self, leaf_idx: u32) -> Result<Proof> {
        self.tree.generate_proof(leaf_idx)
    }

    /// Capture the tree and the log
    pub fn snapshot(&mut self) -> HistorySnapshot {
        HistorySnapshot {
            tree: self.tree.snapshot(),
            log: self.log.clone(),
        }
    }

    /// Rebuild a [`HistoricalTree`] from a [`HistorySnapshot`]
    ///
    /// # Errors
    ///
    /// Fails for the same reasons as [`IndexedTree::restore`], and with
    /// [`Error::InconsistentSnapshot`] if the log is empty, contains a root twice, or does not
    /// contain the root of a non-empty tree
    pub fn restore(snapshot: &HistorySnapshot, clock: K) -> Result<Self>
    where
        C: Default,
    {
        Self::restore_with_cache(snapshot, C::default(), clock)
    }

    /// Like [`restore`][Self::restore], but with a specific cache
    pub fn restore_with_cache(snapshot: &HistorySnapshot, cache: C, clock: K) -> Result<Self> {
        let tree = IndexedTree::restore_with_cache(&snapshot.tree, cache)?;

        if snapshot.log.is_empty() {
            return Err(Error::InconsistentSnapshot("the historical log is empty"));
        }

        let mut positions = HashMap::with_capacity(snapshot.log.len());

        for (position, entry) in snapshot.log.iter().enumerate() {
            if positions.insert(entry.root, position).is_some() {
                return Err(Error::InconsistentSnapshot("a historical root appears twice"));
            }
        }

        if !tree.is_empty() && !positions.contains_key(&snapshot.tree.root) {
            return Err(Error::InconsistentSnapshot(
                "the current root is not in the historical log",
            ));
        }

        Ok(Self {
            tree,
            clock,
            log: snapshot.log.clone(),
            positions,
        })
    }
}

impl<C, K> HistoricalTree<C, K> {
    /// The wrapped tree
    #[inline]
    #[must_use]
    pub fn tree(&self) -> &IndexedTree<C> {
        &self.tree
    }

    /// The clock used to timestamp new roots
    #[inline]
    #[must_use]
    pub fn clock(&self) -> &K {
        &self.clock
    }

    /// See [`IndexedTree::verify_proof`]
    #[must_use]
    pub fn verify_proof(&self, proof: &Proof) -> bool {
        self.tree.verify_proof(proof)
    }

    /// See [`IndexedTree::verify_exclusion_proof`]
    #[must_use]
    pub fn verify_exclusion_proof(&self, excluded_key: u64, proof: &Proof) -> bool {
        self.tree.verify_exclusion_proof(excluded_key, proof)
    }

    /// Whether `proof` shows that its leaf was in the tree when the tree had `proof.root`
    ///
    /// The root must be in the log, and the proof is checked at the depth and leaf count the tree
    /// had at that root. Unlike [`verify_proof`][Self::verify_proof], proofs stay valid after
    /// later inserts.
    ///
    /// ```rust
    /// # use imt::*;
    /// let mut history = HistoricalTree::<NoopHashCache, FixedClock>::default();
    /// history.insert_leaf(1, Element::new(1)).unwrap();
    /// history.insert_leaf(2, Element::new(2)).unwrap();
    ///
    /// let proof = history.generate_proof(0).unwrap();
    /// history.insert_leaf(3, Element::new(3)).unwrap();
    ///
    /// assert!(!history.verify_proof(&proof));
    /// assert!(history.verify_historical_proof(&proof));
    ///
    /// // a proof with a made-up root is rejected, even if it hashes correctly
    /// let mut forged = proof.clone();
    /// forged.leaf.value = Element::new(99);
    /// forged.root = forged.compute_root(1);
    /// assert!(!history.verify_historical_proof(&forged));
    /// ```
    #[must_use]
    pub fn verify_historical_proof(&self, proof: &Proof) -> bool {
        let Ok(entry) = self.historical_root_data(proof.root) else {
            return false;
        };

        proof.leaf_idx < entry.leaf_count
            && proof.compute_root(depth_for(entry.leaf_count as usize)) == proof.root
    }

    /// Whether `root` is in the log
    #[inline]
    #[must_use]
    pub fn is_historical_root(&self, root: Element) -> bool {
        self.positions.contains_key(&root)
    }

    /// The log entry for `root`
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if `root` was never stored
    pub fn historical_root_data(&self, root: Element) -> Result<&HistoricalRoot> {
        self.positions
            .get(&root)
            .map(|&position| &self.log[position])
            .ok_or(Error::NotFound { root })
    }

    /// The number of entries in the log, including the sentinel
    #[inline]
    #[must_use]
    pub fn total_historical_roots(&self) -> usize {
        self.log.len()
    }

    /// The log entry at `index`
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfBounds`] if `index >= total_historical_roots()`
    pub fn historical_root_by_index(&self, index: usize) -> Result<&HistoricalRoot> {
        self.log.get(index).ok_or(Error::IndexOutOfBounds {
            index,
            len: self.log.len(),
        })
    }

    /// The most recent log entry
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyLog`] if the log has no entries, which can't happen for a tree built
    /// by this crate, since the log always holds the sentinel
    pub fn latest_historical_root(&self) -> Result<&HistoricalRoot> {
        self.log.last().ok_or(Error::EmptyLog)
    }

    /// Every log entry, oldest first
    #[inline]
    #[must_use]
    pub fn historical_roots(&self) -> &[HistoricalRoot] {
        &self.log
    }

    /// Take every event recorded since the last call, see [`IndexedTree::drain_events`]
    pub fn drain_events(&mut self) -> Vec<TreeEvent> {
        self.tree.drain_events()
    }
}

/// The persisted form of a [`HistoricalTree`]
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HistorySnapshot {
    /// The wrapped tree
    pub tree: TreeSnapshot,
    /// The log, oldest first
    pub log: Vec<HistoricalRoot>,
}

#[cfg(test)]
mod tests {
    use crate::{empty_leaf_hash, imt, Leaf, CAPACITY};

    use super::*;

    type History = HistoricalTree<NoopHashCache, FixedClock>;

    fn history_at(now: u64) -> (History, FixedClock) {
        let clock = FixedClock::new(now);
        (History::with_clock(clock.clone()), clock)
    }

    #[test]
    fn seeded_with_sentinel() {
        let (history, _) = history_at(1000);

        assert_eq!(history.total_historical_roots(), 1);

        let sentinel = history.latest_historical_root().unwrap();
        assert_eq!(
            *sentinel,
            HistoricalRoot {
                root: Element::ZERO,
                leaf_count: 0,
                timestamp: 1000,
                leaf_idx: 0,
            }
        );

        assert!(history.is_historical_root(Element::ZERO));
        assert!(!history.is_historical_root(empty_leaf_hash()));
    }

    #[test]
    fn every_insert_is_recorded() {
        let (mut history, clock) = history_at(10);

        let (idx_0, root_0, stored_0) = history
            .insert_leaf_with_history(123, Element::new(456))
            .unwrap();
        clock.advance(5);
        let (idx_1, root_1, stored_1) = history
            .insert_leaf_with_history(300, Element::new(400))
            .unwrap();

        assert!(stored_0 && stored_1);
        assert_eq!(history.total_historical_roots(), 3);

        assert_eq!(
            *history.historical_root_by_index(1).unwrap(),
            HistoricalRoot {
                root: root_0,
                leaf_count: 1,
                timestamp: 10,
                leaf_idx: idx_0,
            }
        );
        assert_eq!(
            *history.historical_root_data(root_1).unwrap(),
            HistoricalRoot {
                root: root_1,
                leaf_count: 2,
                timestamp: 15,
                leaf_idx: idx_1,
            }
        );
        assert_eq!(history.latest_historical_root().unwrap().root, root_1);
        assert_eq!(history.root(), root_1);
    }

    #[test]
    fn duplicate_roots_are_not_stored() {
        let (mut history, clock) = history_at(1);
        let (_, root) = history.insert_leaf(5, Element::new(5)).unwrap();
        history.drain_events();

        clock.advance(100);
        assert!(!history.store_historical_root(root, 1, 0));
        assert!(!history.store_historical_root(Element::ZERO, 0, 0));

        assert_eq!(history.total_historical_roots(), 2);
        assert_eq!(history.historical_root_data(root).unwrap().timestamp, 1);
        assert!(history.drain_events().is_empty());
    }

    #[test]
    fn boundary_failures() {
        let (mut history, _) = history_at(0);
        history.insert_leaf(1, Element::ONE).unwrap();

        let total = history.total_historical_roots();
        assert_eq!(
            history.historical_root_by_index(total).unwrap_err(),
            Error::IndexOutOfBounds {
                index: total,
                len: total
            }
        );

        let never = Element::new(12345);
        assert_eq!(
            history.historical_root_data(never).unwrap_err(),
            Error::NotFound { root: never }
        );

        assert_eq!(
            history.generate_proof(1).unwrap_err(),
            Error::IndexOutOfBounds { index: 1, len: 1 }
        );
    }

    #[test]
    fn empty_log_error() {
        let (mut history, _) = history_at(0);
        history.log.clear();
        history.positions.clear();

        assert_eq!(history.latest_historical_root().unwrap_err(), Error::EmptyLog);
    }

    #[test]
    fn failed_insert_leaves_log_unchanged() {
        let (mut history, _) = history_at(0);

        for i in 0..CAPACITY as u64 {
            history.insert_leaf(i, Element::new(i)).unwrap();
        }

        let total = history.total_historical_roots();
        let error = history.insert_leaf(99, Element::ONE).unwrap_err();

        assert_eq!(error, Error::CapacityExhausted { capacity: CAPACITY });
        assert_eq!(history.total_historical_roots(), total);
        assert_eq!(total, CAPACITY + 1);
    }

    #[test]
    fn old_roots_remain_provable() {
        let (mut history, _) = history_at(0);
        history.insert_leaf(10, Element::new(1)).unwrap();
        history.insert_leaf(20, Element::new(2)).unwrap();
        history.insert_leaf(30, Element::new(3)).unwrap();

        let proof = history.generate_proof(0).unwrap();
        history.insert_leaf(40, Element::new(4)).unwrap();

        assert_ne!(proof.root, history.root());
        assert!(!history.verify_proof(&proof));
        assert!(history.verify_historical_proof(&proof));

        // the depth grows from 2 to 3
        history.insert_leaf(50, Element::new(5)).unwrap();
        assert!(history.verify_historical_proof(&proof));
    }

    #[test]
    fn historical_proof_needs_a_slot_that_existed() {
        let (mut history, _) = history_at(0);
        history.insert_leaf(10, Element::new(1)).unwrap();
        history.insert_leaf(20, Element::new(2)).unwrap();
        history.insert_leaf(30, Element::new(3)).unwrap();

        // same path bits as slot 0 at depth 2, but the root had only 3 leaves
        let mut proof = history.generate_proof(0).unwrap();
        proof.leaf_idx = 4;
        assert_eq!(proof.compute_root(2), proof.root);
        assert!(!history.verify_historical_proof(&proof));

        // the sentinel root has no leaves
        let sentinel = Proof {
            leaf_idx: 0,
            leaf: Leaf::default(),
            root: Element::ZERO,
            siblings: [Element::ZERO; crate::MAX_TREE_DEPTH],
        };
        assert!(!history.verify_historical_proof(&sentinel));
    }

    #[test]
    fn events_include_history() {
        let (mut history, _) = history_at(3);
        history.insert_leaf(1, Element::new(2)).unwrap();

        let names: Vec<_> = history.drain_events().iter().map(TreeEvent::name).collect();
        assert_eq!(
            names,
            [
                "HistoricalRootStored",
                "Rebuilt",
                "LeafInserted",
                "HistoricalRootStored"
            ]
        );
    }

    #[test]
    fn from_existing_tree() {
        let mut tree = imt! { 4 => 4, 2 => 2 };
        let root = tree.root();

        let history = HistoricalTree::from_tree(tree, FixedClock::new(9));

        assert_eq!(history.total_historical_roots(), 2);
        assert_eq!(
            *history.latest_historical_root().unwrap(),
            HistoricalRoot {
                root,
                leaf_count: 2,
                timestamp: 9,
                leaf_idx: 1,
            }
        );
    }

    #[test]
    fn snapshot_round_trip() {
        let (mut history, _) = history_at(50);
        history.insert_leaf(8, Element::new(80)).unwrap();
        history.insert_leaf(3, Element::new(30)).unwrap();

        let snapshot = history.snapshot();
        let bytes = borsh::to_vec(&snapshot).unwrap();
        let decoded: HistorySnapshot = borsh::from_slice(&bytes).unwrap();

        let mut restored = History::restore(&decoded, FixedClock::new(60)).unwrap();

        assert_eq!(restored.historical_roots(), history.historical_roots());
        assert_eq!(restored.root(), history.root());

        let (_, root, stored) = restored
            .insert_leaf_with_history(5, Element::new(50))
            .unwrap();
        assert!(stored);
        assert_eq!(restored.historical_root_data(root).unwrap().timestamp, 60);
    }

    #[test]
    fn inconsistent_history_is_rejected() {
        let (mut history, _) = history_at(0);
        history.insert_leaf(1, Element::ONE).unwrap();
        let snapshot = history.snapshot();

        let mut duplicated = snapshot.clone();
        duplicated.log.push(duplicated.log[1]);
        assert_eq!(
            History::restore(&duplicated, FixedClock::default()).unwrap_err(),
            Error::InconsistentSnapshot("a historical root appears twice")
        );

        let mut truncated = snapshot.clone();
        truncated.log.truncate(1);
        assert_eq!(
            History::restore(&truncated, FixedClock::default()).unwrap_err(),
            Error::InconsistentSnapshot("the current root is not in the historical log")
        );

        let mut empty = snapshot;
        empty.log.clear();
        assert_eq!(
            History::restore(&empty, FixedClock::default()).unwrap_err(),
            Error::InconsistentSnapshot("the historical log is empty")
        );
    }

    #[test]
    fn exclusion_through_history() {
        let (mut history, _) = history_at(0);
        history.insert_leaf(100, Element::ONE).unwrap();
        history.insert_leaf(300, Element::ONE).unwrap();

        let proof = history.generate_proof(0).unwrap();
        assert_eq!(proof.leaf, Leaf { key: 100, next_idx: 1, next_key: 300, value: Element::ONE });
        assert!(history.verify_exclusion_proof(200, &proof));
        assert!(!history.verify_exclusion_proof(300, &proof));
    }
}
