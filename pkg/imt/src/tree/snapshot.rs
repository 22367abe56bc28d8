use borsh::{BorshDeserialize, BorshSerialize};

use crate::{hash_cache::HashCache, Element, Error, IndexedTree, Leaf, Result, State, CAPACITY};

/// The persisted form of an [`IndexedTree`]
///
/// Only the leaves are stored, alongside the root they produced. Hashes and cached nodes are
/// recomputed on [`restore`][IndexedTree::restore], and the recomputed root must match.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TreeSnapshot {
    /// Every leaf, in slot order
    pub leaves: Vec<Leaf>,
    /// The root of the tree when the snapshot was taken
    pub root: Element,
}

impl TreeSnapshot {
    /// Encode this snapshot with borsh
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        // writing to a `Vec` can't fail
        borsh::to_vec(self).unwrap_or_default()
    }

    /// Decode a snapshot written by [`to_bytes`][Self::to_bytes]
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(borsh::from_slice(bytes)?)
    }
}

impl<C: HashCache> IndexedTree<C> {
    /// Capture the leaves and root of this tree
    ///
    /// ```rust
    /// # use imt::*;
    /// let mut tree = imt! { 3 => 1, 1 => 2 };
    /// let snapshot = tree.snapshot();
    ///
    /// let mut restored = IndexedTree::<NoopHashCache>::restore(&snapshot).unwrap();
    /// assert_eq!(restored, tree);
    /// assert_eq!(restored.root(), tree.root());
    /// ```
    pub fn snapshot(&mut self) -> TreeSnapshot {
        TreeSnapshot {
            leaves: self.leaves().to_vec(),
            root: self.root(),
        }
    }

    /// Rebuild a tree from a [`TreeSnapshot`]
    ///
    /// # Errors
    ///
    ///  - [`Error::CapacityExhausted`] if the snapshot has more than [`CAPACITY`] leaves
    ///  - [`Error::InconsistentSnapshot`] if the leaves don't form a single sorted list, or don't
    ///    hash to the stored root
    pub fn restore(snapshot: &TreeSnapshot) -> Result<Self>
    where
        C: Default,
    {
        Self::restore_with_cache(snapshot, C::default())
    }

    /// Like [`restore`][Self::restore], but with a specific cache
    pub fn restore_with_cache(snapshot: &TreeSnapshot, cache: C) -> Result<Self> {
        let leaves = &snapshot.leaves;

        if leaves.len() > CAPACITY {
            return Err(Error::CapacityExhausted { capacity: CAPACITY });
        }

        let mut tree = Self::new_with_cache(cache);

        for (idx, leaf) in leaves.iter().enumerate() {
            tree.leaves[idx] = *leaf;
            tree.leaf_hashes[idx] = leaf.hash();
        }

        tree.num_leaves = leaves.len();
        tree.head = find_head(leaves)?;
        tree.state = State::Dirty;

        check_sorted_list(&tree)?;

        if tree.root() != snapshot.root {
            return Err(Error::InconsistentSnapshot("the leaves do not hash to the root"));
        }

        tracing::debug!(leaves = tree.len(), root = %snapshot.root, "restored tree");
        tree.events.clear();

        Ok(tree)
    }
}

/// The only slot that no other leaf points to
fn find_head(leaves: &[Leaf]) -> Result<usize> {
    if leaves.is_empty() {
        return Ok(0);
    }

    let mut has_predecessor = [false; CAPACITY];

    for leaf in leaves.iter().filter(|leaf| !leaf.is_tail()) {
        let next = leaf.next_idx as usize;

        if next >= leaves.len() {
            return Err(Error::InconsistentSnapshot("a successor is beyond the last leaf"));
        }

        if std::mem::replace(&mut has_predecessor[next], true) {
            return Err(Error::InconsistentSnapshot("a leaf has two predecessors"));
        }
    }

    let mut heads = (0..leaves.len()).filter(|&idx| !has_predecessor[idx]);

    match (heads.next(), heads.next()) {
        (Some(head), None) => Ok(head),
        (None, _) => Err(Error::InconsistentSnapshot("the list has no head")),
        (Some(_), Some(_)) => Err(Error::InconsistentSnapshot("the list has several heads")),
    }
}

fn check_sorted_list<C>(tree: &IndexedTree<C>) -> Result<()> {
    let mut visited = 0;

    for (_, leaf) in tree.sorted_leaves() {
        visited += 1;

        if leaf.is_tail() {
            continue;
        }

        let next = tree.leaves[leaf.next_idx as usize];

        if next.key != leaf.next_key {
            return Err(Error::InconsistentSnapshot("a successor key does not match"));
        }

        if next.key < leaf.key {
            return Err(Error::InconsistentSnapshot("the list is not sorted"));
        }
    }

    match visited == tree.len() {
        true => Ok(()),
        false => Err(Error::InconsistentSnapshot("some leaves are not in the list")),
    }
}
