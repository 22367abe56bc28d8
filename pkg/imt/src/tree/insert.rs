use crate::{
    event::TreeEvent, hash_cache::HashCache, Element, Error, IndexedTree, Leaf, Result, State,
    CAPACITY,
};

use super::slot;

impl<C: HashCache> IndexedTree<C> {
    /// Insert a leaf, returning the slot it was written to and the new root
    ///
    /// The new leaf is threaded into the sorted list: the leaf with the greatest key not above
    /// `key` (the "low leaf") is updated to point at the new leaf, and the new leaf takes over
    /// its old successor. If several leaves share that key, the new leaf goes after all of them.
    ///
    /// ```rust
    /// # use imt::*;
    /// let mut tree = IndexedTree::<NoopHashCache>::new();
    ///
    /// let (first, root_1) = tree.insert_leaf(123, Element::new(456)).unwrap();
    /// let (second, root_2) = tree.insert_leaf(100, Element::new(789)).unwrap();
    ///
    /// assert_eq!((first, second), (0, 1));
    /// assert_ne!(root_1, root_2);
    ///
    /// // 100 is the new minimum, so it points at 123
    /// let leaf = tree.leaf(1).unwrap();
    /// assert_eq!((leaf.next_idx, leaf.next_key), (0, 123));
    /// ```
    ///
    /// Updating the low leaf changes its hash, so proofs generated for it before the insert no
    /// longer match the new root.
    ///
    /// # Errors
    ///
    /// If the tree already holds [`CAPACITY`] leaves, [`Error::CapacityExhausted`] is returned and
    /// the tree is unchanged.
    pub fn insert_leaf(&mut self, key: u64, value: Element) -> Result<(u32, Element)> {
        let leaf_idx = self.append_leaf(key, value)?;
        let root = self.root();

        self.record(TreeEvent::LeafInserted {
            leaf_idx,
            key,
            value,
            root,
        });

        Ok((leaf_idx, root))
    }

    /// Insert several leaves, in order, rebuilding the cached nodes once at the end
    ///
    /// Returns the slot of each leaf. Either every leaf is inserted or, if there is not enough
    /// room for all of them, none are.
    ///
    /// One [`TreeEvent::LeafInserted`] is recorded per leaf, after the single rebuild, so every
    /// one of them carries the final root rather than the root right after that leaf.
    ///
    /// ```rust
    /// # use imt::*;
    /// let mut a = IndexedTree::<NoopHashCache>::new();
    /// let mut b = IndexedTree::<NoopHashCache>::new();
    ///
    /// let entries = [(3, Element::new(30)), (1, Element::new(10)), (2, Element::new(20))];
    /// assert_eq!(a.insert_leaves(entries).unwrap(), [0, 1, 2]);
    ///
    /// for (key, value) in entries {
    ///     b.insert_leaf(key, value).unwrap();
    /// }
    ///
    /// assert_eq!(a.root(), b.root());
    /// ```
    pub fn insert_leaves<I>(&mut self, entries: I) -> Result<Vec<u32>>
    where
        I: IntoIterator<Item = (u64, Element)>,
    {
        let entries: Vec<_> = entries.into_iter().collect();

        if entries.len() > self.remaining_capacity() {
            return Err(Error::CapacityExhausted { capacity: CAPACITY });
        }

        let indices = entries
            .iter()
            .map(|&(key, value)| self.append_leaf(key, value))
            .collect::<Result<Vec<_>>>()?;

        let root = self.root();

        for (&leaf_idx, &(key, value)) in indices.iter().zip(&entries) {
            self.record(TreeEvent::LeafInserted {
                leaf_idx,
                key,
                value,
                root,
            });
        }

        Ok(indices)
    }

    /// Write a new leaf and thread it into the list, leaving the cached nodes stale
    pub(super) fn append_leaf(&mut self, key: u64, value: Element) -> Result<u32> {
        if self.is_full() {
            return Err(Error::CapacityExhausted { capacity: CAPACITY });
        }

        let idx = self.num_leaves;
        let mut leaf = Leaf::new(key, value);

        match self.low_leaf_for_insert(key) {
            Some(low) => {
                let low_leaf = &mut self.leaves[low];

                leaf.next_idx = low_leaf.next_idx;
                leaf.next_key = low_leaf.next_key;

                low_leaf.next_idx = slot(idx);
                low_leaf.next_key = key;

                self.leaf_hashes[low] = low_leaf.hash();
            }
            // the first leaf is both head and tail
            None if self.is_empty() => self.head = idx,
            // a new minimum
            None => {
                leaf.next_idx = slot(self.head);
                leaf.next_key = self.leaves[self.head].key;
                self.head = idx;
            }
        }

        self.leaves[idx] = leaf;
        self.leaf_hashes[idx] = leaf.hash();
        self.num_leaves += 1;
        self.state = State::Dirty;

        Ok(slot(idx))
    }

    /// The last leaf, in list order, whose key is at most `key`
    fn low_leaf_for_insert(&self, key: u64) -> Option<usize> {
        self.sorted_leaves()
            .take_while(|(_, leaf)| leaf.key <= key)
            .last()
            .map(|(idx, _)| idx as usize)
    }
}
