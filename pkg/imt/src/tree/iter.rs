use crate::{IndexedTree, Leaf};

use super::slot;

/// An iterator over the leaves of an [`IndexedTree`] in key order
///
/// Yields `(slot, leaf)` pairs by following the `next_idx` pointers from the smallest key.
///
/// ```rust
/// # use imt::*;
/// let tree = imt! { 30 => 1, 10 => 2, 20 => 3 };
///
/// let slots: Vec<_> = tree.sorted_leaves().map(|(slot, _)| slot).collect();
/// assert_eq!(slots, [1, 2, 0]);
/// ```
#[derive(Debug, Clone)]
pub struct SortedLeaves<'a> {
    leaves: &'a [Leaf],
    next: Option<usize>,
    /// Bounds the walk even if the pointers are corrupted into a cycle
    remaining: usize,
}

impl<'a> Iterator for SortedLeaves<'a> {
    type Item = (u32, &'a Leaf);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let idx = self.next?;
        let leaf = self.leaves.get(idx)?;

        self.remaining -= 1;
        self.next = (!leaf.is_tail()).then_some(leaf.next_idx as usize);

        Some((slot(idx), leaf))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining))
    }
}

impl<C> IndexedTree<C> {
    /// Iterate over the leaves in key order, see [`SortedLeaves`]
    #[must_use]
    pub fn sorted_leaves(&self) -> SortedLeaves<'_> {
        SortedLeaves {
            leaves: self.leaves(),
            next: (!self.is_empty()).then_some(self.head),
            remaining: self.num_leaves,
        }
    }
}
