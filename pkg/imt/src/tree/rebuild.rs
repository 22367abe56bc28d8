use crate::{event::TreeEvent, hash_cache::HashCache, Element, IndexedTree, State};

use super::{node_offset, slot};

impl<C: HashCache> IndexedTree<C> {
    /// The root hash of the tree
    ///
    /// If leaves were written since the last rebuild, the cached nodes are recomputed first, so
    /// the returned root always matches the current leaves.
    ///
    /// ```rust
    /// # use imt::*;
    /// let mut tree = IndexedTree::<NoopHashCache>::new();
    /// let empty = tree.root();
    ///
    /// let (_, root) = tree.insert_leaf(1, Element::new(2)).unwrap();
    ///
    /// assert_ne!(empty, root);
    /// assert_eq!(tree.root(), root);
    /// ```
    pub fn root(&mut self) -> Element {
        if self.state == State::Dirty {
            self.rebuild();
        }

        self.root
    }

    /// Recompute every node up to the live depth of the tree, and the root
    ///
    /// Slots beyond the last leaf count as empty leaves. Only the levels of the smallest complete
    /// tree that fits the leaves are written, so the root is the single node at level
    /// [`depth`][Self::depth], or the hash of slot 0 when the depth is 0.
    fn rebuild(&mut self) {
        let depth = self.depth();

        self.root = match depth {
            0 => self.leaf_hash(0),
            depth => {
                for level in 1..=depth {
                    for position in 0..(1 << (depth - level)) {
                        let left = self.child(level, 2 * position);
                        let right = self.child(level, 2 * position + 1);
                        let hash = self.cache.hash(left, right);

                        self.nodes[node_offset(level, position)] = hash;
                    }
                }

                self.nodes[node_offset(depth, 0)]
            }
        };

        self.state = State::Clean;

        let (leaf_count, root) = (slot(self.num_leaves), self.root);
        self.record(TreeEvent::Rebuilt { leaf_count, root });
    }

    /// The hash of the child at `position` of a node at `level`, i.e. the node at `level - 1`
    fn child(&self, level: usize, position: usize) -> Element {
        match level {
            1 => self.leaf_hash(position),
            level => self.nodes[node_offset(level - 1, position)],
        }
    }
}
