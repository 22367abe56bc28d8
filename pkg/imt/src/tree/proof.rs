use borsh::{BorshDeserialize, BorshSerialize};
use zk_primitives::compute_merkle_root;

use crate::{hash_cache::HashCache, Element, Error, IndexedTree, Leaf, Result, MAX_TREE_DEPTH};

use super::node_offset;

/// A proof that a [`Leaf`] sits at a given slot of a tree with a given root
///
/// Only the first `depth` siblings are meaningful (deepest first), where `depth` is the depth of
/// the tree when the proof was made. The rest are zero.
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Proof {
    /// The slot of the leaf
    pub leaf_idx: u32,
    /// The leaf being proven
    pub leaf: Leaf,
    /// The root the leaf hashes up to
    pub root: Element,
    /// Sibling hashes from the leaf level upwards
    pub siblings: [Element; MAX_TREE_DEPTH],
}

impl Proof {
    /// The root obtained by hashing the leaf with the first `depth` siblings
    ///
    /// # Panics
    ///
    /// Panics if `depth` is greater than [`MAX_TREE_DEPTH`]
    #[must_use]
    pub fn compute_root(&self, depth: usize) -> Element {
        compute_merkle_root(
            self.leaf.hash(),
            u64::from(self.leaf_idx),
            self.siblings[..depth].iter().copied(),
        )
    }
}

impl<C: HashCache> IndexedTree<C> {
    /// Generate a [`Proof`] that the leaf in slot `leaf_idx` is part of the current root
    ///
    /// ```rust
    /// # use imt::*;
    /// let mut tree = imt! { 10 => 1, 20 => 2, 30 => 3 };
    ///
    /// let proof = tree.generate_proof(1).unwrap();
    ///
    /// assert_eq!(proof.leaf.key, 20);
    /// assert_eq!(proof.root, tree.root());
    /// assert!(tree.verify_proof(&proof));
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfBounds`] if `leaf_idx` is not an occupied slot
    pub fn generate_proof(&mut self, leaf_idx: u32) -> Result<Proof> {
        let idx = leaf_idx as usize;

        if idx >= self.num_leaves {
            return Err(Error::IndexOutOfBounds {
                index: idx,
                len: self.num_leaves,
            });
        }

        let root = self.root();
        let mut siblings = [Element::ZERO; MAX_TREE_DEPTH];

        for (level, sibling) in siblings.iter_mut().enumerate().take(self.depth()) {
            let position = (idx >> level) ^ 1;

            *sibling = match level {
                0 => self.leaf_hash(position),
                level => self.nodes[node_offset(level, position)],
            };
        }

        Ok(Proof {
            leaf_idx,
            leaf: self.leaves[idx],
            root,
            siblings,
        })
    }
}

impl<C> IndexedTree<C> {
    /// Whether `proof` shows that its leaf is in the tree as it is now
    ///
    /// The proof must name an occupied slot, claim the current root, and hash up to that root at
    /// the current depth. Any insert changes the root, so a proof made before it is rejected,
    /// even though it was valid when it was made.
    ///
    /// ```rust
    /// # use imt::*;
    /// let mut tree = imt! { 1 => 1, 2 => 2 };
    /// let proof = tree.generate_proof(0).unwrap();
    /// assert!(tree.verify_proof(&proof));
    ///
    /// tree.insert_leaf(3, Element::new(3)).unwrap();
    /// assert!(!tree.verify_proof(&proof));
    /// ```
    #[must_use]
    pub fn verify_proof(&self, proof: &Proof) -> bool {
        // every public mutation rebuilds, so the cached root is current
        (proof.leaf_idx as usize) < self.num_leaves
            && proof.root == self.root
            && proof.compute_root(self.depth()) == proof.root
    }

    /// Like [`verify_proof`][Self::verify_proof], but returns an error for an invalid proof
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidProof`] if the proof is not valid for the current tree
    pub fn check_proof(&self, proof: &Proof) -> Result<()> {
        match self.verify_proof(proof) {
            true => Ok(()),
            false => Err(Error::InvalidProof {
                leaf_idx: proof.leaf_idx,
            }),
        }
    }

    /// Whether `proof.leaf` shows that `excluded_key` is not in the tree
    ///
    /// This holds when `excluded_key` is strictly above the leaf's key and strictly below its
    /// successor's key (or the leaf has no successor).
    ///
    /// This does **not** check that the leaf is in the tree. Use
    /// [`verify_proof`][Self::verify_proof] for that.
    ///
    /// ```rust
    /// # use imt::*;
    /// let mut tree = imt! { 100 => 1, 300 => 2 };
    /// let proof = tree.generate_proof(0).unwrap();
    ///
    /// assert!(tree.verify_exclusion_proof(150, &proof));
    /// assert!(!tree.verify_exclusion_proof(100, &proof));
    /// assert!(!tree.verify_exclusion_proof(300, &proof));
    /// ```
    #[must_use]
    #[allow(clippy::unused_self)]
    pub fn verify_exclusion_proof(&self, excluded_key: u64, proof: &Proof) -> bool {
        proof.leaf.excludes(excluded_key)
    }

    /// The slot of the last leaf, in sorted order, whose key is strictly below `key`
    ///
    /// If `key` is absent, a proof for this leaf is the witness for
    /// [`verify_exclusion_proof`][Self::verify_exclusion_proof]. Returns `None` if every key is at
    /// least `key`.
    ///
    /// ```rust
    /// # use imt::*;
    /// let mut tree = imt! { 100 => 1, 300 => 2, 200 => 3 };
    ///
    /// assert_eq!(tree.find_low_leaf(250), Some(2));
    /// assert_eq!(tree.find_low_leaf(200), Some(0));
    /// assert_eq!(tree.find_low_leaf(100), None);
    ///
    /// let low = tree.find_low_leaf(250).unwrap();
    /// let proof = tree.generate_proof(low).unwrap();
    /// assert!(tree.verify_exclusion_proof(250, &proof));
    /// ```
    #[must_use]
    pub fn find_low_leaf(&self, key: u64) -> Option<u32> {
        self.sorted_leaves()
            .take_while(|(_, leaf)| leaf.key < key)
            .last()
            .map(|(idx, _)| idx)
    }
}

#[cfg(test)]
mod tests {
    use proptest::{
        collection::vec,
        prelude::{any, ProptestConfig},
    };
    use test_strategy::proptest;

    use crate::{imt, tree::slot, NoopHashCache, CAPACITY};

    use super::*;

    type Tree = IndexedTree<NoopHashCache>;

    #[test]
    fn out_of_bounds() {
        let mut tree = Tree::new();
        assert_eq!(
            tree.generate_proof(0).unwrap_err(),
            Error::IndexOutOfBounds { index: 0, len: 0 }
        );

        let mut tree = imt! { 1 => 1, 2 => 2 };
        assert_eq!(
            tree.generate_proof(2).unwrap_err(),
            Error::IndexOutOfBounds { index: 2, len: 2 }
        );
    }

    #[test]
    fn single_leaf_proof_has_no_siblings() {
        let mut tree = imt! { 5 => 6 };
        let proof = tree.generate_proof(0).unwrap();

        assert_eq!(proof.siblings, [Element::ZERO; MAX_TREE_DEPTH]);
        assert_eq!(proof.root, proof.leaf.hash());
        assert!(tree.verify_proof(&proof));
    }

    #[test]
    fn unused_siblings_are_zero() {
        let mut tree = imt! { 1 => 1, 2 => 2, 3 => 3 };
        let proof = tree.generate_proof(2).unwrap();

        assert!(proof.siblings[2..].iter().all(|s| s.is_zero()));
        assert!(!proof.siblings[0].is_zero());
    }

    #[test]
    fn full_tree_proofs_verify() {
        let mut tree = Tree::new();
        tree.insert_leaves((0..CAPACITY as u64).map(|i| (i * 3, Element::new(i))))
            .unwrap();

        for idx in 0..CAPACITY {
            let proof = tree.generate_proof(slot(idx)).unwrap();
            assert!(tree.verify_proof(&proof), "leaf {idx}");
            assert!(tree.check_proof(&proof).is_ok());
        }
    }

    #[test]
    fn tampered_proofs_fail() {
        let mut tree = imt! { 1 => 1, 2 => 2, 3 => 3, 4 => 4 };
        let proof = tree.generate_proof(1).unwrap();

        let mut wrong_value = proof.clone();
        wrong_value.leaf.value = Element::new(100);
        assert!(!tree.verify_proof(&wrong_value));
        assert_eq!(
            tree.check_proof(&wrong_value).unwrap_err(),
            Error::InvalidProof { leaf_idx: 1 }
        );

        let mut wrong_index = proof.clone();
        wrong_index.leaf_idx = 0;
        assert!(!tree.verify_proof(&wrong_index));

        let mut wrong_sibling = proof;
        wrong_sibling.siblings[1] = Element::ONE;
        assert!(!tree.verify_proof(&wrong_sibling));
    }

    #[test]
    fn stale_proof_is_rejected() {
        let mut tree = imt! { 10 => 1, 20 => 2 };
        let proof = tree.generate_proof(1).unwrap();

        tree.insert_leaf(30, Element::new(3)).unwrap();

        assert!(!tree.verify_proof(&proof));

        let fresh = tree.generate_proof(1).unwrap();
        assert!(tree.verify_proof(&fresh));
    }

    #[test]
    fn stale_proof_is_rejected_at_the_same_depth() {
        let mut tree = imt! { 10 => 1, 20 => 2, 30 => 3 };
        let proof = tree.generate_proof(0).unwrap();

        // slot 0 is untouched, and the depth stays at 2
        tree.insert_leaf(40, Element::new(4)).unwrap();
        assert_eq!(tree.depth(), 2);
        assert_eq!(tree.leaf(0), Some(&proof.leaf));

        assert!(!tree.verify_proof(&proof));
        assert_eq!(
            tree.check_proof(&proof).unwrap_err(),
            Error::InvalidProof { leaf_idx: 0 }
        );
    }

    #[test]
    fn rethreaded_leaf_proof_is_rejected() {
        let mut tree = imt! { 10 => 1, 20 => 2, 30 => 3 };
        let proof = tree.generate_proof(0).unwrap();

        tree.insert_leaf(15, Element::new(4)).unwrap();

        assert_ne!(tree.leaf(0), Some(&proof.leaf));
        assert!(!tree.verify_proof(&proof));
    }

    #[test]
    fn self_consistent_forgery_is_rejected() {
        let tree = imt! { 100 => 1, 300 => 2 };

        let mut forged = Proof {
            leaf_idx: 0,
            leaf: Leaf::new(150, Element::new(9)),
            root: Element::ZERO,
            siblings: [Element::ZERO; MAX_TREE_DEPTH],
        };
        forged.root = forged.compute_root(tree.depth());

        assert!(!tree.verify_proof(&forged));
    }

    #[test]
    fn proof_for_unused_slot_is_rejected() {
        let mut tree = imt! { 1 => 1, 2 => 2, 3 => 3, 4 => 4 };
        let mut proof = tree.generate_proof(0).unwrap();

        // the same path, as far as the siblings go
        proof.leaf_idx = 4;
        assert_eq!(proof.compute_root(tree.depth()), proof.root);

        assert!(!tree.verify_proof(&proof));
    }

    #[test]
    fn predecessor_proof_changes_on_insert() {
        let mut tree = imt! { 10 => 1, 20 => 2, 30 => 3 };
        let before = tree.generate_proof(0).unwrap();

        // 10 becomes the low leaf of 15, same depth
        tree.insert_leaf(15, Element::new(4)).unwrap();
        let after = tree.generate_proof(0).unwrap();

        assert_ne!(before.leaf, after.leaf);
        assert_ne!(before.root, after.root);
    }

    #[test]
    fn exclusion_correctness() {
        let mut tree = imt! { 100 => 1, 300 => 2 };
        let proof = tree.generate_proof(0).unwrap();

        assert_eq!(proof.leaf.next_key, 300);
        assert_ne!(proof.leaf.next_idx, 0);

        assert!(tree.verify_exclusion_proof(150, &proof));
        assert!(!tree.verify_exclusion_proof(100, &proof));
        assert!(!tree.verify_exclusion_proof(300, &proof));
    }

    #[test]
    fn exclusion_with_successor_in_slot_zero() {
        // 50 is the new minimum, and points at slot 0
        let mut tree = imt! { 100 => 1, 50 => 2 };
        let proof = tree.generate_proof(1).unwrap();

        assert_eq!((proof.leaf.next_idx, proof.leaf.next_key), (0, 100));
        assert!(tree.verify_exclusion_proof(70, &proof));
        assert!(!tree.verify_exclusion_proof(100, &proof));
        assert!(!tree.verify_exclusion_proof(150, &proof));
    }

    #[test]
    fn no_low_leaf_below_minimum() {
        let tree = imt! { 100 => 1 };

        assert_eq!(tree.find_low_leaf(100), None);
        assert_eq!(tree.find_low_leaf(0), None);
        assert_eq!(tree.find_low_leaf(101), Some(0));
    }

    #[proptest(ProptestConfig { cases: 32, ..ProptestConfig::default() })]
    fn round_trip(
        #[strategy(vec(any::<(u64, Element)>(), 1..=CAPACITY))] entries: Vec<(u64, Element)>,
    ) {
        let mut tree = Tree::new();
        tree.insert_leaves(entries).unwrap();

        for idx in 0..tree.len() {
            let proof = tree.generate_proof(slot(idx)).unwrap();
            assert!(tree.verify_proof(&proof));
        }
    }

    #[proptest(ProptestConfig { cases: 32, ..ProptestConfig::default() })]
    fn absent_keys_have_exclusion_witnesses(
        #[strategy(vec(1..1000u64, 1..=CAPACITY))] keys: Vec<u64>,
        #[strategy(1..1000u64)] query: u64,
    ) {
        let mut tree = Tree::new();
        tree.insert_leaves(keys.iter().map(|&key| (key, Element::from(key))))
            .unwrap();

        let present = keys.contains(&query);

        match tree.find_low_leaf(query) {
            Some(low) => {
                let proof = tree.generate_proof(low).unwrap();
                assert!(tree.verify_proof(&proof));
                assert_eq!(tree.verify_exclusion_proof(query, &proof), !present);
            }
            None => assert!(keys.iter().all(|&key| key >= query)),
        }
    }
}
