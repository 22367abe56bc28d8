use crate::{hash_merge, Element};

/// Compute the root hash of a Merkle tree from a leaf hash, its index, and its siblings
///
/// `siblings` are in "deepest-first" order, one per level. At each level the parity of the
/// current index decides the order of the children: an even index means the current hash is the
/// left child, an odd index means it is the right child. The index is halved after every level.
///
/// For example, consider the following tree:
/// ```text
///            C
///         /     \
///        A       B
///       / \     / \
///      0   1   2   3
/// ```
/// Here:
///  - `A` is [`hash_merge([0, 1])`][crate::hash_merge]
///  - `B` is [`hash_merge([2, 3])`][crate::hash_merge]
///  - `C` is [`hash_merge([A, B])`][crate::hash_merge] (i.e. the root hash of the tree)
///
/// To prove that `2` sits at index 2:
/// ```rust
/// # use zk_primitives::*;
/// let a = hash_merge([Element::new(0), Element::new(1)]);
/// let b = hash_merge([Element::new(2), Element::new(3)]);
/// let c = hash_merge([a, b]);
///
/// let root = compute_merkle_root(Element::new(2), 2, [Element::new(3), a]);
/// assert_eq!(root, c);
///
/// // the same siblings do not prove a different leaf, or the same leaf at another index
/// assert_ne!(compute_merkle_root(Element::new(4), 2, [Element::new(3), a]), c);
/// assert_ne!(compute_merkle_root(Element::new(2), 3, [Element::new(3), a]), c);
/// ```
pub fn compute_merkle_root<I: IntoIterator<Item = Element>>(
    leaf: Element,
    index: u64,
    siblings: I,
) -> Element {
    let (root, _) = siblings
        .into_iter()
        .fold((leaf, index), |(hash, index), sibling| {
            let parent = match index % 2 == 0 {
                true => hash_merge([hash, sibling]),
                false => hash_merge([sibling, hash]),
            };

            (parent, index / 2)
        });

    root
}
