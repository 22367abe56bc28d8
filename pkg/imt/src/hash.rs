use std::sync::OnceLock;

use zk_primitives::Element;

use crate::Leaf;

/// The hash of an all-zero [`Leaf`]
///
/// Every unused slot of a tree holds this value, and it is the root of an empty tree. It is
/// equal to `hash_merge([0, 0])`, since the zero leaf packs to two zero inputs.
///
/// ```rust
/// # use imt::*;
/// assert_eq!(empty_leaf_hash(), Leaf::default().hash());
/// assert_eq!(empty_leaf_hash(), hash_merge([Element::ZERO, Element::ZERO]));
/// ```
///
/// The value is computed on first use and cached, so calls are essentially free after that.
#[inline]
#[must_use]
pub fn empty_leaf_hash() -> Element {
    static EMPTY: OnceLock<Element> = OnceLock::new();

    *EMPTY.get_or_init(|| Leaf::default().hash())
}
