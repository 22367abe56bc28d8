use borsh::{BorshDeserialize, BorshSerialize};
use zk_primitives::{permute, Element};

/// A single entry of an [`IndexedTree`]
///
/// Alongside its own `key` and `value`, a leaf stores the slot (`next_idx`) and key (`next_key`)
/// of the leaf holding the next largest key. Following these pointers from the smallest key visits
/// every leaf in key order.
///
/// A leaf with `next_idx == 0` and `next_key == 0` has no successor (it holds the largest key).
///
/// [`IndexedTree`]: crate::IndexedTree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, BorshSerialize, BorshDeserialize)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Leaf {
    /// The key used to order leaves
    pub key: u64,
    /// The slot of the leaf with the next largest key
    pub next_idx: u32,
    /// The key of the leaf with the next largest key
    pub next_key: u64,
    /// The value committed by this leaf
    pub value: Element,
}

/// The number of low bits of `value` that go into the right half of the hash input
const VALUE_LOW_BITS: u32 = 96;

impl Leaf {
    /// Create a leaf with no successor
    #[inline]
    #[must_use]
    pub fn new(key: u64, value: Element) -> Self {
        Self {
            key,
            next_idx: 0,
            next_key: 0,
            value,
        }
    }

    /// Whether this leaf has no successor
    ///
    /// ```rust
    /// # use imt::*;
    /// assert!(Leaf::new(5, Element::ONE).is_tail());
    ///
    /// // a successor stored in slot 0 is still a successor
    /// let leaf = Leaf { key: 5, next_idx: 0, next_key: 9, value: Element::ONE };
    /// assert!(!leaf.is_tail());
    /// ```
    #[inline]
    #[must_use]
    pub fn is_tail(&self) -> bool {
        self.next_idx == 0 && self.next_key == 0
    }

    /// The hash of this leaf
    ///
    /// The fields are packed into two 256-bit halves:
    ///  - left: `key << 192 | next_idx << 160 | next_key << 96 | value >> 96`
    ///  - right: the low 96 bits of `value`
    ///
    /// and the result is the left output of [`permute`] applied to them.
    ///
    /// ```rust
    /// # use imt::*;
    /// let leaf = Leaf::new(123, Element::new(456));
    /// let expected = permute(Element::new(123) << 192, Element::new(456)).0;
    ///
    /// assert_eq!(leaf.hash(), expected);
    /// ```
    #[must_use]
    pub fn hash(&self) -> Element {
        let (left, right) = self.pack();
        permute(left, right).0
    }

    fn pack(&self) -> (Element, Element) {
        let low_mask = (Element::ONE << VALUE_LOW_BITS) - Element::ONE;

        let left = (Element::from(self.key) << 192)
            | (Element::from(self.next_idx) << 160)
            | (Element::from(self.next_key) << 96)
            | (self.value >> VALUE_LOW_BITS);
        let right = self.value & low_mask;

        (left, right)
    }

    /// Whether `key` lies strictly between this leaf's key and its successor's key
    ///
    /// If the leaf has no successor, every key above this leaf's key is in range.
    #[inline]
    #[must_use]
    pub fn excludes(&self, key: u64) -> bool {
        key > self.key && (self.is_tail() || key < self.next_key)
    }
}

#[cfg(any(test, feature = "proptest"))]
mod proptest_impls {
    use super::Leaf;
    use ::proptest::prelude::*;
    use zk_primitives::Element;

    impl Arbitrary for Leaf {
        type Parameters = ();
        type Strategy = BoxedStrategy<Self>;

        fn arbitrary_with((): Self::Parameters) -> Self::Strategy {
            (any::<u64>(), any::<u32>(), any::<u64>(), any::<Element>())
                .prop_map(|(key, next_idx, next_key, value)| Leaf {
                    key,
                    next_idx,
                    next_key,
                    value,
                })
                .boxed()
        }
    }
}
