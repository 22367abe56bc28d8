use ::proptest::{collection::vec, prelude::*};
use zk_primitives::Element;

use crate::{
    hash_cache::{HashCache, NoopHashCache, SimpleHashCache},
    IndexedTree, CAPACITY,
};

impl<C> Arbitrary for IndexedTree<C>
where
    C: HashCache + Arbitrary + core::fmt::Debug,
{
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with((): Self::Parameters) -> Self::Strategy {
        (any::<C>(), vec(any::<(u64, Element)>(), 0..=CAPACITY))
            .prop_map(|(cache, entries)| {
                let mut tree = IndexedTree::new_with_cache(cache);
                // at most `CAPACITY` entries, so this can't fail
                let _ = tree.insert_leaves(entries);
                tree.drain_events();
                tree
            })
            .boxed()
    }
}

impl Arbitrary for NoopHashCache {
    type Parameters = ();
    type Strategy = Just<Self>;

    fn arbitrary_with((): Self::Parameters) -> Self::Strategy {
        Just(Self)
    }
}

impl Arbitrary for SimpleHashCache {
    type Parameters = ();
    type Strategy = Just<Self>;

    fn arbitrary_with((): Self::Parameters) -> Self::Strategy {
        Just(Self::default())
    }
}
