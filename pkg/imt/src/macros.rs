/// Helper macro to create an [`IndexedTree`]
///
/// Entries are inserted in the order they are written, so the first entry is in slot 0.
///
/// ```rust
/// # use imt::*;
/// let mut tree = imt! {
///     // integer literals are converted using `Element::new`, anything else with `Element::from`
///     123 => 456,
///     100 => Element::new(789),
/// };
///
/// assert_eq!(tree.len(), 2);
/// assert_eq!(tree.leaf(0).unwrap().key, 123);
/// assert_eq!(tree.sorted_keys(), [100, 123]);
///
/// // an empty tree
/// let empty = imt! {};
/// assert!(empty.is_empty());
/// ```
///
/// # Panics
///
/// Panics if more than [`CAPACITY`] entries are given
///
/// [`IndexedTree`]: crate::IndexedTree
/// [`CAPACITY`]: crate::CAPACITY
#[macro_export]
macro_rules! imt {
    (@insert $tree:ident;) => {};
    (@insert $tree:ident; $k:expr => $v:literal $(, $($rest:tt)*)?) => {
        $tree.insert_leaf($k, $crate::Element::new($v)).unwrap();
        $crate::imt!(@insert $tree; $($($rest)*)?);
    };
    (@insert $tree:ident; $k:expr => $v:expr $(, $($rest:tt)*)?) => {
        $tree.insert_leaf($k, $crate::Element::from($v)).unwrap();
        $crate::imt!(@insert $tree; $($($rest)*)?);
    };
    { $($t:tt)* } => {{
        #[allow(unused_mut)]
        let mut tree = $crate::IndexedTree::<$crate::NoopHashCache>::new();
        $crate::imt!(@insert tree; $($t)*);
        tree
    }};
}
