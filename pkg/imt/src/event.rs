use zk_primitives::Element;

/// A notification of a change to a tree
///
/// Events are buffered inside the tree in the order they happen, and handed out by
/// [`IndexedTree::drain_events`]. Each event is also logged at `debug` level as it is recorded.
///
/// [`IndexedTree::drain_events`]: crate::IndexedTree::drain_events
#[derive(Debug, Clone, PartialEq, Eq, strum::IntoStaticStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum TreeEvent {
    /// A leaf was added to the tree
    LeafInserted {
        /// The slot the leaf was written to
        leaf_idx: u32,
        /// The key of the new leaf
        key: u64,
        /// The value of the new leaf
        value: Element,
        /// The root after the insert
        root: Element,
    },

    /// The cached nodes were recomputed
    Rebuilt {
        /// The number of leaves at the time of the rebuild
        leaf_count: u32,
        /// The new root
        root: Element,
    },

    /// A previously unseen root was added to the historical log
    HistoricalRootStored {
        /// The stored root
        root: Element,
        /// The number of leaves in the tree when the root was produced
        leaf_count: u32,
        /// The time the root was stored, in seconds since the unix epoch
        timestamp: u64,
        /// The leaf whose insertion produced this root
        leaf_idx: u32,
    },
}

impl TreeEvent {
    /// A short, stable name for this kind of event
    ///
    /// ```rust
    /// # use imt::*;
    /// let event = TreeEvent::Rebuilt { leaf_count: 0, root: Element::ZERO };
    /// assert_eq!(event.name(), "Rebuilt");
    /// ```
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.into()
    }
}
