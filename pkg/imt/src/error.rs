use zk_primitives::Element;

/// An error from an [`IndexedTree`] or a [`HistoricalTree`]
///
/// None of these errors are transient, and a failed operation never leaves partial changes
/// behind.
///
/// [`IndexedTree`]: crate::IndexedTree
/// [`HistoricalTree`]: crate::HistoricalTree
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The tree has no free leaf slots left
    #[error("the tree is full: all {capacity} leaf slots are in use")]
    CapacityExhausted {
        /// The number of leaf slots in the tree
        capacity: usize,
    },

    /// A leaf index or historical log index was beyond the current bounds
    #[error("index {index} is out of bounds for length {len}")]
    IndexOutOfBounds {
        /// The requested index
        index: usize,
        /// The number of valid entries
        len: usize,
    },

    /// A root was looked up that was never stored in the historical log
    #[error("{root} is not a historical root")]
    NotFound {
        /// The requested root
        root: Element,
    },

    /// The historical log contains no entries
    #[error("the historical root log is empty")]
    EmptyLog,

    /// A proof did not hash to the root it claims
    #[error("the proof for leaf {leaf_idx} does not hash to its root")]
    InvalidProof {
        /// The leaf index the proof claims
        leaf_idx: u32,
    },

    /// A snapshot could not be decoded
    #[error("snapshot decoding error: {0}")]
    Snapshot(String),

    /// A snapshot decoded, but its contents disagree with each other
    #[error("inconsistent snapshot: {0}")]
    InconsistentSnapshot(&'static str),
}

/// A `Result` defaulting to [`Error`]
pub type Result<T, E = Error> = std::result::Result<T, E>;

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Snapshot(error.to_string())
    }
}
