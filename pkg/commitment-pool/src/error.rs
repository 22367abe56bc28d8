use zk_primitives::Element;

/// An error from a [`CommitmentPool`]
///
/// A failed [`commit_entry`] changes nothing: no nonce is marked spent and no leaves are
/// inserted.
///
/// [`CommitmentPool`]: crate::CommitmentPool
/// [`commit_entry`]: crate::CommitmentPool::commit_entry
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The public input vector had the wrong length
    #[error("expected {expected} public inputs, got {actual}")]
    InvalidInputShape {
        /// The required number of public inputs
        expected: usize,
        /// The number of public inputs given
        actual: usize,
    },

    /// No proof verifier has been set
    #[error("no proof verifier is configured")]
    VerifierNotConfigured,

    /// The verifier rejected the proof, or failed while checking it
    #[error("the proof was rejected by the verifier")]
    InvalidProof,

    /// The attached value does not equal the declared amount
    #[error("attached value {attached} does not match the declared amount {amount}")]
    ValueMismatch {
        /// The value attached to the call
        attached: Element,
        /// The amount in the public inputs
        amount: Element,
    },

    /// A public input had a forbidden value
    #[error("invalid parameter: {0}")]
    InvalidParameter(&'static str),

    /// The nonce commitment has already been spent
    #[error("nonce commitment {nonce} has already been spent")]
    ReplayedNonce {
        /// The nonce commitment
        nonce: Element,
    },

    /// The underlying tree failed
    #[error("tree error: {0}")]
    Tree(#[from] imt::Error),

    /// A snapshot file could not be read or written
    #[error("io error")]
    Io(#[from] std::io::Error),

    /// A snapshot file decoded, but could not be restored
    #[error("inconsistent pool snapshot: {0}")]
    InconsistentSnapshot(&'static str),

    /// The configuration could not be loaded
    #[error("config error: {0}")]
    Config(Box<figment::Error>),
}

impl From<figment::Error> for Error {
    fn from(error: figment::Error) -> Self {
        Self::Config(Box::new(error))
    }
}

/// A `Result` defaulting to [`Error`]
pub type Result<T, E = Error> = std::result::Result<T, E>;
