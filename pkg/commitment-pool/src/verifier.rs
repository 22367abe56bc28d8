use zk_primitives::Element;

/// Checks zero-knowledge proofs for a [`CommitmentPool`]
///
/// The pool only needs a yes or no answer: `Ok(false)` and `Err(_)` are both reported to the
/// caller as [`Error::InvalidProof`].
///
/// [`CommitmentPool`]: crate::CommitmentPool
/// [`Error::InvalidProof`]: crate::Error::InvalidProof
pub trait ProofVerifier: Send + Sync {
    /// Whether `proof` is valid for `public_inputs`
    fn verify(&self, proof: &[u8], public_inputs: &[Element]) -> Result<bool, VerifierError>;
}

/// A verifier could not reach a verdict
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("verifier error: {0}")]
pub struct VerifierError(pub String);

impl<V: ProofVerifier + ?Sized> ProofVerifier for Box<V> {
    fn verify(&self, proof: &[u8], public_inputs: &[Element]) -> Result<bool, VerifierError> {
        (**self).verify(proof, public_inputs)
    }
}
