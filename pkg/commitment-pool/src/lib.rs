#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]
#![deny(missing_docs)]

//! # Commitment pool
//!
//! The entry point for deposits into an [`imt::HistoricalTree`]. A caller presents a
//! zero-knowledge proof and its public inputs. If an external [`ProofVerifier`] accepts the proof
//! and the inputs pass their checks, the deposit's main tree commitment and nonce commitment are
//! inserted as two leaves, and the nonce can never be used again.
//!
//! ```rust
//! # use commitment_pool::*;
//! # use zk_primitives::Element;
//! struct AcceptAll;
//!
//! impl ProofVerifier for AcceptAll {
//!     fn verify(&self, _: &[u8], _: &[Element]) -> Result<bool, VerifierError> {
//!         Ok(true)
//!     }
//! }
//!
//! let mut pool = CommitmentPool::<imt::SimpleHashCache>::new();
//! pool.set_verifier(AcceptAll);
//!
//! let inputs: Vec<_> = [1, 100, 123, 456, 0, 0, 0].map(Element::new).to_vec();
//! let record = pool.commit_entry(b"proof", &inputs, Element::new(100)).unwrap();
//!
//! assert_eq!((record.main_leaf_idx, record.nonce_leaf_idx), (0, 1));
//! assert!(pool.is_nonce_spent(Element::new(456)));
//!
//! // the same nonce can't be used twice
//! assert!(pool.commit_entry(b"proof", &inputs, Element::new(100)).is_err());
//! ```

mod config;
mod error;
mod inputs;
mod pool;
mod record;
mod verifier;

pub use config::PoolConfig;
pub use error::{Error, Result};
pub use inputs::PublicInputs;
pub use pool::{CommitmentPool, PoolSnapshot};
pub use record::CommitmentRecord;
pub use verifier::{ProofVerifier, VerifierError};
