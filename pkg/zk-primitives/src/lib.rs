#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::match_bool)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]
#![deny(missing_docs)]

//! Field elements and the MiMC-Feistel hash used by the indexed Merkle tree

mod element;
mod hash;
mod path;

#[cfg(feature = "test-api")]
pub use hash::{hash_count, reset_hash_count};

pub use element::Element;
pub use hash::{hash_merge, permute, round_constants, ROUNDS};
pub use path::compute_merkle_root;

/// The base element used by cryptographic operations on the tree
///
/// This is (roughly) an integer modulo `p` where `p` is [`Element::MODULUS`], the scalar field of
/// the BN254 curve
pub type Base = halo2curves::bn256::Fr;
