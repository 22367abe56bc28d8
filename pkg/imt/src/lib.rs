#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::match_bool)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::single_match_else)]
#![deny(missing_docs)]

//! # IMT (**I**ndexed **M**erkle **T**ree)
//!
//! A fixed-capacity, append-only indexed Merkle tree over a MiMC-Feistel hash, plus a registry of
//! every root the tree has ever had.
//!
//! Every [`Leaf`] stores a `key` and a `value`, and also a pointer to the leaf holding the next
//! largest key. The leaves therefore form a sorted linked list layered over the insertion-ordered
//! slots of the tree, which makes it possible to prove that a key is **absent**: find the leaf
//! whose key is just below it, and show that its successor's key is above it.
//!
//! ```rust
//! # use imt::*;
//! let mut tree = IndexedTree::<NoopHashCache>::new();
//!
//! let (idx, root) = tree.insert_leaf(100, Element::new(1)).unwrap();
//! assert_eq!(idx, 0);
//! assert_eq!(root, tree.root());
//!
//! tree.insert_leaf(300, Element::new(2)).unwrap();
//!
//! // prove that 100 is in the tree
//! let proof = tree.generate_proof(0).unwrap();
//! assert!(tree.verify_proof(&proof));
//!
//! // and that 150 is not
//! assert!(tree.verify_exclusion_proof(150, &proof));
//! assert!(!tree.verify_exclusion_proof(300, &proof));
//! ```
//!
//! ## Capacity
//!
//! A tree holds at most [`CAPACITY`] leaves. Once it is full, every insert fails with
//! [`Error::CapacityExhausted`], and a new tree is needed.
//!
//! ## Root hash
//!
//! The root is computed over the smallest complete binary tree that fits the current leaves, with
//! unused slots holding [`empty_leaf_hash`]. A tree with zero or one leaves has a root equal to
//! the hash of its first slot. [`IndexedTree::verify_proof`] checks proofs against the current
//! root, so a proof stops verifying as soon as another leaf is inserted.
//!
//! ## History
//!
//! [`HistoricalTree`] wraps an [`IndexedTree`] and records every distinct root it produces, so that
//! a proof against an older root can still be accepted by
//! [`HistoricalTree::verify_historical_proof`].

mod error;
mod event;
mod hash;
/// Caching of hash values
pub mod hash_cache;
mod history;
mod leaf;
mod macros;
mod tree;

pub use error::{Error, Result};
pub use event::TreeEvent;
pub use hash::empty_leaf_hash;
pub use hash_cache::{HashCache, NoopHashCache, SimpleHashCache};
pub use history::{
    Clock, FixedClock, HistoricalRoot, HistoricalTree, HistorySnapshot, SystemClock,
};
pub use leaf::Leaf;
pub use tree::{IndexedTree, Proof, SortedLeaves, State, TreeSnapshot, CAPACITY, MAX_TREE_DEPTH};
pub use zk_primitives::*;
