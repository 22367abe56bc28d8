use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use zk_primitives::Element;

/// The outcome of a successful [`commit_entry`]
///
/// [`commit_entry`]: crate::CommitmentPool::commit_entry
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize,
)]
pub struct CommitmentRecord {
    /// The main tree commitment, which is also the value of its leaf
    pub main_tree_commitment: Element,
    /// The slot of the main tree commitment's leaf
    pub main_leaf_idx: u32,
    /// The root after inserting the main tree commitment
    pub main_root: Element,
    /// The nonce commitment, which is also the value of its leaf
    pub nonce_commitment: Element,
    /// The slot of the nonce commitment's leaf
    pub nonce_leaf_idx: u32,
    /// The root after inserting the nonce commitment
    pub nonce_root: Element,
    /// The position of the latest historical root after both insertions
    pub historical_root_index: usize,
    /// The amount, encrypted for the recipient
    pub encrypted_amount: Element,
    /// The token address, encrypted for the recipient
    pub encrypted_token_address: Element,
    /// The recipient's personal root, encrypted
    pub encrypted_personal_root: Element,
}
