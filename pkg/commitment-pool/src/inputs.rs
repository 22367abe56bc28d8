use zk_primitives::Element;

use crate::{Error, Result};

/// The public inputs of a commitment proof, in the order the proof commits to them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublicInputs {
    /// The token being deposited, must be non-zero
    pub token_address: Element,
    /// The deposited amount, must be non-zero and match the attached value
    pub amount: Element,
    /// The commitment inserted into the tree for the note itself
    pub main_tree_commitment: Element,
    /// The commitment inserted into the tree for the nonce, spendable once
    pub nonce_commitment: Element,
    /// The amount, encrypted for the recipient
    pub encrypted_amount: Element,
    /// The token address, encrypted for the recipient
    pub encrypted_token_address: Element,
    /// The recipient's personal root, encrypted
    pub encrypted_personal_root: Element,
}

impl PublicInputs {
    /// The number of public inputs
    pub const LEN: usize = 7;

    /// Read the public inputs from a slice
    ///
    /// ```rust
    /// # use commitment_pool::*;
    /// # use zk_primitives::Element;
    /// let elements: Vec<_> = (1..=7).map(Element::new).collect();
    /// let inputs = PublicInputs::from_slice(&elements).unwrap();
    ///
    /// assert_eq!(inputs.amount, Element::new(2));
    /// assert_eq!(inputs.to_array().as_slice(), elements);
    ///
    /// assert!(PublicInputs::from_slice(&elements[..6]).is_err());
    /// ```
    pub fn from_slice(inputs: &[Element]) -> Result<Self> {
        let &[
            token_address,
            amount,
            main_tree_commitment,
            nonce_commitment,
            encrypted_amount,
            encrypted_token_address,
            encrypted_personal_root,
        ] = inputs
        else {
            return Err(Error::InvalidInputShape {
                expected: Self::LEN,
                actual: inputs.len(),
            });
        };

        Ok(Self {
            token_address,
            amount,
            main_tree_commitment,
            nonce_commitment,
            encrypted_amount,
            encrypted_token_address,
            encrypted_personal_root,
        })
    }

    /// The public inputs in proof order
    #[must_use]
    pub fn to_array(&self) -> [Element; Self::LEN] {
        [
            self.token_address,
            self.amount,
            self.main_tree_commitment,
            self.nonce_commitment,
            self.encrypted_amount,
            self.encrypted_token_address,
            self.encrypted_personal_root,
        ]
    }
}
