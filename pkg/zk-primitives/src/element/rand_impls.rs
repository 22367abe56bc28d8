use rand::{CryptoRng, RngCore};

use crate::Element;

impl Element {
    /// Generate a uniformly random canonical [`Element`]
    ///
    /// The rng must be cryptographically secure, since random elements are typically used as
    /// blinding factors for commitments
    ///
    /// ```rust
    /// # use zk_primitives::*;
    /// let element = Element::secure_random(rand::thread_rng());
    /// assert!(element.is_canonical());
    /// ```
    #[must_use]
    pub fn secure_random(mut rng: impl RngCore + CryptoRng) -> Self {
        // rejection sampling keeps the distribution uniform below the modulus
        loop {
            let mut bytes = [0; 32];
            rng.fill_bytes(&mut bytes);

            // the modulus is a 254-bit number
            bytes[0] &= 0b0011_1111;

            let element = Element::from_be_bytes(bytes);
            if element.is_canonical() {
                return element;
            }
        }
    }
}
