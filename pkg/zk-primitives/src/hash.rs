use std::sync::OnceLock;

use sha3::{Digest, Keccak256};

use crate::{Base, Element};

/// The number of Feistel rounds applied by [`permute`]
pub const ROUNDS: usize = 220;

/// The seed from which the round constants are derived
const CONSTANTS_SEED: &[u8] = b"mimcsponge";

#[cfg(feature = "test-api")]
static HASH_COUNTER: core::sync::atomic::AtomicUsize = core::sync::atomic::AtomicUsize::new(0);

/// The number of times [`permute`] has been called
#[cfg(feature = "test-api")]
pub fn hash_count() -> usize {
    HASH_COUNTER.load(core::sync::atomic::Ordering::Relaxed)
}

/// Reset the count returned by [`hash_count`] to 0
#[cfg(feature = "test-api")]
pub fn reset_hash_count() {
    HASH_COUNTER.store(0, core::sync::atomic::Ordering::Relaxed);
}

/// The round constants of the permutation
///
/// The first and last constants are zero. Every other constant is the next link of a keccak256
/// chain seeded with `"mimcsponge"`, reduced modulo [`Element::MODULUS`]:
///  - `digest_0 = keccak256("mimcsponge")`
///  - `digest_i = keccak256(digest_{i - 1})`
///  - `round_constants()[i] = digest_i mod p`
///
/// These are the MiMCSponge constants, so hashes produced here agree with any other MiMCSponge
/// implementation over BN254.
///
/// The chain is computed on first use and cached, so calls after the first are free.
///
/// ```rust
/// # use zk_primitives::*;
/// let constants = round_constants();
///
/// assert_eq!(constants.len(), ROUNDS);
/// assert_eq!(constants[0], Element::ZERO);
/// assert_eq!(constants[ROUNDS - 1], Element::ZERO);
/// ```
#[must_use]
pub fn round_constants() -> &'static [Element; ROUNDS] {
    static CONSTANTS: OnceLock<[Element; ROUNDS]> = OnceLock::new();

    CONSTANTS.get_or_init(|| {
        let mut constants = [Element::ZERO; ROUNDS];
        let mut digest: [u8; 32] = Keccak256::digest(CONSTANTS_SEED).into();

        for constant in &mut constants[1..ROUNDS - 1] {
            digest = Keccak256::digest(digest).into();

            let mut element = Element::from_be_bytes(digest);
            element.canonicalize();
            *constant = element;
        }

        constants
    })
}

fn base_constants() -> &'static [Base; ROUNDS] {
    static CONSTANTS: OnceLock<[Base; ROUNDS]> = OnceLock::new();

    CONSTANTS.get_or_init(|| (*round_constants()).map(Element::to_base))
}

/// Apply the MiMC-Feistel permutation to a pair of elements
///
/// Each round computes `t = x_l + c_i` and mixes `t^5` into the right half before swapping the
/// halves. The final round does not swap. Both inputs are reduced modulo [`Element::MODULUS`]
/// first, so the outputs are always canonical.
///
/// ```rust
/// # use zk_primitives::*;
/// let a = permute(Element::new(1), Element::new(2));
/// let b = permute(Element::new(1), Element::new(2));
///
/// // no state, no randomness
/// assert_eq!(a, b);
/// assert_ne!(a, permute(Element::new(2), Element::new(1)));
/// ```
#[must_use]
pub fn permute(left: Element, right: Element) -> (Element, Element) {
    #[cfg(feature = "test-api")]
    HASH_COUNTER.fetch_add(1, core::sync::atomic::Ordering::Relaxed);

    let mut x_l = left.to_base();
    let mut x_r = right.to_base();

    for (round, constant) in base_constants().iter().enumerate() {
        let t = x_l + *constant;
        let t2 = t * t;
        let t5 = t2 * t2 * t;

        if round < ROUNDS - 1 {
            (x_l, x_r) = (x_r + t5, x_l);
        } else {
            x_r += t5;
        }
    }

    (Element::from_base(x_l), Element::from_base(x_r))
}

/// Hash two elements together
///
/// This is the left output of [`permute`], and is used to calculate the hash of a parent node
/// from the hashes of its children, i.e.: `parent_hash = hash_merge([left_hash, right_hash])`
///
/// ```rust
/// # use zk_primitives::*;
/// let a = hash_merge([Element::new(1), Element::new(2)]);
/// let b = hash_merge([Element::new(1), Element::new(3)]);
///
/// assert_ne!(a, b);
/// assert_eq!(a, permute(Element::new(1), Element::new(2)).0);
/// ```
/// This operation is not symmetric:
/// ```rust
/// # use zk_primitives::*;
/// let a = Element::new(1);
/// let b = Element::new(2);
///
/// assert_ne!(hash_merge([a, b]), hash_merge([b, a]));
/// ```
#[inline]
#[must_use]
pub fn hash_merge([left, right]: [Element; 2]) -> Element {
    permute(left, right).0
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use proptest::prelude::ProptestConfig;
    use rand_chacha::{rand_core::SeedableRng, ChaChaRng};
    use test_strategy::proptest;

    use super::*;

    fn hex(s: &str) -> Element {
        Element::from_str(s).unwrap()
    }

    #[test]
    fn round_constants_match_mimc_sponge() {
        let constants = round_constants();

        assert_eq!(
            constants[1],
            Element::from_dec_str(
                "7120861356467848435263064379192047478074060781135320967663101236819528304084"
            )
            .unwrap()
        );
        assert_eq!(
            constants[2],
            Element::from_dec_str(
                "5024705281721889198577876690145313457398658950011302225525409148828000436681"
            )
            .unwrap()
        );
        assert_eq!(
            constants[3],
            Element::from_dec_str(
                "17980351014018068290387269214713820287804403312720763401943303895585469787384"
            )
            .unwrap()
        );
        assert_eq!(
            constants[218].to_hex(),
            "04af9e46dbc42b94137981fece56e9775d00fc101129f08fd6b781f439c20c0b"
        );

        assert!(constants.iter().all(Element::is_canonical));
    }

    #[test]
    fn permute_known_answers() {
        let (l, r) = permute(Element::ZERO, Element::ZERO);
        assert_eq!(
            l,
            hex("0x2027777a0db985664a19a476fa41bb311a34bf30e70eade27d3eb7ff691dba40")
        );
        assert_eq!(
            r,
            hex("0x2ecb76d9e45ae78bd3a2c416f313eca956284a9af91217709228db73c56a8aa7")
        );

        let (l, r) = permute(Element::new(1), Element::new(2));
        assert_eq!(
            l,
            hex("0x29332b2bad024b96ae4482a1e1fc5ab172b954b5990cae754792046e45b61116")
        );
        assert_eq!(
            r,
            hex("0x2a51638a43a6219a4fd46f1a6437e39e9574275020d18c1d7de4c0788bf0dd59")
        );
    }

    #[test]
    fn inputs_are_reduced_before_permuting() {
        let reduced = permute(Element::ONE, Element::new(2));
        let unreduced = permute(Element::ONE + Element::MODULUS, Element::new(2));

        assert_eq!(reduced, unreduced);
    }

    #[test]
    fn distinct_random_inputs_give_distinct_hashes() {
        let mut rng = ChaChaRng::from_seed([0; 32]);
        let mut seen = std::collections::HashSet::new();

        for _ in 0..32 {
            let left = Element::secure_random(&mut rng);
            let right = Element::secure_random(&mut rng);
            assert!(seen.insert(hash_merge([left, right])));
        }
    }

    #[proptest(ProptestConfig { cases: 16, ..ProptestConfig::default() })]
    fn permute_is_deterministic(left: Element, right: Element) {
        assert_eq!(permute(left, right), permute(left, right));
    }

    #[proptest(ProptestConfig { cases: 16, ..ProptestConfig::default() })]
    fn outputs_are_canonical(left: Element, right: Element) {
        let (l, r) = permute(left, right);

        assert!(l.is_canonical());
        assert!(r.is_canonical());
    }
}
