use ethnum::U256;
use ff::PrimeField;

use crate::{Base, Element};

impl Element {
    /// The modulus of the underlying prime field (the BN254 scalar field)
    pub const MODULUS: Element = Element(U256::from_words(
        0x3064_4e72_e131_a029_b850_45b6_8181_585d,
        0x2833_e848_79b9_7091_43e1_f593_f000_0001,
    ));

    /// Convert this [`Element`] to its equivalent [`Base`] representation
    ///
    /// Values greater than or equal to [`Element::MODULUS`] are reduced first
    #[inline]
    #[must_use]
    pub fn to_base(self) -> Base {
        let mut canonical = self;
        canonical.canonicalize();

        let u8s = canonical.0.to_le_bytes();
        Base::from_raw(u8s_to_u64(u8s))
    }

    /// Create an [`Element`] from a [`Base`]
    #[inline]
    #[must_use]
    pub fn from_base(base: Base) -> Element {
        let u8s = base.to_repr();
        Self(U256::from_le_bytes(u8s))
    }

    /// Reduce this element to its canonical form, i.e. apply the modulus
    ///
    /// Elements in canonical form are guaranteed to be unchanged when converting to/from a [`Base`]
    #[inline]
    pub fn canonicalize(&mut self) {
        self.0 %= Self::MODULUS.0;
    }

    /// Whether this [`Element`] is smaller than [`Element::MODULUS`]
    #[inline]
    #[must_use]
    pub fn is_canonical(&self) -> bool {
        *self < Self::MODULUS
    }
}

impl From<Base> for Element {
    fn from(value: Base) -> Self {
        Element::from_base(value)
    }
}

impl From<Element> for Base {
    fn from(value: Element) -> Self {
        value.to_base()
    }
}

fn u8s_to_u64(u8s: [u8; 32]) -> [u64; 4] {
    core::array::from_fn(|i| {
        let mut limb = [0; 8];
        limb.copy_from_slice(&u8s[i * 8..(i + 1) * 8]);
        u64::from_le_bytes(limb)
    })
}
