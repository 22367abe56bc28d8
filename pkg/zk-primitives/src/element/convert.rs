use std::str::FromStr;

use ethnum::U256;

use crate::Element;

macro_rules! from_int_impls {
    ($t:ty) => {
        impl From<$t> for Element {
            #[inline]
            fn from(value: $t) -> Self {
                Element(U256::from(value))
            }
        }
    };
}

// leaf slots and keys
from_int_impls!(u32);
from_int_impls!(u64);

impl FromStr for Element {
    type Err = <U256 as FromStr>::Err;

    /// Parse a hex string, with or without a `0x` prefix
    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        Ok(Self(U256::from_str_radix(s, 16)?))
    }
}

impl Element {
    /// Parse a decimal string
    ///
    /// ```rust
    /// # use zk_primitives::*;
    /// let element = Element::from_dec_str("255").unwrap();
    /// assert_eq!(element, Element::new(255));
    /// ```
    #[inline]
    pub fn from_dec_str(s: &str) -> Result<Self, <U256 as FromStr>::Err> {
        Ok(Self(U256::from_str_radix(s, 10)?))
    }

    /// Convert the [`Element`] to its bytes in big-endian format
    ///
    /// ```rust
    /// # use zk_primitives::*;
    /// let element = Element::ONE;
    /// assert_eq!(element.to_be_bytes(), {
    ///     let mut temp = [0; 32];
    ///     temp[31] = 1;
    ///     temp
    /// });
    /// ```
    #[inline]
    #[must_use]
    pub fn to_be_bytes(self) -> [u8; 32] {
        self.0.to_be_bytes()
    }

    /// Convert big-endian bytes into an [`Element`]
    #[inline]
    #[must_use]
    pub fn from_be_bytes(bytes: [u8; 32]) -> Self {
        Self(U256::from_be_bytes(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str() {
        assert_eq!(Element::from_str("0").unwrap(), Element::ZERO);
        assert_eq!(Element::from_str("0x0").unwrap(), Element::ZERO);
        assert_eq!(Element::from_str("0x1").unwrap(), Element::ONE);
        assert_eq!(Element::from_str("0xB").unwrap(), Element::from(11u64));
        assert!(Element::from_str("0xg").is_err());
    }

    #[test]
    fn test_from_dec_str() {
        assert_eq!(Element::from_dec_str("0").unwrap(), Element::ZERO);
        assert_eq!(Element::from_dec_str("1000").unwrap(), Element::new(1000));
        assert!(Element::from_dec_str("12a").is_err());
    }
}
