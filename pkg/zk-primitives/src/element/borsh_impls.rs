use borsh::{BorshDeserialize, BorshSerialize};
use ethnum::U256;

use super::Element;

// big-endian, so the encoding of an element matches `Element::to_be_bytes`
impl BorshSerialize for Element {
    fn serialize<W: std::io::Write>(&self, writer: &mut W) -> std::io::Result<()> {
        self.0.to_be_bytes().serialize(writer)
    }
}

impl BorshDeserialize for Element {
    fn deserialize_reader<R: std::io::Read>(reader: &mut R) -> std::io::Result<Self> {
        let bytes = <[u8; 32]>::deserialize_reader(reader)?;
        Ok(Self(U256::from_be_bytes(bytes)))
    }
}

#[cfg(test)]
mod tests {
    use crate::Element;

    #[test]
    fn borsh_encoding_is_big_endian() {
        let bytes = borsh::to_vec(&Element::ONE).unwrap();

        assert_eq!(bytes.len(), 32);
        assert_eq!(bytes[31], 1);
        assert!(bytes[..31].iter().all(|b| *b == 0));

        let again: Element = borsh::from_slice(&bytes).unwrap();
        assert_eq!(again, Element::ONE);
    }
}
