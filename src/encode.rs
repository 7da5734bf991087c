use k256::{
    elliptic_curve::{bigint::ArrayEncoding, group::Curve, sec1::ToEncodedPoint},
    AffinePoint, ProjectivePoint, U256,
};

use crate::{Error, Result};

/// One input to the hash layer. The closed set of variants is the whole
/// encoding contract: anything else must be converted into one of these
/// before it can be hashed.
#[derive(Clone, Debug)]
pub enum Item {
    /// Unsigned integer, encoded as exactly 32 big-endian bytes.
    Int(U256),
    /// Raw bytes, copied through verbatim.
    Bytes(Vec<u8>),
    /// Affine curve point, encoded as `x || y` with 32 bytes per coordinate.
    Point(AffinePoint),
    /// Sublist, flattened recursively with no framing.
    List(Vec<Item>),
}

impl Item {
    /// Builds an integer item from up to 32 big-endian bytes.
    pub fn int_from_be_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() > 32 {
            return Err(Error::OversizeInteger);
        }
        let mut buf = [0u8; 32];
        buf[32 - bytes.len()..].copy_from_slice(bytes);
        Ok(Item::Int(U256::from_be_byte_array(buf.into())))
    }

    /// A ring of public keys as a single list item.
    pub fn ring(keys: &[AffinePoint]) -> Self {
        Item::List(keys.iter().copied().map(Item::Point).collect())
    }

    fn encode_into(&self, out: &mut Vec<u8>) -> Result<()> {
        match self {
            Item::Int(n) => out.extend_from_slice(&n.to_be_byte_array()),
            Item::Bytes(bytes) => out.extend_from_slice(bytes),
            Item::Point(point) => {
                let encoded = point.to_encoded_point(false);
                match (encoded.x(), encoded.y()) {
                    (Some(x), Some(y)) => {
                        out.extend_from_slice(x);
                        out.extend_from_slice(y);
                    }
                    _ => return Err(Error::IdentityPointEncoding),
                }
            }
            Item::List(items) => {
                for item in items {
                    item.encode_into(out)?;
                }
            }
        }
        Ok(())
    }
}

impl From<u64> for Item {
    fn from(n: u64) -> Self {
        Item::Int(U256::from(n))
    }
}

impl From<U256> for Item {
    fn from(n: U256) -> Self {
        Item::Int(n)
    }
}

impl From<&[u8]> for Item {
    fn from(bytes: &[u8]) -> Self {
        Item::Bytes(bytes.to_vec())
    }
}

impl From<Vec<u8>> for Item {
    fn from(bytes: Vec<u8>) -> Self {
        Item::Bytes(bytes)
    }
}

impl From<&str> for Item {
    fn from(text: &str) -> Self {
        Item::Bytes(text.as_bytes().to_vec())
    }
}

impl From<AffinePoint> for Item {
    fn from(point: AffinePoint) -> Self {
        Item::Point(point)
    }
}

impl From<ProjectivePoint> for Item {
    fn from(point: ProjectivePoint) -> Self {
        Item::Point(point.to_affine())
    }
}

impl From<Vec<Item>> for Item {
    fn from(items: Vec<Item>) -> Self {
        Item::List(items)
    }
}

/// Serializes the items into one byte string, in list order, with no
/// separators or length prefixes. Concatenation carries no framing:
/// `concat(&[a, b])` equals `concat(&[a])` followed by `concat(&[b])`.
/// Callers fix the input structure by always hashing the same shape.
pub fn concat(items: &[Item]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    for item in items {
        item.encode_into(&mut out)?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_are_fixed_width_big_endian() {
        let bytes = concat(&[Item::from(1u64)]).unwrap();
        let mut expected = [0u8; 32];
        expected[31] = 1;
        assert_eq!(bytes, expected);

        let bytes = concat(&[Item::from(0x0102u64)]).unwrap();
        assert_eq!(bytes.len(), 32);
        assert_eq!(&bytes[30..], &[0x01, 0x02]);
    }

    #[test]
    fn wide_integer_bytes_are_rejected() {
        assert_eq!(
            Item::int_from_be_bytes(&[0xff; 33]).unwrap_err(),
            Error::OversizeInteger
        );

        let item = Item::int_from_be_bytes(&[0xff; 32]).unwrap();
        assert_eq!(concat(&[item]).unwrap(), vec![0xff; 32]);

        let item = Item::int_from_be_bytes(&[0x07]).unwrap();
        let bytes = concat(&[item]).unwrap();
        assert_eq!(bytes[..31], [0u8; 31]);
        assert_eq!(bytes[31], 0x07);
    }

    #[test]
    fn points_encode_as_both_coordinates() {
        let generator = AffinePoint::GENERATOR;
        let bytes = concat(&[Item::from(generator)]).unwrap();
        let sec1 = generator.to_encoded_point(false);
        assert_eq!(bytes.len(), 64);
        assert_eq!(&bytes[..32], sec1.x().unwrap().as_slice());
        assert_eq!(&bytes[32..], sec1.y().unwrap().as_slice());
    }

    #[test]
    fn identity_point_is_an_error() {
        assert_eq!(
            concat(&[Item::Point(AffinePoint::IDENTITY)]).unwrap_err(),
            Error::IdentityPointEncoding
        );
    }

    #[test]
    fn text_passes_through_as_utf8() {
        let bytes = concat(&[Item::from("ring")]).unwrap();
        assert_eq!(bytes, b"ring");
    }

    #[test]
    fn lists_flatten_without_framing() {
        let a = Item::from(3u64);
        let b = Item::from("m");
        let nested = concat(&[Item::List(vec![a.clone(), b.clone()])]).unwrap();
        let flat = concat(&[a.clone(), b.clone()]).unwrap();
        assert_eq!(nested, flat);

        let mut spliced = concat(&[a]).unwrap();
        spliced.extend(concat(&[b]).unwrap());
        assert_eq!(spliced, flat);
    }

    #[test]
    fn encoding_depends_only_on_values() {
        let ring = vec![AffinePoint::GENERATOR; 3];
        let once = concat(&[Item::ring(&ring), Item::from("msg")]).unwrap();
        let again = concat(&[Item::ring(&ring), Item::from("msg")]).unwrap();
        assert_eq!(once, again);
    }
}
