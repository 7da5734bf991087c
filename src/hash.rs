use k256::{
    elliptic_curve::{bigint::ArrayEncoding, ops::Reduce, sec1::FromEncodedPoint},
    AffinePoint, EncodedPoint, FieldBytes, FieldElement, Scalar, U256,
};
use tiny_keccak::{Hasher, Sha3};

use crate::{
    encode::{concat, Item},
    Error, Result,
};

/// How many x-coordinate candidates try-and-increment examines before
/// giving up. Roughly half of all field elements are valid x-coordinates,
/// so 256 misses in a row will not happen on honest inputs.
pub const MAX_MAP_TO_CURVE_ATTEMPTS: usize = 256;

const FIELD_MODULUS: U256 =
    U256::from_be_hex("FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEFFFFFC2F");

/// Output of `hash_to_scalar`: the SHA3-256 digest read as an unreduced
/// big-endian 256-bit integer.
///
/// Challenges are stored and compared verbatim. They are reduced mod the
/// group order only at the point where they enter scalar arithmetic, via
/// [`Challenge::to_scalar`]. Reducing eagerly would still self-verify but
/// would not interoperate with signatures that transmit `c0` unreduced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Challenge(pub [u8; 32]);

impl Challenge {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// The challenge as a scalar mod the group order.
    pub fn to_scalar(&self) -> Scalar {
        let bytes: FieldBytes = self.0.into();
        <Scalar as Reduce<U256>>::reduce_bytes(&bytes)
    }
}

/// `H1`: hashes the items to an integer with SHA3-256 over their canonical
/// encoding.
pub fn hash_to_scalar(items: &[Item]) -> Result<Challenge> {
    let encoded = concat(items)?;
    let mut sha3 = Sha3::v256();
    sha3.update(&encoded);
    let mut digest = [0u8; 32];
    sha3.finalize(&mut digest);
    Ok(Challenge(digest))
}

/// `H2`: hashes the items to a curve point by try-and-increment. The digest
/// seeds an x-coordinate candidate; candidates are stepped by one until
/// `x^3 + 7` has a square root, and the principal root becomes y.
pub fn hash_to_curve(items: &[Item]) -> Result<AffinePoint> {
    let mut x = digest_to_field(&hash_to_scalar(items)?)?;

    for _ in 0..MAX_MAP_TO_CURVE_ATTEMPTS {
        let f = (x * x * x + FieldElement::from(7u64)).normalize();
        let y = f.sqrt();
        if bool::from(y.is_some()) {
            let y = y.unwrap().normalize();
            let encoded =
                EncodedPoint::from_affine_coordinates(&x.to_bytes(), &y.to_bytes(), false);
            let point = AffinePoint::from_encoded_point(&encoded);
            if bool::from(point.is_some()) {
                return Ok(point.unwrap());
            }
        }
        x = (x + FieldElement::ONE).normalize();
    }

    Err(Error::HashToCurveDiverged)
}

// The digest is below 2^256 < 2p, so at most one subtraction of p is needed
// to land in the field.
fn digest_to_field(digest: &Challenge) -> Result<FieldElement> {
    let n = U256::from_be_byte_array(digest.0.into());
    let n = if n < FIELD_MODULUS {
        n
    } else {
        n.wrapping_sub(&FIELD_MODULUS)
    };
    let fe = FieldElement::from_bytes(&n.to_be_byte_array());
    if bool::from(fe.is_some()) {
        Ok(fe.unwrap())
    } else {
        Err(Error::HashToCurveDiverged)
    }
}
