//! Linkable Spontaneous Anonymous Group (LSAG) signatures over secp256k1,
//! after Liu, Wei and Wong (eprint 2004/027).
//!
//! A signer hidden in a ring of public keys produces `(c0, s, tag)` where the
//! tag is deterministic in `(secret key, ring, message)`, so two signatures by
//! the same key over the same ring and message are linkable without revealing
//! which ring member signed.

use thiserror::Error;

mod encode;
mod hash;
mod lsag;

pub use encode::{concat, Item};
pub use hash::{hash_to_curve, hash_to_scalar, Challenge, MAX_MAP_TO_CURVE_ATTEMPTS};
pub use lsag::{generate_keypair, LsagMaterial, LsagSignature};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    #[error("signer index {0} is outside a ring of {1} keys")]
    InvalidSignerIndex(usize, usize),
    #[error("ring must contain at least one public key")]
    RingTooSmall,
    #[error("signature shape does not match the ring")]
    MalformedSignature,
    #[error("challenge chain does not close")]
    InvalidRingSignature,
    #[error("no curve point found within the candidate limit")]
    HashToCurveDiverged,
    #[error("the identity point has no affine encoding")]
    IdentityPointEncoding,
    #[error("integers wider than 32 bytes cannot be encoded")]
    OversizeInteger,
}
