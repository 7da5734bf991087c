use k256::{
    elliptic_curve::{group::Curve, sec1::ToEncodedPoint, Field},
    AffinePoint, ProjectivePoint, Scalar,
};
use rand_core::RngCore;

use crate::{
    encode::Item,
    hash::{hash_to_curve, hash_to_scalar, Challenge},
    Error, Result,
};

/// A signer's view of the ring: the private scalar, the position of the
/// matching public key, and every member's public key in ring order.
///
/// Ring order is part of the signed statement. The signer does not check
/// that `ring[key_index]` matches `secret_key`; a mismatch simply produces
/// a signature that fails to verify.
pub struct LsagMaterial {
    pub secret_key: Scalar,
    pub key_index: usize,
    pub ring: Vec<AffinePoint>,
}

impl LsagMaterial {
    pub fn public_key(&self) -> ProjectivePoint {
        ProjectivePoint::GENERATOR * self.secret_key
    }

    /// Produces `(c0, s, tag)` over the message.
    ///
    /// The key image `h = H2(ring || msg)` anchors the link tag
    /// `tag = secret_key * h`. A random commitment seeds the challenge at
    /// the slot after the signer, the chain is filled around the ring with
    /// random responses, and the signer's own response closes it.
    pub fn sign(&self, msg: &[u8], mut rng: impl RngCore) -> Result<LsagSignature> {
        let n = self.ring.len();
        if n == 0 {
            return Err(Error::RingTooSmall);
        }
        if self.key_index >= n {
            return Err(Error::InvalidSignerIndex(self.key_index, n));
        }

        #[allow(non_snake_case)]
        let G = ProjectivePoint::GENERATOR;

        let h = ProjectivePoint::from(hash_to_curve(&[
            Item::ring(&self.ring),
            Item::from(msg),
        ])?);
        let tag = (h * self.secret_key).to_affine();

        let u = random_nonzero_scalar(&mut rng);
        let mut s: Vec<Scalar> = (0..n).map(|_| random_nonzero_scalar(&mut rng)).collect();
        let mut c: Vec<Challenge> = vec![Challenge::default(); n];

        c[(self.key_index + 1) % n] = c_hash(&self.ring, &tag, msg, G * u, h * u)?;

        for offset in 1..n {
            let i = (self.key_index + offset) % n;
            let ci = c[i].to_scalar();
            let z1 = G * s[i] + ProjectivePoint::from(self.ring[i]) * ci;
            let z2 = h * s[i] + ProjectivePoint::from(tag) * ci;
            c[(i + 1) % n] = c_hash(&self.ring, &tag, msg, z1, z2)?;
        }

        s[self.key_index] = u - self.secret_key * c[self.key_index].to_scalar();

        Ok(LsagSignature { c0: c[0], s, tag })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LsagSignature {
    pub c0: Challenge,
    pub s: Vec<Scalar>,
    pub tag: AffinePoint,
}

impl LsagSignature {
    /// Recomputes the challenge chain from `c0` and accepts iff it closes
    /// back onto `c0`. Malformed input (ring/response length mismatch, an
    /// identity point among the keys or as the tag) is rejected before any
    /// chain work.
    pub fn verify(&self, msg: &[u8], ring: &[AffinePoint]) -> Result<()> {
        let n = ring.len();
        if n == 0 {
            return Err(Error::RingTooSmall);
        }
        if self.s.len() != n {
            return Err(Error::MalformedSignature);
        }
        if self.tag == AffinePoint::IDENTITY || ring.contains(&AffinePoint::IDENTITY) {
            return Err(Error::MalformedSignature);
        }

        #[allow(non_snake_case)]
        let G = ProjectivePoint::GENERATOR;

        let h = ProjectivePoint::from(hash_to_curve(&[Item::ring(ring), Item::from(msg)])?);
        let tag = ProjectivePoint::from(self.tag);

        let mut c = self.c0;
        for (i, y) in ring.iter().enumerate() {
            let ci = c.to_scalar();
            let z1 = G * self.s[i] + ProjectivePoint::from(*y) * ci;
            let z2 = h * self.s[i] + tag * ci;
            c = c_hash(ring, &self.tag, msg, z1, z2)?;
        }

        if c == self.c0 {
            Ok(())
        } else {
            Err(Error::InvalidRingSignature)
        }
    }

    /// Two accepted signatures over the same ring and message carry the same
    /// tag exactly when one private key produced both.
    pub fn links_with(&self, other: &LsagSignature) -> bool {
        self.tag == other.tag
    }

    /// `c0 || s_0 || .. || s_{n-1} || tag_x || tag_y`, 32 bytes per element.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut v = Vec::with_capacity(32 * (self.s.len() + 3));
        v.extend_from_slice(self.c0.as_bytes());
        for s in &self.s {
            v.extend_from_slice(&s.to_bytes());
        }
        v.extend_from_slice(&self.tag.to_encoded_point(false).as_bytes()[1..]);
        v
    }
}

fn c_hash(
    ring: &[AffinePoint],
    tag: &AffinePoint,
    msg: &[u8],
    z1: ProjectivePoint,
    z2: ProjectivePoint,
) -> Result<Challenge> {
    hash_to_scalar(&[
        Item::ring(ring),
        Item::from(*tag),
        Item::from(msg),
        Item::from(z1),
        Item::from(z2),
    ])
}

/// Samples a scalar uniformly from `[1, q)`.
fn random_nonzero_scalar(mut rng: impl RngCore) -> Scalar {
    loop {
        let s = Scalar::random(&mut rng);
        if !bool::from(s.is_zero()) {
            return s;
        }
    }
}

/// A fresh `(secret key, public key)` pair suitable for ring membership.
pub fn generate_keypair(mut rng: impl RngCore) -> (Scalar, AffinePoint) {
    let secret_key = random_nonzero_scalar(&mut rng);
    let public_key = (ProjectivePoint::GENERATOR * secret_key).to_affine();
    (secret_key, public_key)
}
