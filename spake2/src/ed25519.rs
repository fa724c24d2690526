//! "Edwards25519" elliptic curve group.

mod element;
mod scalar;

use crate::{Group, Result};
use alloc::vec::Vec;
use curve25519_dalek::{
    constants::ED25519_BASEPOINT_POINT, edwards::EdwardsPoint, scalar::Scalar, traits::Identity,
};
use hkdf::Hkdf;
use rand_core::{CryptoRng, RngCore};
use sha2::Sha256;
use zeroize::Zeroizing;

/// Ed25519 elliptic curve group.
///
/// Elements are points of the prime-order subgroup, encoded as 32-byte
/// compressed Edwards-Y. Scalars are 32-byte little-endian integers mod `L`.
#[derive(Debug, PartialEq, Eq)]
pub struct Ed25519Group;

impl Group for Ed25519Group {
    type Scalar = Scalar;
    type Element = EdwardsPoint;

    fn name() -> &'static str {
        "Ed25519"
    }

    fn order() -> &'static [u8] {
        &scalar::ORDER
    }

    fn scalar_length() -> usize {
        scalar::SCALAR_LENGTH
    }

    fn element_length() -> usize {
        element::ELEMENT_LENGTH
    }

    fn base() -> EdwardsPoint {
        ED25519_BASEPOINT_POINT
    }

    fn zero() -> EdwardsPoint {
        EdwardsPoint::identity()
    }

    fn const_m() -> EdwardsPoint {
        element::pinned(&element::M_BYTES)
    }

    fn const_n() -> EdwardsPoint {
        element::pinned(&element::N_BYTES)
    }

    fn const_s() -> EdwardsPoint {
        element::pinned(&element::S_BYTES)
    }

    fn random_scalar<T>(csprng: &mut T) -> Result<Zeroizing<Scalar>>
    where
        T: RngCore + CryptoRng,
    {
        scalar::random_scalar(csprng)
    }

    fn scalar_to_bytes(s: &Scalar) -> Vec<u8> {
        scalar::scalar_to_bytes(s).to_vec()
    }

    fn bytes_to_scalar(b: &[u8]) -> Result<Scalar> {
        scalar::bytes_to_scalar(b)
    }

    fn password_to_scalar(pw: &[u8]) -> Scalar {
        scalar::password_to_scalar(pw)
    }

    fn arbitrary_element(seed: &[u8]) -> EdwardsPoint {
        element::arbitrary_element(seed)
    }

    fn scalar_neg(s: &Scalar) -> Scalar {
        -s
    }

    fn element_to_bytes(e: &EdwardsPoint) -> Vec<u8> {
        element::element_to_bytes(e).to_vec()
    }

    fn bytes_to_element(b: &[u8]) -> Result<EdwardsPoint> {
        element::bytes_to_element(b)
    }

    fn basepoint_mult(s: &Scalar) -> EdwardsPoint {
        EdwardsPoint::mul_base(s)
    }

    fn scalarmult(e: &EdwardsPoint, s: &Scalar) -> EdwardsPoint {
        e * s
    }

    fn add(a: &EdwardsPoint, b: &EdwardsPoint) -> EdwardsPoint {
        a + b
    }
}

/// `HKDF-SHA256` with an empty salt, filling `okm`.
///
/// Only used with short fixed-size outputs, far below the 8160-byte limit.
fn hkdf_sha256(ikm: &[u8], info: &[u8], okm: &mut [u8]) {
    Hkdf::<Sha256>::new(Some(b""), ikm)
        .expand(info, okm)
        .expect("output length within HKDF-SHA256 limit");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn sizes() {
        assert_eq!(Ed25519Group::scalar_length(), 32);
        assert_eq!(Ed25519Group::element_length(), 32);
        assert_eq!(Ed25519Group::order().len(), Ed25519Group::scalar_length());
    }

    #[test]
    fn order_annihilates_base() {
        // (L - 1) * B + B == 0
        let mut l_minus_one = scalar::ORDER;
        l_minus_one[0] -= 1;
        let s = Ed25519Group::bytes_to_scalar(&l_minus_one).unwrap();
        let p = Ed25519Group::basepoint_mult(&s);
        assert_eq!(Ed25519Group::add(&p, &Ed25519Group::base()), Ed25519Group::zero());
    }

    #[test]
    fn fixed_and_variable_base_agree() {
        let s = Ed25519Group::password_to_scalar(b"password");
        assert_eq!(
            Ed25519Group::basepoint_mult(&s),
            Ed25519Group::scalarmult(&Ed25519Group::base(), &s)
        );
    }

    #[test]
    fn negation_cancels_blinding() {
        let pw = Ed25519Group::password_to_scalar(b"password");
        let m = Ed25519Group::const_m();
        let blinded = Ed25519Group::scalarmult(&m, &pw);
        let unblinded = Ed25519Group::scalarmult(&m, &Ed25519Group::scalar_neg(&pw));
        assert_eq!(Ed25519Group::add(&blinded, &unblinded), Ed25519Group::zero());
    }

    #[test]
    fn blinding_elements_are_distinct() {
        let m = Ed25519Group::const_m();
        let n = Ed25519Group::const_n();
        let s = Ed25519Group::const_s();
        assert_ne!(m, n);
        assert_ne!(m, s);
        assert_ne!(n, s);
        assert_ne!(m, Ed25519Group::base());
    }

    #[test]
    fn zeroized_element_is_identity() {
        use zeroize::Zeroize;

        let pw = Ed25519Group::password_to_scalar(b"password");
        let mut e = Ed25519Group::basepoint_mult(&pw);
        e.zeroize();
        assert_eq!(e, Ed25519Group::zero());
    }

    #[test]
    fn zero_is_not_a_valid_message_element() {
        let zero = Ed25519Group::element_to_bytes(&Ed25519Group::zero());
        assert_eq!(
            Ed25519Group::bytes_to_element(&zero),
            Err(Error::InvalidPoint)
        );
    }
}
