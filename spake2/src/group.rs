//! Group trait.

use crate::Result;
use alloc::vec::Vec;
use rand_core::{CryptoRng, RngCore};
use zeroize::{Zeroize, Zeroizing};

/// Prime-order group used by the SPAKE2 engine.
///
/// Bundles scalar arithmetic, element arithmetic and the two derived
/// operations SPAKE2 needs: mapping a password to a scalar, and deriving an
/// element of unknown discrete log from a public seed. Both derived
/// operations must be deterministic so that the two sides of an exchange
/// agree on their outputs.
pub trait Group {
    /// Scalar modulo the group order
    type Scalar: Copy + Zeroize;

    /// Group element
    type Element: Zeroize;

    /// Name, also mixed into the session key schedule
    fn name() -> &'static str;

    /// Group order as little-endian bytes
    fn order() -> &'static [u8];

    /// Length of an encoded scalar
    fn scalar_length() -> usize;

    /// Length of an encoded element
    fn element_length() -> usize;

    /// Generator
    fn base() -> Self::Element;

    /// Identity element
    fn zero() -> Self::Element;

    /// `m` constant, blinding element of side A
    fn const_m() -> Self::Element;

    /// `n` constant, blinding element of side B
    fn const_n() -> Self::Element;

    /// `s` constant, blinding element of the symmetric mode
    fn const_s() -> Self::Element;

    /// Generate a uniformly random non-zero scalar, wiped on drop.
    ///
    /// Fails with [`Error::InsecureEntropy`](crate::Error::InsecureEntropy)
    /// if the RNG reports an error or keeps producing unusable output.
    fn random_scalar<T>(csprng: &mut T) -> Result<Zeroizing<Self::Scalar>>
    where
        T: RngCore + CryptoRng;

    /// Fixed-width little-endian scalar encoding
    fn scalar_to_bytes(s: &Self::Scalar) -> Vec<u8>;

    /// Decode a canonical fixed-width little-endian scalar
    fn bytes_to_scalar(b: &[u8]) -> Result<Self::Scalar>;

    /// Deterministically map a password to a scalar
    fn password_to_scalar(pw: &[u8]) -> Self::Scalar;

    /// Deterministically derive an element of unknown discrete log from `seed`
    fn arbitrary_element(seed: &[u8]) -> Self::Element;

    /// Scalar negation
    fn scalar_neg(s: &Self::Scalar) -> Self::Scalar;

    /// Canonical element encoding
    fn element_to_bytes(e: &Self::Element) -> Vec<u8>;

    /// Decode and validate an element.
    ///
    /// Must reject anything that is not the canonical encoding of a
    /// prime-order subgroup element other than the identity.
    fn bytes_to_element(b: &[u8]) -> Result<Self::Element>;

    /// Fixed-base scalar multiplication
    fn basepoint_mult(s: &Self::Scalar) -> Self::Element;

    /// Variable-base scalar multiplication
    fn scalarmult(e: &Self::Element, s: &Self::Scalar) -> Self::Element;

    /// Group operation
    fn add(a: &Self::Element, b: &Self::Element) -> Self::Element;
}
