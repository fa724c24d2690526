//! Edwards25519 group elements.

use super::hkdf_sha256;
use crate::{Error, Result};
use curve25519_dalek::{
    edwards::{CompressedEdwardsY, EdwardsPoint},
    traits::Identity,
};
use num_bigint::BigUint;

/// Length of an encoded element.
pub(crate) const ELEMENT_LENGTH: usize = 32;

const ARBITRARY_ELEMENT_INFO: &[u8] = b"SPAKE2 arbitrary element";

// Blinding elements, `arbitrary_element(b"M")`, `(b"N")` and `(b"symmetric")`.
// Pinned so both sides agree with every other implementation.

/// 15cfd18e385952982b6a8f8c7854963b58e34388c8e6dae891db756481a02312
pub(crate) const M_BYTES: [u8; ELEMENT_LENGTH] = [
    0x15, 0xcf, 0xd1, 0x8e, 0x38, 0x59, 0x52, 0x98, 0x2b, 0x6a, 0x8f, 0x8c, 0x78, 0x54, 0x96, 0x3b,
    0x58, 0xe3, 0x43, 0x88, 0xc8, 0xe6, 0xda, 0xe8, 0x91, 0xdb, 0x75, 0x64, 0x81, 0xa0, 0x23, 0x12,
];

/// f04f2e7eb734b2a8f8b472eaf9c3c632576ac64aea650b496a8a20ff00e583c3
pub(crate) const N_BYTES: [u8; ELEMENT_LENGTH] = [
    0xf0, 0x4f, 0x2e, 0x7e, 0xb7, 0x34, 0xb2, 0xa8, 0xf8, 0xb4, 0x72, 0xea, 0xf9, 0xc3, 0xc6, 0x32,
    0x57, 0x6a, 0xc6, 0x4a, 0xea, 0x65, 0x0b, 0x49, 0x6a, 0x8a, 0x20, 0xff, 0x00, 0xe5, 0x83, 0xc3,
];

/// 6f00dae87c1be1a73b5922ef431cd8f57879569c222d22b1cd71e8546ab8e6f1
pub(crate) const S_BYTES: [u8; ELEMENT_LENGTH] = [
    0x6f, 0x00, 0xda, 0xe8, 0x7c, 0x1b, 0xe1, 0xa7, 0x3b, 0x59, 0x22, 0xef, 0x43, 0x1c, 0xd8, 0xf5,
    0x78, 0x79, 0x56, 0x9c, 0x22, 0x2d, 0x22, 0xb1, 0xcd, 0x71, 0xe8, 0x54, 0x6a, 0xb8, 0xe6, 0xf1,
];

pub(crate) fn pinned(bytes: &[u8; ELEMENT_LENGTH]) -> EdwardsPoint {
    CompressedEdwardsY(*bytes)
        .decompress()
        .expect("pinned blinding elements are valid points")
}

pub(crate) fn element_to_bytes(e: &EdwardsPoint) -> [u8; ELEMENT_LENGTH] {
    e.compress().to_bytes()
}

/// Decode an element, accepting only canonical encodings of non-identity
/// points in the prime-order subgroup.
pub(crate) fn bytes_to_element(b: &[u8]) -> Result<EdwardsPoint> {
    let bytes: [u8; ELEMENT_LENGTH] = b.try_into().map_err(|_| Error::InvalidEncoding)?;
    let compressed = CompressedEdwardsY(bytes);
    let point = compressed.decompress().ok_or(Error::InvalidPoint)?;

    // decompress() reduces y mod p and ignores the sign bit when x = 0
    if point.compress() != compressed {
        return Err(Error::InvalidPoint);
    }

    if point.is_small_order() || !point.is_torsion_free() {
        return Err(Error::InvalidPoint);
    }

    Ok(point)
}

/// Derive an element of unknown discrete log from a public seed.
///
/// The seed is expanded with `HKDF-SHA256(salt="", info="SPAKE2 arbitrary
/// element")` to 48 bytes, read as a big-endian integer and reduced mod `p`
/// to get a candidate `y`. Successive `y, y+1, ...` are tried until one
/// decompresses (with even `x`); the point is then multiplied by the
/// cofactor, skipping the low-order points that land on the identity.
pub(crate) fn arbitrary_element(seed: &[u8]) -> EdwardsPoint {
    let mut okm = [0u8; ELEMENT_LENGTH + 16];
    hkdf_sha256(seed, ARBITRARY_ELEMENT_INFO, &mut okm);

    let p = field_modulus();
    let mut y = BigUint::from_bytes_be(&okm) % &p;

    loop {
        if let Some(point) = decompress_y(&y) {
            let point = point.mul_by_cofactor();
            if point != EdwardsPoint::identity() {
                debug_assert!(point.is_torsion_free());
                return point;
            }
        }
        y = (y + 1u32) % &p;
    }
}

/// `p = 2^255 - 19`
fn field_modulus() -> BigUint {
    (BigUint::from(1u32) << 255u32) - 19u32
}

fn decompress_y(y: &BigUint) -> Option<EdwardsPoint> {
    let le = y.to_bytes_le();
    let mut bytes = [0u8; ELEMENT_LENGTH];
    bytes[..le.len()].copy_from_slice(&le);
    CompressedEdwardsY(bytes).decompress()
}
