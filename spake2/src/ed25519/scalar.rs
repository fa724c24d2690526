//! Scalars modulo the order `L` of the Ed25519 prime-order subgroup.

use super::hkdf_sha256;
use crate::{Error, Result};
use curve25519_dalek::scalar::Scalar;
use rand_core::{CryptoRng, RngCore};
use zeroize::{Zeroize, Zeroizing};

/// Length of an encoded scalar.
pub(crate) const SCALAR_LENGTH: usize = 32;

/// `L = 2^252 + 27742317777372353535851937790883648493`, little-endian.
pub(crate) const ORDER: [u8; SCALAR_LENGTH] = [
    0xed, 0xd3, 0xf5, 0x5c, 0x1a, 0x63, 0x12, 0x58, 0xd6, 0x9c, 0xf7, 0xa2, 0xde, 0xf9, 0xde, 0x14,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x10,
];

/// Upper bound on rejected draws before the RNG is considered broken. Each
/// draw is accepted with probability close to 1/2.
const MAX_DRAWS: usize = 64;

const PASSWORD_INFO: &[u8] = b"SPAKE2 pw";

/// Rejection-sample a non-zero scalar in `[1, L)`.
pub(crate) fn random_scalar<T>(csprng: &mut T) -> Result<Zeroizing<Scalar>>
where
    T: RngCore + CryptoRng,
{
    let mut bytes = Zeroizing::new([0u8; SCALAR_LENGTH]);

    for _ in 0..MAX_DRAWS {
        csprng
            .try_fill_bytes(&mut bytes[..])
            .map_err(|_| Error::InsecureEntropy)?;

        // L < 2^253: keep 253 bits so about half of the draws land below L
        bytes[SCALAR_LENGTH - 1] &= 0x1f;

        let mut candidate: Option<Scalar> = Scalar::from_canonical_bytes(*bytes).into();
        let accepted = candidate
            .filter(|s| *s != Scalar::ZERO)
            .map(Zeroizing::new);
        candidate.zeroize();

        if let Some(s) = accepted {
            return Ok(s);
        }
    }

    Err(Error::InsecureEntropy)
}

pub(crate) fn scalar_to_bytes(s: &Scalar) -> [u8; SCALAR_LENGTH] {
    s.to_bytes()
}

pub(crate) fn bytes_to_scalar(b: &[u8]) -> Result<Scalar> {
    let bytes: [u8; SCALAR_LENGTH] = b.try_into().map_err(|_| Error::InvalidEncoding)?;
    Option::from(Scalar::from_canonical_bytes(bytes)).ok_or(Error::InvalidEncoding)
}

/// Map a password to a scalar.
///
/// `HKDF-SHA256(salt="", ikm=pw, info="SPAKE2 pw")` is expanded to 16 bytes
/// more than a scalar, read as a big-endian integer and reduced mod `L`.
pub(crate) fn password_to_scalar(pw: &[u8]) -> Scalar {
    let mut okm = Zeroizing::new([0u8; SCALAR_LENGTH + 16]);
    hkdf_sha256(pw, PASSWORD_INFO, &mut okm[..]);

    // big-endian okm into the low bytes of a little-endian wide buffer
    let mut reducible = Zeroizing::new([0u8; 2 * SCALAR_LENGTH]);
    for (i, x) in okm.iter().rev().enumerate() {
        reducible[i] = *x;
    }

    Scalar::from_bytes_mod_order_wide(&reducible)
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigUint;

    struct ConstantRng(u8);

    impl RngCore for ConstantRng {
        fn next_u32(&mut self) -> u32 {
            u32::from_le_bytes([self.0; 4])
        }

        fn next_u64(&mut self) -> u64 {
            u64::from_le_bytes([self.0; 8])
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            dest.fill(self.0);
        }

        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> core::result::Result<(), rand_core::Error> {
            self.fill_bytes(dest);
            Ok(())
        }
    }

    impl CryptoRng for ConstantRng {}

    #[test]
    fn order_matches_decimal() {
        let l = BigUint::parse_bytes(
            b"7237005577332262213973186563042994240857116359379907606001950938285454250989",
            10,
        )
        .unwrap();
        assert_eq!(BigUint::from_bytes_le(&ORDER), l);
    }

    #[test]
    fn order_is_not_a_canonical_scalar() {
        assert_eq!(bytes_to_scalar(&ORDER), Err(Error::InvalidEncoding));

        let mut l_minus_one = ORDER;
        l_minus_one[0] -= 1;
        let s = bytes_to_scalar(&l_minus_one).unwrap();
        assert_eq!(s + Scalar::ONE, Scalar::ZERO);
    }

    #[test]
    fn bytes_to_scalar_rejects_wrong_length() {
        assert_eq!(bytes_to_scalar(&[1u8; 31]), Err(Error::InvalidEncoding));
        assert_eq!(bytes_to_scalar(&[1u8; 33]), Err(Error::InvalidEncoding));
        assert_eq!(bytes_to_scalar(&[]), Err(Error::InvalidEncoding));
    }

    #[test]
    fn scalar_bytes_are_little_endian() {
        let s = Scalar::from(0x0102u64);
        let bytes = scalar_to_bytes(&s);
        assert_eq!(bytes[0], 0x02);
        assert_eq!(bytes[1], 0x01);
        assert!(bytes[2..].iter().all(|b| *b == 0));
        assert_eq!(bytes_to_scalar(&bytes).unwrap(), s);
    }

    #[test]
    fn random_scalar_accepts_in_range_draw() {
        // 0x01 repeated, top byte masked to 0x01: well below L
        let s = random_scalar(&mut ConstantRng(0x01)).unwrap();
        assert_eq!(scalar_to_bytes(&s), [0x01; SCALAR_LENGTH]);
    }

    #[test]
    fn random_scalar_is_wiped_on_zeroize() {
        let mut s = random_scalar(&mut ConstantRng(0x01)).unwrap();
        s.zeroize();
        assert_eq!(*s, Scalar::ZERO);
    }

    #[test]
    fn random_scalar_gives_up_on_stuck_rng() {
        // every draw masks to 2^253 - 1 > L
        assert_eq!(
            random_scalar(&mut ConstantRng(0xff)),
            Err(Error::InsecureEntropy)
        );
        // every draw is zero
        assert_eq!(
            random_scalar(&mut ConstantRng(0x00)),
            Err(Error::InsecureEntropy)
        );
    }

    #[test]
    fn password_to_scalar_is_deterministic() {
        assert_eq!(password_to_scalar(b"password"), password_to_scalar(b"password"));
        assert_ne!(password_to_scalar(b"password"), password_to_scalar(b"passwore"));
        assert_ne!(password_to_scalar(b""), Scalar::ZERO);
    }
}
