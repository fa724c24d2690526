//! Session key derivation.
//!
//! Both sides hash the same fixed-layout transcript. For the asymmetric
//! sides the layout is ordered by role:
//!
//! ```text
//! SHA256(pw) || SHA256(idA) || SHA256(idB) || X_msg || Y_msg || K
//! ```
//!
//! where `X_msg` is always the message of side A. The symmetric mode has no
//! roles, so its two messages are sorted bytewise instead:
//!
//! ```text
//! SHA256(pw) || SHA256(idS) || min(X_msg, Y_msg) || max(X_msg, Y_msg) || K
//! ```

use crate::{Error, Result};
use alloc::vec::Vec;
use core::{fmt, ops::Deref};
use hkdf::Hkdf;
use sha2::{Digest, Sha256};
use subtle::{Choice, ConstantTimeEq};
use zeroize::{Zeroize, Zeroizing};

/// Default session key length in bytes.
pub const DEFAULT_KEY_LENGTH: usize = 32;

/// Largest session key HKDF-SHA256 can produce.
pub const MAX_KEY_LENGTH: usize = 255 * 32;

const SESSION_KEY_INFO: &[u8] = b"SPAKE2 session key";

/// Session key schedule.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Kdf {
    /// HKDF-SHA256 over `"SPAKE2-" || group name || "-v1" || transcript`,
    /// expanded to `length` bytes.
    Hkdf {
        /// Session key length, `1..=MAX_KEY_LENGTH`
        length: usize,
    },

    /// SHA-256 of the transcript, always 32 bytes. Interoperates with the
    /// python `spake2` package and magic-wormhole.
    Legacy,
}

impl Default for Kdf {
    fn default() -> Self {
        Kdf::Hkdf {
            length: DEFAULT_KEY_LENGTH,
        }
    }
}

impl Kdf {
    /// Length of the keys this schedule derives.
    pub fn key_length(&self) -> usize {
        match self {
            Kdf::Hkdf { length } => *length,
            Kdf::Legacy => 32,
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        match self {
            Kdf::Hkdf { length } if *length == 0 || *length > MAX_KEY_LENGTH => {
                Err(Error::InvalidKeyLength)
            }
            _ => Ok(()),
        }
    }

    pub(crate) fn derive(&self, group_name: &str, transcript: &[u8]) -> Result<SessionKey> {
        match self {
            Kdf::Hkdf { length } => {
                let mut ikm = Zeroizing::new(Vec::with_capacity(
                    b"SPAKE2-".len() + group_name.len() + b"-v1".len() + transcript.len(),
                ));
                ikm.extend_from_slice(b"SPAKE2-");
                ikm.extend_from_slice(group_name.as_bytes());
                ikm.extend_from_slice(b"-v1");
                ikm.extend_from_slice(transcript);

                let mut okm = Zeroizing::new(vec![0u8; *length]);
                Hkdf::<Sha256>::new(Some(b""), &ikm)
                    .expand(SESSION_KEY_INFO, &mut okm)
                    .map_err(|_| Error::InvalidKeyLength)?;
                Ok(SessionKey(okm))
            }
            Kdf::Legacy => {
                let mut digest = Sha256::digest(transcript);
                let key = SessionKey(Zeroizing::new(digest.to_vec()));
                digest.as_mut_slice().zeroize();
                Ok(key)
            }
        }
    }
}

/// `SHA256(pw)`, the password's slot in the transcript.
pub(crate) fn password_digest(password: &[u8]) -> Zeroizing<[u8; 32]> {
    let mut hash = Sha256::digest(password);
    let mut digest = Zeroizing::new([0u8; 32]);
    digest.copy_from_slice(&hash);
    hash.as_mut_slice().zeroize();
    digest
}

/// Transcript of an A/B exchange. `first_msg` is always side A's element.
pub(crate) fn transcript_ab(
    password_digest: &[u8; 32],
    id_a: &[u8],
    id_b: &[u8],
    first_msg: &[u8],
    second_msg: &[u8],
    key_bytes: &[u8],
) -> Zeroizing<Vec<u8>> {
    let mut transcript = Zeroizing::new(Vec::with_capacity(
        3 * 32 + first_msg.len() + second_msg.len() + key_bytes.len(),
    ));
    transcript.extend_from_slice(password_digest);
    transcript.extend_from_slice(&Sha256::digest(id_a));
    transcript.extend_from_slice(&Sha256::digest(id_b));
    transcript.extend_from_slice(first_msg);
    transcript.extend_from_slice(second_msg);
    transcript.extend_from_slice(key_bytes);
    transcript
}

/// Transcript of a symmetric exchange; message order does not matter.
pub(crate) fn transcript_symmetric(
    password_digest: &[u8; 32],
    id_s: &[u8],
    msg_u: &[u8],
    msg_v: &[u8],
    key_bytes: &[u8],
) -> Zeroizing<Vec<u8>> {
    let (first_msg, second_msg) = if msg_u < msg_v {
        (msg_u, msg_v)
    } else {
        (msg_v, msg_u)
    };

    let mut transcript = Zeroizing::new(Vec::with_capacity(
        2 * 32 + first_msg.len() + second_msg.len() + key_bytes.len(),
    ));
    transcript.extend_from_slice(password_digest);
    transcript.extend_from_slice(&Sha256::digest(id_s));
    transcript.extend_from_slice(first_msg);
    transcript.extend_from_slice(second_msg);
    transcript.extend_from_slice(key_bytes);
    transcript
}

/// Shared session key produced by [`Spake2::finish`](crate::Spake2::finish).
///
/// Zeroized on drop. Equality is constant-time.
#[derive(Clone)]
pub struct SessionKey(Zeroizing<Vec<u8>>);

impl SessionKey {
    /// Key bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Copy the key out. The copy is not zeroized on drop.
    pub fn to_vec(&self) -> Vec<u8> {
        self.0.to_vec()
    }
}

impl AsRef<[u8]> for SessionKey {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl Deref for SessionKey {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl ConstantTimeEq for SessionKey {
    fn ct_eq(&self, other: &Self) -> Choice {
        self.as_bytes().ct_eq(other.as_bytes())
    }
}

impl PartialEq for SessionKey {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other).into()
    }
}

impl Eq for SessionKey {}

impl fmt::Debug for SessionKey {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "SessionKey([REDACTED; {}])", self.0.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const X: &[u8] = b"XXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXX";
    const Y: &[u8] = b"YYYYYYYYYYYYYYYYYYYYYYYYYYYYYYYY";
    const K: &[u8] = b"KKKKKKKKKKKKKKKKKKKKKKKKKKKKKKKK";

    #[test]
    fn test_hash_ab() {
        let transcript = transcript_ab(&password_digest(b"pw"), b"idA", b"idB", X, Y, K);
        assert_eq!(transcript.len(), 6 * 32);
        let key = Kdf::Legacy.derive("Ed25519", &transcript).unwrap();
        let expected_key = "d59d9ba920f7092565cec747b08d5b2e981d553ac32fde0f25e5b4a4cfca3efd";
        assert_eq!(hex::encode(key.as_bytes()), expected_key);
    }

    #[test]
    fn test_hash_symmetric() {
        let transcript = transcript_symmetric(&password_digest(b"pw"), b"idSymmetric", X, Y, K);
        assert_eq!(transcript.len(), 5 * 32);
        let key = Kdf::Legacy.derive("Ed25519", &transcript).unwrap();
        let expected_key = "b0b31e4401aae37d91a9a8bf6fbb1298cafc005ff9142e3ffc5b9799fb11128b";
        assert_eq!(hex::encode(key.as_bytes()), expected_key);
    }

    #[test]
    fn test_hkdf_ab() {
        let transcript = transcript_ab(&password_digest(b"pw"), b"idA", b"idB", X, Y, K);
        let key = Kdf::default().derive("Ed25519", &transcript).unwrap();
        assert_eq!(
            hex::encode(key.as_bytes()),
            "65b9d34426dba5bda4b443d2728a5fbac8aa35b2a73ac2feae8eed685ec85e78"
        );
    }

    #[test]
    fn symmetric_transcript_ignores_message_order() {
        let pw = password_digest(b"pw");
        assert_eq!(
            *transcript_symmetric(&pw, b"idS", X, Y, K),
            *transcript_symmetric(&pw, b"idS", Y, X, K)
        );
    }

    #[test]
    fn asymmetric_transcript_keeps_role_order() {
        let pw = password_digest(b"pw");
        assert_ne!(
            *transcript_ab(&pw, b"idA", b"idB", X, Y, K),
            *transcript_ab(&pw, b"idA", b"idB", Y, X, K)
        );
    }

    #[test]
    fn group_name_separates_keys() {
        let transcript = transcript_ab(&password_digest(b"pw"), b"idA", b"idB", X, Y, K);
        let kdf = Kdf::default();
        assert_ne!(
            kdf.derive("Ed25519", &transcript).unwrap(),
            kdf.derive("Ristretto255", &transcript).unwrap()
        );
    }

    #[test]
    fn key_length_is_configurable() {
        let transcript = transcript_ab(&password_digest(b"pw"), b"idA", b"idB", X, Y, K);
        let short = Kdf::Hkdf { length: 16 }.derive("Ed25519", &transcript).unwrap();
        let long = Kdf::Hkdf { length: 64 }.derive("Ed25519", &transcript).unwrap();
        assert_eq!(short.len(), 16);
        assert_eq!(long.len(), 64);
        // HKDF output is prefix-stable
        assert_eq!(&long[..16], short.as_bytes());
        assert_eq!(Kdf::Legacy.key_length(), 32);
    }

    #[test]
    fn validate_rejects_out_of_range_lengths() {
        assert_eq!(Kdf::Hkdf { length: 0 }.validate(), Err(Error::InvalidKeyLength));
        assert_eq!(
            Kdf::Hkdf {
                length: MAX_KEY_LENGTH + 1
            }
            .validate(),
            Err(Error::InvalidKeyLength)
        );
        assert!(Kdf::Hkdf {
            length: MAX_KEY_LENGTH
        }
        .validate()
        .is_ok());
        assert!(Kdf::Legacy.validate().is_ok());
    }

    #[test]
    fn session_key_buffer_is_wiped() {
        let mut key = Kdf::Legacy
            .derive("Ed25519", &transcript_ab(&password_digest(b"pw"), b"idA", b"idB", X, Y, K))
            .unwrap();
        assert_eq!(key.len(), 32);
        key.0.zeroize();
        assert!(key.is_empty());

        let mut transcript = transcript_symmetric(&password_digest(b"pw"), b"idS", X, Y, K);
        transcript.zeroize();
        assert!(transcript.is_empty());
    }

    #[test]
    fn session_key_debug_is_redacted() {
        let key = SessionKey(Zeroizing::new(vec![0x41; 32]));
        assert_eq!(format!("{:?}", key), "SessionKey([REDACTED; 32])");
    }
}
