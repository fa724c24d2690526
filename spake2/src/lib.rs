#![no_std]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]
#![doc(
    html_logo_url = "https://raw.githubusercontent.com/RustCrypto/meta/master/logo.svg",
    html_favicon_url = "https://raw.githubusercontent.com/RustCrypto/meta/master/logo.svg"
)]
#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

//! # Usage
//!
//! Alice and Bob both initialize their SPAKE2 sessions with the same (weak)
//! password. They exchange one message each to (hopefully) derive a shared
//! secret key.
//!
//! There are two roles in the SPAKE2 protocol, "A" and "B". The two sides
//! must agree ahead of time which one will play which role (the messages
//! they generate depend upon which side they play). The role is chosen by
//! the constructor: `new_a()` / `start_a()` on one computer, and
//! `new_b()` / `start_b()` on the other. There is no default role.
//!
//! A session is a small state machine:
//!
//! ```text
//! Initialized --start()--> MessageSent --finish()--> Finished
//!      |                        |
//!      +------------------------+-----(any error)--> Failed
//! ```
//!
//! `start()` hands out the outbound message, which you must send to your
//! partner. Once you receive the partner's message, pass it to `finish()`
//! and you get back the shared [`SessionKey`]. A session completes at most
//! once: calling `finish()` twice, or before `start()`, is reported as
//! [`Error::IllegalState`], and a session that failed stays failed.
//!
//! The password and identity strings must each be wrapped in a "newtype",
//! which is a simple `struct` that protects against swapping the different
//! types of bytestrings.
//!
//! Thus a client-side program starts with:
//!
//! ```rust
//! use spake2::{Ed25519Group, Identity, Password, Spake2};
//! # fn send(msg: &[u8]) {}
//! # fn main() -> spake2::Result<()> {
//! let (mut s1, outbound_msg) = Spake2::<Ed25519Group>::start_a(
//!    &Password::new(b"password"),
//!    &Identity::new(b"client id string"),
//!    &Identity::new(b"server id string"))?;
//! send(&outbound_msg);
//!
//! # fn receive() -> Vec<u8> { let (_s2, i2) = Spake2::<Ed25519Group>::start_b(&Password::new(b"password"), &Identity::new(b"client id string"), &Identity::new(b"server id string")).unwrap(); i2 }
//! let inbound_msg = receive();
//! let key1 = s1.finish(&inbound_msg)?;
//! # Ok(())
//! # }
//! ```
//!
//! while the server-side might do:
//!
//! ```rust
//! # fn send(msg: &[u8]) {}
//! use spake2::{Config, Ed25519Group, Identity, Password, Spake2};
//! # fn main() -> spake2::Result<()> {
//! let mut s2 = Spake2::<Ed25519Group>::new_b(
//!    &Password::new(b"password"),
//!    &Identity::new(b"client id string"),
//!    &Identity::new(b"server id string"),
//!    Config::default())?;
//! let outbound_msg = s2.start()?;
//! send(&outbound_msg);
//!
//! # fn receive() -> Vec<u8> { let (_s1, i1) = Spake2::<Ed25519Group>::start_a(&Password::new(b"password"), &Identity::new(b"client id string"), &Identity::new(b"server id string")).unwrap(); i1 }
//! let inbound_msg = receive();
//! let key2 = s2.finish(&inbound_msg)?;
//! # Ok(())
//! # }
//! ```
//!
//! If both sides used the same password, and there is no man-in-the-middle,
//! then `key1` and `key2` will be identical. If not, the two sides will get
//! different keys. When one side encrypts with `key1`, and the other side
//! attempts to decrypt with `key2`, they'll get nothing but garbled noise.
//!
//! The shared key can be used as an HMAC key to provide data integrity on
//! subsequent messages, or as an authenticated-encryption key (e.g.
//! nacl.secretbox). It can also be fed into [HKDF][1] to derive other
//! session keys as necessary.
//!
//! # Symmetric Usage
//!
//! For egalitarian protocols with no clear way to assign roles ahead of
//! time, use `start_symmetric()` (or `new_symmetric()`) on both sides. This
//! uses a different blinding element (so it is not interoperable with
//! `start_a` or `start_b`), but otherwise behaves the same way. The
//! symmetric mode uses only one identity string, not two. A symmetric
//! session that receives its own message back fails with
//! [`Error::ReflectionDetected`].
//!
//! Carol does:
//!
//! ```rust
//! # fn send(msg: &[u8]) {}
//! use spake2::{Ed25519Group, Identity, Password, Spake2};
//! # fn main() -> spake2::Result<()> {
//! let (mut s1, outbound_msg) = Spake2::<Ed25519Group>::start_symmetric(
//!    &Password::new(b"password"),
//!    &Identity::new(b"shared id string"))?;
//! send(&outbound_msg);
//!
//! # fn receive() -> Vec<u8> { let (_s2, i2) = Spake2::<Ed25519Group>::start_symmetric(&Password::new(b"password"), &Identity::new(b"shared id string")).unwrap(); i2 }
//! let inbound_msg = receive();
//! let key1 = s1.finish(&inbound_msg)?;
//! # Ok(())
//! # }
//! ```
//!
//! Dave does exactly the same.
//!
//! # Identifier Strings
//!
//! The SPAKE2 protocol includes a pair of "identity strings" `idA` and `idB`
//! that are included in the final key-derivation hash. This binds the key to a
//! single pair of parties, or for some specific purpose.
//!
//! For example, when user "alice" logs into "example.com", both sides should set
//! `idA = b"alice"` and `idB = b"example.com"`. This prevents an attacker from
//! substituting messages from unrelated login sessions (other users on the same
//! server, or other servers for the same user).
//!
//! `start_symmetric` uses a single `idSymmetric=` string, instead of `idA`
//! and `idB`. Both sides must provide the same `idSymmetric=`, or leave it
//! empty.
//!
//! # Key Schedule
//!
//! By default the session key is `HKDF-SHA256` over the protocol transcript,
//! 32 bytes long; [`Config`] selects another length through [`Kdf::Hkdf`].
//! [`Kdf::Legacy`] derives the SHA-256 transcript hash used by the python
//! `spake2` package (and magic-wormhole) for byte-compatible keys. Both sides
//! must use the same schedule.
//!
//! # Wire Format
//!
//! Every message is a one-byte side tag (`0x41` 'A', `0x42` 'B', `0x53` 'S')
//! followed by the 32-byte compressed Edwards-Y encoding of the blinded
//! element. Inbound elements must be canonical, non-identity points of the
//! prime-order subgroup.
//!
//! # Security
//!
//! Secret scalars are processed with the constant-time arithmetic of
//! `curve25519-dalek`, and are zeroized when a session finishes, fails, or is
//! dropped. Passwords and session keys are zeroized on drop and compared in
//! constant time.
//!
//! This library depends upon a strong source of random numbers. Ephemeral
//! scalars are rejection-sampled; an RNG that errors or keeps producing
//! unusable output is reported as [`Error::InsecureEntropy`].
//!
//! # History
//!
//! The protocol was described as "PAKE2" in ["cryptobook"] [2] from Dan Boneh
//! and Victor Shoup. This is a form of "SPAKE2", defined by Abdalla and
//! Pointcheval at [RSA 2005] [3]. Additional recommendations for groups and
//! distinguished elements were published in [Ladd's IETF draft] [4].
//!
//! The "arbitrary element" computation, which must be the same for both
//! participants, is the one from python-spake2[5].
//!
//! ### footnotes
//!
//! [1]: https://tools.ietf.org/html/rfc5869 "HKDF"
//! [2]: http://crypto.stanford.edu/~dabo/cryptobook/  "cryptobook"
//! [3]: http://www.di.ens.fr/~pointche/Documents/Papers/2005_rsa.pdf "RSA 2005"
//! [4]: https://tools.ietf.org/html/draft-ladd-spake2-01 "Ladd's IETF draft"
//! [5]: https://github.com/warner/python-spake2

#[allow(unused_imports)]
#[macro_use]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

mod config;
mod ed25519;
mod error;
mod group;
mod kdf;


pub use self::{
    config::Config,
    ed25519::Ed25519Group,
    error::{Error, Result},
    group::Group,
    kdf::{Kdf, SessionKey, DEFAULT_KEY_LENGTH, MAX_KEY_LENGTH},
};

use alloc::vec::Vec;
use core::{fmt, ops::Deref, str};
use rand_core::{CryptoRng, RngCore};
use subtle::{Choice, ConstantTimeEq};
use zeroize::{Zeroize, Zeroizing};

#[cfg(feature = "getrandom")]
use rand_core::OsRng;

/// Password, zeroized on drop.
#[derive(Clone)]
pub struct Password(Zeroizing<Vec<u8>>);

impl Password {
    /// Create a new password.
    pub fn new(p: impl AsRef<[u8]>) -> Password {
        Password(Zeroizing::new(p.as_ref().to_vec()))
    }
}

impl Deref for Password {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl ConstantTimeEq for Password {
    fn ct_eq(&self, other: &Self) -> Choice {
        self.0.as_slice().ct_eq(other.0.as_slice())
    }
}

impl PartialEq for Password {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other).into()
    }
}

impl Eq for Password {}

impl fmt::Debug for Password {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.write_str("Password([REDACTED])")
    }
}

/// SPAKE2 identity.
#[derive(PartialEq, Eq, Clone, Default)]
pub struct Identity(Vec<u8>);

impl Deref for Identity {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl Identity {
    /// Create a new identity.
    pub fn new(p: impl AsRef<[u8]>) -> Identity {
        Identity(p.as_ref().to_vec())
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "Identity{:?}", MaybeUtf8(&self.0))
    }
}

/// Side of a SPAKE2 exchange.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Side {
    /// Side "A", blinds with `M`
    A,
    /// Side "B", blinds with `N`
    B,
    /// Either side of a symmetric exchange, blinds with `S`
    Symmetric,
}

impl Side {
    fn tag(self) -> u8 {
        match self {
            Side::A => 0x41,         // 'A'
            Side::B => 0x42,         // 'B'
            Side::Symmetric => 0x53, // 'S'
        }
    }

    fn peer_tag(self) -> u8 {
        match self {
            Side::A => Side::B.tag(),
            Side::B => Side::A.tag(),
            Side::Symmetric => Side::Symmetric.tag(),
        }
    }

    /// Element masking our password contribution.
    fn blinding<G: Group>(self) -> G::Element {
        match self {
            Side::A => G::const_m(),
            Side::B => G::const_n(),
            Side::Symmetric => G::const_s(),
        }
    }

    /// Element masking the peer's password contribution.
    fn unblinding<G: Group>(self) -> G::Element {
        match self {
            Side::A => G::const_n(),
            Side::B => G::const_m(),
            Side::Symmetric => G::const_s(),
        }
    }
}

/// Lifecycle of a [`Spake2`] session. Transitions only move forward.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum State {
    /// Constructed, outbound message not handed out yet
    Initialized,
    /// `start()` returned the outbound message
    MessageSent,
    /// `finish()` derived the session key
    Finished,
    /// An operation failed; the session is unusable
    Failed,
}

/// SPAKE2 algorithm.
pub struct Spake2<G: Group> {
    side: Side,
    state: State,
    config: Config,
    xy_scalar: Zeroizing<G::Scalar>,
    password_scalar: Zeroizing<G::Scalar>,
    password_digest: Zeroizing<[u8; 32]>,
    id_a: Identity,
    id_b: Identity,
    id_s: Identity,
    msg1: Vec<u8>,
}

impl<G: Group> Spake2<G> {
    /// Create a session with identity `idA`.
    ///
    /// Uses the system RNG.
    #[cfg(feature = "getrandom")]
    #[cfg_attr(docsrs, doc(cfg(feature = "getrandom")))]
    pub fn new_a(
        password: &Password,
        id_a: &Identity,
        id_b: &Identity,
        config: Config,
    ) -> Result<Spake2<G>> {
        Self::new_a_with_rng(password, id_a, id_b, config, OsRng)
    }

    /// Create a session with identity `idB`.
    ///
    /// Uses the system RNG.
    #[cfg(feature = "getrandom")]
    #[cfg_attr(docsrs, doc(cfg(feature = "getrandom")))]
    pub fn new_b(
        password: &Password,
        id_a: &Identity,
        id_b: &Identity,
        config: Config,
    ) -> Result<Spake2<G>> {
        Self::new_b_with_rng(password, id_a, id_b, config, OsRng)
    }

    /// Create a symmetric session.
    ///
    /// Uses the system RNG.
    #[cfg(feature = "getrandom")]
    #[cfg_attr(docsrs, doc(cfg(feature = "getrandom")))]
    pub fn new_symmetric(password: &Password, id_s: &Identity, config: Config) -> Result<Spake2<G>> {
        Self::new_symmetric_with_rng(password, id_s, config, OsRng)
    }

    /// Create a session with identity `idA` and the provided cryptographically
    /// secure RNG.
    pub fn new_a_with_rng(
        password: &Password,
        id_a: &Identity,
        id_b: &Identity,
        config: Config,
        mut csrng: impl CryptoRng + RngCore,
    ) -> Result<Spake2<G>> {
        Self::new_internal(
            Side::A,
            password,
            id_a,
            id_b,
            &Identity::default(),
            config,
            &mut csrng,
        )
    }

    /// Create a session with identity `idB` and the provided cryptographically
    /// secure RNG.
    pub fn new_b_with_rng(
        password: &Password,
        id_a: &Identity,
        id_b: &Identity,
        config: Config,
        mut csrng: impl CryptoRng + RngCore,
    ) -> Result<Spake2<G>> {
        Self::new_internal(
            Side::B,
            password,
            id_a,
            id_b,
            &Identity::default(),
            config,
            &mut csrng,
        )
    }

    /// Create a symmetric session with the provided cryptographically secure
    /// RNG.
    pub fn new_symmetric_with_rng(
        password: &Password,
        id_s: &Identity,
        config: Config,
        mut csrng: impl CryptoRng + RngCore,
    ) -> Result<Spake2<G>> {
        Self::new_internal(
            Side::Symmetric,
            password,
            &Identity::default(),
            &Identity::default(),
            id_s,
            config,
            &mut csrng,
        )
    }

    /// Start with identity `idA` and the default [`Config`].
    ///
    /// Returns the session, ready for [`finish`](Self::finish), and the
    /// message to send to side B. Uses the system RNG.
    #[cfg(feature = "getrandom")]
    #[cfg_attr(docsrs, doc(cfg(feature = "getrandom")))]
    pub fn start_a(
        password: &Password,
        id_a: &Identity,
        id_b: &Identity,
    ) -> Result<(Spake2<G>, Vec<u8>)> {
        Self::start_a_with_rng(password, id_a, id_b, OsRng)
    }

    /// Start with identity `idB` and the default [`Config`].
    ///
    /// Uses the system RNG.
    #[cfg(feature = "getrandom")]
    #[cfg_attr(docsrs, doc(cfg(feature = "getrandom")))]
    pub fn start_b(
        password: &Password,
        id_a: &Identity,
        id_b: &Identity,
    ) -> Result<(Spake2<G>, Vec<u8>)> {
        Self::start_b_with_rng(password, id_a, id_b, OsRng)
    }

    /// Start with symmetric identity and the default [`Config`].
    ///
    /// Uses the system RNG.
    #[cfg(feature = "getrandom")]
    #[cfg_attr(docsrs, doc(cfg(feature = "getrandom")))]
    pub fn start_symmetric(password: &Password, id_s: &Identity) -> Result<(Spake2<G>, Vec<u8>)> {
        Self::start_symmetric_with_rng(password, id_s, OsRng)
    }

    /// Start with identity `idA` and the provided cryptographically secure RNG.
    pub fn start_a_with_rng(
        password: &Password,
        id_a: &Identity,
        id_b: &Identity,
        csrng: impl CryptoRng + RngCore,
    ) -> Result<(Spake2<G>, Vec<u8>)> {
        Self::new_a_with_rng(password, id_a, id_b, Config::default(), csrng)?.started()
    }

    /// Start with identity `idB` and the provided cryptographically secure RNG.
    pub fn start_b_with_rng(
        password: &Password,
        id_a: &Identity,
        id_b: &Identity,
        csrng: impl CryptoRng + RngCore,
    ) -> Result<(Spake2<G>, Vec<u8>)> {
        Self::new_b_with_rng(password, id_a, id_b, Config::default(), csrng)?.started()
    }

    /// Start with symmetric identity and the provided cryptographically secure RNG.
    pub fn start_symmetric_with_rng(
        password: &Password,
        id_s: &Identity,
        csrng: impl CryptoRng + RngCore,
    ) -> Result<(Spake2<G>, Vec<u8>)> {
        Self::new_symmetric_with_rng(password, id_s, Config::default(), csrng)?.started()
    }

    /// Side this session plays.
    pub fn side(&self) -> Side {
        self.side
    }

    /// Current session state.
    pub fn state(&self) -> State {
        self.state
    }

    /// Configuration the session was created with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Hand out the outbound message.
    ///
    /// Only valid once, on a freshly constructed session.
    pub fn start(&mut self) -> Result<Vec<u8>> {
        if self.state != State::Initialized {
            return Err(self.illegal_state());
        }

        self.state = State::MessageSent;

        let mut msg_and_side = Vec::with_capacity(1 + self.msg1.len());
        msg_and_side.push(self.side.tag());
        msg_and_side.extend_from_slice(&self.msg1);
        Ok(msg_and_side)
    }

    /// Finish SPAKE2.
    ///
    /// Consumes the peer's message and derives the session key. The session
    /// ends up [`State::Finished`] on success and [`State::Failed`] on any
    /// error; either way its secrets are wiped.
    pub fn finish(&mut self, msg2: &[u8]) -> Result<SessionKey> {
        if self.state != State::MessageSent {
            return Err(self.illegal_state());
        }

        let result = self.derive_key(msg2);
        self.state = match result {
            Ok(_) => State::Finished,
            Err(_) => State::Failed,
        };
        self.wipe();
        result
    }

    fn started(mut self) -> Result<(Spake2<G>, Vec<u8>)> {
        let msg = self.start()?;
        Ok((self, msg))
    }

    fn derive_key(&self, msg2: &[u8]) -> Result<SessionKey> {
        if msg2.len() != 1 + G::element_length() {
            return Err(Error::InvalidEncoding);
        }
        let (msg_side, msg2_bytes) = (msg2[0], &msg2[1..]);

        if msg2_bytes == self.msg1.as_slice() {
            return Err(Error::ReflectionDetected);
        }

        if msg_side != self.side.peer_tag() {
            return Err(Error::BadSide);
        }

        let msg2_element = G::bytes_to_element(msg2_bytes)?;

        // a: K = (Y+N*(-pw))*x
        // b: K = (X+M*(-pw))*y
        // sym: K = (Y+S*(-pw))*x
        let neg_password_scalar = Zeroizing::new(G::scalar_neg(&self.password_scalar));
        let tmp1 = Zeroizing::new(G::scalarmult(
            &self.side.unblinding::<G>(),
            &neg_password_scalar,
        ));
        let tmp2 = Zeroizing::new(G::add(&msg2_element, &tmp1));
        let key_element = Zeroizing::new(G::scalarmult(&tmp2, &self.xy_scalar));
        let key_bytes = Zeroizing::new(G::element_to_bytes(&key_element));

        let transcript = match self.side {
            Side::A => kdf::transcript_ab(
                &self.password_digest,
                &self.id_a,
                &self.id_b,
                &self.msg1,
                msg2_bytes,
                &key_bytes,
            ),
            Side::B => kdf::transcript_ab(
                &self.password_digest,
                &self.id_a,
                &self.id_b,
                msg2_bytes,
                &self.msg1,
                &key_bytes,
            ),
            Side::Symmetric => kdf::transcript_symmetric(
                &self.password_digest,
                &self.id_s,
                &self.msg1,
                msg2_bytes,
                &key_bytes,
            ),
        };

        self.config.kdf.derive(G::name(), &transcript)
    }

    fn new_internal(
        side: Side,
        password: &Password,
        id_a: &Identity,
        id_b: &Identity,
        id_s: &Identity,
        config: Config,
        csrng: &mut (impl CryptoRng + RngCore),
    ) -> Result<Spake2<G>> {
        config.validate(password)?;

        let password_scalar = Zeroizing::new(G::password_to_scalar(password));
        let xy_scalar = G::random_scalar(csrng)?;

        Ok(Self::with_scalars(
            side,
            password,
            id_a,
            id_b,
            id_s,
            config,
            password_scalar,
            xy_scalar,
        ))
    }

    #[allow(clippy::too_many_arguments)]
    fn with_scalars(
        side: Side,
        password: &Password,
        id_a: &Identity,
        id_b: &Identity,
        id_s: &Identity,
        config: Config,
        password_scalar: Zeroizing<G::Scalar>,
        xy_scalar: Zeroizing<G::Scalar>,
    ) -> Spake2<G> {
        // a: X = B*x + M*pw
        // b: Y = B*y + N*pw
        // sym: X = B*x + S*pw
        let ephemeral = Zeroizing::new(G::basepoint_mult(&xy_scalar));
        let blinding = Zeroizing::new(G::scalarmult(&side.blinding::<G>(), &password_scalar));
        let m1 = G::add(&ephemeral, &blinding);
        let msg1 = G::element_to_bytes(&m1);

        Spake2 {
            side,
            state: State::Initialized,
            config,
            xy_scalar,
            password_scalar,
            password_digest: kdf::password_digest(password),
            id_a: id_a.clone(),
            id_b: id_b.clone(),
            id_s: id_s.clone(),
            msg1,
        }
    }

    /// Out-of-sequence call. A live session is poisoned; a finished or
    /// failed one keeps its state.
    fn illegal_state(&mut self) -> Error {
        if matches!(self.state, State::Initialized | State::MessageSent) {
            self.state = State::Failed;
            self.wipe();
        }
        Error::IllegalState
    }

    fn wipe(&mut self) {
        self.xy_scalar.zeroize();
        self.password_scalar.zeroize();
        self.password_digest.zeroize();
    }
}

impl<G: Group> fmt::Debug for Spake2<G> {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.debug_struct("SPAKE2")
            .field("group", &G::name())
            .field("side", &self.side)
            .field("state", &self.state)
            .field("idA", &MaybeUtf8(&self.id_a))
            .field("idB", &MaybeUtf8(&self.id_b))
            .field("idS", &MaybeUtf8(&self.id_s))
            .finish()
    }
}

struct MaybeUtf8<'a>(&'a [u8]);

impl fmt::Debug for MaybeUtf8<'_> {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Ok(s) = str::from_utf8(self.0) {
            write!(fmt, "(s={})", s)
        } else {
            write!(fmt, "(hex=")?;

            for byte in self.0 {
                write!(fmt, "{:02x}", byte)?;
            }

            write!(fmt, ")")
        }
    }
}
