//! Error types.

use core::fmt;

/// [`Result`][`core::result::Result`] type with `spake2`'s [`Error`] type.
pub type Result<T> = core::result::Result<T, Error>;

/// SPAKE2 errors.
#[non_exhaustive]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Error {
    /// Scalar or element bytes have the wrong length, or a scalar is not
    /// reduced modulo the group order.
    InvalidEncoding,

    /// Element bytes do not decode to a canonical point of the prime-order
    /// subgroup.
    InvalidPoint,

    /// The inbound message is our own outbound message.
    ReflectionDetected,

    /// Operation invoked out of sequence, or on a finished or failed session.
    IllegalState,

    /// The entropy source failed or never produced a usable draw.
    InsecureEntropy,

    /// The peer message carries the wrong side tag.
    BadSide,

    /// Empty password rejected by the session [`Config`](crate::Config).
    EmptyPassword,

    /// Requested session key length is not supported by the key schedule.
    InvalidKeyLength,
}

impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidEncoding => fmt.write_str("invalid encoding"),
            Error::InvalidPoint => fmt.write_str("invalid group element"),
            Error::ReflectionDetected => fmt.write_str("reflected message"),
            Error::IllegalState => fmt.write_str("illegal session state"),
            Error::InsecureEntropy => fmt.write_str("entropy source unusable"),
            Error::BadSide => fmt.write_str("bad side"),
            Error::EmptyPassword => fmt.write_str("empty password"),
            Error::InvalidKeyLength => fmt.write_str("invalid session key length"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}
