//! Per-session configuration.

use crate::{Error, Kdf, Result};

/// Session policy, fixed when a [`Spake2`](crate::Spake2) session is
/// constructed.
///
/// Both sides of an exchange must use the same [`Kdf`], or they will derive
/// different keys.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Config {
    /// Accept an empty password. Off by default.
    pub allow_empty_password: bool,

    /// Session key schedule.
    pub kdf: Kdf,
}

impl Config {
    /// Config with the python `spake2` compatible key schedule.
    pub fn legacy() -> Self {
        Config {
            kdf: Kdf::Legacy,
            ..Default::default()
        }
    }

    pub(crate) fn validate(&self, password: &[u8]) -> Result<()> {
        if password.is_empty() && !self.allow_empty_password {
            return Err(Error::EmptyPassword);
        }

        self.kdf.validate()
    }
}
