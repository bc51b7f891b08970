use std::{fmt, ops::Deref, str::FromStr};

use crate::Error;

/// Name of the Docker Machine to forward ports from.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MachineName(String);

impl MachineName {
    /// Returns a `MachineName` if the name is non-empty and has no whitespace.
    pub fn new(name: impl Into<String>) -> Result<Self, Error> {
        let name = name.into();
        if name.is_empty() || name.chars().any(char::is_whitespace) {
            Err(Error::MachineNameInvalid { name })
        } else {
            Ok(Self(name))
        }
    }
}

impl Deref for MachineName {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<std::ffi::OsStr> for MachineName {
    fn as_ref(&self) -> &std::ffi::OsStr {
        self.0.as_ref()
    }
}

impl FromStr for MachineName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for MachineName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}
