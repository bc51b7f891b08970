use std::{collections::BTreeSet, fmt, ops::Deref};

use serde::{Deserialize, Serialize};

/// Host ports that should be forwarded through the tunnel.
///
/// Ports are held as the strings Docker reports them as, kept sorted and free
/// of duplicates, so two sets compare equal exactly when they hold the same
/// ports regardless of the order they were collected in.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct ForwardedPortSet(BTreeSet<String>);

impl ForwardedPortSet {
    /// Returns an empty port set.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Deref for ForwardedPortSet {
    type Target = BTreeSet<String>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S> FromIterator<S> for ForwardedPortSet
where
    S: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl<'s> IntoIterator for &'s ForwardedPortSet {
    type IntoIter = std::collections::btree_set::Iter<'s, String>;
    type Item = &'s String;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for ForwardedPortSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        self.0.iter().enumerate().try_for_each(|(index, port)| {
            if index == 0 {
                write!(f, "{}", port)
            } else {
                write!(f, ", {}", port)
            }
        })?;
        write!(f, "]")
    }
}
