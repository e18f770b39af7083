use std::fmt;

use crate::error::ClientError;

/// Logical channel key scoping one shared connection (a lobby id, a game room).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Namespace(String);

impl Namespace {
    pub fn new(value: impl AsRef<str>) -> Result<Self, ClientError> {
        let trimmed = value.as_ref().trim();
        if trimmed.is_empty() {
            return Err(ClientError::EmptyNamespace);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<&str> for Namespace {
    type Error = ClientError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Namespace::new(value)
    }
}
