use crate::error::StorageError;
use std::fmt;

const MAX_KEY_LEN: usize = 128;
pub(crate) const VALUE_EXTENSION: &str = "kv";

/// A validated storage key.
///
/// Keys are file stems inside the store root, so they are restricted to ASCII letters,
/// digits, `_`, `-` and `.`, may not start with `.` and are at most 128 bytes long.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorageKey(String);

impl StorageKey {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub(crate) fn file_name(&self) -> String {
        format!("{}.{VALUE_EXTENSION}", self.0)
    }

    /// Recovers the key from a file name written by the store.
    pub(crate) fn from_file_name(name: &str) -> Option<Self> {
        let stem = name.strip_suffix(VALUE_EXTENSION)?.strip_suffix('.')?;
        Self::try_from(stem).ok()
    }
}

impl TryFrom<&str> for StorageKey {
    type Error = StorageError;

    fn try_from(value: &str) -> Result<Self, StorageError> {
        let reason = if value.is_empty() {
            Some("key cannot be empty")
        } else if value.len() > MAX_KEY_LEN {
            Some("key is longer than 128 bytes")
        } else if value.starts_with('.') {
            Some("key cannot start with '.'")
        } else if !value.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.')) {
            Some("key contains illegal characters")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(StorageError::InvalidKey {
                message: value.to_owned().into(),
                context: Some(reason.into()),
            }),
            None => Ok(Self(value.to_owned())),
        }
    }
}

impl TryFrom<String> for StorageKey {
    type Error = StorageError;

    fn try_from(value: String) -> Result<Self, StorageError> {
        Self::try_from(value.as_str())
    }
}

impl TryFrom<&String> for StorageKey {
    type Error = StorageError;

    fn try_from(value: &String) -> Result<Self, StorageError> {
        Self::try_from(value.as_str())
    }
}

impl AsRef<str> for StorageKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
