//! # Index Keys
//!
//! Every committed transaction lives at `prefix ++ binary(index)` where the
//! binary rendering is a fixed [`INDEX_WIDTH`] digits. Fixed width makes
//! byte order equal to numeric order, so "highest key under the prefix" is
//! "highest committed index".
//!
//! The prefix is reserved for the ledger; no other writer may put keys under
//! it.

use crate::errors::{KeyError, Result};
use crate::ports::{CoordinationStore, SortOrder};

/// Namespace used when none is configured.
pub const DEFAULT_PREFIX: &str = "tledger/";

/// Digits in the binary rendering of an index.
pub const INDEX_WIDTH: usize = 64;

/// Maps global indices to store keys and back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySpace {
    prefix: String,
}

impl Default for KeySpace {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX)
    }
}

impl KeySpace {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &[u8] {
        self.prefix.as_bytes()
    }

    /// Store key for `index`.
    pub fn key(&self, index: u64) -> Vec<u8> {
        format!("{}{:0width$b}", self.prefix, index, width = INDEX_WIDTH).into_bytes()
    }

    /// Half-open key range covering indices `[first, first + count)`.
    ///
    /// When `first + count` overflows the range extends to the end of the
    /// namespace.
    pub fn range(&self, first: u64, count: u64) -> (Vec<u8>, Vec<u8>) {
        let start = self.key(first);
        let end = match first.checked_add(count) {
            Some(end) => self.key(end),
            None => {
                let mut end = self.prefix.clone().into_bytes();
                end.push(b'2');
                end
            }
        };
        (start, end)
    }

    /// Decode the index stored at `key`.
    pub fn index_of(&self, key: &[u8]) -> std::result::Result<u64, KeyError> {
        let malformed = |reason| KeyError {
            key: String::from_utf8_lossy(key).into_owned(),
            reason,
        };

        let digits = key
            .strip_prefix(self.prefix())
            .ok_or_else(|| malformed("outside the ledger prefix"))?;
        if digits.len() != INDEX_WIDTH {
            return Err(malformed("wrong index width"));
        }
        digits.iter().try_fold(0u64, |acc, digit| match digit {
            b'0' => Ok(acc << 1),
            b'1' => Ok((acc << 1) | 1),
            _ => Err(malformed("non-binary digit")),
        })
    }
}

/// Highest committed index, or `None` on an empty ledger.
pub async fn latest_committed_index<S>(store: &S, keys: &KeySpace) -> Result<Option<u64>>
where
    S: CoordinationStore + ?Sized,
{
    let latest = store
        .get_by_prefix_sorted(keys.prefix(), SortOrder::Descend, Some(1))
        .await?;
    match latest.first() {
        Some(kv) => Ok(Some(keys.index_of(&kv.key)?)),
        None => Ok(None),
    }
}
