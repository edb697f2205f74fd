//! Keyed set-difference between an original and a submitted collection.
//!
//! Collections are compared as insertion-ordered keyed mappings: arrays
//! contribute index keys, objects contribute text keys. An entry of one
//! collection that has no strictly-equal counterpart *at the same key* in
//! the other is "extra"; the write phase turns extras into adder and
//! remover calls.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// Position of an entry within a keyed collection.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(untagged)]
pub enum EntryKey {
    /// Array position.
    Index(usize),
    /// Object key.
    Text(String),
}

impl EntryKey {
    /// Create an index key.
    #[inline]
    pub fn index(i: usize) -> Self {
        EntryKey::Index(i)
    }

    /// Create a text key.
    #[inline]
    pub fn text(k: impl Into<String>) -> Self {
        EntryKey::Text(k.into())
    }

    /// Get the index if this is an index key.
    #[inline]
    pub fn as_index(&self) -> Option<usize> {
        match self {
            EntryKey::Index(i) => Some(*i),
            EntryKey::Text(_) => None,
        }
    }

    /// Get the text if this is a text key.
    #[inline]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            EntryKey::Index(_) => None,
            EntryKey::Text(k) => Some(k),
        }
    }
}

impl fmt::Display for EntryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryKey::Index(i) => write!(f, "[{}]", i),
            EntryKey::Text(k) => write!(f, ".{}", k),
        }
    }
}

impl From<usize> for EntryKey {
    fn from(i: usize) -> Self {
        EntryKey::Index(i)
    }
}

impl From<&str> for EntryKey {
    fn from(k: &str) -> Self {
        EntryKey::Text(k.to_owned())
    }
}

impl From<String> for EntryKey {
    fn from(k: String) -> Self {
        EntryKey::Text(k)
    }
}

/// An insertion-ordered keyed view of a collection value.
pub type Entries = IndexMap<EntryKey, Value>;

/// Normalize a value into its keyed entries.
///
/// Null and scalar values normalize to no entries; a scalar reaching a
/// collection-valued field is a caller bug the write phase reports
/// separately.
pub fn keyed_entries(value: &Value) -> Entries {
    match value {
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, v)| (EntryKey::Index(i), v.clone()))
            .collect(),
        Value::Object(map) => map
            .iter()
            .map(|(k, v)| (EntryKey::Text(k.clone()), v.clone()))
            .collect(),
        _ => Entries::new(),
    }
}

/// Return the needle entries that have no counterpart in the haystack.
///
/// A needle entry `(key, value)` is *present* only when the first
/// strictly-equal haystack entry sits at the same key and the full
/// equality rule `eq` agrees; every other needle entry is extra. The
/// result preserves needle ordering.
///
/// Key sensitivity is deliberate: reordering a collection without changing
/// membership shifts keys and can produce matching remove/add pairs.
pub fn extra_values(
    haystack: &Entries,
    needle: &Entries,
    eq: impl Fn(&Value, &Value) -> bool,
) -> Entries {
    let mut extra = Entries::new();

    for (key, value) in needle {
        let found = haystack.iter().find(|&(_, candidate)| candidate == value);
        let present = match found {
            Some((found_key, found_value)) => found_key == key && eq(found_value, value),
            None => false,
        };
        if !present {
            extra.insert(key.clone(), value.clone());
        }
    }

    extra
}
