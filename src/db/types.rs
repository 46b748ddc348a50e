//! Value types stored in the keyspace.
//!
//! LatticeDB supports exactly four kinds. A key never changes kind in
//! place: an operation against a key of the wrong kind fails rather than
//! converting the value.

use std::collections::{HashMap, HashSet, VecDeque};

/// All data kinds a keyspace entry can hold.
#[derive(Debug, Clone)]
pub enum DataType {
    /// Textual scalar, interpreted as a signed 64-bit integer on demand.
    String(String),
    /// Ordered sequence supporting O(1) push/pop at both ends.
    List(VecDeque<String>),
    /// Unordered collection of unique elements.
    Set(HashSet<String>),
    /// Field -> value mapping with unique fields.
    Hash(HashMap<String, String>),
}

impl DataType {
    /// The lowercase kind name, as used by error messages and tests.
    pub fn kind_name(&self) -> &'static str {
        match self {
            DataType::String(_) => "string",
            DataType::List(_) => "list",
            DataType::Set(_) => "set",
            DataType::Hash(_) => "hash",
        }
    }

    /// Whether the collection backing this value holds zero elements.
    ///
    /// Strings are never "empty" in the sense that matters here: an
    /// empty string is still a live string value. Only the collection
    /// kinds (list/set/hash) are subject to emptying-removes-the-key.
    pub fn is_empty_collection(&self) -> bool {
        match self {
            DataType::String(_) => false,
            DataType::List(l) => l.is_empty(),
            DataType::Set(s) => s.is_empty(),
            DataType::Hash(h) => h.is_empty(),
        }
    }
}
