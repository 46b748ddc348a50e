//! Hash operations: field-level get/set/delete and bulk reads.

use crate::db::core::Keyspace;
use crate::db::types::DataType;
use crate::error::CommandError;
use std::collections::HashMap;

/// Operations on hash-typed values.
pub trait HashOps {
    /// Set `field` to `value` within the hash at `key`, creating the hash
    /// if absent. Returns `true` if `field` is new, `false` if overwritten.
    fn hset(&mut self, key: &str, field: &str, value: String) -> Result<bool, CommandError>;

    /// Fetch `field` from the hash at `key`. `None` if the key or field
    /// is absent.
    fn hget(&mut self, key: &str, field: &str) -> Result<Option<String>, CommandError>;

    /// Remove `field` from the hash at `key`. Removing the last field
    /// deletes the key. Returns whether a field was actually removed.
    fn hdel(&mut self, key: &str, field: &str) -> Result<bool, CommandError>;

    /// All field names, in arbitrary order.
    fn hkeys(&mut self, key: &str) -> Result<Vec<String>, CommandError>;

    /// All values, in arbitrary order.
    fn hvals(&mut self, key: &str) -> Result<Vec<String>, CommandError>;

    /// All field/value pairs, in arbitrary order.
    fn hgetall(&mut self, key: &str) -> Result<Vec<(String, String)>, CommandError>;
}

impl HashOps for Keyspace {
    fn hset(&mut self, key: &str, field: &str, value: String) -> Result<bool, CommandError> {
        self.expire_if_due(key);
        let entry = self
            .data
            .entry(key.to_string())
            .or_insert_with(|| DataType::Hash(HashMap::new()));
        let hash = match entry {
            DataType::Hash(h) => h,
            _ => return Err(CommandError::WrongType),
        };
        Ok(hash.insert(field.to_string(), value).is_none())
    }

    fn hget(&mut self, key: &str, field: &str) -> Result<Option<String>, CommandError> {
        self.expire_if_due(key);
        match self.data.get(key) {
            None => Ok(None),
            Some(DataType::Hash(h)) => Ok(h.get(field).cloned()),
            Some(_) => Err(CommandError::WrongType),
        }
    }

    fn hdel(&mut self, key: &str, field: &str) -> Result<bool, CommandError> {
        self.expire_if_due(key);
        let removed = match self.data.get_mut(key) {
            None => return Ok(false),
            Some(DataType::Hash(h)) => h.remove(field).is_some(),
            Some(_) => return Err(CommandError::WrongType),
        };
        self.remove_if_emptied(key);
        Ok(removed)
    }

    fn hkeys(&mut self, key: &str) -> Result<Vec<String>, CommandError> {
        self.expire_if_due(key);
        match self.data.get(key) {
            None => Ok(Vec::new()),
            Some(DataType::Hash(h)) => Ok(h.keys().cloned().collect()),
            Some(_) => Err(CommandError::WrongType),
        }
    }

    fn hvals(&mut self, key: &str) -> Result<Vec<String>, CommandError> {
        self.expire_if_due(key);
        match self.data.get(key) {
            None => Ok(Vec::new()),
            Some(DataType::Hash(h)) => Ok(h.values().cloned().collect()),
            Some(_) => Err(CommandError::WrongType),
        }
    }

    fn hgetall(&mut self, key: &str) -> Result<Vec<(String, String)>, CommandError> {
        self.expire_if_due(key);
        match self.data.get(key) {
            None => Ok(Vec::new()),
            Some(DataType::Hash(h)) => Ok(h.iter().map(|(k, v)| (k.clone(), v.clone())).collect()),
            Some(_) => Err(CommandError::WrongType),
        }
    }
}
