//! String operations: get, set, and integer increment/decrement.

use crate::db::core::Keyspace;
use crate::db::types::DataType;
use crate::error::CommandError;

/// Operations on string-typed values.
pub trait StringOps {
    /// Fetch the string at `key`. `None` if absent; an error if the key
    /// holds a different kind.
    fn get(&mut self, key: &str) -> Result<Option<String>, CommandError>;

    /// Set `key` to `value`, overwriting any existing value and clearing
    /// any TTL, regardless of the previous kind.
    fn set(&mut self, key: &str, value: String);

    /// Parse the string at `key` as an `i64`, add `delta`, and store the
    /// result back as a string. A missing key is treated as `0`. Fails if
    /// the key holds a non-string value or an unparseable string.
    fn incr_by(&mut self, key: &str, delta: i64) -> Result<i64, CommandError>;
}

impl StringOps for Keyspace {
    fn get(&mut self, key: &str) -> Result<Option<String>, CommandError> {
        self.expire_if_due(key);
        match self.data.get(key) {
            None => Ok(None),
            Some(DataType::String(s)) => Ok(Some(s.clone())),
            Some(_) => Err(CommandError::WrongType),
        }
    }

    fn set(&mut self, key: &str, value: String) {
        self.expire_if_due(key);
        self.data.insert(key.to_string(), DataType::String(value));
        self.expirations.remove(key);
    }

    fn incr_by(&mut self, key: &str, delta: i64) -> Result<i64, CommandError> {
        self.expire_if_due(key);
        let current: i64 = match self.data.get(key) {
            None => 0,
            Some(DataType::String(s)) => s.parse().map_err(|_| CommandError::NotAnInteger)?,
            Some(_) => return Err(CommandError::WrongType),
        };

        let next = current
            .checked_add(delta)
            .ok_or(CommandError::NotAnInteger)?;
        self.data
            .insert(key.to_string(), DataType::String(next.to_string()));
        Ok(next)
    }
}
