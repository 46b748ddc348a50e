//! List operations: push/pop at both ends, length, and range reads.

use crate::db::core::Keyspace;
use crate::db::types::DataType;
use crate::error::CommandError;
use std::collections::VecDeque;

/// Operations on list-typed values.
pub trait ListOps {
    /// Push `values` onto the head, one at a time in the order given, so
    /// the last element of `values` ends up closest to the head.
    fn lpush(&mut self, key: &str, values: Vec<String>) -> Result<usize, CommandError>;

    /// Push `values` onto the tail, in order, so the last element of
    /// `values` ends up closest to the tail.
    fn rpush(&mut self, key: &str, values: Vec<String>) -> Result<usize, CommandError>;

    /// Pop one element from the head. `None` if the key is absent or the
    /// list is empty (the latter should not be observable: emptying a
    /// list removes the key).
    fn lpop(&mut self, key: &str) -> Result<Option<String>, CommandError>;

    /// Pop one element from the tail.
    fn rpop(&mut self, key: &str) -> Result<Option<String>, CommandError>;

    /// Number of elements, `0` if the key is absent.
    fn llen(&mut self, key: &str) -> Result<usize, CommandError>;

    /// Elements from `start` to `stop` inclusive, both interpreted Python-
    /// style (negative indexes count from the end) and clamped to the
    /// list's bounds. An empty or out-of-range window yields `Vec::new()`.
    fn lrange(&mut self, key: &str, start: i64, stop: i64) -> Result<Vec<String>, CommandError>;
}

impl ListOps for Keyspace {
    fn lpush(&mut self, key: &str, values: Vec<String>) -> Result<usize, CommandError> {
        self.expire_if_due(key);
        let entry = self
            .data
            .entry(key.to_string())
            .or_insert_with(|| DataType::List(VecDeque::new()));
        let list = match entry {
            DataType::List(l) => l,
            _ => return Err(CommandError::WrongType),
        };
        for value in values {
            list.push_front(value);
        }
        Ok(list.len())
    }

    fn rpush(&mut self, key: &str, values: Vec<String>) -> Result<usize, CommandError> {
        self.expire_if_due(key);
        let entry = self
            .data
            .entry(key.to_string())
            .or_insert_with(|| DataType::List(VecDeque::new()));
        let list = match entry {
            DataType::List(l) => l,
            _ => return Err(CommandError::WrongType),
        };
        for value in values {
            list.push_back(value);
        }
        Ok(list.len())
    }

    fn lpop(&mut self, key: &str) -> Result<Option<String>, CommandError> {
        self.expire_if_due(key);
        let popped = match self.data.get_mut(key) {
            None => return Ok(None),
            Some(DataType::List(l)) => l.pop_front(),
            Some(_) => return Err(CommandError::WrongType),
        };
        self.remove_if_emptied(key);
        Ok(popped)
    }

    fn rpop(&mut self, key: &str) -> Result<Option<String>, CommandError> {
        self.expire_if_due(key);
        let popped = match self.data.get_mut(key) {
            None => return Ok(None),
            Some(DataType::List(l)) => l.pop_back(),
            Some(_) => return Err(CommandError::WrongType),
        };
        self.remove_if_emptied(key);
        Ok(popped)
    }

    fn llen(&mut self, key: &str) -> Result<usize, CommandError> {
        self.expire_if_due(key);
        match self.data.get(key) {
            None => Ok(0),
            Some(DataType::List(l)) => Ok(l.len()),
            Some(_) => Err(CommandError::WrongType),
        }
    }

    fn lrange(&mut self, key: &str, start: i64, stop: i64) -> Result<Vec<String>, CommandError> {
        self.expire_if_due(key);
        let list = match self.data.get(key) {
            None => return Ok(Vec::new()),
            Some(DataType::List(l)) => l,
            Some(_) => return Err(CommandError::WrongType),
        };

        let len = list.len() as i64;
        if len == 0 {
            return Ok(Vec::new());
        }

        let normalize = |i: i64| -> i64 {
            if i < 0 {
                (len + i).max(0)
            } else {
                i
            }
        };
        let start = normalize(start).min(len);
        let stop = normalize(stop).min(len - 1);

        if start > stop || start >= len {
            return Ok(Vec::new());
        }

        Ok(list
            .iter()
            .skip(start as usize)
            .take((stop - start + 1) as usize)
            .cloned()
            .collect())
    }
}
