//! Set operations: membership, insertion, removal.

use crate::db::core::Keyspace;
use crate::db::types::DataType;
use crate::error::CommandError;
use std::collections::HashSet;

/// Operations on set-typed values.
pub trait SetOps {
    /// Add `members` to the set at `key`, creating it if absent. Returns
    /// the number of members actually added (duplicates don't count).
    fn sadd(&mut self, key: &str, members: Vec<String>) -> Result<usize, CommandError>;

    /// Remove `members` from the set at `key`. Returns the number
    /// actually removed. Removing the last member deletes the key.
    fn srem(&mut self, key: &str, members: &[String]) -> Result<usize, CommandError>;

    /// All members, in arbitrary order. Empty if the key is absent.
    fn smembers(&mut self, key: &str) -> Result<Vec<String>, CommandError>;

    /// Number of members, `0` if the key is absent.
    fn scard(&mut self, key: &str) -> Result<usize, CommandError>;

    /// Whether `member` is in the set at `key`.
    fn sismember(&mut self, key: &str, member: &str) -> Result<bool, CommandError>;
}

impl SetOps for Keyspace {
    fn sadd(&mut self, key: &str, members: Vec<String>) -> Result<usize, CommandError> {
        self.expire_if_due(key);
        let entry = self
            .data
            .entry(key.to_string())
            .or_insert_with(|| DataType::Set(HashSet::new()));
        let set = match entry {
            DataType::Set(s) => s,
            _ => return Err(CommandError::WrongType),
        };
        let mut added = 0;
        for member in members {
            if set.insert(member) {
                added += 1;
            }
        }
        Ok(added)
    }

    fn srem(&mut self, key: &str, members: &[String]) -> Result<usize, CommandError> {
        self.expire_if_due(key);
        let removed = match self.data.get_mut(key) {
            None => return Ok(0),
            Some(DataType::Set(s)) => members.iter().filter(|m| s.remove(*m)).count(),
            Some(_) => return Err(CommandError::WrongType),
        };
        self.remove_if_emptied(key);
        Ok(removed)
    }

    fn smembers(&mut self, key: &str) -> Result<Vec<String>, CommandError> {
        self.expire_if_due(key);
        match self.data.get(key) {
            None => Ok(Vec::new()),
            Some(DataType::Set(s)) => Ok(s.iter().cloned().collect()),
            Some(_) => Err(CommandError::WrongType),
        }
    }

    fn scard(&mut self, key: &str) -> Result<usize, CommandError> {
        self.expire_if_due(key);
        match self.data.get(key) {
            None => Ok(0),
            Some(DataType::Set(s)) => Ok(s.len()),
            Some(_) => Err(CommandError::WrongType),
        }
    }

    fn sismember(&mut self, key: &str, member: &str) -> Result<bool, CommandError> {
        self.expire_if_due(key);
        match self.data.get(key) {
            None => Ok(false),
            Some(DataType::Set(s)) => Ok(s.contains(member)),
            Some(_) => Err(CommandError::WrongType),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sadd_reports_only_new_members() {
        let mut ks = Keyspace::new();
        assert_eq!(ks.sadd("k", vec!["a".into(), "b".into()]).unwrap(), 2);
        assert_eq!(ks.sadd("k", vec!["b".into(), "c".into()]).unwrap(), 1);
        assert_eq!(ks.scard("k").unwrap(), 3);
    }

    #[test]
    fn srem_removing_last_member_deletes_key() {
        let mut ks = Keyspace::new();
        ks.sadd("k", vec!["a".into()]).unwrap();
        assert_eq!(ks.srem("k", &["a".to_string()]).unwrap(), 1);
        assert!(!ks.data.contains_key("k"));
    }

    #[test]
    fn sismember_true_and_false() {
        let mut ks = Keyspace::new();
        ks.sadd("k", vec!["a".into()]).unwrap();
        assert!(ks.sismember("k", "a").unwrap());
        assert!(!ks.sismember("k", "b").unwrap());
        assert!(!ks.sismember("missing", "a").unwrap());
    }

    #[test]
    fn wrong_type_errors() {
        let mut ks = Keyspace::new();
        ks.data.insert("k".into(), DataType::String("v".into()));
        assert_eq!(ks.sadd("k", vec!["x".into()]), Err(CommandError::WrongType));
        assert_eq!(ks.smembers("k"), Err(CommandError::WrongType));
    }
}
