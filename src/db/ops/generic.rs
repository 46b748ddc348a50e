//! Generic key operations: existence, deletion, expiry, pattern matching.
//!
//! These operate on any key regardless of the kind of value stored there.

use crate::db::core::Keyspace;
use std::time::{Duration, Instant};

/// Generic, kind-agnostic keyspace operations.
pub trait GenericOps {
    /// Live-check: false if the key is absent or has expired (and has
    /// just been removed as a side effect).
    fn exists(&mut self, key: &str) -> bool;

    /// Remove a key and any expiry entry. Returns whether anything was
    /// actually removed.
    fn delete(&mut self, key: &str) -> bool;

    /// Record an absolute expiry `seconds_from_now` seconds out. Fails
    /// (returns false) if the key is absent. A non-positive duration
    /// deletes the key immediately and still reports success.
    fn set_expiry(&mut self, key: &str, seconds_from_now: i64) -> bool;

    /// `-2` absent, `-1` no expiry, else `ceil(expiry - now)` in seconds.
    fn ttl(&mut self, key: &str) -> i64;

    /// All live keys matching a `*`/`?` glob over the entire key.
    fn keys_matching(&mut self, pattern: &str) -> Vec<String>;

    /// Remove every key and expiry entry.
    fn flush_all(&mut self);
}

impl GenericOps for Keyspace {
    fn exists(&mut self, key: &str) -> bool {
        self.expire_if_due(key);
        self.data.contains_key(key)
    }

    fn delete(&mut self, key: &str) -> bool {
        self.expire_if_due(key);
        let removed = self.data.remove(key).is_some();
        self.expirations.remove(key);
        removed
    }

    fn set_expiry(&mut self, key: &str, seconds_from_now: i64) -> bool {
        self.expire_if_due(key);
        if !self.data.contains_key(key) {
            return false;
        }

        if seconds_from_now <= 0 {
            self.data.remove(key);
            self.expirations.remove(key);
            return true;
        }

        self.expirations.insert(
            key.to_string(),
            Instant::now() + Duration::from_secs(seconds_from_now as u64),
        );
        true
    }

    fn ttl(&mut self, key: &str) -> i64 {
        self.expire_if_due(key);
        if !self.data.contains_key(key) {
            return -2;
        }

        match self.expirations.get(key) {
            None => -1,
            Some(&at) => {
                let now = Instant::now();
                if at <= now {
                    -2
                } else {
                    let remaining = at - now;
                    let secs = remaining.as_secs();
                    let nanos = remaining.subsec_nanos();
                    (secs + if nanos > 0 { 1 } else { 0 }) as i64
                }
            }
        }
    }

    fn keys_matching(&mut self, pattern: &str) -> Vec<String> {
        let due: Vec<String> = self
            .expirations
            .iter()
            .filter(|&(_, &at)| Instant::now() >= at)
            .map(|(k, _)| k.clone())
            .collect();
        for key in due {
            self.data.remove(&key);
            self.expirations.remove(&key);
        }

        self.data
            .keys()
            .filter(|k| glob_match(pattern, k))
            .cloned()
            .collect()
    }

    fn flush_all(&mut self) {
        self.data.clear();
        self.expirations.clear();
    }
}

/// Match `text` against a glob `pattern` supporting `*` (zero or more of
/// any char) and `?` (exactly one of any char), over the entire string.
/// Dynamic-programming table over (pattern index, text index).
pub fn glob_match(pattern: &str, text: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let t: Vec<char> = text.chars().collect();
    let (plen, tlen) = (p.len(), t.len());

    // dp[i][j] = pattern[..i] matches text[..j]
    let mut dp = vec![vec![false; tlen + 1]; plen + 1];
    dp[0][0] = true;
    for i in 1..=plen {
        if p[i - 1] == '*' {
            dp[i][0] = dp[i - 1][0];
        }
    }

    for i in 1..=plen {
        for j in 1..=tlen {
            dp[i][j] = match p[i - 1] {
                '*' => dp[i - 1][j] || dp[i][j - 1],
                '?' => dp[i - 1][j - 1],
                c => dp[i - 1][j - 1] && c == t[j - 1],
            };
        }
    }

    dp[plen][tlen]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glob_matches_literal() {
        assert!(glob_match("hello", "hello"));
        assert!(!glob_match("hello", "world"));
    }

    #[test]
    fn glob_matches_star() {
        assert!(glob_match("*", "anything"));
        assert!(glob_match("a*b", "ab"));
        assert!(glob_match("a*b", "axb"));
        assert!(glob_match("a*b", "axxb"));
        assert!(!glob_match("a*b", "a"));
    }

    #[test]
    fn glob_matches_question_mark() {
        assert!(glob_match("h?llo", "hello"));
        assert!(!glob_match("h?llo", "hllo"));
    }

    #[test]
    fn exists_and_delete() {
        let mut ks = Keyspace::new();
        assert!(!ks.exists("a"));
        ks.data
            .insert("a".into(), crate::db::DataType::String("v".into()));
        assert!(ks.exists("a"));
        assert!(ks.delete("a"));
        assert!(!ks.delete("a"));
    }

    #[test]
    fn expire_zero_deletes_immediately() {
        let mut ks = Keyspace::new();
        ks.data
            .insert("a".into(), crate::db::DataType::String("v".into()));
        assert!(ks.set_expiry("a", 0));
        assert!(!ks.exists("a"));
        assert_eq!(ks.ttl("a"), -2);
    }

    #[test]
    fn ttl_absent_and_no_expiry() {
        let mut ks = Keyspace::new();
        assert_eq!(ks.ttl("missing"), -2);
        ks.data
            .insert("a".into(), crate::db::DataType::String("v".into()));
        assert_eq!(ks.ttl("a"), -1);
    }
}
