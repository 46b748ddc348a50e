//! Command dispatch: arity validation against a data-driven table, then
//! routing to the keyspace operation that implements the command.
//!
//! This module does no I/O and holds the keyspace lock only for the
//! duration of a single command's execution.

use crate::db::{GenericOps, HashOps, ListOps, SetOps, StringOps};
use crate::db::core::Keyspace;
use crate::error::CommandError;
use crate::observability::metrics::{METRIC_COMMANDS_TOTAL, METRIC_COMMAND_ERRORS_TOTAL, METRIC_COMMAND_LATENCY};
use crate::resp::RespValue;
use metrics::{counter, histogram};
use std::sync::Arc;
use tokio::sync::Mutex;

/// How many arguments (excluding the command name) a command accepts.
#[derive(Debug, Clone, Copy)]
enum Arity {
    /// Exactly this many.
    Exact(usize),
    /// This many or more.
    AtLeast(usize),
    /// Between `min` and `max`, inclusive.
    Range(usize, usize),
}

impl Arity {
    fn accepts(self, n: usize) -> bool {
        match self {
            Arity::Exact(k) => n == k,
            Arity::AtLeast(k) => n >= k,
            Arity::Range(min, max) => n >= min && n <= max,
        }
    }
}

struct CommandSpec {
    name: &'static str,
    arity: Arity,
}

/// Every command this server understands, with its accepted argument
/// count. Arity is checked here, uniformly, before any command-specific
/// code runs.
const COMMAND_TABLE: &[CommandSpec] = &[
    CommandSpec { name: "PING", arity: Arity::Range(0, 1) },
    CommandSpec { name: "GET", arity: Arity::Exact(1) },
    CommandSpec { name: "SET", arity: Arity::Exact(2) },
    CommandSpec { name: "INCR", arity: Arity::Exact(1) },
    CommandSpec { name: "DECR", arity: Arity::Exact(1) },
    CommandSpec { name: "DEL", arity: Arity::AtLeast(1) },
    CommandSpec { name: "EXISTS", arity: Arity::AtLeast(1) },
    CommandSpec { name: "EXPIRE", arity: Arity::Exact(2) },
    CommandSpec { name: "TTL", arity: Arity::Exact(1) },
    CommandSpec { name: "KEYS", arity: Arity::Exact(1) },
    CommandSpec { name: "FLUSHALL", arity: Arity::Exact(0) },
    CommandSpec { name: "LPUSH", arity: Arity::AtLeast(2) },
    CommandSpec { name: "RPUSH", arity: Arity::AtLeast(2) },
    CommandSpec { name: "LPOP", arity: Arity::Exact(1) },
    CommandSpec { name: "RPOP", arity: Arity::Exact(1) },
    CommandSpec { name: "LLEN", arity: Arity::Exact(1) },
    CommandSpec { name: "LRANGE", arity: Arity::Exact(3) },
    CommandSpec { name: "SADD", arity: Arity::AtLeast(2) },
    CommandSpec { name: "SREM", arity: Arity::AtLeast(2) },
    CommandSpec { name: "SMEMBERS", arity: Arity::Exact(1) },
    CommandSpec { name: "SCARD", arity: Arity::Exact(1) },
    CommandSpec { name: "SISMEMBER", arity: Arity::Exact(2) },
    CommandSpec { name: "HSET", arity: Arity::AtLeast(3) },
    CommandSpec { name: "HGET", arity: Arity::Exact(2) },
    CommandSpec { name: "HDEL", arity: Arity::AtLeast(2) },
    CommandSpec { name: "HKEYS", arity: Arity::Exact(1) },
    CommandSpec { name: "HVALS", arity: Arity::Exact(1) },
    CommandSpec { name: "HGETALL", arity: Arity::Exact(1) },
];

fn lookup(name: &str) -> Option<&'static CommandSpec> {
    COMMAND_TABLE.iter().find(|c| c.name == name)
}

struct LatencyGuard {
    start: std::time::Instant,
}

impl Drop for LatencyGuard {
    fn drop(&mut self) {
        histogram!(METRIC_COMMAND_LATENCY).record(self.start.elapsed().as_secs_f64());
    }
}

/// Per-connection command executor. Holds a handle to the shared
/// keyspace; stateless beyond that, so arity validation and routing can
/// both be pure functions of the input tokens.
pub struct Dispatcher {
    keyspace: Arc<Mutex<Keyspace>>,
}

impl Dispatcher {
    pub fn new(keyspace: Arc<Mutex<Keyspace>>) -> Self {
        Dispatcher { keyspace }
    }

    /// Execute one already-tokenized command line and produce its reply.
    #[tracing::instrument(skip(self, tokens), fields(cmd))]
    pub async fn execute(&self, tokens: Vec<String>) -> RespValue {
        counter!(METRIC_COMMANDS_TOTAL).increment(1);
        let _latency = LatencyGuard {
            start: std::time::Instant::now(),
        };

        let Some((command, args)) = tokens.split_first() else {
            return RespValue::Error(CommandError::SyntaxError.to_string());
        };
        let name = command.to_uppercase();
        tracing::Span::current().record("cmd", name.as_str());

        let Some(spec) = lookup(&name) else {
            counter!(METRIC_COMMAND_ERRORS_TOTAL).increment(1);
            return RespValue::Error(CommandError::UnknownCommand(command.clone()).to_string());
        };

        if !spec.arity.accepts(args.len()) {
            counter!(METRIC_COMMAND_ERRORS_TOTAL).increment(1);
            return RespValue::Error(CommandError::WrongArity(name).to_string());
        }

        let mut keyspace = self.keyspace.lock().await;
        let result = route(&mut keyspace, &name, args);
        drop(keyspace);

        match result {
            Ok(value) => value,
            Err(e) => {
                counter!(METRIC_COMMAND_ERRORS_TOTAL).increment(1);
                RespValue::Error(e.to_string())
            }
        }
    }
}

/// Route one arity-validated command to its keyspace operation. Never
/// performs I/O; the keyspace lock is already held by the caller.
fn route(keyspace: &mut Keyspace, name: &str, args: &[String]) -> Result<RespValue, CommandError> {
    match name {
        "PING" => Ok(RespValue::SimpleString(
            args.first().cloned().unwrap_or_else(|| "PONG".to_string()),
        )),

        "GET" => match keyspace.get(&args[0])? {
            Some(v) => Ok(RespValue::SimpleString(v)),
            None => Ok(RespValue::NullBulk),
        },
        "SET" => {
            keyspace.set(&args[0], args[1].clone());
            Ok(RespValue::SimpleString("OK".to_string()))
        }
        "INCR" => keyspace.incr_by(&args[0], 1).map(RespValue::Integer),
        "DECR" => keyspace.incr_by(&args[0], -1).map(RespValue::Integer),

        "DEL" => {
            let removed = args.iter().filter(|k| keyspace.delete(k)).count();
            Ok(RespValue::Integer(removed as i64))
        }
        "EXISTS" => {
            let count = args.iter().filter(|k| keyspace.exists(k)).count();
            Ok(RespValue::Integer(count as i64))
        }
        "EXPIRE" => {
            let seconds: i64 = args[1]
                .parse()
                .map_err(|_| CommandError::NotAnInteger)?;
            Ok(RespValue::Integer(
                if keyspace.set_expiry(&args[0], seconds) { 1 } else { 0 },
            ))
        }
        "TTL" => Ok(RespValue::Integer(keyspace.ttl(&args[0]))),
        "KEYS" => Ok(RespValue::Array(keyspace.keys_matching(&args[0]))),
        "FLUSHALL" => {
            keyspace.flush_all();
            Ok(RespValue::SimpleString("OK".to_string()))
        }

        "LPUSH" => keyspace
            .lpush(&args[0], args[1..].to_vec())
            .map(|n| RespValue::Integer(n as i64)),
        "RPUSH" => keyspace
            .rpush(&args[0], args[1..].to_vec())
            .map(|n| RespValue::Integer(n as i64)),
        "LPOP" => keyspace.lpop(&args[0]).map(|v| match v {
            Some(s) => RespValue::SimpleString(s),
            None => RespValue::NullBulk,
        }),
        "RPOP" => keyspace.rpop(&args[0]).map(|v| match v {
            Some(s) => RespValue::SimpleString(s),
            None => RespValue::NullBulk,
        }),
        "LLEN" => keyspace.llen(&args[0]).map(|n| RespValue::Integer(n as i64)),
        "LRANGE" => {
            let start: i64 = args[1].parse().map_err(|_| CommandError::NotAnInteger)?;
            let stop: i64 = args[2].parse().map_err(|_| CommandError::NotAnInteger)?;
            keyspace
                .lrange(&args[0], start, stop)
                .map(RespValue::Array)
        }

        "SADD" => keyspace
            .sadd(&args[0], args[1..].to_vec())
            .map(|n| RespValue::Integer(n as i64)),
        "SREM" => keyspace
            .srem(&args[0], &args[1..])
            .map(|n| RespValue::Integer(n as i64)),
        "SMEMBERS" => keyspace.smembers(&args[0]).map(RespValue::Array),
        "SCARD" => keyspace.scard(&args[0]).map(|n| RespValue::Integer(n as i64)),
        "SISMEMBER" => keyspace
            .sismember(&args[0], &args[1])
            .map(|b| RespValue::Integer(if b { 1 } else { 0 })),

        "HSET" => {
            let pairs = &args[1..];
            if pairs.is_empty() || pairs.len() % 2 != 0 {
                return Err(CommandError::SyntaxError);
            }
            let mut created = 0;
            for pair in pairs.chunks_exact(2) {
                if keyspace.hset(&args[0], &pair[0], pair[1].clone())? {
                    created += 1;
                }
            }
            Ok(RespValue::Integer(created))
        }
        "HGET" => keyspace.hget(&args[0], &args[1]).map(|v| match v {
            Some(s) => RespValue::SimpleString(s),
            None => RespValue::NullBulk,
        }),
        "HDEL" => {
            let mut removed = 0;
            for field in &args[1..] {
                if keyspace.hdel(&args[0], field)? {
                    removed += 1;
                }
            }
            Ok(RespValue::Integer(removed))
        }
        "HKEYS" => keyspace.hkeys(&args[0]).map(RespValue::Array),
        "HVALS" => keyspace.hvals(&args[0]).map(RespValue::Array),
        "HGETALL" => keyspace.hgetall(&args[0]).map(|pairs| {
            RespValue::Array(pairs.into_iter().flat_map(|(f, v)| [f, v]).collect())
        }),

        _ => unreachable!("arity table and router disagree on supported commands"),
    }
}
