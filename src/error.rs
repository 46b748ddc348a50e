//! Error types shared by the keyspace and command dispatcher.

use thiserror::Error;

/// Errors produced while executing a single command against the keyspace.
///
/// Every variant maps to one `-ERR …` reply line; none of these ever
/// terminate the connection.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("ERR unknown command '{0}'")]
    UnknownCommand(String),

    #[error("ERR wrong number of arguments for '{0}' command")]
    WrongArity(String),

    #[error("WRONGTYPE Operation against a key holding the wrong kind of value")]
    WrongType,

    #[error("ERR value is not an integer or out of range")]
    NotAnInteger,

    #[error("ERR syntax error")]
    SyntaxError,
}
