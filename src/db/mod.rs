//! The keyspace: typed value storage, expiration, and per-kind operations.

pub mod core;
pub mod ops;
pub mod sweeper;
pub mod types;

pub use core::Keyspace;
pub use ops::generic::GenericOps;
pub use ops::hash::HashOps;
pub use ops::list::ListOps;
pub use ops::set::SetOps;
pub use ops::string::StringOps;
pub use types::DataType;
