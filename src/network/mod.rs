//! Network module for LatticeDB.
//!
//! Handles client connections and the per-connection read/dispatch/write
//! loop. RESP framing itself lives in the crate-level `resp` module.

pub mod connection;
