//! `PgSqlEx`: minimal PostgreSQL client binding for Elixir
//!
//! This is the root module for the `PgSqlEx` NIF (Native Implemented Function) library.
//! Connection options are encoded into a descriptor, a connection runs one
//! query per call, and each result is read through a forward-only cursor.
//! Every handle is released exactly once, either explicitly or when the BEAM
//! garbage collects its resource.
pub mod connection;
pub mod constants;
pub mod cursor;
pub mod decode;
pub mod descriptor;
pub mod error;
pub mod models;
pub mod native;
pub mod result;
pub mod utils;

// Re-export key types and functions
pub use connection::Connection;
pub use constants::DESCRIPTOR_CAPACITY;
pub use cursor::{Cursor, RecordIterator};
pub use descriptor::{build, ConnectionDescriptor, ConnectionOptions, OptionValue};
pub use error::{Error, Result};
pub use native::{PingStatus, ResultSet, Row};
pub use result::QueryResult;

// Register all NIF functions with Erlang/Elixir
// Note: The rustler::init! macro automatically discovers all #[rustler::nif] functions
rustler::init!("Elixir.PgSqlEx.Native");

#[cfg(test)]
mod tests;
