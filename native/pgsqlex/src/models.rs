/// Resource definitions for PgSqlEx
///
/// Each resource wraps one core handle for the BEAM. Dropping a resource (the
/// garbage collector's finalizer) drops the wrapped handle, which releases the
/// native side if the caller never closed it explicitly.
use rustler::{Resource, ResourceArc};
use std::sync::Mutex;

use crate::connection::Connection;
use crate::cursor::Cursor;
use crate::result::QueryResult;

/// Connection handle passed to Elixir
pub struct ConnectionResource {
    pub connection: Mutex<Connection>,
}

#[rustler::resource_impl]
impl Resource for ConnectionResource {}

impl ConnectionResource {
    pub fn new(connection: Connection) -> Self {
        ConnectionResource {
            connection: Mutex::new(connection),
        }
    }
}

/// Query result handle passed to Elixir
pub struct ResultResource {
    pub result: Mutex<QueryResult>,
}

#[rustler::resource_impl]
impl Resource for ResultResource {}

impl ResultResource {
    pub fn new(result: QueryResult) -> Self {
        ResultResource {
            result: Mutex::new(result),
        }
    }
}

/// Record cursor passed to Elixir
///
/// Refers to its result resource and keeps its own position. Closing the
/// result invalidates the cursor.
pub struct CursorResource {
    pub result: ResourceArc<ResultResource>,
    pub cursor: Mutex<Cursor>,
}

#[rustler::resource_impl]
impl Resource for CursorResource {}

impl CursorResource {
    pub fn new(result: ResourceArc<ResultResource>) -> Self {
        CursorResource {
            result,
            cursor: Mutex::new(Cursor::new()),
        }
    }
}
