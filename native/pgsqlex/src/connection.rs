/// Connection lifecycle management for PostgreSQL
///
/// This module handles link establishment, health checking, client encoding
/// and query submission, plus the NIFs exposing them. A `Connection` moves
/// from open to closed exactly once; every operation except `close` fails with
/// `Error::ConnectionClosed` afterwards.
use rustler::{Atom, NifResult, ResourceArc, Term};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::constants::runtime;
use crate::decode;
use crate::descriptor::{self, ConnectionDescriptor, ConnectionOptions};
use crate::error::{Error, Result};
use crate::models::{ConnectionResource, ResultResource};
use crate::native::{self, Link, PingStatus};
use crate::result::QueryResult;
use crate::utils::{safe_lock, validate_sql};

pub struct Connection {
    id: Uuid,
    descriptor: ConnectionDescriptor,
    link: Option<Link>,
}

impl Connection {
    /// Build the descriptor from `options` and open a link with it.
    pub fn open(options: &ConnectionOptions) -> Result<Self> {
        let descriptor = descriptor::build(options)?;
        Self::open_descriptor(descriptor)
    }

    pub fn open_descriptor(descriptor: ConnectionDescriptor) -> Result<Self> {
        let runtime = runtime()?;
        match native::open(runtime, descriptor.as_str()) {
            Ok(link) => {
                let id = Uuid::new_v4();
                debug!(conn_id = %id, ?descriptor, "connection opened");
                Ok(Connection {
                    id,
                    descriptor,
                    link: Some(link),
                })
            }
            Err(message) => {
                warn!(?descriptor, error = %message, "connection failed");
                Err(Error::ConnectionFailed { message })
            }
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn descriptor(&self) -> &ConnectionDescriptor {
        &self.descriptor
    }

    pub fn is_closed(&self) -> bool {
        self.link.is_none()
    }

    fn link(&self) -> Result<&Link> {
        self.link.as_ref().ok_or(Error::ConnectionClosed)
    }

    /// Probe the server with the stored descriptor; the live link is not used.
    pub fn ping_status(&self) -> Result<PingStatus> {
        self.link()?;
        let status = match runtime() {
            Ok(runtime) => native::ping(runtime, self.descriptor.as_str()),
            Err(_) => PingStatus::NoAttempt,
        };
        debug!(conn_id = %self.id, ?status, "ping");
        Ok(status)
    }

    /// `Ok(())` when the server is healthy, otherwise the matching ping error.
    pub fn ping(&self) -> Result<()> {
        match self.ping_status()? {
            PingStatus::Healthy => Ok(()),
            PingStatus::Rejecting => Err(Error::ServerRejecting),
            PingStatus::NoResponse => Err(Error::Unreachable),
            PingStatus::NoAttempt => Err(Error::NotAttempted),
        }
    }

    pub fn set_encoding(&self, name: &str) -> Result<()> {
        let link = self.link()?;
        link.set_client_encoding(runtime()?, name)
            .map_err(|message| Error::EncodingRejected { message })?;
        debug!(conn_id = %self.id, encoding = name, "client encoding set");
        Ok(())
    }

    /// Submit `sql` and block until the server has answered.
    ///
    /// With several statements in `sql`, the result of the last one is returned.
    pub fn query(&self, sql: &str) -> Result<QueryResult> {
        let link = self.link()?;
        validate_sql(sql)?;

        match link.exec(runtime()?, sql) {
            Ok(set) => {
                debug!(
                    conn_id = %self.id,
                    columns = set.columns.len(),
                    rows = set.rows.len(),
                    "query succeeded"
                );
                Ok(QueryResult::from(set))
            }
            Err(message) => {
                debug!(conn_id = %self.id, error = %message, "query failed");
                Err(Error::QueryFailed { message })
            }
        }
    }

    /// Release the link. Closing an already closed connection does nothing.
    pub fn close(&mut self) {
        if let Some(link) = self.link.take() {
            let broken = link.is_closed();
            link.release();
            debug!(conn_id = %self.id, broken, "connection closed");
        }
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.close();
    }
}

/// Open a connection from a keyword list or map of options.
///
/// Options: `host` (string, required), `port` (integer, required), and the
/// optional strings `user`, `password`, `database`, `connect_timeout`.
///
/// Returns `{:ok, conn}` or `{:error, {kind, message}}`.
#[rustler::nif(schedule = "DirtyIo")]
pub fn connect(opts: Term) -> NifResult<(Atom, ResourceArc<ConnectionResource>)> {
    let options = decode::decode_options(opts)?;
    let connection = Connection::open(&options)?;
    Ok((
        rustler::types::atom::ok(),
        ResourceArc::new(ConnectionResource::new(connection)),
    ))
}

/// Check whether the server behind a connection accepts connections.
///
/// Returns `:ok`, or an error of kind `server_rejecting`, `unreachable` or
/// `not_attempted`.
#[rustler::nif(schedule = "DirtyIo")]
pub fn ping(conn: Term) -> NifResult<Atom> {
    let resource = decode::connection_handle(conn, "argument #1")?;
    safe_lock(&resource.connection, "ping connection")?.ping()?;
    Ok(rustler::types::atom::ok())
}

/// Set the client-side text encoding, e.g. `"UTF8"`.
#[rustler::nif(schedule = "DirtyIo")]
pub fn set_encoding(conn: Term, name: Term) -> NifResult<Atom> {
    let resource = decode::connection_handle(conn, "argument #1")?;
    let name = decode::string_argument(name, "argument #2")?;
    safe_lock(&resource.connection, "set_encoding connection")?.set_encoding(&name)?;
    Ok(rustler::types::atom::ok())
}

/// Execute SQL text and return a result handle.
///
/// Returns `{:ok, result}` or `{:error, {kind, message}}`; a failed statement
/// leaves no result behind.
#[rustler::nif(schedule = "DirtyIo")]
pub fn query(conn: Term, sql: Term) -> NifResult<(Atom, ResourceArc<ResultResource>)> {
    let resource = decode::connection_handle(conn, "argument #1")?;
    let sql = decode::string_argument(sql, "argument #2")?;
    let result = safe_lock(&resource.connection, "query connection")?.query(&sql)?;
    Ok((
        rustler::types::atom::ok(),
        ResourceArc::new(ResultResource::new(result)),
    ))
}

/// Close a connection. Safe to call any number of times.
#[rustler::nif(schedule = "DirtyIo")]
pub fn close_connection(conn: Term) -> NifResult<Atom> {
    let resource = decode::connection_handle(conn, "argument #1")?;
    safe_lock(&resource.connection, "close connection")?.close();
    Ok(rustler::types::atom::ok())
}
