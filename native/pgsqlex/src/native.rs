/// Boundary with the PostgreSQL client library
///
/// Everything that touches `tokio-postgres` lives here. The rest of the crate
/// sees blocking open / ping / encoding / exec calls that report failures as
/// the client's own diagnostic text.
use bytes::Bytes;
use tokio::runtime::Runtime;
use tokio_postgres::error::SqlState;
use tokio_postgres::{Client, Config, NoTls, SimpleQueryMessage};
use tracing::{debug, warn};

use crate::utils::{has_statement, quote_literal};

/// Outcome of a reachability probe. Exactly one applies to every probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PingStatus {
    /// The server accepted the connection attempt.
    Healthy,
    /// The server answered but refuses connections (startup, shutdown, recovery).
    Rejecting,
    /// Nothing answered.
    NoResponse,
    /// No attempt was made; the parameters or the local side were unusable.
    NoAttempt,
}

/// One row of text cells as sent by the server; `None` is SQL NULL.
pub type Row = Vec<Option<Bytes>>;

/// Materialized outcome of one statement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultSet {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
    /// Row count from the command tag, when the server sent one.
    pub affected: Option<u64>,
}

impl ResultSet {
    /// Collapse a simple-query message stream into the last statement's result.
    ///
    /// Fails with the client's diagnostic when a cell is not valid UTF-8,
    /// which happens after switching to another client encoding.
    pub fn from_messages(messages: Vec<SimpleQueryMessage>) -> Result<Self, String> {
        let mut current = ResultSet::default();
        let mut last = None;

        for message in messages {
            match message {
                SimpleQueryMessage::RowDescription(columns) => {
                    current.columns = columns.iter().map(|c| c.name().to_string()).collect();
                }
                SimpleQueryMessage::Row(row) => {
                    if current.columns.is_empty() {
                        current.columns =
                            row.columns().iter().map(|c| c.name().to_string()).collect();
                    }
                    let cells = (0..row.len())
                        .map(|i| {
                            row.try_get(i)
                                .map(|cell| cell.map(|text| Bytes::copy_from_slice(text.as_bytes())))
                                .map_err(|e| diagnostic(&e))
                        })
                        .collect::<Result<Row, String>>()?;
                    current.rows.push(cells);
                }
                SimpleQueryMessage::CommandComplete(count) => {
                    current.affected = Some(count);
                    last = Some(std::mem::take(&mut current));
                }
                _ => {}
            }
        }

        Ok(last.unwrap_or(current))
    }
}

const EMPTY_QUERY: &str = "empty query: the SQL text contains no statement";

/// Live link to the server. The I/O driver runs as a task on the runtime.
pub struct Link {
    client: Client,
}

/// Diagnostic text for a client error; server errors keep severity, detail and hint.
pub fn diagnostic(err: &tokio_postgres::Error) -> String {
    match err.as_db_error() {
        Some(db) => db.to_string(),
        None => err.to_string(),
    }
}

fn parse_descriptor(descriptor: &str) -> Result<Config, String> {
    descriptor
        .parse::<Config>()
        .map_err(|e| format!("invalid connection descriptor: {e}"))
}

/// Open a link using an encoded descriptor.
pub fn open(runtime: &Runtime, descriptor: &str) -> Result<Link, String> {
    let config = parse_descriptor(descriptor)?;
    let (client, connection) = runtime
        .block_on(config.connect(NoTls))
        .map_err(|e| diagnostic(&e))?;

    runtime.spawn(async move {
        if let Err(e) = connection.await {
            warn!(error = %e, "PostgreSQL link driver error");
        }
    });

    Ok(Link { client })
}

/// Probe configuration for `descriptor`, or `None` when no attempt can be made.
///
/// A missing password becomes an empty one, so a server demanding one
/// answers with an authentication error instead of the client giving up
/// before sending anything.
pub fn probe_config(descriptor: &str) -> Option<Config> {
    let mut config = parse_descriptor(descriptor).ok()?;
    if config.get_hosts().is_empty() {
        return None;
    }
    if config.get_password().is_none() {
        config.password("");
    }
    Some(config)
}

/// Probe the server described by `descriptor` with a throwaway connection.
pub fn ping(runtime: &Runtime, descriptor: &str) -> PingStatus {
    let Some(config) = probe_config(descriptor) else {
        return PingStatus::NoAttempt;
    };

    match runtime.block_on(config.connect(NoTls)) {
        Ok((client, connection)) => {
            drop(client);
            runtime.spawn(async move {
                let _ = connection.await;
            });
            PingStatus::Healthy
        }
        Err(e) => match e.code() {
            Some(code) if *code == SqlState::CANNOT_CONNECT_NOW => PingStatus::Rejecting,
            // Any other server reply, authentication failures included, proves it is up.
            Some(_) => PingStatus::Healthy,
            None => {
                debug!(error = %e, "ping got no response");
                PingStatus::NoResponse
            }
        },
    }
}

impl Link {
    pub fn set_client_encoding(&self, runtime: &Runtime, name: &str) -> Result<(), String> {
        let statement = format!("SET client_encoding TO {}", quote_literal(name));
        runtime
            .block_on(self.client.batch_execute(&statement))
            .map_err(|e| diagnostic(&e))
    }

    /// Run `sql` with the simple query protocol and wait for the whole result.
    pub fn exec(&self, runtime: &Runtime, sql: &str) -> Result<ResultSet, String> {
        if !has_statement(sql) {
            return Err(EMPTY_QUERY.to_string());
        }
        let messages = runtime
            .block_on(self.client.simple_query(sql))
            .map_err(|e| diagnostic(&e))?;
        ResultSet::from_messages(messages)
    }

    pub fn is_closed(&self) -> bool {
        self.client.is_closed()
    }

    /// Close the link. The driver task sends Terminate and exits once the
    /// client is gone.
    pub fn release(self) {
        drop(self.client);
    }
}
