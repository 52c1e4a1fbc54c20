/// Error taxonomy for PgSqlEx
///
/// Every fallible operation returns [`Result`]. Each variant maps to one kind
/// atom at the NIF boundary, and native diagnostics are carried verbatim.
use rustler::Encoder;

use crate::constants;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Caller passed a value of the wrong shape; detected before any I/O.
    #[error("{argument} is expected to be {expected}, but got {actual}")]
    InvalidArgument {
        argument: String,
        expected: &'static str,
        actual: String,
    },

    /// A connection option is missing or carries the wrong type.
    #[error("option `{field}' is expected to be a {expected}, but got {actual}")]
    InvalidOption {
        field: &'static str,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("connection descriptor is {length} bytes, exceeding the {capacity}-byte capacity")]
    DescriptorOverflow { length: usize, capacity: usize },

    #[error("{message}")]
    ConnectionFailed { message: String },

    #[error("The server is running but is in a state that disallows connections (startup, shutdown, or crash recovery).")]
    ServerRejecting,

    #[error("The server could not be contacted. The server may not be running, the connection parameters may be wrong (for example, the port number), or the network may be blocking the request.")]
    Unreachable,

    #[error("No attempt was made to contact the server, because the supplied parameters were obviously incorrect or there was some client-side problem (for example, out of memory).")]
    NotAttempted,

    #[error("{message}")]
    EncodingRejected { message: String },

    #[error("{message}")]
    QueryFailed { message: String },

    #[error("connection is closed")]
    ConnectionClosed,

    #[error("query result is closed")]
    ResultClosed,

    /// Host-side failure unrelated to the database (poisoned lock, allocation).
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn invalid_argument(
        argument: impl Into<String>,
        expected: &'static str,
        actual: impl Into<String>,
    ) -> Self {
        Error::InvalidArgument {
            argument: argument.into(),
            expected,
            actual: actual.into(),
        }
    }

    /// Kind name, identical to the atom returned to the host.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::InvalidArgument { .. } => "invalid_argument",
            Error::InvalidOption { .. } => "invalid_option",
            Error::DescriptorOverflow { .. } => "descriptor_overflow",
            Error::ConnectionFailed { .. } => "connection_failed",
            Error::ServerRejecting => "server_rejecting",
            Error::Unreachable => "unreachable",
            Error::NotAttempted => "not_attempted",
            Error::EncodingRejected { .. } => "encoding_rejected",
            Error::QueryFailed { .. } => "query_failed",
            Error::ConnectionClosed => "connection_closed",
            Error::ResultClosed => "result_closed",
            Error::Internal(_) => "internal",
        }
    }

    fn kind_atom(&self) -> rustler::Atom {
        match self {
            Error::InvalidArgument { .. } => constants::invalid_argument(),
            Error::InvalidOption { .. } => constants::invalid_option(),
            Error::DescriptorOverflow { .. } => constants::descriptor_overflow(),
            Error::ConnectionFailed { .. } => constants::connection_failed(),
            Error::ServerRejecting => constants::server_rejecting(),
            Error::Unreachable => constants::unreachable(),
            Error::NotAttempted => constants::not_attempted(),
            Error::EncodingRejected { .. } => constants::encoding_rejected(),
            Error::QueryFailed { .. } => constants::query_failed(),
            Error::ConnectionClosed => constants::connection_closed(),
            Error::ResultClosed => constants::result_closed(),
            Error::Internal(_) => constants::internal(),
        }
    }
}

/// Encodes as `{kind, message}`; rustler wraps it into `{:error, {kind, message}}`.
impl Encoder for Error {
    fn encode<'a>(&self, env: rustler::Env<'a>) -> rustler::Term<'a> {
        (self.kind_atom(), self.to_string()).encode(env)
    }
}

impl From<Error> for rustler::Error {
    fn from(err: Error) -> Self {
        rustler::Error::Term(Box::new(err))
    }
}
