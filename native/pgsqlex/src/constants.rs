/// Global constants and atom declarations for PgSqlEx
///
/// This module holds all static configuration, the shared runtime, and atom
/// definitions used throughout the codebase.
use once_cell::sync::Lazy;
use rustler::atoms;
use tokio::runtime::{Builder, Runtime};

use crate::error::{Error, Result};

/// Total bytes reserved for a native link handle plus its descriptor.
pub const HANDLE_BLOCK_SIZE: usize = 1024;

/// Bytes reserved for the link pointer inside the handle block. Fixed at 8 so
/// the descriptor capacity does not depend on the target's pointer width.
pub const LINK_POINTER_SIZE: usize = 8;

/// Maximum encoded length of a connection descriptor, in bytes.
pub const DESCRIPTOR_CAPACITY: usize = HANDLE_BLOCK_SIZE - LINK_POINTER_SIZE;

/// Worker threads driving link I/O in the background.
pub const RUNTIME_WORKER_THREADS: usize = 2;

/// Global Tokio runtime for the blocking operations.
///
/// Built on first use. A build failure is kept rather than panicking, so every
/// caller can report it as an ordinary error.
static TOKIO_RUNTIME: Lazy<std::result::Result<Runtime, String>> = Lazy::new(|| {
    Builder::new_multi_thread()
        .worker_threads(RUNTIME_WORKER_THREADS)
        .thread_name("pgsqlex-io")
        .enable_all()
        .build()
        .map_err(|e| format!("failed to initialize Tokio runtime: {e}"))
});

/// Shared runtime, or `Error::Internal` if it could not be created.
pub fn runtime() -> Result<&'static Runtime> {
    TOKIO_RUNTIME
        .as_ref()
        .map_err(|message| Error::Internal(message.clone()))
}

// Atom declarations - used as return values and error kinds in the NIF interface
atoms! {
    ok,
    done,
    internal,
    invalid_argument,
    invalid_option,
    descriptor_overflow,
    connection_failed,
    server_rejecting,
    unreachable,
    not_attempted,
    encoding_rejected,
    query_failed,
    connection_closed,
    result_closed,
}
