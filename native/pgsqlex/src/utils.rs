/// Utility functions and helpers for PgSqlEx
///
/// Locking with poison reporting, SQL literal quoting and SQL text checks.
use std::sync::{Mutex, MutexGuard};

use crate::error::{Error, Result};

/// Safely lock a mutex with proper error handling
///
/// Returns a descriptive error message if the mutex is poisoned.
pub fn safe_lock<'a, T>(mutex: &'a Mutex<T>, context: &str) -> Result<MutexGuard<'a, T>> {
    mutex
        .lock()
        .map_err(|e| Error::Internal(format!("Mutex poisoned in {context}: {e}")))
}

/// Quote `value` as a standard SQL string literal, doubling embedded quotes.
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Reject SQL text that would not reach the server as a statement.
pub fn validate_sql(sql: &str) -> Result<()> {
    if sql.trim().is_empty() {
        return Err(Error::invalid_argument(
            "sql",
            "a non-empty SQL statement",
            "an empty string",
        ));
    }
    Ok(())
}

/// Whether `sql` holds anything besides whitespace, semicolons and comments.
///
/// The server answers text without a statement with an empty-query response,
/// which the simple query protocol cannot tell apart from a command that
/// touched no rows. Block comments nest. An unterminated one counts as a
/// statement so the server reports the syntax error itself.
pub fn has_statement(sql: &str) -> bool {
    let bytes = sql.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b';' | b' ' | b'\t' | b'\n' | b'\r' | b'\x0c' => i += 1,
            b'-' if bytes.get(i + 1) == Some(&b'-') => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                let mut depth = 1;
                i += 2;
                while depth > 0 {
                    match (bytes.get(i), bytes.get(i + 1)) {
                        (None, _) => return true,
                        (Some(b'/'), Some(b'*')) => {
                            depth += 1;
                            i += 2;
                        }
                        (Some(b'*'), Some(b'/')) => {
                            depth -= 1;
                            i += 2;
                        }
                        _ => i += 1,
                    }
                }
            }
            _ => return true,
        }
    }
    false
}
