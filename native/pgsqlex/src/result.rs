/// Query result handles
///
/// A `QueryResult` owns the materialized rows of one statement. It does not
/// depend on the connection that produced it, and closing it is idempotent.
use rustler::{Atom, NifResult, Term};

use crate::cursor::RecordIterator;
use crate::decode;
use crate::error::{Error, Result};
use crate::native::{ResultSet, Row};
use crate::utils::safe_lock;

#[derive(Debug)]
pub struct QueryResult {
    set: Option<ResultSet>,
}

impl From<ResultSet> for QueryResult {
    fn from(set: ResultSet) -> Self {
        QueryResult { set: Some(set) }
    }
}

impl QueryResult {
    fn set(&self) -> Result<&ResultSet> {
        self.set.as_ref().ok_or(Error::ResultClosed)
    }

    /// Column names in server order; empty for command-only statements.
    pub fn column_names(&self) -> Result<&[String]> {
        Ok(&self.set()?.columns)
    }

    pub fn row_count(&self) -> Result<usize> {
        Ok(self.set()?.rows.len())
    }

    /// Row count from the command tag (`INSERT 0 3` gives 3), if any.
    pub fn affected_rows(&self) -> Result<Option<u64>> {
        Ok(self.set()?.affected)
    }

    /// Row at `index`, or `None` past the end or once closed.
    ///
    /// Cells share their buffers with the result, so this does not copy text.
    pub fn row(&self, index: usize) -> Option<Row> {
        self.set.as_ref()?.rows.get(index).cloned()
    }

    /// A fresh cursor over the rows, starting at the first one.
    pub fn iter(&self) -> Result<RecordIterator<'_>> {
        self.set()?;
        Ok(RecordIterator::new(self))
    }

    pub fn is_closed(&self) -> bool {
        self.set.is_none()
    }

    pub fn close(&mut self) {
        self.set = None;
    }
}

/// Column names of a result as a list of binaries.
#[rustler::nif]
pub fn column_names(result: Term) -> NifResult<(Atom, Vec<String>)> {
    let resource = decode::result_handle(result, "argument #1")?;
    let guard = safe_lock(&resource.result, "column_names result")?;
    Ok((rustler::types::atom::ok(), guard.column_names()?.to_vec()))
}

/// Number of rows held by a result.
#[rustler::nif]
pub fn row_count(result: Term) -> NifResult<(Atom, usize)> {
    let resource = decode::result_handle(result, "argument #1")?;
    let count = safe_lock(&resource.result, "row_count result")?.row_count()?;
    Ok((rustler::types::atom::ok(), count))
}

/// Rows reported by the command tag, or `nil` when the server sent none.
#[rustler::nif]
pub fn affected_rows(result: Term) -> NifResult<(Atom, Option<u64>)> {
    let resource = decode::result_handle(result, "argument #1")?;
    let affected = safe_lock(&resource.result, "affected_rows result")?.affected_rows()?;
    Ok((rustler::types::atom::ok(), affected))
}

/// Release a result. Safe to call any number of times.
#[rustler::nif]
pub fn close_result(result: Term) -> NifResult<Atom> {
    let resource = decode::result_handle(result, "argument #1")?;
    safe_lock(&resource.result, "close result")?.close();
    Ok(rustler::types::atom::ok())
}
