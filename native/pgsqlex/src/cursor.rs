/// Forward-only record iteration over query results.
///
/// A `Cursor` is just a position; it looks rows up in a result it does not
/// own. `RecordIterator` pairs a cursor with a borrowed result for Rust
/// callers, and `CursorResource` pairs one with a result resource for Elixir.
///
/// Once a cursor has run past the last row it stays exhausted.
use std::iter::FusedIterator;

use rustler::{Atom, Binary, Encoder, Env, NifResult, OwnedBinary, ResourceArc, Term};

use crate::decode;
use crate::error::{Error, Result};
use crate::models::CursorResource;
use crate::native::Row;
use crate::result::QueryResult;
use crate::utils::safe_lock;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    position: usize,
}

impl Cursor {
    pub fn new() -> Self {
        Cursor { position: 0 }
    }

    /// Index of the row the next `advance` returns.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Yield the row at the current position and move past it.
    pub fn advance(&mut self, result: &QueryResult) -> Option<Row> {
        let row = result.row(self.position)?;
        self.position += 1;
        Some(row)
    }
}

#[derive(Debug)]
pub struct RecordIterator<'a> {
    result: &'a QueryResult,
    cursor: Cursor,
}

impl<'a> RecordIterator<'a> {
    pub fn new(result: &'a QueryResult) -> Self {
        RecordIterator {
            result,
            cursor: Cursor::new(),
        }
    }

    pub fn position(&self) -> usize {
        self.cursor.position()
    }
}

impl Iterator for RecordIterator<'_> {
    type Item = Row;

    fn next(&mut self) -> Option<Row> {
        self.cursor.advance(self.result)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let total = self.result.row_count().unwrap_or(0);
        let remaining = total.saturating_sub(self.cursor.position());
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for RecordIterator<'_> {}

impl FusedIterator for RecordIterator<'_> {}

fn encode_row<'a>(env: Env<'a>, row: &Row) -> Result<Term<'a>> {
    let cells: Result<Vec<Term<'a>>> = row
        .iter()
        .enumerate()
        .map(|(i, cell)| match cell {
            Some(bytes) => OwnedBinary::new(bytes.len())
                .ok_or_else(|| {
                    Error::Internal(format!("Failed to allocate binary for column {i}"))
                })
                .map(|mut owned| {
                    owned.as_mut_slice().copy_from_slice(bytes);
                    Binary::from_owned(owned, env).encode(env)
                }),
            None => Ok(rustler::types::atom::nil().encode(env)),
        })
        .collect();
    Ok(cells?.encode(env))
}

/// Create a cursor over a result, positioned before the first row.
#[rustler::nif]
pub fn iterator(result: Term) -> NifResult<(Atom, ResourceArc<CursorResource>)> {
    let resource = decode::result_handle(result, "argument #1")?;
    if safe_lock(&resource.result, "iterator result")?.is_closed() {
        return Err(Error::ResultClosed.into());
    }
    Ok((
        rustler::types::atom::ok(),
        ResourceArc::new(CursorResource::new(resource)),
    ))
}

/// Advance a cursor.
///
/// Returns `{:ok, row}` with one binary (or `nil` for NULL) per column, or
/// `:done` once every row has been produced. Repeated calls after `:done`
/// keep returning `:done`.
#[rustler::nif]
pub fn next_record<'a>(env: Env<'a>, cursor: Term<'a>) -> NifResult<Term<'a>> {
    let resource = decode::cursor_handle(cursor, "argument #1")?;
    let result = safe_lock(&resource.result.result, "next_record result")?;
    if result.is_closed() {
        return Err(Error::ResultClosed.into());
    }

    let mut position = safe_lock(&resource.cursor, "next_record cursor")?;
    match position.advance(&result) {
        Some(row) => {
            let encoded = encode_row(env, &row)?;
            Ok((rustler::types::atom::ok(), encoded).encode(env))
        }
        None => Ok(crate::constants::done().encode(env)),
    }
}
