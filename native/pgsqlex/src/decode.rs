/// Decoding of Elixir terms into Rust values
///
/// Converts NIF arguments into options, strings and resource handles. Shape
/// mismatches become `Error::InvalidArgument` naming the argument and the kind
/// of term actually received, so they reach the caller as `{:error, ...}`
/// instead of raising.
use rustler::types::atom::nil;
use rustler::types::map::MapIterator;
use rustler::{Atom, Resource, ResourceArc, Term};
use tracing::debug;

use crate::descriptor::{ConnectionOptions, OptionValue};
use crate::error::{Error, Result};
use crate::models::{ConnectionResource, CursorResource, ResultResource};

/// Name of a term's kind, for error messages.
pub fn term_kind(term: Term) -> &'static str {
    if term.is_atom() {
        if term.decode::<bool>().is_ok() {
            "boolean"
        } else if term.decode::<Atom>().is_ok_and(|atom| atom == nil()) {
            "nil"
        } else {
            "atom"
        }
    } else if term.is_binary() {
        "binary"
    } else if term.decode::<i64>().is_ok() {
        "integer"
    } else if term.decode::<f64>().is_ok() {
        "float"
    } else if term.is_number() {
        // Integers beyond i64 are the only numbers neither decode accepts.
        "bignum"
    } else if term.is_list() {
        "list"
    } else if term.is_map() {
        "map"
    } else if term.is_tuple() {
        "tuple"
    } else if term.is_pid() {
        "pid"
    } else if term.is_fun() {
        "function"
    } else if term.is_ref() {
        "reference"
    } else {
        "term"
    }
}

/// Decode an option value. `nil` means the option is absent.
pub fn decode_option_value(term: Term) -> Option<OptionValue> {
    if let Ok(atom) = term.decode::<Atom>() {
        if atom == nil() {
            return None;
        }
        return Some(match term.decode::<bool>() {
            Ok(flag) => OptionValue::Boolean(flag),
            Err(_) => OptionValue::Other("atom"),
        });
    }

    let value = if let Ok(n) = term.decode::<i64>() {
        OptionValue::Integer(n)
    } else if let Ok(f) = term.decode::<f64>() {
        OptionValue::Float(f)
    } else if term.is_binary() {
        match term.decode::<String>() {
            Ok(text) => OptionValue::Text(text),
            Err(_) => OptionValue::Other("non-UTF-8 binary"),
        }
    } else {
        OptionValue::Other(term_kind(term))
    };
    Some(value)
}

fn option_name(key: Term) -> Option<String> {
    key.atom_to_string()
        .ok()
        .or_else(|| key.decode::<String>().ok())
}

fn assign_option(options: &mut ConnectionOptions, key: Term, value: Term) {
    let Some(name) = option_name(key) else {
        debug!(key = term_kind(key), "ignoring connection option with non-name key");
        return;
    };
    let Some(value) = decode_option_value(value) else {
        return;
    };
    if !options.set(&name, value) {
        debug!(option = %name, "ignoring unknown connection option");
    }
}

/// Decode connection options from a keyword list or a map.
pub fn decode_options(term: Term) -> Result<ConnectionOptions> {
    const EXPECTED: &str = "a keyword list or map";
    let mut options = ConnectionOptions::default();

    if term.is_map() {
        let entries = MapIterator::new(term)
            .ok_or_else(|| Error::invalid_argument("argument #1", EXPECTED, term_kind(term)))?;
        for (key, value) in entries {
            assign_option(&mut options, key, value);
        }
    } else if term.is_list() {
        let list: Vec<Term> = term
            .decode()
            .map_err(|_| Error::invalid_argument("argument #1", EXPECTED, "improper list"))?;
        for pair in list {
            let (key, value): (Term, Term) = pair.decode().map_err(|_| {
                Error::invalid_argument(
                    "argument #1",
                    EXPECTED,
                    format!("list containing {}", term_kind(pair)),
                )
            })?;
            assign_option(&mut options, key, value);
        }
    } else {
        return Err(Error::invalid_argument(
            "argument #1",
            EXPECTED,
            term_kind(term),
        ));
    }

    Ok(options)
}

/// Decode a UTF-8 binary argument.
pub fn string_argument(term: Term, argument: &str) -> Result<String> {
    term.decode::<String>()
        .map_err(|_| Error::invalid_argument(argument, "a string", term_kind(term)))
}

fn resource<T: Resource>(
    term: Term,
    argument: &str,
    expected: &'static str,
) -> Result<ResourceArc<T>> {
    term.decode::<ResourceArc<T>>()
        .map_err(|_| Error::invalid_argument(argument, expected, term_kind(term)))
}

pub fn connection_handle(term: Term, argument: &str) -> Result<ResourceArc<ConnectionResource>> {
    resource(term, argument, "a connection")
}

pub fn result_handle(term: Term, argument: &str) -> Result<ResourceArc<ResultResource>> {
    resource(term, argument, "a query result")
}

pub fn cursor_handle(term: Term, argument: &str) -> Result<ResourceArc<CursorResource>> {
    resource(term, argument, "a record iterator")
}
