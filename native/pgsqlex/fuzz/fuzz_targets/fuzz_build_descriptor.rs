#![no_main]
//! Structured descriptor fuzzing
//!
//! Feeds arbitrarily typed option values to the descriptor builder. The builder
//! must never panic, never return a descriptor longer than the capacity, and
//! only fail with an option or overflow error.

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use pgsqlex::{build, ConnectionOptions, Error, OptionValue, DESCRIPTOR_CAPACITY};

#[derive(Debug, Arbitrary)]
enum FuzzValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Other,
}

impl From<FuzzValue> for OptionValue {
    fn from(value: FuzzValue) -> Self {
        match value {
            FuzzValue::Text(text) => OptionValue::Text(text),
            FuzzValue::Integer(n) => OptionValue::Integer(n),
            FuzzValue::Float(f) => OptionValue::Float(f),
            FuzzValue::Boolean(b) => OptionValue::Boolean(b),
            FuzzValue::Other => OptionValue::Other("tuple"),
        }
    }
}

#[derive(Debug, Arbitrary)]
struct FuzzOptions {
    host: Option<FuzzValue>,
    port: Option<FuzzValue>,
    user: Option<FuzzValue>,
    password: Option<FuzzValue>,
    database: Option<FuzzValue>,
    connect_timeout: Option<FuzzValue>,
}

fuzz_target!(|input: FuzzOptions| {
    let options = ConnectionOptions {
        host: input.host.map(Into::into),
        port: input.port.map(Into::into),
        user: input.user.map(Into::into),
        password: input.password.map(Into::into),
        database: input.database.map(Into::into),
        connect_timeout: input.connect_timeout.map(Into::into),
    };

    match build(&options) {
        Ok(descriptor) => {
            assert!(descriptor.len() <= DESCRIPTOR_CAPACITY);
            assert!(descriptor.as_str().starts_with("host='"));
        }
        Err(Error::InvalidOption { .. }) => {}
        Err(Error::DescriptorOverflow { length, capacity }) => assert!(length > capacity),
        Err(other) => panic!("unexpected error kind: {other:?}"),
    }
});
