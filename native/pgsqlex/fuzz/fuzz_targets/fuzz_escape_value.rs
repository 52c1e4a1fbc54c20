#![no_main]
//! Fuzz test for conninfo value escaping
//!
//! Escaped values end up inside single quotes in the connection descriptor, so
//! no unescaped quote may survive and unescaping must restore the input.

use libfuzzer_sys::fuzz_target;
use pgsqlex::descriptor::escape_value;

fn unescape(escaped: &str) -> String {
    let mut out = String::with_capacity(escaped.len());
    let mut chars = escaped.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            assert_ne!(c, '\'', "unescaped quote in {escaped:?}");
            out.push(c);
        }
    }
    out
}

fuzz_target!(|data: &[u8]| {
    if let Ok(value) = std::str::from_utf8(data) {
        let escaped = escape_value(value);
        assert_eq!(unescape(&escaped), value);
    }
});
