//! Tests for descriptor.rs - option validation and conninfo encoding

#![allow(clippy::unwrap_used, clippy::panic)]

use crate::constants::DESCRIPTOR_CAPACITY;
use crate::descriptor::{build, escape_value, ConnectionOptions, OptionValue};
use crate::error::Error;

mod encoding {
    use super::*;

    #[test]
    fn test_required_fields_only() {
        let descriptor = build(&ConnectionOptions::new("localhost", 5432_i64)).unwrap();
        assert_eq!(descriptor.as_str(), "host='localhost' port='5432'");
    }

    #[test]
    fn test_all_fields_in_fixed_order() {
        // Set in a scrambled order; encoding order must not follow it.
        let mut options = ConnectionOptions::default();
        options.set("connect_timeout", "10".into());
        options.set("database", "app".into());
        options.set("password", "secret".into());
        options.set("user", "alice".into());
        options.set("port", OptionValue::Integer(6543));
        options.set("host", "db.internal".into());

        let descriptor = build(&options).unwrap();
        assert_eq!(
            descriptor.as_str(),
            "host='db.internal' port='6543' user='alice' password='secret' dbname='app' connect_timeout='10'"
        );
        assert_eq!(
            descriptor.keywords().collect::<Vec<_>>(),
            vec!["host", "port", "user", "password", "dbname", "connect_timeout"]
        );
    }

    #[test]
    fn test_absent_optional_fields_are_skipped() {
        let options = ConnectionOptions::new("h", 1_i64).database("d");
        let descriptor = build(&options).unwrap();
        assert_eq!(descriptor.as_str(), "host='h' port='1' dbname='d'");
    }

    #[test]
    fn test_float_port_is_numeric() {
        let options = ConnectionOptions::new("h", OptionValue::Float(5432.0));
        assert_eq!(build(&options).unwrap().as_str(), "host='h' port='5432'");
    }

    #[test]
    fn test_quotes_and_backslashes_are_escaped() {
        let options = ConnectionOptions::new("h", 1_i64).password(r"it's a \ secret");
        let descriptor = build(&options).unwrap();
        assert_eq!(
            descriptor.as_str(),
            r"host='h' port='1' password='it\'s a \\ secret'"
        );
    }

    #[test]
    fn test_escape_value_leaves_plain_text_alone() {
        assert_eq!(escape_value("plain text"), "plain text");
        assert_eq!(escape_value(""), "");
        assert_eq!(escape_value("'"), r"\'");
    }

    #[test]
    fn test_debug_masks_password() {
        let options = ConnectionOptions::new("h", 1_i64).password("hunter2");
        let rendered = format!("{:?}", build(&options).unwrap());
        assert!(!rendered.contains("hunter2"), "password leaked: {rendered}");
        assert!(rendered.contains("password='***'"));
        assert!(rendered.contains("host='h'"));
    }

    #[test]
    fn test_unknown_option_is_ignored() {
        let mut options = ConnectionOptions::new("h", 1_i64);
        assert!(!options.set("sslmode", "require".into()));
        assert_eq!(build(&options).unwrap().as_str(), "host='h' port='1'");
    }
}

mod validation {
    use super::*;

    fn invalid_field(options: &ConnectionOptions) -> (&'static str, &'static str, &'static str) {
        match build(options) {
            Err(Error::InvalidOption {
                field,
                expected,
                actual,
            }) => (field, expected, actual),
            other => panic!("expected InvalidOption, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_host() {
        let options = ConnectionOptions {
            port: Some(OptionValue::Integer(5432)),
            ..Default::default()
        };
        assert_eq!(invalid_field(&options), ("host", "string", "nil"));
    }

    #[test]
    fn test_missing_port() {
        let options = ConnectionOptions {
            host: Some("localhost".into()),
            ..Default::default()
        };
        assert_eq!(invalid_field(&options), ("port", "number", "nil"));
    }

    #[test]
    fn test_host_must_be_text() {
        let options = ConnectionOptions::new(OptionValue::Integer(127), 5432_i64);
        assert_eq!(invalid_field(&options), ("host", "string", "integer"));
    }

    #[test]
    fn test_port_must_be_numeric() {
        let options = ConnectionOptions::new("localhost", "5432");
        assert_eq!(invalid_field(&options), ("port", "number", "string"));
    }

    #[test]
    fn test_non_finite_port_is_rejected() {
        let options = ConnectionOptions::new("localhost", OptionValue::Float(f64::NAN));
        assert_eq!(invalid_field(&options), ("port", "number", "float"));
    }

    #[test]
    fn test_optional_fields_must_be_text() {
        let cases: [(&str, &'static str); 4] = [
            ("user", "user"),
            ("password", "password"),
            ("database", "database"),
            ("connect_timeout", "connect_timeout"),
        ];
        for (name, field) in cases {
            let mut options = ConnectionOptions::new("h", 1_i64);
            options.set(name, OptionValue::Boolean(true));
            assert_eq!(invalid_field(&options), (field, "string", "boolean"));
        }
    }

    #[test]
    fn test_host_checked_before_port() {
        let options = ConnectionOptions::default();
        assert_eq!(invalid_field(&options).0, "host");
    }

    #[test]
    fn test_error_message_names_field_and_types() {
        let err = build(&ConnectionOptions::new("h", OptionValue::Other("map"))).unwrap_err();
        assert_eq!(
            err.to_string(),
            "option `port' is expected to be a number, but got map"
        );
        assert_eq!(err.kind(), "invalid_option");
    }

    #[test]
    fn test_bignum_port_message_names_the_kind() {
        let err = build(&ConnectionOptions::new("h", OptionValue::Other("bignum"))).unwrap_err();
        assert_eq!(
            err.to_string(),
            "option `port' is expected to be a number, but got bignum"
        );
    }
}

mod capacity {
    use super::*;

    /// Length of the encoding for host `h` and port `1` plus a user of `n` bytes.
    fn encoded_len_with_user(n: usize) -> usize {
        "host='h' port='1'".len() + " user=''".len() + n
    }

    #[test]
    fn test_descriptor_at_capacity_is_accepted() {
        let fill = DESCRIPTOR_CAPACITY - encoded_len_with_user(0);
        let options = ConnectionOptions::new("h", 1_i64).user("u".repeat(fill));
        let descriptor = build(&options).unwrap();
        assert_eq!(descriptor.len(), DESCRIPTOR_CAPACITY);
    }

    #[test]
    fn test_descriptor_over_capacity_is_rejected() {
        let fill = DESCRIPTOR_CAPACITY - encoded_len_with_user(0) + 1;
        let options = ConnectionOptions::new("h", 1_i64).user("u".repeat(fill));
        assert_eq!(
            build(&options).unwrap_err(),
            Error::DescriptorOverflow {
                length: DESCRIPTOR_CAPACITY + 1,
                capacity: DESCRIPTOR_CAPACITY,
            }
        );
    }

    #[test]
    fn test_escaping_counts_towards_capacity() {
        // Each quote doubles in size once escaped.
        let quotes = DESCRIPTOR_CAPACITY / 2;
        let options = ConnectionOptions::new("h", 1_i64).user("'".repeat(quotes));
        assert!(matches!(
            build(&options),
            Err(Error::DescriptorOverflow { .. })
        ));
    }

    #[test]
    fn test_type_errors_win_over_overflow() {
        let options = ConnectionOptions::new("h".repeat(4096), 1_i64).user(OptionValue::Integer(1));
        assert!(matches!(
            build(&options),
            Err(Error::InvalidOption { field: "user", .. })
        ));
    }
}
