/// Connection descriptor construction
///
/// Validates the caller's connection options and encodes them into the
/// `key='value'` conninfo string handed to the client library for both
/// opening and pinging.
use std::fmt;

use crate::constants::DESCRIPTOR_CAPACITY;
use crate::error::{Error, Result};

/// A dynamically typed option value as supplied by the host.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    /// Any other host value; carries the host's name for its kind.
    Other(&'static str),
}

impl OptionValue {
    /// Human-readable kind name, used in type-mismatch messages.
    pub fn kind(&self) -> &'static str {
        match self {
            OptionValue::Text(_) => "string",
            OptionValue::Integer(_) => "integer",
            OptionValue::Float(_) => "float",
            OptionValue::Boolean(_) => "boolean",
            OptionValue::Other(kind) => *kind,
        }
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        OptionValue::Text(value.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        OptionValue::Text(value)
    }
}

impl From<i64> for OptionValue {
    fn from(value: i64) -> Self {
        OptionValue::Integer(value)
    }
}

impl From<u16> for OptionValue {
    fn from(value: u16) -> Self {
        OptionValue::Integer(i64::from(value))
    }
}

/// Caller-supplied connection options. `None` means the option was omitted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConnectionOptions {
    pub host: Option<OptionValue>,
    pub port: Option<OptionValue>,
    pub user: Option<OptionValue>,
    pub password: Option<OptionValue>,
    pub database: Option<OptionValue>,
    pub connect_timeout: Option<OptionValue>,
}

impl ConnectionOptions {
    pub fn new(host: impl Into<OptionValue>, port: impl Into<OptionValue>) -> Self {
        ConnectionOptions {
            host: Some(host.into()),
            port: Some(port.into()),
            ..Default::default()
        }
    }

    pub fn user(mut self, user: impl Into<OptionValue>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn password(mut self, password: impl Into<OptionValue>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn database(mut self, database: impl Into<OptionValue>) -> Self {
        self.database = Some(database.into());
        self
    }

    pub fn connect_timeout(mut self, timeout: impl Into<OptionValue>) -> Self {
        self.connect_timeout = Some(timeout.into());
        self
    }

    /// Assign an option by its host-facing name.
    ///
    /// Returns `false` for names this binding does not know; those are ignored.
    pub fn set(&mut self, name: &str, value: OptionValue) -> bool {
        let slot = match name {
            "host" => &mut self.host,
            "port" => &mut self.port,
            "user" => &mut self.user,
            "password" => &mut self.password,
            "database" => &mut self.database,
            "connect_timeout" => &mut self.connect_timeout,
            _ => return false,
        };
        *slot = Some(value);
        true
    }
}

/// Encoded connection string, guaranteed to fit in [`DESCRIPTOR_CAPACITY`].
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionDescriptor {
    encoded: String,
    /// (keyword, raw value) in encoding order, kept for masked debug output.
    tokens: Vec<(&'static str, String)>,
}

impl ConnectionDescriptor {
    pub fn as_str(&self) -> &str {
        &self.encoded
    }

    pub fn len(&self) -> usize {
        self.encoded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.encoded.is_empty()
    }

    /// Keywords present in the descriptor, in encoding order.
    pub fn keywords(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.tokens.iter().map(|(keyword, _)| *keyword)
    }
}

impl fmt::Debug for ConnectionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let masked: Vec<String> = self
            .tokens
            .iter()
            .map(|(keyword, value)| {
                if *keyword == "password" {
                    format!("{keyword}='***'")
                } else {
                    format!("{keyword}='{}'", escape_value(value))
                }
            })
            .collect();
        f.debug_tuple("ConnectionDescriptor")
            .field(&masked.join(" "))
            .finish()
    }
}

/// Validate `options` and encode them into a descriptor.
///
/// All type checks run before anything is encoded. The encoded string may not
/// exceed [`DESCRIPTOR_CAPACITY`] bytes.
pub fn build(options: &ConnectionOptions) -> Result<ConnectionDescriptor> {
    let host = require_text("host", options.host.as_ref())?;
    let port = require_number("port", options.port.as_ref())?;
    let user = optional_text("user", options.user.as_ref())?;
    let password = optional_text("password", options.password.as_ref())?;
    let database = optional_text("database", options.database.as_ref())?;
    let connect_timeout = optional_text("connect_timeout", options.connect_timeout.as_ref())?;

    let mut tokens: Vec<(&'static str, String)> = Vec::with_capacity(6);
    tokens.push(("host", host.to_string()));
    tokens.push(("port", port));
    let optional = [
        ("user", user),
        ("password", password),
        ("dbname", database),
        ("connect_timeout", connect_timeout),
    ];
    for (keyword, value) in optional {
        if let Some(value) = value {
            tokens.push((keyword, value.to_string()));
        }
    }

    let encoded = encode_tokens(&tokens);
    if encoded.len() > DESCRIPTOR_CAPACITY {
        return Err(Error::DescriptorOverflow {
            length: encoded.len(),
            capacity: DESCRIPTOR_CAPACITY,
        });
    }

    Ok(ConnectionDescriptor { encoded, tokens })
}

fn encode_tokens(tokens: &[(&'static str, String)]) -> String {
    let mut encoded = String::new();
    for (keyword, value) in tokens {
        if !encoded.is_empty() {
            encoded.push(' ');
        }
        encoded.push_str(keyword);
        encoded.push_str("='");
        encoded.push_str(&escape_value(value));
        encoded.push('\'');
    }
    encoded
}

/// Escape a value for a single-quoted conninfo token (`\` and `'`).
pub fn escape_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if c == '\\' || c == '\'' {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn require_text<'a>(field: &'static str, value: Option<&'a OptionValue>) -> Result<&'a str> {
    match value {
        Some(OptionValue::Text(text)) => Ok(text.as_str()),
        other => Err(Error::InvalidOption {
            field,
            expected: "string",
            actual: other.map_or("nil", OptionValue::kind),
        }),
    }
}

fn require_number(field: &'static str, value: Option<&OptionValue>) -> Result<String> {
    match value {
        Some(OptionValue::Integer(n)) => Ok(n.to_string()),
        Some(OptionValue::Float(f)) if f.is_finite() => Ok(f.to_string()),
        other => Err(Error::InvalidOption {
            field,
            expected: "number",
            actual: other.map_or("nil", OptionValue::kind),
        }),
    }
}

fn optional_text<'a>(
    field: &'static str,
    value: Option<&'a OptionValue>,
) -> Result<Option<&'a str>> {
    match value {
        None => Ok(None),
        Some(OptionValue::Text(text)) => Ok(Some(text.as_str())),
        Some(other) => Err(Error::InvalidOption {
            field,
            expected: "string",
            actual: other.kind(),
        }),
    }
}
