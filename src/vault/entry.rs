//! Vault entries: named, typed values kept inside the encrypted payload.
//!
//! Values are a closed set of variants serialized as
//! `{"type": "...", "value": ...}`, wrapped in a versioned
//! `EntriesDocument`.  The whole document is JSON-encoded and then
//! encrypted as a single blob; nothing here touches the cipher.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};

use super::format::{base64_decode, base64_encode};
use crate::errors::{Result, SaltVaultError};

/// Current version of the entries document.
pub const ENTRIES_VERSION: u32 = 1;

/// A single typed entry value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum EntryValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Bytes(
        #[serde(serialize_with = "base64_encode", deserialize_with = "base64_decode")] Vec<u8>,
    ),
    List(Vec<EntryValue>),
    Map(BTreeMap<String, EntryValue>),
}

/// How to interpret a value typed on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EntryKind {
    #[default]
    Text,
    Integer,
    Float,
    Bool,
    /// Hex-encoded bytes.
    Bytes,
    /// Any JSON value; objects become maps, arrays become lists.
    Json,
}

impl FromStr for EntryKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(EntryKind::Text),
            "int" | "integer" => Ok(EntryKind::Integer),
            "float" => Ok(EntryKind::Float),
            "bool" => Ok(EntryKind::Bool),
            "bytes" => Ok(EntryKind::Bytes),
            "json" => Ok(EntryKind::Json),
            other => Err(format!(
                "unknown kind '{other}' — use text, int, float, bool, bytes or json"
            )),
        }
    }
}

impl EntryValue {
    /// Parse raw text as the given kind.
    pub fn parse_as(kind: EntryKind, raw: &str) -> Result<Self> {
        let invalid = |what: &str| SaltVaultError::CommandFailed(format!("'{raw}' is not {what}"));

        match kind {
            EntryKind::Text => Ok(EntryValue::Text(raw.to_string())),
            EntryKind::Integer => raw
                .trim()
                .parse()
                .map(EntryValue::Integer)
                .map_err(|_| invalid("an integer")),
            EntryKind::Float => raw
                .trim()
                .parse()
                .map(EntryValue::Float)
                .map_err(|_| invalid("a number")),
            EntryKind::Bool => match raw.trim().to_lowercase().as_str() {
                "true" | "yes" | "1" => Ok(EntryValue::Bool(true)),
                "false" | "no" | "0" => Ok(EntryValue::Bool(false)),
                _ => Err(invalid("a boolean")),
            },
            EntryKind::Bytes => hex::decode(raw.trim())
                .map(EntryValue::Bytes)
                .map_err(|_| invalid("hex-encoded bytes")),
            EntryKind::Json => {
                let json: serde_json::Value =
                    serde_json::from_str(raw).map_err(|_| invalid("valid JSON"))?;
                Self::from_json(json)
            }
        }
    }

    /// Convert plain JSON into an entry value.  `null` has no counterpart.
    pub fn from_json(json: serde_json::Value) -> Result<Self> {
        use serde_json::Value;

        match json {
            Value::Null => Err(SaltVaultError::CommandFailed(
                "null is not a storable value".into(),
            )),
            Value::Bool(b) => Ok(EntryValue::Bool(b)),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Ok(EntryValue::Integer(i)),
                None => n.as_f64().map(EntryValue::Float).ok_or_else(|| {
                    SaltVaultError::CommandFailed(format!("number {n} is out of range"))
                }),
            },
            Value::String(s) => Ok(EntryValue::Text(s)),
            Value::Array(items) => items
                .into_iter()
                .map(Self::from_json)
                .collect::<Result<Vec<_>>>()
                .map(EntryValue::List),
            Value::Object(fields) => fields
                .into_iter()
                .map(|(k, v)| Self::from_json(v).map(|v| (k, v)))
                .collect::<Result<BTreeMap<_, _>>>()
                .map(EntryValue::Map),
        }
    }

    /// Plain (untagged) JSON form, for display and export.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value;

        match self {
            EntryValue::Text(s) => Value::String(s.clone()),
            EntryValue::Integer(i) => Value::from(*i),
            EntryValue::Float(f) => Value::from(*f),
            EntryValue::Bool(b) => Value::Bool(*b),
            EntryValue::Bytes(bytes) => Value::String(BASE64.encode(bytes)),
            EntryValue::List(items) => Value::Array(items.iter().map(Self::to_json).collect()),
            EntryValue::Map(fields) => Value::Object(
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }

    /// Short type name shown in listings.
    pub fn kind_name(&self) -> &'static str {
        match self {
            EntryValue::Text(_) => "text",
            EntryValue::Integer(_) => "integer",
            EntryValue::Float(_) => "float",
            EntryValue::Bool(_) => "bool",
            EntryValue::Bytes(_) => "bytes",
            EntryValue::List(_) => "list",
            EntryValue::Map(_) => "map",
        }
    }
}

impl fmt::Display for EntryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryValue::Text(s) => f.write_str(s),
            EntryValue::Bytes(bytes) => f.write_str(&hex::encode(bytes)),
            other => write!(f, "{}", other.to_json()),
        }
    }
}

/// The versioned plaintext that gets encrypted into a vault payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntriesDocument {
    pub version: u32,
    pub entries: BTreeMap<String, EntryValue>,
}

impl Default for EntriesDocument {
    fn default() -> Self {
        Self {
            version: ENTRIES_VERSION,
            entries: BTreeMap::new(),
        }
    }
}

impl EntriesDocument {
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self)
            .map_err(|e| SaltVaultError::SerializationError(format!("entries: {e}")))
    }

    /// Parse a decrypted payload.
    ///
    /// A wrong key usually lands here as garbage, since the cipher has
    /// no integrity check of its own.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let doc: EntriesDocument = serde_json::from_slice(bytes).map_err(|e| {
            SaltVaultError::InvalidVaultFormat(format!("entries payload is not valid JSON: {e}"))
        })?;

        if doc.version != ENTRIES_VERSION {
            return Err(SaltVaultError::InvalidVaultFormat(format!(
                "unsupported entries version {}, expected {ENTRIES_VERSION}",
                doc.version
            )));
        }
        Ok(doc)
    }
}
