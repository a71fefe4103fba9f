//! Raw combat log lines: tokenization and legacy deduplication.

mod dedup;
mod parser;

pub use dedup::{LineDeduplicator, timestamp_prefix};
pub use parser::{parse_line, parse_timestamp};

use serde::Serialize;

/// GUID the game writes when an event has no source or destination.
pub const NULL_GUID: &str = "0000000000000000";

/// One loosely-typed parameter of a log line.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// The literal `nil` token.
    Null,
    Int(i64),
    Float(f64),
    Text(String),
    /// A bracketed `[...]` or parenthesized `(...)` sub-record.
    List(Vec<ParamValue>),
}

impl ParamValue {
    pub fn is_null(&self) -> bool {
        matches!(self, ParamValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Integer view. Multi-valued text such as `0|3` yields its first entry.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ParamValue::Int(v) => Some(*v),
            ParamValue::Float(v) => Some(*v as i64),
            ParamValue::Text(s) => first_piece(s).parse().ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Int(v) => Some(*v as f64),
            ParamValue::Float(v) => Some(*v),
            ParamValue::Text(s) => first_piece(s).parse().ok(),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[ParamValue]> {
        match self {
            ParamValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Textual identity of the value, used for GUIDs and team ids.
    pub fn to_id_string(&self) -> Option<String> {
        match self {
            ParamValue::Null => None,
            ParamValue::Int(v) => Some(v.to_string()),
            ParamValue::Float(v) => Some(v.to_string()),
            ParamValue::Text(s) => Some(s.clone()),
            ParamValue::List(_) => None,
        }
    }
}

fn first_piece(s: &str) -> &str {
    s.split('|').next().unwrap_or(s)
}

/// A tokenized log line. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogLine {
    /// Milliseconds since the Unix epoch of the line's naive local time.
    pub timestamp: i64,
    pub event_kind: String,
    pub parameters: Vec<ParamValue>,
    #[serde(skip)]
    pub raw: String,
}

impl LogLine {
    pub fn param(&self, idx: usize) -> Option<&ParamValue> {
        self.parameters.get(idx)
    }

    pub fn str_at(&self, idx: usize) -> Option<&str> {
        self.param(idx).and_then(ParamValue::as_str)
    }

    pub fn i64_at(&self, idx: usize) -> Option<i64> {
        self.param(idx).and_then(ParamValue::as_i64)
    }

    pub fn f64_at(&self, idx: usize) -> Option<f64> {
        self.param(idx).and_then(ParamValue::as_f64)
    }

    pub fn id_at(&self, idx: usize) -> Option<String> {
        self.param(idx).and_then(ParamValue::to_id_string)
    }

    /// A unit GUID, or `None` for `nil` and the null GUID.
    pub fn guid_at(&self, idx: usize) -> Option<String> {
        self.str_at(idx)
            .filter(|g| is_unit_guid(g))
            .map(str::to_string)
    }

    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }
}

/// True for GUIDs that name an actual unit.
pub fn is_unit_guid(guid: &str) -> bool {
    !guid.is_empty() && guid != NULL_GUID && guid != "nil"
}
