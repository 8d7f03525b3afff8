//! Job identifiers.

use derive_more::Display;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// The server-assigned identifier of a job.
///
/// Servers send ids either as JSON strings or as integers. Both are kept in
/// their canonical string form, so `7` and `"7"` address the same job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Display)]
#[display("{_0}")]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    /// Read an identifier out of a JSON value.
    ///
    /// Returns `None` for anything that is not a non-empty string or an
    /// integer.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) if !s.is_empty() => Some(Self(s.clone())),
            Value::Number(n) if n.is_i64() || n.is_u64() => Some(Self(n.to_string())),
            _ => None,
        }
    }

    /// The canonical string form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for JobId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for JobId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<i64> for JobId {
    fn from(n: i64) -> Self {
        Self(n.to_string())
    }
}

impl<'de> Deserialize<'de> for JobId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(&value).ok_or_else(|| {
            serde::de::Error::custom(format!("expected a string or integer job id, got {value}"))
        })
    }
}

impl std::str::FromStr for JobId {
    type Err = String;

    /// Same rule as [`JobId::from_value`] for strings: any non-empty text.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if s.is_empty() {
            return Err("job id must not be empty".to_string());
        }
        Ok(Self(s.to_string()))
    }
}
