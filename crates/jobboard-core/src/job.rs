//! Job records.

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::JobId;

/// Name of the identifier key inside raw job payloads.
pub const ID_KEY: &str = "id";

/// One job tracked by the dashboard.
///
/// `fields` holds everything the server sent except the identifier. The
/// field set is open-ended and can grow with every merge.
#[derive(Debug, Clone, PartialEq)]
pub struct JobRecord {
    /// Server-assigned identifier, never reassigned.
    pub id: JobId,
    /// Job state as last reported by the server.
    pub fields: Map<String, Value>,
    /// Number of merges that changed at least one field.
    pub revision: u64,
    /// When the record was created or last changed locally.
    pub updated_at: DateTime<Utc>,
}

impl JobRecord {
    pub fn new(id: JobId, fields: Map<String, Value>) -> Self {
        Self {
            id,
            fields,
            revision: 0,
            updated_at: Utc::now(),
        }
    }

    /// Build a record from a raw `{ "id": ..., ...fields }` object.
    ///
    /// The error string explains why the value is not a usable record.
    pub fn from_value(value: Value) -> std::result::Result<Self, String> {
        let Value::Object(mut fields) = value else {
            return Err(format!("expected a JSON object, got {}", type_name(&value)));
        };
        let raw_id = fields
            .remove(ID_KEY)
            .ok_or_else(|| "missing id".to_string())?;
        let id = JobId::from_value(&raw_id).ok_or_else(|| format!("invalid id {raw_id}"))?;
        Ok(Self::new(id, fields))
    }

    /// Look up a field by name. `id` resolves to the identifier.
    pub fn get(&self, name: &str) -> Option<Value> {
        if name == ID_KEY {
            return Some(Value::String(self.id.to_string()));
        }
        self.fields.get(name).cloned()
    }

    /// Shallow merge `update` into this record.
    ///
    /// Every incoming field overwrites the stored one; fields absent from
    /// `update` are left alone. Returns the keys whose value changed, in the
    /// order they appeared in the update.
    pub fn merge(&mut self, update: Map<String, Value>) -> Vec<String> {
        let mut changed = Vec::new();
        for (key, value) in update {
            if key == ID_KEY {
                continue;
            }
            if self.fields.get(&key) != Some(&value) {
                changed.push(key.clone());
                self.fields.insert(key, value);
            }
        }
        if !changed.is_empty() {
            self.revision += 1;
            self.updated_at = Utc::now();
        }
        changed
    }

    /// The record as the flat payload the server speaks.
    pub fn to_value(&self) -> Value {
        let mut object = Map::with_capacity(self.fields.len() + 1);
        object.insert(ID_KEY.to_string(), Value::String(self.id.to_string()));
        for (key, value) in &self.fields {
            object.insert(key.clone(), value.clone());
        }
        Value::Object(object)
    }
}

impl Serialize for JobRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
