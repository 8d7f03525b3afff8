//! Update events pushed by the server.

use serde_json::{Map, Value};

use crate::job::ID_KEY;
use crate::{Error, JobId, Result};

/// A partial update for one job, decoded from a `{ id, ...fields }` payload.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateEvent {
    pub id: JobId,
    /// Fields to overwrite. Never contains `id`.
    pub fields: Map<String, Value>,
}

impl UpdateEvent {
    /// Decode a channel payload.
    ///
    /// Fails with [`Error::InvalidEvent`] when the payload is not an object
    /// or has no usable `id`.
    pub fn from_payload(payload: Value) -> Result<Self> {
        let Value::Object(mut fields) = payload else {
            return Err(Error::InvalidEvent(format!(
                "payload is not an object: {payload}"
            )));
        };
        let Some(raw_id) = fields.remove(ID_KEY) else {
            return Err(Error::InvalidEvent("payload has no id".to_string()));
        };
        let id = JobId::from_value(&raw_id)
            .ok_or_else(|| Error::InvalidEvent(format!("invalid id {raw_id}")))?;
        Ok(Self { id, fields })
    }

    /// The flat payload this event was decoded from.
    pub fn to_payload(&self) -> Value {
        let mut object = self.fields.clone();
        object.insert(ID_KEY.to_string(), Value::String(self.id.to_string()));
        Value::Object(object)
    }
}
