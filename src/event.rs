use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Data carried by a message, in either direction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Payload {
    /// Structured-clone compatible value
    Json(JsonValue),
    /// Transferable buffer (ArrayBuffer)
    Binary(Bytes),
}

impl Payload {
    /// Get the JSON value if this is a JSON payload
    pub fn as_json(&self) -> Option<&JsonValue> {
        match self {
            Self::Json(v) => Some(v),
            Self::Binary(_) => None,
        }
    }

    /// Get the bytes if this is a binary payload
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Self::Binary(b) => Some(b),
            Self::Json(_) => None,
        }
    }

    pub fn is_binary(&self) -> bool {
        matches!(self, Self::Binary(_))
    }
}

impl Default for Payload {
    fn default() -> Self {
        Self::Json(JsonValue::Null)
    }
}

impl From<JsonValue> for Payload {
    fn from(v: JsonValue) -> Self {
        Self::Json(v)
    }
}

impl From<Bytes> for Payload {
    fn from(b: Bytes) -> Self {
        Self::Binary(b)
    }
}

impl From<Vec<u8>> for Payload {
    fn from(b: Vec<u8>) -> Self {
        Self::Binary(Bytes::from(b))
    }
}

impl From<&str> for Payload {
    fn from(s: &str) -> Self {
        Self::Json(JsonValue::String(s.to_string()))
    }
}

impl From<String> for Payload {
    fn from(s: String) -> Self {
        Self::Json(JsonValue::String(s))
    }
}

fn default_last_event_id() -> String {
    "0".to_string()
}

/// Message delivered from a worker channel to its handle
///
/// Field names and defaults follow the browser `MessageEvent`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageEvent {
    pub data: Payload,
    #[serde(default)]
    pub origin: String,
    #[serde(default = "default_last_event_id")]
    pub last_event_id: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub ports: Vec<String>,
}

impl MessageEvent {
    /// Create an event carrying `data` with default metadata
    pub fn new(data: impl Into<Payload>) -> Self {
        Self {
            data: data.into(),
            origin: String::new(),
            last_event_id: default_last_event_id(),
            source: String::new(),
            ports: Vec::new(),
        }
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = origin.into();
        self
    }

    pub fn with_last_event_id(mut self, id: impl Into<String>) -> Self {
        self.last_event_id = id.into();
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }
}

impl Default for MessageEvent {
    fn default() -> Self {
        Self::new(Payload::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_event_has_browser_defaults() {
        let event = MessageEvent::new(json!({"data": "x"}));

        assert_eq!(event.origin, "");
        assert_eq!(event.last_event_id, "0");
        assert_eq!(event.source, "");
        assert!(event.ports.is_empty());
    }

    #[test]
    fn test_event_json_uses_camel_case() {
        let event = MessageEvent::new(json!(1)).with_last_event_id("7");
        let value = serde_json::to_value(&event).unwrap();

        assert_eq!(value["lastEventId"], "7");
        assert_eq!(value["data"], json!({"type": "json", "value": 1}));
        assert!(value.get("last_event_id").is_none());
    }

    #[test]
    fn test_missing_metadata_falls_back_to_defaults() {
        let event: MessageEvent =
            serde_json::from_value(json!({"data": {"type": "json", "value": "hi"}})).unwrap();

        assert_eq!(event, MessageEvent::new("hi"));
    }

    #[test]
    fn test_payload_accessors() {
        let binary = Payload::from(vec![1u8, 2, 3]);
        assert!(binary.is_binary());
        assert_eq!(binary.as_bytes().map(|b| b.len()), Some(3));
        assert!(binary.as_json().is_none());

        let text = Payload::from("hello");
        assert_eq!(text.as_json(), Some(&json!("hello")));
        assert!(text.as_bytes().is_none());
    }
}
