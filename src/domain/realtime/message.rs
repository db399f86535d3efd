//! Push message types delivered to connected clients.
//!
//! Every message serializes to a flat JSON object:
//!
//! ```text
//! { "type": "chart_1_update", "time": 12, "value": 2.71, "timestamp": 1736467200 }
//! ```
//!
//! The `type` discriminator and `timestamp` (Unix seconds) are always
//! present; the remaining keys are type-specific fields.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::foundation::{Timestamp, ValidationError};

/// Keys owned by the envelope and never accepted as payload fields.
const RESERVED_KEYS: &[&str] = &["type", "timestamp"];

/// Discriminator carried in the `type` field of every push message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MessageKind {
    /// First chart series sample.
    Chart1Update,
    /// Second chart series sample.
    Chart2Update,
    /// Watched file changed.
    FileUpdate,
    /// Free-form notification.
    Notification,
    /// Any other type string, passed through untouched.
    Custom(String),
}

impl MessageKind {
    /// Returns the wire name of this kind.
    pub fn as_str(&self) -> &str {
        match self {
            MessageKind::Chart1Update => "chart_1_update",
            MessageKind::Chart2Update => "chart_2_update",
            MessageKind::FileUpdate => "file_update",
            MessageKind::Notification => "notification",
            MessageKind::Custom(name) => name,
        }
    }
}

impl From<String> for MessageKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "chart_1_update" => MessageKind::Chart1Update,
            "chart_2_update" => MessageKind::Chart2Update,
            "file_update" => MessageKind::FileUpdate,
            "notification" => MessageKind::Notification,
            _ => MessageKind::Custom(value),
        }
    }
}

impl From<MessageKind> for String {
    fn from(kind: MessageKind) -> Self {
        match kind {
            MessageKind::Custom(name) => name,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which chart a generated sample belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartSeries {
    First,
    Second,
}

impl ChartSeries {
    fn kind(self) -> MessageKind {
        match self {
            ChartSeries::First => MessageKind::Chart1Update,
            ChartSeries::Second => MessageKind::Chart2Update,
        }
    }
}

/// Immutable message fanned out to one or more connections.
///
/// Once broadcast it is shared read-only behind an `Arc`; nothing
/// mutates it after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "WireMessage", try_from = "WireMessage")]
pub struct PushMessage {
    kind: MessageKind,
    fields: Map<String, Value>,
    timestamp: Timestamp,
}

impl PushMessage {
    /// Creates a message of the given kind stamped with the current time.
    ///
    /// Reserved envelope keys (`type`, `timestamp`) are removed from
    /// `fields`.
    pub fn new(kind: MessageKind, mut fields: Map<String, Value>) -> Self {
        for key in RESERVED_KEYS {
            fields.remove(*key);
        }
        Self {
            kind,
            fields,
            timestamp: Timestamp::now().truncated_to_secs(),
        }
    }

    /// Chart sample with `time` (tick counter) and `value` fields.
    pub fn chart_update(series: ChartSeries, time: u64, value: f64) -> Self {
        let mut fields = Map::new();
        fields.insert("time".to_string(), Value::from(time));
        fields.insert("value".to_string(), Value::from(value));
        Self::new(series.kind(), fields)
    }

    /// File change alert carrying the event name.
    pub fn file_update(event: impl Into<String>) -> Self {
        let mut fields = Map::new();
        fields.insert("event".to_string(), Value::String(event.into()));
        Self::new(MessageKind::FileUpdate, fields)
    }

    /// Generic notification.
    ///
    /// An object payload becomes the message fields; any other JSON
    /// value is carried under `data`.
    pub fn notification(payload: Value) -> Self {
        let fields = match payload {
            Value::Object(map) => map,
            other => {
                let mut map = Map::new();
                map.insert("data".to_string(), other);
                map
            }
        };
        Self::new(MessageKind::Notification, fields)
    }

    /// Replaces the timestamp (second precision).
    pub fn with_timestamp(mut self, timestamp: Timestamp) -> Self {
        self.timestamp = timestamp.truncated_to_secs();
        self
    }

    pub fn kind(&self) -> &MessageKind {
        &self.kind
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Looks up a single type-specific field.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    /// Serializes to the JSON text sent over the wire.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Flat wire representation used for (de)serialization.
#[derive(Serialize, Deserialize)]
struct WireMessage {
    #[serde(rename = "type")]
    kind: MessageKind,
    #[serde(flatten)]
    fields: Map<String, Value>,
    timestamp: i64,
}

impl From<PushMessage> for WireMessage {
    fn from(message: PushMessage) -> Self {
        Self {
            kind: message.kind,
            fields: message.fields,
            timestamp: message.timestamp.as_unix_secs(),
        }
    }
}

impl TryFrom<WireMessage> for PushMessage {
    type Error = ValidationError;

    fn try_from(wire: WireMessage) -> Result<Self, Self::Error> {
        if wire.kind.as_str().is_empty() {
            return Err(ValidationError::invalid_format("type", "must not be empty"));
        }
        Ok(Self {
            kind: wire.kind,
            fields: wire.fields,
            timestamp: Timestamp::from_unix_secs(wire.timestamp),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn chart_update_serializes_flat() {
        let msg = PushMessage::chart_update(ChartSeries::First, 7, 1.5)
            .with_timestamp(Timestamp::from_unix_secs(1_700_000_000));

        let value: Value = serde_json::to_value(&msg).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "chart_1_update",
                "time": 7,
                "value": 1.5,
                "timestamp": 1_700_000_000
            })
        );
    }

    #[test]
    fn second_series_uses_chart_2_type() {
        let msg = PushMessage::chart_update(ChartSeries::Second, 0, 0.2);
        assert_eq!(msg.kind(), &MessageKind::Chart2Update);
    }

    #[test]
    fn file_update_carries_event_field() {
        let msg = PushMessage::file_update("file_updated");
        let json = msg.to_json().unwrap();
        assert!(json.contains(r#""type":"file_update""#));
        assert!(json.contains(r#""event":"file_updated""#));
    }

    #[test]
    fn notification_with_object_payload_uses_fields() {
        let msg = PushMessage::notification(json!({"x": 1}));
        assert_eq!(msg.field("x"), Some(&json!(1)));
        assert_eq!(msg.kind(), &MessageKind::Notification);
    }

    #[test]
    fn notification_with_scalar_payload_wraps_in_data() {
        let msg = PushMessage::notification(json!("hello"));
        assert_eq!(msg.field("data"), Some(&json!("hello")));
    }

    #[test]
    fn reserved_keys_are_stripped_from_fields() {
        let msg = PushMessage::notification(json!({"type": "spoof", "timestamp": 1, "ok": true}));
        assert_eq!(msg.fields().len(), 1);
        assert_eq!(msg.kind(), &MessageKind::Notification);
    }

    #[test]
    fn message_survives_serialization_unchanged() {
        let msg = PushMessage::notification(json!({"all": true, "nested": {"a": [1, 2]}}));
        let json = msg.to_json().unwrap();
        let back: PushMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(back, msg);
    }

    #[test]
    fn unknown_type_deserializes_as_custom() {
        let back: PushMessage =
            serde_json::from_str(r#"{"type":"presence","who":"alice","timestamp":5}"#).unwrap();
        assert_eq!(back.kind(), &MessageKind::Custom("presence".to_string()));
        assert_eq!(back.timestamp().as_unix_secs(), 5);
        assert_eq!(back.to_json().unwrap(), r#"{"type":"presence","who":"alice","timestamp":5}"#);
    }

    #[test]
    fn empty_type_is_rejected() {
        let result = serde_json::from_str::<PushMessage>(r#"{"type":"","timestamp":5}"#);
        assert!(result.is_err());
    }

    #[test]
    fn missing_timestamp_is_rejected() {
        let result = serde_json::from_str::<PushMessage>(r#"{"type":"notification"}"#);
        assert!(result.is_err());
    }
}
