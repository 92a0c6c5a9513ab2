//! Tagged events broadcast to viewers.
//!
//! Every receiver notification is normalized into one [`TaggedEvent`] and
//! serialized to viewers as `{"tag": <string>, "data": <any>}` inside a
//! server-sent-events frame.

mod normalizer;

pub use normalizer::normalize;

use bytes::Bytes;
use serde_json::{json, Value};

use crate::device::DeviceStatus;

/// A normalized receiver event.
///
/// Constructed by the normalizer, by viewer registration, or synthesized by
/// the mute→power compensation rule; consumed exactly once by the
/// broadcaster.
#[derive(Debug, Clone, PartialEq)]
pub enum TaggedEvent {
    /// Main-zone power changed (true = on).
    Power(bool),
    /// Main-zone volume changed.
    Volume(u64),
    /// Main-zone mute changed.
    Mute(bool),
    /// Input changed (true = the primary/TV input).
    Tv(bool),
    /// Full status snapshot, seeded to newly connected viewers.
    Status(DeviceStatus),
    /// First frame on every viewer stream.
    Connected,
    /// A receiver query on behalf of a viewer failed.
    Error(String),
    /// Payload that matched no known field; logged, never broadcast.
    Unknown(Value),
}

impl TaggedEvent {
    /// The wire tag for this event.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Power(_) => "power",
            Self::Volume(_) => "volume",
            Self::Mute(_) => "mute",
            Self::Tv(_) => "tv",
            Self::Status(_) => "status",
            Self::Connected => "connected",
            Self::Error(_) => "error",
            Self::Unknown(_) => "unknown",
        }
    }

    /// The wire payload for this event.
    fn data(&self) -> Value {
        match self {
            Self::Power(on) => json!(on),
            Self::Volume(volume) => json!(volume),
            Self::Mute(muted) => json!(muted),
            Self::Tv(tv) => json!(tv),
            Self::Status(status) => serde_json::to_value(status).unwrap_or(Value::Null),
            Self::Connected => Value::Null,
            Self::Error(message) => json!(message),
            Self::Unknown(raw) => raw.clone(),
        }
    }

    /// Serializes to the `{"tag", "data"}` wire object.
    pub fn to_json(&self) -> Value {
        json!({ "tag": self.tag(), "data": self.data() })
    }

    /// Encodes as a server-sent-events frame: `data: <JSON>\n\n`.
    pub fn to_sse_frame(&self) -> Bytes {
        Bytes::from(format!("data: {}\n\n", self.to_json()))
    }
}
