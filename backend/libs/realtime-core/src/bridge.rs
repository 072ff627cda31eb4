//! Cross-instance bridge envelope
//!
//! Frames mirrored through Redis carry the publishing instance id so a node
//! can skip redelivering its own traffic. Both services publish this shape;
//! the chat service's listener consumes it.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeEnvelope {
    pub origin: Uuid,
    pub frame: String,
}

impl BridgeEnvelope {
    pub fn new(origin: Uuid, frame: String) -> Self {
        Self { origin, frame }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_json() {
        let envelope = BridgeEnvelope::new(Uuid::new_v4(), "{\"type\":\"typing\"}".into());
        let json = serde_json::to_string(&envelope).unwrap();
        let back: BridgeEnvelope = serde_json::from_str(&json).unwrap();
        assert_eq!(back.origin, envelope.origin);
        assert_eq!(back.frame, envelope.frame);
    }
}
