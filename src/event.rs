use serde::{Deserialize, Serialize};

/// Sentinel classification the detection backend uses for benign traffic.
pub const NORMAL_TRAFFIC: &str = "Normal Traffic";

/// A single classified traffic event as it arrives on the wire.
///
/// The backend agent emits one JSON object per text frame. `src_ip` is
/// optional because older agent builds omit it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertEvent {
    pub alert_type: String,
    pub description: String,
    #[serde(default)]
    pub src_ip: Option<String>,
    /// Seconds since epoch, fractional allowed. Arrival order is not
    /// guaranteed to match timestamp order.
    pub timestamp: f64,
}

impl AlertEvent {
    /// Anything the backend did not classify as normal traffic counts as
    /// an alert.
    pub fn is_abnormal(&self) -> bool {
        self.alert_type != NORMAL_TRAFFIC
    }

    /// Whole-second timestamp used for bucketing.
    pub fn epoch_secs(&self) -> i64 {
        self.timestamp.floor() as i64
    }
}

/// Decode one inbound text frame into an [`AlertEvent`].
///
/// A frame that fails to decode is dropped by the caller; the connection
/// stays open. Unknown extra fields are ignored.
pub fn decode_frame(payload: &str) -> Result<AlertEvent, serde_json::Error> {
    serde_json::from_str(payload)
}
