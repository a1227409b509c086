use bytes::Bytes;
use chrono::{DateTime, Local};

/// One frame as delivered by the capture device, with the wall-clock
/// time it was pulled off the wire.
#[derive(Debug, Clone)]
pub struct CapturedFrame {
    pub data: Bytes,
    pub observed_at: DateTime<Local>,
}

impl CapturedFrame {
    pub fn new(data: Vec<u8>, observed_at: DateTime<Local>) -> Self {
        Self {
            data: Bytes::from(data),
            observed_at,
        }
    }
}
