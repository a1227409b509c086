//! Flow identity and per-flow state.
//!
//! A flow is directional: `A -> B` and `B -> A` are distinct keys, and
//! each side of a conversation accumulates under its own record.

mod table;

pub use table::FlowTable;

use chrono::{DateTime, Local};

use crate::packet::PacketDescriptor;

/// Directional flow identifier: the string-rendered (source, destination)
/// address pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FlowKey {
    pub source: String,
    pub destination: String,
}

impl FlowKey {
    /// Derives the key for a packet.
    ///
    /// Returns `None` when the packet cannot be attributed to a flow,
    /// which requires both network and transport layers to be present.
    /// Such packets are skipped outright: no record, no emission.
    pub fn derive(packet: &PacketDescriptor) -> Option<Self> {
        let network = packet.network.as_ref()?;
        packet.transport?;

        Some(Self {
            source: network.source.to_string(),
            destination: network.destination.to_string(),
        })
    }
}

impl std::fmt::Display for FlowKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.source, self.destination)
    }
}

/// Running statistics for one directional flow.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowRecord {
    /// Payload-bearing packets seen on this flow. Monotonic.
    pub packet_count: u64,

    /// Bytes received against the keyed direction.
    pub bytes_in: u64,

    /// Bytes sent along the keyed direction, full frame lengths.
    pub bytes_out: u64,

    /// Entropy of the most recent payload, bits/byte. Overwritten per
    /// packet, never averaged.
    pub last_entropy: f64,

    /// Aggregate entropy over the flow's lifetime. Carried in every
    /// emitted record but not yet fed by per-packet processing.
    pub total_entropy: f64,

    /// First observation of this flow. Immutable after creation.
    pub start_time: DateTime<Local>,
}

impl FlowRecord {
    fn new(start_time: DateTime<Local>) -> Self {
        Self {
            packet_count: 0,
            bytes_in: 0,
            bytes_out: 0,
            last_entropy: 0.0,
            total_entropy: 0.0,
            start_time,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::{NetworkInfo, Transport};
    use bytes::Bytes;

    fn descriptor(
        network: Option<NetworkInfo>,
        transport: Option<Transport>,
    ) -> PacketDescriptor {
        PacketDescriptor {
            network,
            transport,
            payload: Some(Bytes::from_static(b"data")),
            total_len: 60,
            observed_at: Local::now(),
        }
    }

    fn network(src: &str, dst: &str) -> NetworkInfo {
        NetworkInfo {
            source: src.parse().unwrap(),
            destination: dst.parse().unwrap(),
        }
    }

    #[test]
    fn test_derive_requires_both_layers() {
        let net = network("10.0.0.1", "10.0.0.2");

        assert!(FlowKey::derive(&descriptor(None, Some(Transport::Udp))).is_none());
        assert!(FlowKey::derive(&descriptor(Some(net), None)).is_none());

        let key = FlowKey::derive(&descriptor(Some(net), Some(Transport::Udp))).unwrap();
        assert_eq!(key.source, "10.0.0.1");
        assert_eq!(key.destination, "10.0.0.2");
    }

    #[test]
    fn test_keys_are_direction_sensitive() {
        let forward = FlowKey::derive(&descriptor(
            Some(network("10.0.0.1", "10.0.0.2")),
            Some(Transport::Tcp),
        ))
        .unwrap();
        let reverse = FlowKey::derive(&descriptor(
            Some(network("10.0.0.2", "10.0.0.1")),
            Some(Transport::Tcp),
        ))
        .unwrap();

        assert_ne!(forward, reverse);
    }
}
