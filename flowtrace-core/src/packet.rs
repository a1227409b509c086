//! Decoded packet model consumed by the aggregation loop.

use std::net::IpAddr;

use bytes::Bytes;
use chrono::{DateTime, Local};

/// Transport protocols a flow can be attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    Tcp,
    Udp,
}

impl Transport {
    pub fn name(&self) -> &'static str {
        match self {
            Transport::Tcp => "TCP",
            Transport::Udp => "UDP",
        }
    }
}

/// Network-layer addressing of a captured frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkInfo {
    pub source: IpAddr,
    pub destination: IpAddr,
}

/// Decoded view of one captured frame.
///
/// Layers that were missing or could not be decoded are simply absent;
/// whether an incomplete packet is usable is the aggregator's call, not
/// the decoder's.
#[derive(Debug, Clone)]
pub struct PacketDescriptor {
    /// Network-layer addresses, if an IP header was decoded.
    pub network: Option<NetworkInfo>,

    /// Transport protocol, if a TCP or UDP header was decoded.
    pub transport: Option<Transport>,

    /// Application-layer payload. An empty payload counts as absent.
    pub payload: Option<Bytes>,

    /// Captured length of the whole frame, all layers included.
    pub total_len: usize,

    /// Wall-clock time the frame was observed.
    pub observed_at: DateTime<Local>,
}

impl PacketDescriptor {
    /// A descriptor with every layer absent. Undecodable frames still
    /// carry their length and observation time.
    pub fn opaque(total_len: usize, observed_at: DateTime<Local>) -> Self {
        Self {
            network: None,
            transport: None,
            payload: None,
            total_len,
            observed_at,
        }
    }
}
