//! Raw frame decoding via `etherparse`.

use std::net::{Ipv4Addr, Ipv6Addr};

use bytes::Bytes;
use chrono::{DateTime, Local};
use etherparse::{NetHeaders, PacketHeaders, TransportHeader};

use crate::packet::{NetworkInfo, PacketDescriptor, Transport};

/// Decodes an Ethernet frame into a [`PacketDescriptor`].
///
/// Decoding is total: frames that fail to parse, or that carry layers
/// beyond IPv4/IPv6 + TCP/UDP, come back with those layers absent rather
/// than as errors. ICMP and other IP protocols count as transport-absent.
pub fn decode(raw: &[u8], observed_at: DateTime<Local>) -> PacketDescriptor {
    let total_len = raw.len();

    let headers = match PacketHeaders::from_ethernet_slice(raw) {
        Ok(headers) => headers,
        Err(_) => return PacketDescriptor::opaque(total_len, observed_at),
    };

    let network = match &headers.net {
        Some(NetHeaders::Ipv4(ipv4, _)) => Some(NetworkInfo {
            source: Ipv4Addr::from(ipv4.source).into(),
            destination: Ipv4Addr::from(ipv4.destination).into(),
        }),
        Some(NetHeaders::Ipv6(ipv6, _)) => Some(NetworkInfo {
            source: Ipv6Addr::from(ipv6.source).into(),
            destination: Ipv6Addr::from(ipv6.destination).into(),
        }),
        _ => None,
    };

    let transport = match &headers.transport {
        Some(TransportHeader::Tcp(_)) => Some(Transport::Tcp),
        Some(TransportHeader::Udp(_)) => Some(Transport::Udp),
        _ => None,
    };

    // The slice past the last decoded header is the application layer.
    let payload = match headers.payload.slice() {
        [] => None,
        slice => Some(Bytes::copy_from_slice(slice)),
    };

    PacketDescriptor {
        network,
        transport,
        payload,
        total_len,
        observed_at,
    }
}
