use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Local;
use pcap::{Capture, Device};
use thiserror::Error;
use tracing::trace;

use crate::packet::CapturedFrame;

/// Poll timeout for the capture handle, in milliseconds. A timeout only
/// re-checks the terminate flag; it is not a deadline of any kind.
const POLL_TIMEOUT_MS: i32 = 1000;

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("capture device '{0}' not found")]
    DeviceNotFound(String),

    #[error("pcap error: {0}")]
    Pcap(#[from] pcap::Error),
}

/// Lists the names of capture-capable devices on this host.
pub fn devices() -> Result<Vec<String>, CaptureError> {
    Ok(Device::list()?.into_iter().map(|d| d.name).collect())
}

/// Runs a live capture loop on `interface`, invoking `callback` for each
/// captured frame until `terminate` is set.
///
/// Device lookup and open failures are returned immediately; once the
/// loop is running the only exits are the terminate flag and a hard pcap
/// error. There is no per-wait deadline: if no frames arrive the loop
/// polls indefinitely.
pub fn run<F>(
    interface: &str,
    snaplen: usize,
    promiscuous: bool,
    terminate: &AtomicBool,
    mut callback: F,
) -> Result<(), CaptureError>
where
    F: FnMut(&CapturedFrame),
{
    let device = Device::list()?
        .into_iter()
        .find(|d| d.name == interface)
        .ok_or_else(|| CaptureError::DeviceNotFound(interface.to_string()))?;

    let mut cap = Capture::from_device(device)?
        .promisc(promiscuous)
        .snaplen(snaplen as i32)
        .timeout(POLL_TIMEOUT_MS)
        .open()?;

    while !terminate.load(Ordering::Relaxed) {
        match cap.next_packet() {
            Ok(packet) => {
                trace!(len = packet.data.len(), "captured frame");
                let frame = CapturedFrame::new(packet.data.to_vec(), Local::now());
                callback(&frame);
            }
            // No frame inside the poll window; loop back to the flag check.
            Err(pcap::Error::TimeoutExpired) => continue,
            Err(e) => return Err(e.into()),
        }
    }

    Ok(())
}
