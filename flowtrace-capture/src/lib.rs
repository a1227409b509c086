//! flowtrace-capture
//!
//! Packet acquisition for flowtrace. Wraps pcap live capture behind a
//! callback loop; decoding and aggregation happen downstream.

pub mod live_capture;
pub mod packet;

pub use live_capture::{devices, run, CaptureError};
pub use packet::CapturedFrame;
