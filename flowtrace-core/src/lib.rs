//! # flowtrace-core
//!
//! Flow aggregation primitives: the packet descriptor model, frame
//! decoding, flow keying, the flow table, and the payload entropy
//! estimator. Everything here is synchronous and side-effect free;
//! capture devices and output sinks live in their own crates.

pub mod decode;
pub mod entropy;
pub mod flow;
pub mod packet;
