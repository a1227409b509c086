//! # flowtrace-engine
//!
//! The aggregation loop: pulls decoded packets from the capture source,
//! maintains the flow table, scores payload entropy, and emits one
//! cumulative flow record per payload-bearing packet to the sink.

pub mod aggregator;
pub mod error;
pub mod runtime;
pub mod sink;

pub use aggregator::{CaptureState, FlowAggregator};
pub use error::EngineError;
pub use runtime::run_live;
pub use sink::{CsvSink, FlowRow, FlowSink, SinkError};
