//! The per-window aggregation loop.

use chrono::{DateTime, Local};
use opentelemetry::KeyValue;
use tracing::{debug, info, trace};

use flowtrace_core::entropy::shannon_entropy;
use flowtrace_core::flow::{FlowKey, FlowTable};
use flowtrace_core::packet::PacketDescriptor;
use flowtrace_telemetry::{EventLogger, MetricsRecorder};

use crate::sink::{FlowRow, FlowSink, SinkError};

/// Loop state. STOPPED is terminal; it is entered when a packet arrives
/// past the deadline or when the source is exhausted, and always after a
/// final flush.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    Capturing,
    Stopped,
}

/// Turns an ordered stream of packet descriptors into per-flow records,
/// emitting the cumulative state of a flow after every payload-bearing
/// packet.
///
/// Single-threaded by design: the flow table has exactly one owner and
/// rows are emitted strictly in packet-arrival order.
pub struct FlowAggregator<S: FlowSink> {
    table: FlowTable,
    deadline: DateTime<Local>,
    sink: S,
    metrics: MetricsRecorder,
    state: CaptureState,
    rows_emitted: u64,
}

impl<S: FlowSink> FlowAggregator<S> {
    pub fn new(deadline: DateTime<Local>, sink: S, metrics: MetricsRecorder) -> Self {
        Self {
            table: FlowTable::new(),
            deadline,
            sink,
            metrics,
            state: CaptureState::Capturing,
            rows_emitted: 0,
        }
    }

    pub fn state(&self) -> CaptureState {
        self.state
    }

    /// Distinct flows tracked so far.
    pub fn flow_count(&self) -> usize {
        self.table.len()
    }

    pub fn rows_emitted(&self) -> u64 {
        self.rows_emitted
    }

    /// Processes one packet, returning the state afterwards.
    ///
    /// The deadline is checked first: a packet arriving after it stops
    /// the loop without being processed. Packets missing network or
    /// transport info, and packets without an application payload, are
    /// skipped silently and emit nothing.
    pub fn process(&mut self, packet: &PacketDescriptor) -> Result<CaptureState, SinkError> {
        if self.state == CaptureState::Stopped {
            return Ok(CaptureState::Stopped);
        }

        if packet.observed_at > self.deadline {
            self.stop()?;
            return Ok(CaptureState::Stopped);
        }

        self.metrics.packets_total.inc();

        let Some(transport) = packet.transport else {
            trace!("skipping packet without transport layer");
            return Ok(CaptureState::Capturing);
        };
        let Some(key) = FlowKey::derive(packet) else {
            trace!("skipping packet without network layer");
            return Ok(CaptureState::Capturing);
        };

        let record = self.table.get_or_create(&key, packet.observed_at);

        // Only payload-bearing packets produce visible updates; a bare
        // ACK neither counts nor emits.
        let Some(payload) = packet.payload.as_ref() else {
            return Ok(CaptureState::Capturing);
        };

        record.packet_count += 1;

        // Keys are direction-sensitive, so every packet matching this key
        // travels the flow's keyed direction and lands in bytes_out; the
        // reverse path accumulates under its own key.
        record.bytes_out += packet.total_len as u64;

        let entropy = shannon_entropy(payload);
        record.last_entropy = entropy;

        let row = FlowRow::snapshot(&key, transport.name(), record);

        self.metrics.payload_entropy.observe(entropy);
        self.metrics.active_flows.set(self.table.len() as i64);

        // Flush per row: partial results survive an aborted run.
        self.sink.write(&row)?;
        self.sink.flush()?;
        self.rows_emitted += 1;
        self.metrics.flow_rows_total.inc();

        debug!(
            flow = %key,
            packets = row.packet_count,
            entropy = format_args!("{:.2}", entropy),
            "flow updated"
        );

        Ok(CaptureState::Capturing)
    }

    /// Drains `source` until the deadline passes or the source ends.
    pub fn run<I>(&mut self, source: I) -> Result<(), SinkError>
    where
        I: IntoIterator<Item = PacketDescriptor>,
    {
        for packet in source {
            if self.process(&packet)? == CaptureState::Stopped {
                return Ok(());
            }
        }
        self.finish()
    }

    /// Marks the source exhausted and performs the final flush. Safe to
    /// call after the loop already stopped on its deadline.
    pub fn finish(&mut self) -> Result<(), SinkError> {
        if self.state == CaptureState::Capturing {
            self.stop()?;
        }
        Ok(())
    }

    fn stop(&mut self) -> Result<(), SinkError> {
        self.state = CaptureState::Stopped;
        self.sink.flush()?;
        info!(
            flows = self.table.len(),
            rows = self.rows_emitted,
            "capture window complete"
        );
        EventLogger::log_event(
            "capture_window_complete",
            vec![
                KeyValue::new("flows", self.table.len() as i64),
                KeyValue::new("rows", self.rows_emitted as i64),
            ],
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use chrono::Duration;
    use flowtrace_core::packet::{NetworkInfo, Transport};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default, Clone)]
    struct RecordingSink {
        rows: Rc<RefCell<Vec<FlowRow>>>,
        flushes: Rc<RefCell<usize>>,
    }

    impl FlowSink for RecordingSink {
        fn write(&mut self, row: &FlowRow) -> Result<(), SinkError> {
            self.rows.borrow_mut().push(row.clone());
            Ok(())
        }

        fn flush(&mut self) -> Result<(), SinkError> {
            *self.flushes.borrow_mut() += 1;
            Ok(())
        }
    }

    fn network(src: &str, dst: &str) -> NetworkInfo {
        NetworkInfo {
            source: src.parse().unwrap(),
            destination: dst.parse().unwrap(),
        }
    }

    fn payload_packet(
        src: &str,
        dst: &str,
        payload: &'static [u8],
        observed_at: DateTime<Local>,
    ) -> PacketDescriptor {
        PacketDescriptor {
            network: Some(network(src, dst)),
            transport: Some(Transport::Udp),
            payload: Some(Bytes::from_static(payload)),
            total_len: payload.len() + 42,
            observed_at,
        }
    }

    fn aggregator(deadline: DateTime<Local>) -> (FlowAggregator<RecordingSink>, RecordingSink) {
        let sink = RecordingSink::default();
        let agg = FlowAggregator::new(deadline, sink.clone(), MetricsRecorder::new());
        (agg, sink)
    }

    #[test]
    fn test_three_packet_scenario() {
        let now = Local::now();
        let (mut agg, sink) = aggregator(now + Duration::seconds(30));

        static PAYLOAD: [u8; 100] = [0u8; 100];
        for _ in 0..3 {
            let packet = payload_packet("10.0.0.1", "10.0.0.2", &PAYLOAD, now);
            assert_eq!(agg.process(&packet).unwrap(), CaptureState::Capturing);
        }

        let rows = sink.rows.borrow();
        assert_eq!(rows.len(), 3);
        for (i, row) in rows.iter().enumerate() {
            let n = (i + 1) as u64;
            assert_eq!(row.source, "10.0.0.1");
            assert_eq!(row.destination, "10.0.0.2");
            assert_eq!(row.packet_count, n);
            assert_eq!(row.protocol, "UDP");
            assert_eq!(row.bytes_in, 0);
            assert_eq!(row.bytes_out, n * 142);
            assert_eq!(row.last_entropy, 0.0);
            assert_eq!(row.total_entropy, 0.0);
            assert_eq!(row.start_time, rows[0].start_time);
        }
        assert_eq!(agg.flow_count(), 1);
    }

    #[test]
    fn test_each_row_is_flushed() {
        let now = Local::now();
        let (mut agg, sink) = aggregator(now + Duration::seconds(30));

        let packet = payload_packet("10.0.0.1", "10.0.0.2", b"ab", now);
        agg.process(&packet).unwrap();
        agg.process(&packet).unwrap();

        assert!(*sink.flushes.borrow() >= 2);
    }

    #[test]
    fn test_missing_transport_skips_entirely() {
        let now = Local::now();
        let (mut agg, sink) = aggregator(now + Duration::seconds(30));

        let packet = PacketDescriptor {
            network: Some(network("10.0.0.1", "10.0.0.2")),
            transport: None,
            payload: Some(Bytes::from_static(b"data")),
            total_len: 60,
            observed_at: now,
        };

        assert_eq!(agg.process(&packet).unwrap(), CaptureState::Capturing);
        assert_eq!(agg.flow_count(), 0);
        assert!(sink.rows.borrow().is_empty());
    }

    #[test]
    fn test_missing_payload_creates_flow_but_emits_nothing() {
        let now = Local::now();
        let (mut agg, sink) = aggregator(now + Duration::seconds(30));

        let bare = PacketDescriptor {
            network: Some(network("10.0.0.1", "10.0.0.2")),
            transport: Some(Transport::Tcp),
            payload: None,
            total_len: 54,
            observed_at: now,
        };
        agg.process(&bare).unwrap();

        // The flow exists but stayed zeroed and nothing was emitted.
        assert_eq!(agg.flow_count(), 1);
        assert!(sink.rows.borrow().is_empty());

        // A later payload packet is that flow's first counted packet.
        let packet = payload_packet("10.0.0.1", "10.0.0.2", b"hello", now);
        agg.process(&packet).unwrap();
        let rows = sink.rows.borrow();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].packet_count, 1);
        assert_eq!(rows[0].bytes_out, 47);
    }

    #[test]
    fn test_reverse_direction_is_a_separate_flow() {
        let now = Local::now();
        let (mut agg, sink) = aggregator(now + Duration::seconds(30));

        agg.process(&payload_packet("10.0.0.1", "10.0.0.2", b"req", now))
            .unwrap();
        agg.process(&payload_packet("10.0.0.2", "10.0.0.1", b"resp", now))
            .unwrap();

        assert_eq!(agg.flow_count(), 2);
        let rows = sink.rows.borrow();
        assert_eq!(rows[0].packet_count, 1);
        assert_eq!(rows[1].packet_count, 1);
        assert_eq!(rows[1].source, "10.0.0.2");
        // Each direction attributes bytes outbound on its own flow.
        assert_eq!(rows[0].bytes_in, 0);
        assert_eq!(rows[1].bytes_in, 0);
    }

    #[test]
    fn test_deadline_stops_without_processing() {
        let now = Local::now();
        let (mut agg, sink) = aggregator(now - Duration::seconds(1));

        let flushes_before = *sink.flushes.borrow();
        let packet = payload_packet("10.0.0.1", "10.0.0.2", b"late", now);
        assert_eq!(agg.process(&packet).unwrap(), CaptureState::Stopped);

        assert_eq!(agg.flow_count(), 0);
        assert!(sink.rows.borrow().is_empty());
        // The transition flushed buffered output.
        assert!(*sink.flushes.borrow() > flushes_before);

        // STOPPED is terminal: further packets are ignored.
        assert_eq!(agg.process(&packet).unwrap(), CaptureState::Stopped);
        assert!(sink.rows.borrow().is_empty());
    }

    #[test]
    fn test_run_stops_on_source_exhaustion() {
        let now = Local::now();
        let (mut agg, sink) = aggregator(now + Duration::seconds(30));

        let source = vec![
            payload_packet("10.0.0.1", "10.0.0.2", b"one", now),
            payload_packet("10.0.0.1", "10.0.0.2", b"two", now),
        ];
        agg.run(source).unwrap();

        assert_eq!(agg.state(), CaptureState::Stopped);
        assert_eq!(sink.rows.borrow().len(), 2);
    }

    #[tracing_test::traced_test]
    #[test]
    fn test_window_completion_is_logged() {
        let now = Local::now();
        let (mut agg, _sink) = aggregator(now + Duration::seconds(30));

        agg.process(&payload_packet("10.0.0.1", "10.0.0.2", b"data", now))
            .unwrap();
        agg.finish().unwrap();

        assert!(logs_contain("capture window complete"));
        assert!(logs_contain("Flow event"));
    }

    #[test]
    fn test_entropy_reflects_latest_payload() {
        let now = Local::now();
        let (mut agg, sink) = aggregator(now + Duration::seconds(30));

        static ZEROS: [u8; 64] = [0u8; 64];
        agg.process(&payload_packet("10.0.0.1", "10.0.0.2", &ZEROS, now))
            .unwrap();
        agg.process(&payload_packet("10.0.0.1", "10.0.0.2", &[0, 1, 2, 3], now))
            .unwrap();

        let rows = sink.rows.borrow();
        assert_eq!(rows[0].last_entropy, 0.0);
        assert!((rows[1].last_entropy - 2.0).abs() < 1e-12);
    }
}
