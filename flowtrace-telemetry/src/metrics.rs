//! Prometheus metrics for the capture pipeline.

use prometheus::{Counter, Histogram, HistogramOpts, IntGauge, Registry};

#[derive(Debug, Clone)]
pub struct MetricsRecorder {
    pub registry: Registry,
    /// Frames pulled off the capture device.
    pub packets_total: Counter,
    /// Flow rows written to the sink.
    pub flow_rows_total: Counter,
    /// Distinct flows currently tracked in the table.
    pub active_flows: IntGauge,
    /// Per-payload Shannon entropy samples, bits/byte.
    pub payload_entropy: Histogram,
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsRecorder {
    pub fn new() -> Self {
        let registry = Registry::new();

        let packets_total =
            Counter::new("flowtrace_packets_total", "Total captured frames processed").unwrap();
        let flow_rows_total =
            Counter::new("flowtrace_flow_rows_total", "Total flow records emitted").unwrap();
        let active_flows =
            IntGauge::new("flowtrace_active_flows", "Distinct flows in the table").unwrap();
        let payload_entropy = Histogram::with_opts(
            HistogramOpts::new(
                "flowtrace_payload_entropy_bits",
                "Shannon entropy of application payloads (bits/byte)",
            )
            .buckets(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 7.5, 8.0]),
        )
        .unwrap();

        registry.register(Box::new(packets_total.clone())).unwrap();
        registry.register(Box::new(flow_rows_total.clone())).unwrap();
        registry.register(Box::new(active_flows.clone())).unwrap();
        registry.register(Box::new(payload_entropy.clone())).unwrap();

        Self {
            registry,
            packets_total,
            flow_rows_total,
            active_flows,
            payload_entropy,
        }
    }

    pub fn gather_metrics(&self) -> Result<String, prometheus::Error> {
        use prometheus::Encoder;
        let encoder = prometheus::TextEncoder::new();
        let mut buffer = Vec::<u8>::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer).unwrap())
    }
}
