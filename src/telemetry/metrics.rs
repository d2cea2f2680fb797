//! Counters and gauges published through the `metrics` facade
//!
//! No exporter is installed by the binary, so these are inert unless the
//! embedding process sets a global recorder.

/// Counter metric types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterMetric {
    /// Text frames received by the feed client
    FramesReceived,
    /// Frames that failed to decode
    FramesMalformed,
    /// Price updates dropped by duplicate suppression
    UpdatesSuppressed,
    /// Samples appended to the history store
    SamplesRecorded,
    /// Frames fanned out by the relay
    RelayFramesBroadcast,
}

impl CounterMetric {
    pub fn name(self) -> &'static str {
        match self {
            CounterMetric::FramesReceived => "ticker_frames_received_total",
            CounterMetric::FramesMalformed => "ticker_frames_malformed_total",
            CounterMetric::UpdatesSuppressed => "ticker_updates_suppressed_total",
            CounterMetric::SamplesRecorded => "ticker_samples_recorded_total",
            CounterMetric::RelayFramesBroadcast => "relay_frames_broadcast_total",
        }
    }
}

/// Gauge metric types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GaugeMetric {
    /// Clients currently attached to the relay
    RelayClients,
}

impl GaugeMetric {
    pub fn name(self) -> &'static str {
        match self {
            GaugeMetric::RelayClients => "relay_clients_connected",
        }
    }
}

/// Increment a counter by one
pub fn increment(metric: CounterMetric) {
    ::metrics::counter!(metric.name()).increment(1);
}

/// Set a gauge value
pub fn set_gauge(metric: GaugeMetric, value: f64) {
    tracing::trace!(metric = metric.name(), value, "Setting gauge");
    ::metrics::gauge!(metric.name()).set(value);
}
