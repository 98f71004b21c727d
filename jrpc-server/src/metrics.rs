//! Server metrics
//!
//! OpenTelemetry instruments recorded by the dispatcher and the stream server
//! when observability is enabled through `ServerBuilder::with_observability()`.
//! Instruments are prefixed `jrpc.server.*`.
//!
//! - **connections_active**: open stream connections (gauge)
//! - **connections_total**: stream connections accepted (counter)
//! - **requests_total**: requests dispatched, by method and status (counter)
//! - **request_duration**: dispatch latency in seconds (histogram)
//! - **batch_size**: requests per batch (histogram)
//! - **errors_total**: error responses, by error code (counter)

use opentelemetry::{
    global,
    metrics::{Counter, Gauge, Histogram, Meter},
    KeyValue,
};

/// Server metric instruments
pub struct ServerMetrics {
    pub connections_active: Gauge<i64>,
    pub connections_total: Counter<u64>,
    pub requests_total: Counter<u64>,
    pub request_duration: Histogram<f64>,
    pub batch_size: Histogram<u64>,
    pub errors_total: Counter<u64>,
}

impl ServerMetrics {
    pub fn new(service_name: impl Into<String>) -> Self {
        let name: &'static str = Box::leak(service_name.into().into_boxed_str());
        let meter = global::meter(name);
        Self::new_with_meter(&meter)
    }

    pub fn new_with_meter(meter: &Meter) -> Self {
        Self {
            connections_active: meter
                .i64_gauge("jrpc.server.connections.active")
                .with_description("Number of open stream connections")
                .build(),
            connections_total: meter
                .u64_counter("jrpc.server.connections.total")
                .with_description("Total number of stream connections accepted")
                .build(),
            requests_total: meter
                .u64_counter("jrpc.server.requests.total")
                .with_description("Total number of requests dispatched")
                .build(),
            request_duration: meter
                .f64_histogram("jrpc.server.request.duration")
                .with_description("Request dispatch duration in seconds")
                .build(),
            batch_size: meter
                .u64_histogram("jrpc.server.batch.size")
                .with_description("Number of requests in batch documents")
                .build(),
            errors_total: meter
                .u64_counter("jrpc.server.errors.total")
                .with_description("Total number of error responses")
                .build(),
        }
    }

    pub fn record_connection(&self, active: i64) {
        self.connections_active.record(active, &[]);
        self.connections_total.add(1, &[]);
    }

    pub fn record_disconnection(&self, active: i64) {
        self.connections_active.record(active, &[]);
    }

    /// Record one dispatched request; `status` is "success" or "error"
    pub fn record_request(&self, method: &str, status: &str, duration_secs: f64) {
        let attributes = &[
            KeyValue::new("method", method.to_string()),
            KeyValue::new("status", status.to_string()),
        ];
        self.requests_total.add(1, attributes);
        self.request_duration.record(duration_secs, attributes);
    }

    pub fn record_batch(&self, size: u64) {
        self.batch_size.record(size, &[]);
    }

    pub fn record_error(&self, code: i32) {
        self.errors_total.add(1, &[KeyValue::new("code", i64::from(code))]);
    }
}
