//! Client metrics
//!
//! OpenTelemetry instruments recorded by [`JrpcClient`](crate::JrpcClient)
//! when observability is enabled through
//! [`ClientBuilder::with_observability`](crate::ClientBuilder::with_observability).
//!
//! # Metrics Collected
//!
//! - **requests_total**: calls made, by method and status (counter)
//! - **request_duration**: round trip latency in seconds (histogram)
//! - **notifications_sent**: notifications sent, by method (counter)
//! - **errors_total**: failed calls, by error kind (counter)

use opentelemetry::{
    global,
    metrics::{Counter, Histogram, Meter},
    KeyValue,
};

/// Client metrics for monitoring
pub struct ClientMetrics {
    pub requests_total: Counter<u64>,
    /// Round trip duration in seconds
    pub request_duration: Histogram<f64>,
    pub notifications_sent: Counter<u64>,
    pub errors_total: Counter<u64>,
}

impl ClientMetrics {
    pub fn new(service_name: impl Into<String>) -> Self {
        let name: &'static str = Box::leak(service_name.into().into_boxed_str());
        let meter = global::meter(name);
        Self::new_with_meter(&meter)
    }

    pub fn new_with_meter(meter: &Meter) -> Self {
        Self {
            requests_total: meter
                .u64_counter("jrpc.client.requests.total")
                .with_description("Total number of calls made")
                .build(),
            request_duration: meter
                .f64_histogram("jrpc.client.request.duration")
                .with_description("Round trip duration in seconds")
                .build(),
            notifications_sent: meter
                .u64_counter("jrpc.client.notifications.sent")
                .with_description("Total number of notifications sent")
                .build(),
            errors_total: meter
                .u64_counter("jrpc.client.errors.total")
                .with_description("Total number of failed calls")
                .build(),
        }
    }

    /// Record a completed call
    pub fn record_request(&self, method: &str, status: &str, duration_secs: f64) {
        let attributes = &[
            KeyValue::new("method", method.to_string()),
            KeyValue::new("status", status.to_string()),
        ];
        self.requests_total.add(1, attributes);
        self.request_duration.record(duration_secs, attributes);
    }

    pub fn record_notification(&self, method: &str) {
        let attributes = &[KeyValue::new("method", method.to_string())];
        self.notifications_sent.add(1, attributes);
    }

    /// Record an error (`error_kind` is "json_rpc", "transport", "protocol", ...)
    pub fn record_error(&self, error_kind: &str) {
        let attributes = &[KeyValue::new("error_kind", error_kind.to_string())];
        self.errors_total.add(1, attributes);
    }
}
