use once_cell::sync::Lazy;
use prometheus::{register_counter_vec, register_histogram_vec, CounterVec, HistogramVec};

pub static BACKEND_REQUESTS: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "funed_backend_requests_total",
        "Total number of backend REST requests",
        &["method", "outcome"]
    )
    .unwrap()
});

pub static BACKEND_LATENCY: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "funed_backend_latency_seconds",
        "Backend request latency in seconds",
        &["method"],
        vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 15.0]
    )
    .unwrap()
});

pub static UNAUTHORIZED_RESPONSES: Lazy<prometheus::Counter> = Lazy::new(|| {
    prometheus::register_counter!(
        "funed_backend_unauthorized_total",
        "Total number of 401 responses observed from the backend"
    )
    .unwrap()
});

pub static VALIDATION_REJECTIONS: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "funed_validation_rejections_total",
        "Form submissions blocked by client-side validation",
        &["form"]
    )
    .unwrap()
});

pub static STALE_RESPONSES: Lazy<prometheus::Counter> = Lazy::new(|| {
    prometheus::register_counter!(
        "funed_stale_responses_total",
        "List responses discarded because the view was remounted"
    )
    .unwrap()
});
