use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter, register_int_counter_vec, HistogramVec,
    IntCounter, IntCounterVec,
};

lazy_static! {
    // HTTP Metrics
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "http_requests_total",
        "Total HTTP requests",
        &["method", "path", "status"]
    )
    .unwrap();

    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "http_request_duration_seconds",
        "HTTP request duration in seconds",
        &["method", "path"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    )
    .unwrap();

    // Authentication Metrics
    pub static ref AUTH_FAILURES_TOTAL: IntCounterVec = register_int_counter_vec!(
        "auth_failures_total",
        "Total bearer authentication failures",
        &["reason"]  // reason: expired, invalid_issuer, stamp_mismatch, ...
    )
    .unwrap();

    pub static ref AUTH_CHALLENGES_TOTAL: IntCounterVec = register_int_counter_vec!(
        "auth_challenges_total",
        "Total 401 challenges issued",
        &["kind"]  // kind: handled, default
    )
    .unwrap();

    pub static ref TOKENS_ISSUED_TOTAL: IntCounter = register_int_counter!(
        "tokens_issued_total",
        "Total bearer tokens issued"
    )
    .unwrap();

    // Database Metrics
    pub static ref DATABASE_QUERIES_TOTAL: IntCounterVec = register_int_counter_vec!(
        "database_queries_total",
        "Total database queries",
        &["query_type"]  // query_type: select, insert, update, delete
    )
    .unwrap();

    pub static ref DATABASE_QUERY_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "database_query_duration_seconds",
        "Database query duration in seconds",
        &["query_type"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]
    )
    .unwrap();

    // Business Metrics
    pub static ref FILES_STORED_BYTES_TOTAL: IntCounter = register_int_counter!(
        "files_stored_bytes_total",
        "Bytes accepted by file uploads since startup"
    )
    .unwrap();
}

/// Initialize all metrics (called on startup)
pub fn init_metrics() {
    // Force lazy_static initialization
    lazy_static::initialize(&HTTP_REQUESTS_TOTAL);
    lazy_static::initialize(&HTTP_REQUEST_DURATION_SECONDS);
    lazy_static::initialize(&AUTH_FAILURES_TOTAL);
    lazy_static::initialize(&AUTH_CHALLENGES_TOTAL);
    lazy_static::initialize(&TOKENS_ISSUED_TOTAL);
    lazy_static::initialize(&DATABASE_QUERIES_TOTAL);
    lazy_static::initialize(&DATABASE_QUERY_DURATION_SECONDS);
    lazy_static::initialize(&FILES_STORED_BYTES_TOTAL);
}
