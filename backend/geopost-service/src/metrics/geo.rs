use lazy_static::lazy_static;
use prometheus::{
    register_histogram, register_histogram_vec, register_int_counter_vec, Histogram,
    HistogramVec, IntCounterVec,
};
use std::time::Duration;

const COUNT_BUCKETS: &[f64] = &[0.0, 1.0, 5.0, 10.0, 25.0, 50.0, 100.0, 200.0, 350.0, 500.0];

lazy_static! {
    /// Geo queries by endpoint (near, by_qr, latest) and outcome.
    pub static ref GEO_QUERY_TOTAL: IntCounterVec = register_int_counter_vec!(
        "geo_query_total",
        "Geo queries segmented by endpoint and outcome",
        &["endpoint", "outcome"]
    )
    .expect("failed to register geo_query_total");

    pub static ref GEO_QUERY_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "geo_query_duration_seconds",
        "Geo query duration segmented by endpoint",
        &["endpoint"]
    )
    .expect("failed to register geo_query_duration_seconds");

    /// Rows returned by the bounding-box pre-filter, per storage call.
    pub static ref GEO_CANDIDATE_COUNT: Histogram = register_histogram!(
        "geo_candidate_count",
        "Bounding-box candidates fetched per storage call",
        COUNT_BUCKETS.to_vec()
    )
    .expect("failed to register geo_candidate_count");

    pub static ref GEO_RESULT_COUNT: HistogramVec = register_histogram_vec!(
        "geo_result_count",
        "Items returned per query segmented by endpoint",
        &["endpoint"],
        COUNT_BUCKETS.to_vec()
    )
    .expect("failed to register geo_result_count");

    /// Posts created by type.
    pub static ref POSTS_CREATED_TOTAL: IntCounterVec = register_int_counter_vec!(
        "posts_created_total",
        "Posts created segmented by type and whether media was attached",
        &["type", "media"]
    )
    .expect("failed to register posts_created_total");

    pub static ref SCANS_CREATED_TOTAL: IntCounterVec = register_int_counter_vec!(
        "scans_created_total",
        "Scan events recorded",
        &["result"]
    )
    .expect("failed to register scans_created_total");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryOutcome {
    Ok,
    Invalid,
    Unavailable,
    Error,
}

impl QueryOutcome {
    fn as_str(&self) -> &'static str {
        match self {
            QueryOutcome::Ok => "ok",
            QueryOutcome::Invalid => "invalid",
            QueryOutcome::Unavailable => "unavailable",
            QueryOutcome::Error => "error",
        }
    }
}

pub fn record_query(endpoint: &str, outcome: QueryOutcome, elapsed: Duration, results: usize) {
    GEO_QUERY_TOTAL
        .with_label_values(&[endpoint, outcome.as_str()])
        .inc();
    GEO_QUERY_DURATION_SECONDS
        .with_label_values(&[endpoint])
        .observe(elapsed.as_secs_f64());
    if outcome == QueryOutcome::Ok {
        GEO_RESULT_COUNT
            .with_label_values(&[endpoint])
            .observe(results as f64);
    }
}

pub fn record_candidates(count: usize) {
    GEO_CANDIDATE_COUNT.observe(count as f64);
}

pub fn record_post_created(kind: &str, with_media: bool) {
    let media = if with_media { "yes" } else { "no" };
    POSTS_CREATED_TOTAL.with_label_values(&[kind, media]).inc();
}

pub fn record_scan_created(ok: bool) {
    let result = if ok { "ok" } else { "rejected" };
    SCANS_CREATED_TOTAL.with_label_values(&[result]).inc();
}
