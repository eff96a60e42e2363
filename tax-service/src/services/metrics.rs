//! Prometheus metrics for tax-service.

use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_histogram_vec, CounterVec, HistogramVec, TextEncoder,
};

/// Tax calculation counter by document kind and outcome.
pub static TAX_CALCULATIONS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "tax_calculations_total",
        "Total number of tax calculations by document kind and outcome",
        &["kind", "outcome"] // success, validation_error, transport_error, api_error
    )
    .expect("Failed to register tax_calculations_total")
});

/// Reconciliation warning counter.
pub static RECONCILIATION_WARNINGS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "tax_reconciliation_warnings_total",
        "Total number of reconciliation warnings by document kind",
        &["kind"]
    )
    .expect("Failed to register reconciliation_warnings_total")
});

/// Address validation counter by outcome.
pub static ADDRESS_VALIDATIONS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "tax_address_validations_total",
        "Total number of address validations by outcome",
        &["outcome"] // validated, applied, error
    )
    .expect("Failed to register address_validations_total")
});

/// Error counter for alerting.
pub static ERRORS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "tax_errors_total",
        "Total number of errors by type",
        &["error_type"]
    )
    .expect("Failed to register errors_total")
});

/// Database query duration histogram.
pub static DB_QUERY_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "tax_db_query_duration_seconds",
        "Database query duration in seconds",
        &["operation"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0]
    )
    .expect("Failed to register db_query_duration")
});

/// Initialize all metrics (forces lazy initialization).
pub fn init_metrics() {
    Lazy::force(&TAX_CALCULATIONS_TOTAL);
    Lazy::force(&RECONCILIATION_WARNINGS_TOTAL);
    Lazy::force(&ADDRESS_VALIDATIONS_TOTAL);
    Lazy::force(&ERRORS_TOTAL);
    Lazy::force(&DB_QUERY_DURATION);
}

/// Get metrics in Prometheus text format.
pub fn get_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    encoder
        .encode_to_string(&metric_families)
        .unwrap_or_default()
}
