use once_cell::sync::Lazy;
use prometheus::{IntCounterVec, Opts};

/// XML order import attempts, labelled by outcome.
pub static IMPORT_OUTCOMES: Lazy<IntCounterVec> = Lazy::new(|| {
    let counter = IntCounterVec::new(
        Opts::new("orderdesk_order_imports_total", "XML order import attempts by outcome"),
        &["outcome"],
    )
    .expect("static metric definition is valid");

    if let Err(e) = prometheus::register(Box::new(counter.clone())) {
        tracing::warn!(error = %e, "Failed to register import metric");
    }
    counter
});

pub fn render() -> String {
    use prometheus::TextEncoder;

    Lazy::force(&IMPORT_OUTCOMES);
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();

    encoder
        .encode_to_string(&metric_families)
        .unwrap_or_else(|_| "Error encoding metrics".to_string())
}
