use std::sync::OnceLock;
use std::time::Duration;

use opentelemetry::metrics::Histogram;
use opentelemetry::{global, KeyValue};

fn api_duration() -> &'static Histogram<f64> {
    static HISTOGRAM: OnceLock<Histogram<f64>> = OnceLock::new();
    HISTOGRAM.get_or_init(|| {
        global::meter("lorageo-resolver")
            .f64_histogram("geolocation_api_duration_seconds")
            .with_description("Duration of geolocation resolver API calls")
            .with_unit("s")
            .build()
    })
}

/// Records one resolver call duration under its endpoint label.
///
/// A no-op until the host application installs a meter provider.
pub(crate) fn observe_api_duration(endpoint: &'static str, elapsed: Duration) {
    api_duration().record(
        elapsed.as_secs_f64(),
        &[KeyValue::new("endpoint", endpoint)],
    );
}
