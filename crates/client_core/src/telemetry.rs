//! Client-side telemetry init (dev-friendly pretty logs by default).

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

pub fn init_client_telemetry(dev_pretty: bool) {
    // Route `log` records from the lower crates into the subscriber.
    let _ = tracing_log::LogTracer::init();
    let filter = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = if dev_pretty {
        fmt::layer().pretty().boxed()
    } else {
        fmt::layer().boxed()
    };
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}
