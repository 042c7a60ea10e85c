use std::env;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Install the stderr subscriber. Filter comes from `CODEMARK_LOG`.
pub fn init_logger() {
    let filter = env::var("CODEMARK_LOG").unwrap_or_else(|_| "warn".to_string());
    let filter_layer = EnvFilter::try_new(&filter).unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time()
                .with_ansi(codemark::utils::use_colors("human")),
        )
        .with(filter_layer)
        .try_init();
}
