use std::sync::Once;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

static INIT: Once = Once::new();

/// Routes tree events to the test output. Set `RUST_LOG=balance_tree=trace`
/// to see every rotation, split and merge.
pub fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::registry()
            .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "balance_tree=warn".into()))
            .with(tracing_subscriber::fmt::layer().with_test_writer())
            .try_init();
    });
}
