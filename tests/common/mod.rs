//! Shared helpers for the integration tests.

#![allow(dead_code)]

use std::sync::Once;

use vcd::FrameIntervals;

static INIT: Once = Once::new();

/// Route `tracing` output to the test harness. Filter with `RUST_LOG`.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

pub fn fis(pairs: &[(i64, i64)]) -> FrameIntervals {
    FrameIntervals::from_pairs(pairs).expect("valid frame intervals")
}

pub fn range(start: i64, end: i64) -> FrameIntervals {
    FrameIntervals::from_range(start, end).expect("valid frame range")
}
