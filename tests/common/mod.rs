#![allow(dead_code)]

pub mod synthetic_airway;

/// Route `log` output through the test harness.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
