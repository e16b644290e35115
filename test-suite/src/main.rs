//! Runs all SPI test cases against the test stand
//!
//! Exits with a non-zero status, if any case fails. Cases that can't run on
//! this host (no `test-stand.toml`, or target or tester not configured) are
//! reported as not supported, which doesn't count as failure.


use std::process;

use log::{
    error,
    info,
    warn,
};

use spi_test_suite::{
    CASES,
    Report,
    TestStand,
};


fn main() {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info")
    )
    .init();

    let report = match TestStand::new() {
        Ok(mut test_stand) => {
            test_stand.run(&CASES)
        }
        Err(err) if err.is_not_supported() => {
            warn!("Test stand not available: {:?}", err);
            Report::not_supported(&CASES, "test stand not configured")
        }
        Err(err) => {
            error!("Failed to initialize test stand: {:?}", err);
            process::exit(1);
        }
    };

    info!(
        "{} case(s), {} failed",
        report.results().len(),
        report.failures(),
    );

    if !report.is_success() {
        process::exit(1);
    }
}
