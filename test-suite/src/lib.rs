//! The library code that supports this test suite
//!
//! Verifies the SPI master driver of a target, using an FPGA test shield that
//! acts as SPI slave. The test functions in [`spi`] are generic over the
//! driver and the shield. [`TestStand`] provides the real hardware, while
//! [`sim`] provides a simulation that is used to test the test suite itself.


pub mod error;
pub mod harness;
pub mod pinmap;
#[cfg(test)]
mod scripted;
pub mod sim;
pub mod spi;
pub mod target;
pub mod test_stand;
pub mod tester;


pub use self::{
    error::{
        Error,
        Result,
    },
    harness::{
        CASES,
        Case,
        Outcome,
        Report,
    },
    test_stand::TestStand,
};
