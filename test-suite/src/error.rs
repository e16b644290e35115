//! Test-suite specific error module


use crate::{
    sim::SimError,
    target::TargetSpiError,
    test_stand::TestStandInitError,
    tester::TesterError,
};


/// Result type specific to this test suite
pub type Result<T = ()> = std::result::Result<T, Error>;


/// Error type specific to this test suite
#[derive(Debug)]
pub enum Error {
    /// The target's SPI driver reported an error
    TargetSpi(TargetSpiError),

    /// Communication with the tester failed
    Tester(TesterError),

    /// The simulated test stand reported an error
    Sim(SimError),

    /// The slave didn't reply with the index of the transfer
    SymbolMismatch {
        index:    u32,
        expected: u32,
        received: u32,
    },

    /// The tester observed a different number of transfers
    TransferCount {
        expected: u32,
        observed: u32,
    },

    /// The tester received different data than was sent
    Checksum {
        expected: u32,
        observed: u32,
    },

    /// The pin map doesn't yield a single complete SPI port
    NoPortFound,

    /// The test stand could not be initialized
    TestStandInit(TestStandInitError),
}

impl From<TargetSpiError> for Error {
    fn from(err: TargetSpiError) -> Self {
        Self::TargetSpi(err)
    }
}

impl From<TesterError> for Error {
    fn from(err: TesterError) -> Self {
        Self::Tester(err)
    }
}

impl From<SimError> for Error {
    fn from(err: SimError) -> Self {
        Self::Sim(err)
    }
}

impl From<TestStandInitError> for Error {
    fn from(err: TestStandInitError) -> Self {
        Self::TestStandInit(err)
    }
}
