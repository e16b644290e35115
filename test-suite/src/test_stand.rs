use std::sync::{
    LockResult,
    MutexGuard,
};

use serde::Deserialize;

use host_lib::{
    config::{
        self,
        ConfigReadError,
    },
    test_stand::NotConfiguredError,
};
use protocol::Pin;

use crate::{
    harness::{
        Case,
        Outcome,
        Report,
    },
    pinmap::{
        FormFactor,
        SpiPinMap,
    },
    target::Target,
    tester::Tester,
};


/// An instance of the test stand
///
/// Used to access all resources that a test case requires.
pub struct TestStand {
    _guard: LockResult<MutexGuard<'static, ()>>,

    pub target: Target,
    pub tester: Tester,

    pub pin_map:     SpiPinMap,
    pub form_factor: FormFactor,
}

impl TestStand {
    /// Initializes the test stand
    ///
    /// Reads the `test-stand.toml` configuration file and initializes test
    /// stand resources, as configured in there.
    pub fn new() -> Result<Self, TestStandInitError> {
        let test_stand = host_lib::TestStand::new()
            .map_err(|err| TestStandInitError::Inner(err))?;

        let config: SuiteConfig = config::read()
            .map_err(|err| TestStandInitError::ConfigRead(err))?;

        Ok(
            Self {
                _guard: test_stand.guard,
                target: Target::new(test_stand.target?),
                tester: Tester::new(test_stand.tester?),

                pin_map:     config.spi,
                form_factor: FormFactor::new(config.restricted),
            }
        )
    }

    /// Run a single case against the hardware
    pub fn run_case(&mut self, case: &Case) -> Outcome {
        case.execute(
            &mut self.target,
            &mut self.tester,
            &self.pin_map,
            &self.form_factor,
        )
    }

    /// Run all the given cases against the hardware
    pub fn run(&mut self, cases: &[Case]) -> Report {
        let mut report = Report::new();

        for case in cases {
            report.add(case.label, self.run_case(case));
        }

        report
    }
}


/// Test suite options from `test-stand.toml`
#[derive(Debug, Deserialize)]
struct SuiteConfig {
    /// Pins that must not be touched by the test cases
    #[serde(default)]
    restricted: Vec<Pin>,

    #[serde(default)]
    spi: SpiPinMap,
}


#[derive(Debug)]
pub enum TestStandInitError {
    Inner(host_lib::test_stand::TestStandInitError),
    NotConfigured(NotConfiguredError),
    ConfigRead(ConfigReadError),
}

impl TestStandInitError {
    /// Indicates whether the test stand is not available on this host
    ///
    /// Test cases are skipped in that case, instead of failing.
    pub fn is_not_supported(&self) -> bool {
        match self {
            TestStandInitError::Inner(err)      => err.is_not_set_up(),
            TestStandInitError::NotConfigured(_) => true,
            TestStandInitError::ConfigRead(_)    => false,
        }
    }
}

impl From<NotConfiguredError> for TestStandInitError {
    fn from(err: NotConfiguredError) -> Self {
        Self::NotConfigured(err)
    }
}
