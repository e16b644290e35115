//! Test case enumeration and reporting
//!
//! Each test case runs one of the test functions from [`crate::spi`] on a
//! set of ports chosen by a [`Strategy`].


use log::{
    debug,
    error,
    info,
    warn,
};

use protocol::SpiMode;

use crate::{
    Error,
    Result,
    pinmap::{
        FormFactor,
        Port,
        Role,
        SpiPinMap,
        find_port,
    },
    spi::{
        SpiMaster,
        SpiTester,
        SymbolSize,
        spi_test_common,
        spi_test_init_free,
    },
};


/// Which ports a test case is run on
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Strategy {
    /// Every pin that can take an SPI role, plus every peripheral
    AllPorts,

    /// One port per peripheral
    AllPeripherals,

    /// A single port
    OnePeripheral,
}

/// Which test function a case runs on each port
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Test {
    /// Initialize and release the peripheral, without any transfers
    InitFree,

    /// Exchange symbols and verify them against the tester
    Transfers {
        mode:        SpiMode,
        symbol_size: SymbolSize,
    },
}


/// A test case
#[derive(Clone, Copy, Debug)]
pub struct Case {
    pub label:    &'static str,
    pub strategy: Strategy,
    pub test:     Test,
}

impl Case {
    /// Run the case, returning the number of ports tested
    pub fn run<M, T>(&self,
        master:      &mut M,
        tester:      &mut T,
        pin_map:     &SpiPinMap,
        form_factor: &FormFactor,
    )
        -> Result<usize>
        where
            M:     SpiMaster,
            T:     SpiTester,
            Error: From<M::Error> + From<T::Error>,
    {
        match self.test {
            Test::InitFree => {
                for_each_port(self.strategy, pin_map, form_factor, |port| {
                    spi_test_init_free(master, port.pins)
                })
            }
            Test::Transfers { mode, symbol_size } => {
                for_each_port(self.strategy, pin_map, form_factor, |port| {
                    spi_test_common(
                        master,
                        tester,
                        port.pins,
                        mode,
                        symbol_size,
                    )
                })
            }
        }
    }

    /// Run the case and turn the result into an outcome
    pub fn execute<M, T>(&self,
        master:      &mut M,
        tester:      &mut T,
        pin_map:     &SpiPinMap,
        form_factor: &FormFactor,
    )
        -> Outcome
        where
            M:     SpiMaster,
            T:     SpiTester,
            Error: From<M::Error> + From<T::Error>,
    {
        if pin_map.is_empty() {
            return Outcome::NotSupported(
                "SPI not supported for this target".to_owned()
            );
        }

        info!("{}", self.label);

        match self.run(master, tester, pin_map, form_factor) {
            Ok(ports) => Outcome::Passed { ports },
            Err(err)  => Outcome::Failed(err),
        }
    }
}


/// The test cases of this test suite
pub const CASES: [Case; 8] = [
    // This will be run for all pins
    Case {
        label:    "SPI - init/free test all pins",
        strategy: Strategy::AllPorts,
        test:     Test::InitFree,
    },

    // This will be run for all peripherals
    Case {
        label:    "SPI - basic test",
        strategy: Strategy::AllPeripherals,
        test:     Test::Transfers {
            mode:        SpiMode::Mode0,
            symbol_size: SymbolSize::new(8),
        },
    },

    // This will be run for single pin configuration
    Case {
        label:    "SPI - mode testing (MODE_1)",
        strategy: Strategy::OnePeripheral,
        test:     Test::Transfers {
            mode:        SpiMode::Mode1,
            symbol_size: SymbolSize::new(8),
        },
    },
    Case {
        label:    "SPI - mode testing (MODE_2)",
        strategy: Strategy::OnePeripheral,
        test:     Test::Transfers {
            mode:        SpiMode::Mode2,
            symbol_size: SymbolSize::new(8),
        },
    },
    Case {
        label:    "SPI - mode testing (MODE_3)",
        strategy: Strategy::OnePeripheral,
        test:     Test::Transfers {
            mode:        SpiMode::Mode3,
            symbol_size: SymbolSize::new(8),
        },
    },
    Case {
        label:    "SPI - symbol size testing (4)",
        strategy: Strategy::OnePeripheral,
        test:     Test::Transfers {
            mode:        SpiMode::Mode0,
            symbol_size: SymbolSize::new(4),
        },
    },
    Case {
        label:    "SPI - symbol size testing (12)",
        strategy: Strategy::OnePeripheral,
        test:     Test::Transfers {
            mode:        SpiMode::Mode0,
            symbol_size: SymbolSize::new(12),
        },
    },
    Case {
        label:    "SPI - symbol size testing (16)",
        strategy: Strategy::OnePeripheral,
        test:     Test::Transfers {
            mode:        SpiMode::Mode0,
            symbol_size: SymbolSize::new(16),
        },
    },
];

/// Look up a case by its label
pub fn case(label: &str) -> Option<&'static Case> {
    CASES.iter().find(|case| case.label == label)
}


/// Run `test` on the ports selected by `strategy`
pub fn for_each_port<F>(
    strategy:    Strategy,
    pin_map:     &SpiPinMap,
    form_factor: &FormFactor,
    test:        F,
)
    -> Result<usize>
    where F: FnMut(&Port) -> Result
{
    match strategy {
        Strategy::AllPorts       => all_ports(pin_map, form_factor, test),
        Strategy::AllPeripherals => all_peripherals(pin_map, form_factor, test),
        Strategy::OnePeripheral  => one_peripheral(pin_map, form_factor, test),
    }
}

/// Run `test` once for every pin of the form factor, in every SPI role
///
/// Ports that come up more than once are only tested once. Afterwards, every
/// peripheral that hasn't been covered yet is tested too.
pub fn all_ports<F>(pin_map: &SpiPinMap, form_factor: &FormFactor, mut test: F)
    -> Result<usize>
    where F: FnMut(&Port) -> Result
{
    let mut tested: Vec<Port> = Vec::new();

    for &pin in form_factor.pins() {
        if form_factor.is_restricted(pin) {
            debug!("Skipping restricted pin {}", pin);
            continue;
        }

        for &role in &Role::ALL {
            for peripheral in pin_map.peripherals() {
                if !peripheral.pins(role).contains(&pin) {
                    continue;
                }

                let port = find_port(
                    peripheral,
                    Some((role, pin)),
                    form_factor,
                );

                match port {
                    Some(port) if tested.contains(&port) => {}
                    Some(port) => {
                        info!("Testing {}", port);
                        test(&port)?;
                        tested.push(port);
                    }
                    None => {
                        warn!(
                            "Skipping {} as {:?} of SPI{}: no free pins",
                            pin, role, peripheral.peripheral,
                        );
                    }
                }
            }
        }
    }

    for peripheral in pin_map.peripherals() {
        if tested.iter().any(|port| port.peripheral == peripheral.peripheral) {
            continue;
        }

        if let Some(port) = find_port(peripheral, None, form_factor) {
            info!("Testing {}", port);
            test(&port)?;
            tested.push(port);
        }
    }

    if tested.is_empty() {
        return Err(Error::NoPortFound);
    }

    Ok(tested.len())
}

/// Run `test` once for every peripheral
pub fn all_peripherals<F>(
    pin_map:     &SpiPinMap,
    form_factor: &FormFactor,
    mut test:    F,
)
    -> Result<usize>
    where F: FnMut(&Port) -> Result
{
    let mut tested = 0;

    for peripheral in pin_map.peripherals() {
        match find_port(peripheral, None, form_factor) {
            Some(port) => {
                info!("Testing {}", port);
                test(&port)?;
                tested += 1;
            }
            None => {
                warn!(
                    "Skipping SPI{}: no free pins",
                    peripheral.peripheral,
                );
            }
        }
    }

    if tested == 0 {
        return Err(Error::NoPortFound);
    }

    Ok(tested)
}

/// Run `test` once, on the first complete port
pub fn one_peripheral<F>(
    pin_map:     &SpiPinMap,
    form_factor: &FormFactor,
    mut test:    F,
)
    -> Result<usize>
    where F: FnMut(&Port) -> Result
{
    let port = pin_map.peripherals()
        .iter()
        .find_map(|peripheral| find_port(peripheral, None, form_factor))
        .ok_or(Error::NoPortFound)?;

    info!("Testing {}", port);
    test(&port)?;

    Ok(1)
}


/// The outcome of a test case
#[derive(Debug)]
pub enum Outcome {
    /// All ports passed
    Passed { ports: usize },

    /// The case was aborted at the first failed check
    Failed(Error),

    /// The case can't run on this target or test stand
    NotSupported(String),
}

impl Outcome {
    pub fn is_failed(&self) -> bool {
        match self {
            Outcome::Failed(_) => true,
            _                  => false,
        }
    }
}


/// The outcomes of all cases of a test run
#[derive(Debug, Default)]
pub struct Report {
    results: Vec<(&'static str, Outcome)>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    /// A report that marks all the given cases as not supported
    pub fn not_supported(cases: &[Case], reason: &str) -> Self {
        let mut report = Self::new();
        for case in cases {
            report.add(case.label, Outcome::NotSupported(reason.to_owned()));
        }
        report
    }

    /// Record the outcome of a case
    pub fn add(&mut self, label: &'static str, outcome: Outcome) {
        match &outcome {
            Outcome::Passed { ports } => {
                info!("{} ... ok ({} port(s))", label, ports);
            }
            Outcome::Failed(err) => {
                error!("{} ... FAILED: {:?}", label, err);
            }
            Outcome::NotSupported(reason) => {
                warn!("{} ... [NOT_SUPPORTED] {}", label, reason);
            }
        }

        self.results.push((label, outcome));
    }

    pub fn results(&self) -> &[(&'static str, Outcome)] {
        &self.results
    }

    /// Number of failed cases
    pub fn failures(&self) -> usize {
        self.results
            .iter()
            .filter(|(_, outcome)| outcome.is_failed())
            .count()
    }

    /// Indicates whether no case has failed
    pub fn is_success(&self) -> bool {
        self.failures() == 0
    }
}
