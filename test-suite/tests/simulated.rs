//! Runs the complete test suite against the simulated test stand
//!
//! Doesn't require any hardware. Verifies that the test cases pass on a
//! correct target, and that they catch a faulty one.


use protocol::Pin;

use spi_test_suite::{
    CASES,
    Error,
    Outcome,
    Report,
    pinmap::{
        FormFactor,
        SpiPeripheralPins,
        SpiPinMap,
    },
    sim::{
        Fault,
        Shield,
    },
};


fn pin_map() -> SpiPinMap {
    SpiPinMap(vec![
        SpiPeripheralPins {
            peripheral: 1,
            mosi: vec![Pin::D11],
            miso: vec![Pin::D12],
            sclk: vec![Pin::D13],
            ssel: vec![Pin::D10],
        },
        SpiPeripheralPins {
            peripheral: 2,
            mosi: vec![Pin::A0, Pin::D4],
            miso: vec![Pin::A1],
            sclk: vec![Pin::A2],
            ssel: vec![Pin::A3],
        },
    ])
}

fn run(shield: &Shield, form_factor: &FormFactor) -> Report {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut master = shield.target();
    let mut tester = shield.tester();

    let mut report = Report::new();
    for case in &CASES {
        let outcome = case.execute(
            &mut master,
            &mut tester,
            &pin_map(),
            form_factor,
        );
        report.add(case.label, outcome);
    }

    report
}


#[test]
fn all_cases_should_pass_on_correct_target() {
    let shield = Shield::new();
    let report = run(&shield, &FormFactor::default());

    assert_eq!(report.results().len(), CASES.len());
    assert!(report.is_success(), "{:?}", report);
    assert!(!shield.spi_in_use());

    for (label, outcome) in report.results() {
        match outcome {
            Outcome::Passed { ports } => {
                let expected = match *label {
                    "SPI - init/free test all pins" => 3,
                    "SPI - basic test"              => 2,
                    _                               => 1,
                };
                assert_eq!(*ports, expected, "{}", label);
            }
            outcome => {
                panic!("{}: {:?}", label, outcome);
            }
        }
    }
}

#[test]
fn init_free_should_visit_every_mapped_pin() {
    let shield = Shield::new();
    let mut master = shield.target();
    let mut tester = shield.tester();

    let outcome = CASES[0].execute(
        &mut master,
        &mut tester,
        &pin_map(),
        &FormFactor::default(),
    );
    assert!(matches!(outcome, Outcome::Passed { ports: 3 }));

    let initialized = shield.initialized_pins();
    for peripheral in pin_map().peripherals() {
        for pin in &peripheral.mosi {
            assert!(initialized.iter().any(|pins| pins.mosi == *pin));
        }
    }
    assert_eq!(shield.releases(), 3);
}

#[test]
fn restricted_pins_should_not_be_used() {
    let shield = Shield::new();
    let report = run(&shield, &FormFactor::new(vec![Pin::D13]));

    assert!(report.is_success(), "{:?}", report);
    assert!(
        shield.initialized_pins()
            .iter()
            .all(|pins| pins.sclk != Pin::D13)
    );
}

#[test]
fn faulty_echo_should_fail_transfer_cases_only() {
    let shield = Shield::new()
        .with_fault(Fault::CorruptEcho { index: 150 });
    let report = run(&shield, &FormFactor::default());

    // The fault only applies while the slave's index is 150, which every
    // transfer case reaches. Init/free never transfers anything.
    assert_eq!(report.failures(), CASES.len() - 1);
    assert!(!report.results()[0].1.is_failed());

    for (_, outcome) in &report.results()[1 ..] {
        assert!(
            matches!(
                outcome,
                Outcome::Failed(Error::SymbolMismatch { index: 150, .. })
            ),
            "{:?}", outcome,
        );
    }

    // Failed cases must still release the peripheral.
    assert!(!shield.spi_in_use());
}

#[test]
fn missing_pin_map_should_not_be_supported() {
    let shield = Shield::new();
    let mut master = shield.target();
    let mut tester = shield.tester();

    for case in &CASES {
        let outcome = case.execute(
            &mut master,
            &mut tester,
            &SpiPinMap::default(),
            &FormFactor::default(),
        );
        assert!(matches!(outcome, Outcome::NotSupported(_)));
    }
    assert!(shield.initialized_pins().is_empty());
}
