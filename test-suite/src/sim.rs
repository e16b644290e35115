//! Simulation of the test stand
//!
//! Pairs a simulated SPI master on the target with a simulated FPGA shield.
//! Like the real shield, the simulated slave replies to transfer `i` with
//! `i`, and counts and sums the symbols it receives. It only does so, if the
//! tester has been configured to match the master; otherwise MISO floats
//! high and nothing is counted.
//!
//! Faults can be injected to exercise the checks of the test suite.


use std::{
    cell::RefCell,
    rc::Rc,
};

use protocol::{
    BitOrder,
    LogicalPin,
    Peripheral,
    Pin,
    SpiMode,
    SpiPins,
};

use crate::spi::{
    SpiMaster,
    SpiTester,
    SymbolSize,
};


/// A fault the simulated shield injects into the transfers
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Fault {
    /// The slave sends back a wrong symbol for this transfer
    CorruptEcho { index: u32 },

    /// The slave receives a symbol with its lowest bit flipped
    CorruptReceive { index: u32 },

    /// A glitch on SSEL after this transfer is counted as an extra transfer
    SselGlitch { index: u32 },
}


/// The simulated test stand
///
/// Hands out a [`SimTarget`] and a [`SimTester`], which share the state of
/// the simulated bus.
pub struct Shield {
    state: Rc<RefCell<State>>,
}

impl Shield {
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(State::default())),
        }
    }

    /// Inject a fault
    pub fn with_fault(self, fault: Fault) -> Self {
        self.state.borrow_mut().faults.push(fault);
        self
    }

    /// The SPI master driver of the simulated target
    pub fn target(&self) -> SimTarget {
        SimTarget(self.state.clone())
    }

    /// The simulated FPGA tester
    pub fn tester(&self) -> SimTester {
        SimTester(self.state.clone())
    }

    /// Indicates whether the target's SPI peripheral is initialized
    pub fn spi_in_use(&self) -> bool {
        self.state.borrow().master.is_some()
    }

    /// How often the target's SPI peripheral has been released
    pub fn releases(&self) -> u32 {
        self.state.borrow().releases
    }

    /// All pin sets the SPI peripheral has been initialized with, in order
    pub fn initialized_pins(&self) -> Vec<SpiPins> {
        self.state.borrow().history.clone()
    }
}

impl Default for Shield {
    fn default() -> Self {
        Self::new()
    }
}


#[derive(Default)]
struct State {
    master:  Option<Master>,
    slave:   Slave,
    faults:  Vec<Fault>,
    history: Vec<SpiPins>,

    releases: u32,
}

struct Master {
    pins:      SpiPins,
    format:    Option<(SymbolSize, SpiMode)>,
    frequency: Option<u32>,
}

#[derive(Default)]
struct Slave {
    pin_map:     [Option<Pin>; 4],
    mode:        Option<SpiMode>,
    bit_order:   Option<BitOrder>,
    symbol_size: Option<SymbolSize>,
    peripheral:  Option<Peripheral>,

    /// Index of the next transfer, which is what the slave sends back
    index: u32,

    transfer_count: u32,
    checksum:       u32,
}

impl Slave {
    fn is_connected_to(&self, pins: &SpiPins) -> bool {
        pins.with_roles()
            .iter()
            .all(|&(pin, role)| self.pin_map[role_index(role)] == Some(pin))
    }

    fn reset_statistics(&mut self) {
        self.index          = 0;
        self.transfer_count = 0;
        self.checksum       = 0;
    }
}

fn role_index(role: LogicalPin) -> usize {
    match role {
        LogicalPin::SpiMosi => 0,
        LogicalPin::SpiMiso => 1,
        LogicalPin::SpiSclk => 2,
        LogicalPin::SpiSsel => 3,
    }
}

impl State {
    fn exchange(&mut self, symbol: u32) -> Result<u32, SimError> {
        let master = self.master.as_ref()
            .ok_or(SimError::NotInitialized)?;
        let (symbol_size, mode) = master.format
            .ok_or(SimError::NotConfigured)?;
        master.frequency
            .ok_or(SimError::NotConfigured)?;

        let mask  = symbol_size.mask();
        let slave = &mut self.slave;

        let matched = slave.is_connected_to(&master.pins)
            && slave.peripheral  == Some(Peripheral::Spi)
            && slave.mode        == Some(mode)
            && slave.bit_order   == Some(BitOrder::MsbFirst)
            && slave.symbol_size == Some(symbol_size);
        if !matched {
            return Ok(mask);
        }

        let index = slave.index;

        let mut received = symbol & mask;
        let mut reply    = index & mask;

        for fault in &self.faults {
            match *fault {
                Fault::CorruptEcho { index: i } if i == index => {
                    reply = !reply & mask;
                }
                Fault::CorruptReceive { index: i } if i == index => {
                    received ^= 1;
                }
                Fault::SselGlitch { index: i } if i == index => {
                    slave.transfer_count += 1;
                }
                _ => {}
            }
        }

        slave.index          += 1;
        slave.transfer_count += 1;
        slave.checksum        = slave.checksum.wrapping_add(received);

        Ok(reply)
    }
}


/// The SPI master driver of the simulated target
pub struct SimTarget(Rc<RefCell<State>>);

impl SpiMaster for SimTarget {
    type Error = SimError;

    fn init(&mut self, pins: SpiPins) -> Result<(), Self::Error> {
        let mut state = self.0.borrow_mut();

        if state.master.is_some() {
            return Err(SimError::AlreadyInUse);
        }

        let all = [pins.mosi, pins.miso, pins.sclk, pins.ssel];
        for (i, pin) in all.iter().enumerate() {
            if all[i + 1 ..].contains(pin) {
                return Err(SimError::PinConflict(*pin));
            }
        }

        state.master = Some(
            Master {
                pins,
                format:    None,
                frequency: None,
            }
        );
        state.history.push(pins);

        Ok(())
    }

    fn configure(&mut self,
        symbol_size: SymbolSize,
        mode:        SpiMode,
        slave:       bool,
    )
        -> Result<(), Self::Error>
    {
        if slave {
            return Err(SimError::Unsupported);
        }

        let mut state  = self.0.borrow_mut();
        let     master = state.master.as_mut()
            .ok_or(SimError::NotInitialized)?;

        master.format = Some((symbol_size, mode));
        Ok(())
    }

    fn set_frequency(&mut self, hz: u32) -> Result<(), Self::Error> {
        let mut state  = self.0.borrow_mut();
        let     master = state.master.as_mut()
            .ok_or(SimError::NotInitialized)?;

        master.frequency = Some(hz);
        Ok(())
    }

    fn write(&mut self, symbol: u32) -> Result<u32, Self::Error> {
        self.0.borrow_mut().exchange(symbol)
    }

    fn release(&mut self) -> Result<(), Self::Error> {
        let mut state = self.0.borrow_mut();

        state.master.take()
            .ok_or(SimError::NotInitialized)?;
        state.releases += 1;

        Ok(())
    }
}


/// The simulated FPGA tester
pub struct SimTester(Rc<RefCell<State>>);

impl SpiTester for SimTester {
    type Error = SimError;

    fn reset(&mut self) -> Result<(), Self::Error> {
        self.0.borrow_mut().slave = Slave::default();
        Ok(())
    }

    fn map_pin(&mut self, pin: Pin, role: LogicalPin)
        -> Result<(), Self::Error>
    {
        self.0.borrow_mut().slave.pin_map[role_index(role)] = Some(pin);
        Ok(())
    }

    fn set_mode(&mut self, mode: SpiMode) -> Result<(), Self::Error> {
        self.0.borrow_mut().slave.mode = Some(mode);
        Ok(())
    }

    fn set_bit_order(&mut self, bit_order: BitOrder)
        -> Result<(), Self::Error>
    {
        self.0.borrow_mut().slave.bit_order = Some(bit_order);
        Ok(())
    }

    fn set_symbol_size(&mut self, symbol_size: SymbolSize)
        -> Result<(), Self::Error>
    {
        self.0.borrow_mut().slave.symbol_size = Some(symbol_size);
        Ok(())
    }

    fn reset_statistics(&mut self) -> Result<(), Self::Error> {
        self.0.borrow_mut().slave.reset_statistics();
        Ok(())
    }

    fn select_peripheral(&mut self, peripheral: Peripheral)
        -> Result<(), Self::Error>
    {
        self.0.borrow_mut().slave.peripheral = Some(peripheral);
        Ok(())
    }

    fn transfer_count(&mut self) -> Result<u32, Self::Error> {
        Ok(self.0.borrow().slave.transfer_count)
    }

    fn checksum(&mut self) -> Result<u32, Self::Error> {
        Ok(self.0.borrow().slave.checksum)
    }
}


/// An error reported by the simulated target
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SimError {
    /// The SPI peripheral is already initialized
    AlreadyInUse,

    /// The SPI peripheral has not been initialized
    NotInitialized,

    /// Format or frequency have not been configured
    NotConfigured,

    /// The same pin was assigned to more than one role
    PinConflict(Pin),

    /// The simulated target only supports master mode
    Unsupported,
}
