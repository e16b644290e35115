//! SPI transfer driver and reference checker
//!
//! The functions in this module implement the actual test cases. They are
//! generic over the local SPI driver ([`SpiMaster`]) and the remote slave
//! ([`SpiTester`]), so the same code runs against the real test stand and
//! against the simulation in [`crate::sim`].


use std::fmt::Debug;

use log::{
    debug,
    warn,
};

use protocol::{
    BitOrder,
    LogicalPin,
    Peripheral,
    Pin,
    SpiMode,
    SpiPins,
};

use crate::{
    Error,
    Result,
};


/// Number of symbols exchanged per test case
pub const TRANSFER_COUNT: u32 = 300;

/// SPI clock frequency used for all test cases
pub const FREQUENCY_HZ: u32 = 1_000_000;

/// Bit order used for all test cases
pub const BIT_ORDER: BitOrder = BitOrder::MsbFirst;


/// The number of bits per SPI symbol
///
/// Always between 4 and 16, inclusive.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SymbolSize(u8);

impl SymbolSize {
    pub const MIN: u8 = 4;
    pub const MAX: u8 = 16;

    /// Create a symbol size
    ///
    /// # Panics
    ///
    /// Panics, if `bits` is outside of the supported range. When used to
    /// initialize a constant, this is a compile-time error.
    pub const fn new(bits: u8) -> Self {
        assert!(bits >= Self::MIN && bits <= Self::MAX);
        Self(bits)
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    /// The mask that truncates a value to the symbol width
    pub fn mask(self) -> u32 {
        (1 << self.0) - 1
    }
}


/// The SPI master driver on the test target
pub trait SpiMaster {
    type Error: Debug;

    /// Initialize an SPI peripheral on the given pins
    fn init(&mut self, pins: SpiPins) -> std::result::Result<(), Self::Error>;

    /// Configure symbol size, mode, and whether to act as slave
    fn configure(&mut self,
        symbol_size: SymbolSize,
        mode:        SpiMode,
        slave:       bool,
    )
        -> std::result::Result<(), Self::Error>;

    /// Set the clock frequency
    fn set_frequency(&mut self, hz: u32)
        -> std::result::Result<(), Self::Error>;

    /// Exchange one symbol, returning the symbol received from the slave
    fn write(&mut self, symbol: u32) -> std::result::Result<u32, Self::Error>;

    /// Release the SPI peripheral
    fn release(&mut self) -> std::result::Result<(), Self::Error>;
}


/// The SPI slave on the FPGA shield, which also observes the bus
pub trait SpiTester {
    type Error: Debug;

    /// Reset pin mapping, configuration, and statistics
    fn reset(&mut self) -> std::result::Result<(), Self::Error>;

    /// Connect a form factor pin to one of the slave's logical pins
    fn map_pin(&mut self, pin: Pin, role: LogicalPin)
        -> std::result::Result<(), Self::Error>;

    fn set_mode(&mut self, mode: SpiMode)
        -> std::result::Result<(), Self::Error>;

    fn set_bit_order(&mut self, bit_order: BitOrder)
        -> std::result::Result<(), Self::Error>;

    fn set_symbol_size(&mut self, symbol_size: SymbolSize)
        -> std::result::Result<(), Self::Error>;

    /// Reset transfer count and checksum
    fn reset_statistics(&mut self) -> std::result::Result<(), Self::Error>;

    /// Select the peripheral that is connected to the mapped pins
    fn select_peripheral(&mut self, peripheral: Peripheral)
        -> std::result::Result<(), Self::Error>;

    /// Number of transfers observed since statistics were last reset
    fn transfer_count(&mut self) -> std::result::Result<u32, Self::Error>;

    /// Sum of all symbols received since statistics were last reset
    fn checksum(&mut self) -> std::result::Result<u32, Self::Error>;
}


/// Represents an SPI peripheral that is currently initialized on the target
///
/// The peripheral is released when this struct is dropped, unless it has
/// already been released using [`SpiSession::free`].
pub struct SpiSession<'r, M: SpiMaster> {
    master:   &'r mut M,
    released: bool,
}

impl<'r, M> SpiSession<'r, M>
    where M: SpiMaster
{
    /// Initialize and configure the SPI peripheral as master
    pub fn open(
        master:      &'r mut M,
        pins:        SpiPins,
        symbol_size: SymbolSize,
        mode:        SpiMode,
    )
        -> std::result::Result<Self, M::Error>
    {
        master.init(pins)?;

        let mut session = Self {
            master,
            released: false,
        };

        session.master.configure(symbol_size, mode, false)?;
        session.master.set_frequency(FREQUENCY_HZ)?;

        Ok(session)
    }

    /// Exchange one symbol
    pub fn write(&mut self, symbol: u32)
        -> std::result::Result<u32, M::Error>
    {
        self.master.write(symbol)
    }

    /// Release the SPI peripheral
    pub fn free(mut self) -> std::result::Result<(), M::Error> {
        self.released = true;
        self.master.release()
    }
}

impl<M> Drop for SpiSession<'_, M>
    where M: SpiMaster
{
    fn drop(&mut self) {
        if self.released {
            return;
        }

        if let Err(err) = self.master.release() {
            warn!("Failed to release SPI peripheral: {:?}", err);
        }
    }
}


/// Tracks the symbols exchanged during one test case
#[derive(Debug)]
pub struct TransferSession {
    symbol_size: SymbolSize,
    transfers:   u32,
    checksum:    u32,
}

impl TransferSession {
    pub fn new(symbol_size: SymbolSize) -> Self {
        Self {
            symbol_size,
            transfers: 0,
            checksum:  0,
        }
    }

    /// The symbol to transmit next
    ///
    /// Symbol `i` is `-i`, truncated to the symbol width.
    pub fn next_symbol(&self) -> u32 {
        0u32.wrapping_sub(self.transfers) & self.symbol_size.mask()
    }

    /// The symbol the slave is expected to send back next
    ///
    /// The slave replies with the index of the transfer, not with the data it
    /// received.
    pub fn expected_reply(&self) -> u32 {
        self.transfers & self.symbol_size.mask()
    }

    /// Exchange the next symbol and verify the reply
    pub fn transfer<M>(&mut self, spi: &mut SpiSession<M>) -> Result
        where
            M:     SpiMaster,
            Error: From<M::Error>,
    {
        let symbol   = self.next_symbol();
        let expected = self.expected_reply();

        let received = spi.write(symbol)?;
        if received != expected {
            return Err(
                Error::SymbolMismatch {
                    index: self.transfers,
                    expected,
                    received,
                }
            );
        }

        self.checksum  = self.checksum.wrapping_add(symbol);
        self.transfers += 1;

        Ok(())
    }

    /// Sum of all transmitted symbols
    pub fn checksum(&self) -> u32 {
        self.checksum
    }

    /// Compare the statistics of the tester with the local ones
    pub fn verify<T>(&self, tester: &mut T) -> Result
        where
            T:     SpiTester,
            Error: From<T::Error>,
    {
        let observed = tester.transfer_count()?;
        if observed != self.transfers {
            return Err(
                Error::TransferCount {
                    expected: self.transfers,
                    observed,
                }
            );
        }

        let observed = tester.checksum()?;
        if observed != self.checksum {
            return Err(
                Error::Checksum {
                    expected: self.checksum,
                    observed,
                }
            );
        }

        Ok(())
    }
}


/// Initialize the SPI peripheral, then release it right away
///
/// Verifies that setup and teardown alone don't fault.
pub fn spi_test_init_free<M>(master: &mut M, pins: SpiPins) -> Result
    where
        M:     SpiMaster,
        Error: From<M::Error>,
{
    debug!("Init/free on {}", pins);

    let spi = SpiSession::open(
        master,
        pins,
        SymbolSize::new(8),
        SpiMode::Mode0,
    )?;
    spi.free()?;

    Ok(())
}


/// Exchange `TRANSFER_COUNT` symbols and verify them on both sides
pub fn spi_test_common<M, T>(
    master:      &mut M,
    tester:      &mut T,
    pins:        SpiPins,
    mode:        SpiMode,
    symbol_size: SymbolSize,
)
    -> Result
    where
        M:     SpiMaster,
        T:     SpiTester,
        Error: From<M::Error> + From<T::Error>,
{
    debug!(
        "Transfers on {} ({:?}, {} bits)",
        pins, mode, symbol_size.bits(),
    );

    // Remap pins for test
    tester.reset()?;
    for &(pin, role) in &pins.with_roles() {
        tester.map_pin(pin, role)?;
    }

    let mut spi = SpiSession::open(master, pins, symbol_size, mode)?;

    // Configure the slave to match the master
    tester.set_mode(mode)?;
    tester.set_bit_order(BIT_ORDER)?;
    tester.set_symbol_size(symbol_size)?;

    tester.reset_statistics()?;
    tester.select_peripheral(Peripheral::Spi)?;

    let mut session = TransferSession::new(symbol_size);
    for _ in 0 .. TRANSFER_COUNT {
        session.transfer(&mut spi)?;
    }

    session.verify(tester)?;

    spi.free()?;
    tester.reset()?;

    Ok(())
}
