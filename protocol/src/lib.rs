//! Messages exchanged between the test suite and the test stand
//!
//! The test suite on the host talks to two nodes: the test target, whose
//! firmware exposes its SPI master driver, and the tester, which controls the
//! FPGA shield acting as SPI slave. All messages are serialized using Postcard
//! and framed using COBS.


#![no_std]


pub mod pin;


use serde::{
    Deserialize,
    Serialize,
};

pub use self::pin::{
    LogicalPin,
    Pin,
    SpiPins,
};


/// A message from the test suite on the host to the target
#[derive(Clone, Copy, Debug, Deserialize, Serialize, Eq, PartialEq)]
pub enum HostToTarget {
    /// Instruct the target to initialize an SPI peripheral on these pins
    SpiInit(SpiPins),

    /// Instruct the target to configure the format of the SPI peripheral
    SpiFormat {
        /// Number of bits per symbol
        bits: u8,

        /// Clock polarity and phase
        mode: SpiMode,

        /// Whether the peripheral should act as slave
        slave: bool,
    },

    /// Instruct the target to set the SPI clock frequency
    SpiFrequency { hz: u32 },

    /// Instruct the target to exchange a single symbol as SPI master
    SpiMasterWrite(u32),

    /// Instruct the target to release the SPI peripheral
    SpiFree,
}


/// A message from the target to the test suite on the host
#[derive(Clone, Copy, Debug, Deserialize, Serialize, Eq, PartialEq)]
pub enum TargetToHost {
    /// The last command has been executed
    Ack,

    /// Notify the host that the SPI exchange completed
    ///
    /// Carries the symbol that was received from the slave.
    SpiReply(u32),
}


/// A message from the test suite on the host to the tester
#[derive(Clone, Copy, Debug, Deserialize, Serialize, Eq, PartialEq)]
pub enum HostToTester {
    /// Reset the tester, including pin mapping and statistics
    Reset,

    /// Connect a physical pin to a logical pin of the shield's peripherals
    PinMapSet {
        physical: u8,
        logical:  LogicalPin,
    },

    /// Set the clock polarity and phase of the SPI slave
    SetMode(SpiMode),

    /// Set the bit order of the SPI slave
    SetBitOrder(BitOrder),

    /// Set the number of bits per symbol of the SPI slave
    SetSymbolSize(u8),

    /// Reset the transfer statistics of all peripherals
    PeripheralsReset,

    /// Select which of the shield's peripherals is connected to the pins
    SelectPeripheral(Peripheral),

    /// Ask for the number of transfers observed since the last reset
    GetTransferCount,

    /// Ask for the sum of all symbols received since the last reset
    GetReceiveChecksum,
}


/// A message from the tester to the test suite on the host
#[derive(Clone, Copy, Debug, Deserialize, Serialize, Eq, PartialEq)]
pub enum TesterToHost {
    /// The last command has been executed
    Ack,

    /// Reply to `GetTransferCount`
    TransferCount(u32),

    /// Reply to `GetReceiveChecksum`
    ReceiveChecksum(u32),
}


/// SPI clock polarity and phase
#[derive(Clone, Copy, Debug, Deserialize, Serialize, Eq, PartialEq)]
pub enum SpiMode {
    /// CPOL = 0, CPHA = 0
    Mode0,

    /// CPOL = 0, CPHA = 1
    Mode1,

    /// CPOL = 1, CPHA = 0
    Mode2,

    /// CPOL = 1, CPHA = 1
    Mode3,
}

impl SpiMode {
    pub const ALL: [SpiMode; 4] = [
        SpiMode::Mode0,
        SpiMode::Mode1,
        SpiMode::Mode2,
        SpiMode::Mode3,
    ];
}


/// The order in which the bits of a symbol are shifted out
#[derive(Clone, Copy, Debug, Deserialize, Serialize, Eq, PartialEq)]
pub enum BitOrder {
    MsbFirst,
    LsbFirst,
}


/// The peripherals that the FPGA shield can emulate
#[derive(Clone, Copy, Debug, Deserialize, Serialize, Eq, PartialEq)]
pub enum Peripheral {
    Gpio,
    Spi,
    Uart,
    I2c,
}
