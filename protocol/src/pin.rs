//! Pins of the Arduino form factor
//!
//! The FPGA test shield plugs into the Arduino headers of the target board.
//! The shield addresses pins by their physical index, which is the position
//! of the pin in [`Pin::ALL`].


use core::fmt;

use serde::{
    Deserialize,
    Serialize,
};


/// A pin on the Arduino headers
#[derive(Clone, Copy, Debug, Deserialize, Serialize, Eq, PartialEq, Hash)]
pub enum Pin {
    D0,
    D1,
    D2,
    D3,
    D4,
    D5,
    D6,
    D7,
    D8,
    D9,
    D10,
    D11,
    D12,
    D13,
    D14,
    D15,
    A0,
    A1,
    A2,
    A3,
    A4,
    A5,
}

impl Pin {
    /// All pins of the form factor, in order of their physical index
    pub const ALL: [Pin; 22] = [
        Pin::D0,  Pin::D1,  Pin::D2,  Pin::D3,
        Pin::D4,  Pin::D5,  Pin::D6,  Pin::D7,
        Pin::D8,  Pin::D9,  Pin::D10, Pin::D11,
        Pin::D12, Pin::D13, Pin::D14, Pin::D15,
        Pin::A0,  Pin::A1,  Pin::A2,  Pin::A3,
        Pin::A4,  Pin::A5,
    ];

    /// The index the test shield uses to address this pin
    pub fn physical_index(self) -> u8 {
        self as u8
    }

    /// The name of the pin, as printed on the board
    pub fn name(self) -> &'static str {
        match self {
            Pin::D0  => "D0",
            Pin::D1  => "D1",
            Pin::D2  => "D2",
            Pin::D3  => "D3",
            Pin::D4  => "D4",
            Pin::D5  => "D5",
            Pin::D6  => "D6",
            Pin::D7  => "D7",
            Pin::D8  => "D8",
            Pin::D9  => "D9",
            Pin::D10 => "D10",
            Pin::D11 => "D11",
            Pin::D12 => "D12",
            Pin::D13 => "D13",
            Pin::D14 => "D14",
            Pin::D15 => "D15",
            Pin::A0  => "A0",
            Pin::A1  => "A1",
            Pin::A2  => "A2",
            Pin::A3  => "A3",
            Pin::A4  => "A4",
            Pin::A5  => "A5",
        }
    }
}

impl fmt::Display for Pin {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The role a physical pin plays on the shield's SPI slave
#[derive(Clone, Copy, Debug, Deserialize, Serialize, Eq, PartialEq)]
pub enum LogicalPin {
    SpiMosi,
    SpiMiso,
    SpiSclk,
    SpiSsel,
}


/// The pins an SPI master uses
#[derive(Clone, Copy, Debug, Deserialize, Serialize, Eq, PartialEq)]
pub struct SpiPins {
    pub mosi: Pin,
    pub miso: Pin,
    pub sclk: Pin,
    pub ssel: Pin,
}

impl SpiPins {
    /// The pins, paired with the role they take on the shield
    pub fn with_roles(&self) -> [(Pin, LogicalPin); 4] {
        [
            (self.mosi, LogicalPin::SpiMosi),
            (self.miso, LogicalPin::SpiMiso),
            (self.sclk, LogicalPin::SpiSclk),
            (self.ssel, LogicalPin::SpiSsel),
        ]
    }
}

impl fmt::Display for SpiPins {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "(MOSI, MISO, SCLK, SSEL) = ({}, {}, {}, {})",
            self.mosi, self.miso, self.sclk, self.ssel,
        )
    }
}
