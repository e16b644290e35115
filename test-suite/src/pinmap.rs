//! Which pins of the form factor the target can use for SPI
//!
//! The pin map is board-specific and read from the configuration file. A
//! [`Port`] is a complete set of SPI pins on a single peripheral.


use std::fmt;

use serde::Deserialize;

use protocol::{
    Pin,
    SpiPins,
};


/// One of the four pins an SPI master needs
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Role {
    Mosi,
    Miso,
    Sclk,
    Ssel,
}

impl Role {
    pub const ALL: [Role; 4] = [
        Role::Mosi,
        Role::Miso,
        Role::Sclk,
        Role::Ssel,
    ];
}


/// The pins that one SPI peripheral of the target can be routed to
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct SpiPeripheralPins {
    /// Identifies the peripheral, e.g. `1` for `SPI1`
    pub peripheral: u32,

    #[serde(default)]
    pub mosi: Vec<Pin>,
    #[serde(default)]
    pub miso: Vec<Pin>,
    #[serde(default)]
    pub sclk: Vec<Pin>,
    #[serde(default)]
    pub ssel: Vec<Pin>,
}

impl SpiPeripheralPins {
    /// The pins that can take the given role on this peripheral
    pub fn pins(&self, role: Role) -> &[Pin] {
        match role {
            Role::Mosi => &self.mosi,
            Role::Miso => &self.miso,
            Role::Sclk => &self.sclk,
            Role::Ssel => &self.ssel,
        }
    }
}


/// The SPI pin map of the target
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(transparent)]
pub struct SpiPinMap(pub Vec<SpiPeripheralPins>);

impl SpiPinMap {
    pub fn peripherals(&self) -> &[SpiPeripheralPins] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}


/// The Arduino form factor, minus any pins reserved on this board
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct FormFactor {
    restricted: Vec<Pin>,
}

impl FormFactor {
    /// Create a form factor with some pins excluded from testing
    ///
    /// Restricted pins are typically needed for something else, like the
    /// serial connection to the host.
    pub fn new(restricted: Vec<Pin>) -> Self {
        Self {
            restricted,
        }
    }

    /// All pins of the form factor
    pub fn pins(&self) -> &'static [Pin] {
        &Pin::ALL
    }

    pub fn is_restricted(&self, pin: Pin) -> bool {
        self.restricted.contains(&pin)
    }
}


/// A complete set of pins on one SPI peripheral
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Port {
    pub peripheral: u32,
    pub pins:       SpiPins,
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "SPI{} {}", self.peripheral, self.pins)
    }
}


/// Find a port on the given peripheral
///
/// If `fixed` is `Some`, the port uses that pin in that role, and the other
/// pins are chosen around it. All pins of a port are distinct, and none of
/// them are restricted. Returns `None`, if no such port exists.
pub fn find_port(
    peripheral:  &SpiPeripheralPins,
    fixed:       Option<(Role, Pin)>,
    form_factor: &FormFactor,
)
    -> Option<Port>
{
    let mut chosen = [None; 4];

    if !assign(peripheral, fixed, form_factor, 0, &mut chosen) {
        return None;
    }

    match chosen {
        [Some(mosi), Some(miso), Some(sclk), Some(ssel)] => {
            Some(
                Port {
                    peripheral: peripheral.peripheral,
                    pins:       SpiPins { mosi, miso, sclk, ssel },
                }
            )
        }
        _ => {
            None
        }
    }
}

fn assign(
    peripheral:  &SpiPeripheralPins,
    fixed:       Option<(Role, Pin)>,
    form_factor: &FormFactor,
    i:           usize,
    chosen:      &mut [Option<Pin>; 4],
)
    -> bool
{
    if i == Role::ALL.len() {
        return true;
    }

    let role = Role::ALL[i];

    let candidates = match fixed {
        Some((fixed_role, pin)) if fixed_role == role => {
            if !peripheral.pins(role).contains(&pin) {
                return false;
            }
            vec![pin]
        }
        _ => {
            peripheral.pins(role).to_vec()
        }
    };

    for pin in candidates {
        if form_factor.is_restricted(pin) {
            continue;
        }
        if chosen[.. i].contains(&Some(pin)) {
            continue;
        }
        // Don't take a pin that is reserved for a later role.
        if let Some((fixed_role, fixed_pin)) = fixed {
            if fixed_role != role && fixed_pin == pin {
                continue;
            }
        }

        chosen[i] = Some(pin);
        if assign(peripheral, fixed, form_factor, i + 1, chosen) {
            return true;
        }
        chosen[i] = None;
    }

    false
}
