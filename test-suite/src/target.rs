use std::time::Duration;

use host_lib::conn::{
    Conn,
    ConnRequestError,
};
use protocol::{
    HostToTarget,
    SpiMode,
    SpiPins,
    TargetToHost,
};

use crate::spi::{
    SpiMaster,
    SymbolSize,
};


/// How long to wait for the target to reply
///
/// A single symbol at 1 MHz takes microseconds. Most of this is the round
/// trip over the serial connection.
const TIMEOUT: Duration = Duration::from_millis(100);


/// The connection to the test target
///
/// Gives access to the SPI master driver of the target firmware.
pub struct Target {
    conn: Conn,
}

impl Target {
    pub(crate) fn new(conn: Conn) -> Self {
        Self {
            conn,
        }
    }

    /// Send a command that the target acknowledges without data
    fn command(&mut self, command: &HostToTarget)
        -> Result<(), TargetSpiError>
    {
        let reply = self.conn.request::<_, TargetToHost>(command, TIMEOUT)
            .map_err(|err| TargetSpiError::Request(err))?;

        match reply {
            TargetToHost::Ack => {
                Ok(())
            }
            message => {
                Err(
                    TargetSpiError::UnexpectedMessage(
                        format!("{:?}", message)
                    )
                )
            }
        }
    }
}

impl SpiMaster for Target {
    type Error = TargetSpiError;

    fn init(&mut self, pins: SpiPins) -> Result<(), Self::Error> {
        self.command(&HostToTarget::SpiInit(pins))
    }

    fn configure(&mut self,
        symbol_size: SymbolSize,
        mode:        SpiMode,
        slave:       bool,
    )
        -> Result<(), Self::Error>
    {
        self.command(
            &HostToTarget::SpiFormat {
                bits: symbol_size.bits(),
                mode,
                slave,
            }
        )
    }

    fn set_frequency(&mut self, hz: u32) -> Result<(), Self::Error> {
        self.command(&HostToTarget::SpiFrequency { hz })
    }

    fn write(&mut self, symbol: u32) -> Result<u32, Self::Error> {
        let reply = self.conn
            .request::<_, TargetToHost>(
                &HostToTarget::SpiMasterWrite(symbol),
                TIMEOUT,
            )
            .map_err(|err| TargetSpiError::Request(err))?;

        match reply {
            TargetToHost::SpiReply(reply) => {
                Ok(reply)
            }
            message => {
                Err(
                    TargetSpiError::UnexpectedMessage(
                        format!("{:?}", message)
                    )
                )
            }
        }
    }

    fn release(&mut self) -> Result<(), Self::Error> {
        self.command(&HostToTarget::SpiFree)
    }
}


#[derive(Debug)]
pub enum TargetSpiError {
    Request(ConnRequestError),
    UnexpectedMessage(String),
}
