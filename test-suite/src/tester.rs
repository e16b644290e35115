use std::time::Duration;

use host_lib::conn::{
    Conn,
    ConnRequestError,
};
use protocol::{
    BitOrder,
    HostToTester,
    LogicalPin,
    Peripheral,
    Pin,
    SpiMode,
    TesterToHost,
};

use crate::spi::{
    SpiTester,
    SymbolSize,
};


const TIMEOUT: Duration = Duration::from_millis(100);


/// The connection to the tester
///
/// The tester controls the FPGA shield, which emulates the SPI slave and
/// keeps statistics about what it observed on the bus.
pub struct Tester {
    conn: Conn,
}

impl Tester {
    pub(crate) fn new(conn: Conn) -> Self {
        Self {
            conn,
        }
    }

    fn request(&mut self, request: &HostToTester)
        -> Result<TesterToHost, TesterError>
    {
        self.conn.request(request, TIMEOUT)
            .map_err(|err| TesterError::Request(err))
    }

    /// Send a command that the tester acknowledges without data
    fn command(&mut self, command: &HostToTester) -> Result<(), TesterError> {
        match self.request(command)? {
            TesterToHost::Ack => {
                Ok(())
            }
            message => {
                Err(
                    TesterError::UnexpectedMessage(
                        format!("{:?}", message)
                    )
                )
            }
        }
    }
}

impl SpiTester for Tester {
    type Error = TesterError;

    fn reset(&mut self) -> Result<(), Self::Error> {
        self.command(&HostToTester::Reset)
    }

    fn map_pin(&mut self, pin: Pin, role: LogicalPin)
        -> Result<(), Self::Error>
    {
        self.command(
            &HostToTester::PinMapSet {
                physical: pin.physical_index(),
                logical:  role,
            }
        )
    }

    fn set_mode(&mut self, mode: SpiMode) -> Result<(), Self::Error> {
        self.command(&HostToTester::SetMode(mode))
    }

    fn set_bit_order(&mut self, bit_order: BitOrder)
        -> Result<(), Self::Error>
    {
        self.command(&HostToTester::SetBitOrder(bit_order))
    }

    fn set_symbol_size(&mut self, symbol_size: SymbolSize)
        -> Result<(), Self::Error>
    {
        self.command(&HostToTester::SetSymbolSize(symbol_size.bits()))
    }

    fn reset_statistics(&mut self) -> Result<(), Self::Error> {
        self.command(&HostToTester::PeripheralsReset)
    }

    fn select_peripheral(&mut self, peripheral: Peripheral)
        -> Result<(), Self::Error>
    {
        self.command(&HostToTester::SelectPeripheral(peripheral))
    }

    fn transfer_count(&mut self) -> Result<u32, Self::Error> {
        match self.request(&HostToTester::GetTransferCount)? {
            TesterToHost::TransferCount(count) => {
                Ok(count)
            }
            message => {
                Err(
                    TesterError::UnexpectedMessage(
                        format!("{:?}", message)
                    )
                )
            }
        }
    }

    fn checksum(&mut self) -> Result<u32, Self::Error> {
        match self.request(&HostToTester::GetReceiveChecksum)? {
            TesterToHost::ReceiveChecksum(checksum) => {
                Ok(checksum)
            }
            message => {
                Err(
                    TesterError::UnexpectedMessage(
                        format!("{:?}", message)
                    )
                )
            }
        }
    }
}


#[derive(Debug)]
pub enum TesterError {
    Request(ConnRequestError),
    UnexpectedMessage(String),
}


#[cfg(test)]
mod tests {
    use protocol::{
        HostToTester,
        LogicalPin,
        Pin,
        TesterToHost,
    };

    use crate::{
        scripted::{
            Requests,
            ScriptedNode,
        },
        spi::SpiTester as _,
    };

    use super::{
        Tester,
        TesterError,
    };


    fn tester(replies: &[TesterToHost]) -> (Tester, Requests) {
        let (conn, requests) = ScriptedNode::connect(replies);
        (Tester::new(conn), requests)
    }


    #[test]
    fn checksum_should_request_receive_checksum() {
        let (mut tester, requests) =
            tester(&[TesterToHost::ReceiveChecksum(42702)]);

        assert_eq!(tester.checksum().unwrap(), 42702);
        assert_eq!(
            requests.decode::<HostToTester>(),
            vec![HostToTester::GetReceiveChecksum],
        );
    }

    #[test]
    fn checksum_should_reject_transfer_count() {
        let (mut tester, _) = tester(&[TesterToHost::TransferCount(300)]);

        match tester.checksum() {
            Err(TesterError::UnexpectedMessage(_)) => {}
            result => panic!("Unexpected result: {:?}", result),
        }
    }

    #[test]
    fn transfer_count_should_request_transfer_count() {
        let (mut tester, requests) =
            tester(&[TesterToHost::TransferCount(300)]);

        assert_eq!(tester.transfer_count().unwrap(), 300);
        assert_eq!(
            requests.decode::<HostToTester>(),
            vec![HostToTester::GetTransferCount],
        );
    }

    #[test]
    fn transfer_count_should_reject_checksum() {
        let (mut tester, _) = tester(&[TesterToHost::ReceiveChecksum(300)]);

        match tester.transfer_count() {
            Err(TesterError::UnexpectedMessage(_)) => {}
            result => panic!("Unexpected result: {:?}", result),
        }
    }

    #[test]
    fn map_pin_should_address_pin_by_physical_index() {
        let (mut tester, requests) = tester(&[TesterToHost::Ack]);

        tester.map_pin(Pin::A2, LogicalPin::SpiSclk).unwrap();

        assert_eq!(
            requests.decode::<HostToTester>(),
            vec![
                HostToTester::PinMapSet {
                    physical: 18,
                    logical:  LogicalPin::SpiSclk,
                },
            ],
        );
    }

    #[test]
    fn commands_should_require_ack() {
        let (mut tester, _) = tester(&[TesterToHost::TransferCount(0)]);

        match tester.reset() {
            Err(TesterError::UnexpectedMessage(_)) => {}
            result => panic!("Unexpected result: {:?}", result),
        }
    }
}
