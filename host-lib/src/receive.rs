use std::{
    io,
    slice,
};

use serde::Deserialize;

use crate::{
    Error,
    Result,
};


/// The longest frame, including the terminating `0`, that `receive` accepts
///
/// Matches the buffer that [`crate::send::send`] is used with.
pub const MAX_FRAME_LEN: usize = 256;


/// Receive a message from a test node, via the provided reader
///
/// - `reader` will be used to receive the message.
/// - `buf` is a buffer that the message is read into, before it is
///   deserialized. It is cleared first.
///
/// Returns [`Error::FrameTooLong`], if no frame terminator shows up within
/// [`MAX_FRAME_LEN`] bytes.
pub fn receive<'de, T, R>(mut reader: R, buf: &'de mut Vec<u8>) -> Result<T>
    where
        T: Deserialize<'de>,
        R: io::Read,
{
    buf.clear();

    loop {
        let mut b = 0; // initialized to `0`, but could be any value
        reader.read_exact(slice::from_mut(&mut b))?;

        buf.push(b);

        if b == 0 {
            // We're using COBS encoding, so `0` signifies the end of the
            // message.
            break;
        }
        if buf.len() >= MAX_FRAME_LEN {
            return Err(Error::FrameTooLong);
        }
    }

    let message = postcard::from_bytes_cobs(buf)?;
    Ok(message)
}


#[cfg(test)]
mod tests {
    use std::io::{
        self,
        Cursor,
    };

    use protocol::{
        HostToTarget,
        Pin,
        SpiMode,
        SpiPins,
        TargetToHost,
        TesterToHost,
    };

    use crate::{
        Error,
        send::send,
    };

    use super::{
        MAX_FRAME_LEN,
        receive,
    };


    #[test]
    fn it_should_receive_what_was_sent() {
        let pins = SpiPins {
            mosi: Pin::D11,
            miso: Pin::D12,
            sclk: Pin::D13,
            ssel: Pin::D10,
        };
        let messages = [
            HostToTarget::SpiInit(pins),
            HostToTarget::SpiFormat { bits: 12, mode: SpiMode::Mode3, slave: false },
            HostToTarget::SpiMasterWrite(0xfff),
        ];

        let mut stream = Vec::new();
        let mut buf    = [0; 64];
        for message in &messages {
            send(message, &mut stream, &mut buf).unwrap();
        }

        let mut reader = Cursor::new(stream);
        let mut buf    = Vec::new();
        for message in &messages {
            let received: HostToTarget = receive(&mut reader, &mut buf)
                .unwrap();
            assert_eq!(&received, message);
        }
    }

    #[test]
    fn it_should_keep_frames_apart() {
        let mut stream = Vec::new();
        let mut buf    = [0; 32];
        send(&TesterToHost::TransferCount(300), &mut stream, &mut buf)
            .unwrap();
        send(&TesterToHost::ReceiveChecksum(42702), &mut stream, &mut buf)
            .unwrap();

        let mut reader = Cursor::new(stream);
        let mut buf    = Vec::new();

        let first: TesterToHost = receive(&mut reader, &mut buf).unwrap();
        let second: TesterToHost = receive(&mut reader, &mut buf).unwrap();

        assert_eq!(first, TesterToHost::TransferCount(300));
        assert_eq!(second, TesterToHost::ReceiveChecksum(42702));
    }

    #[test]
    fn it_should_fail_on_truncated_frame() {
        let mut stream = Vec::new();
        let mut buf    = [0; 32];
        send(&TargetToHost::SpiReply(7), &mut stream, &mut buf).unwrap();
        stream.pop();

        let mut buf    = Vec::new();
        let     result = receive::<TargetToHost, _>(
            Cursor::new(stream),
            &mut buf,
        );

        match result {
            Err(Error::Io(err)) => {
                assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
            }
            result => {
                panic!("Unexpected result: {:?}", result);
            }
        }
    }

    #[test]
    fn it_should_give_up_on_frames_without_terminator() {
        let stream = vec![0x55; MAX_FRAME_LEN * 4];

        let mut reader = Cursor::new(stream);
        let mut buf    = Vec::new();
        let     result = receive::<TargetToHost, _>(&mut reader, &mut buf);

        assert!(matches!(result, Err(Error::FrameTooLong)));
        assert_eq!(buf.len(), MAX_FRAME_LEN);
    }
}
