use std::io;

use serde::Serialize;

use crate::Result;


/// Send a message to a test node, via the provided writer
///
/// - `writer` is where the serialized message is written to.
/// - `buf` is a buffer used for serialization. It needs to be big enough to
///   hold the serialized form of the message.
pub fn send<T, W>(message: &T, mut writer: W, buf: &mut [u8]) -> Result
    where
        T: Serialize,
        W: io::Write,
{
    let serialized = postcard::to_slice_cobs(message, buf)?;
    writer.write_all(serialized)?;
    writer.flush()?;
    Ok(())
}


#[cfg(test)]
mod tests {
    use protocol::HostToTester;

    use super::send;


    #[test]
    fn it_should_terminate_frames_with_zero() {
        let mut out = Vec::new();
        let mut buf = [0; 32];

        send(&HostToTester::GetTransferCount, &mut out, &mut buf).unwrap();

        assert_eq!(out.last(), Some(&0));
        assert_eq!(out.iter().filter(|&&b| b == 0).count(), 1);
    }
}
