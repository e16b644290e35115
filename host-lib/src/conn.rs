use std::{
    io,
    time::Duration,
};

use log::{
    debug,
    trace,
};
use serde::{
    Deserialize,
    Serialize,
};
use serialport::{
    ClearBuffer,
    SerialPort,
};

use crate::{
    Error,
    receive::{
        MAX_FRAME_LEN,
        receive,
    },
    send::send,
};


/// The byte stream underlying a [`Conn`]
///
/// Implemented for serial ports. Tests can implement it to script what a
/// node replies.
pub trait Link: io::Read + io::Write {
    /// Set how long a read may block before failing with `TimedOut`
    fn set_timeout(&mut self, timeout: Duration) -> Result<(), Error>;

    /// Discard anything that has been received but not read yet
    fn clear_input(&mut self) -> Result<(), Error>;
}

impl Link for Box<dyn SerialPort> {
    fn set_timeout(&mut self, timeout: Duration) -> Result<(), Error> {
        SerialPort::set_timeout(self.as_mut(), timeout)?;
        Ok(())
    }

    fn clear_input(&mut self) -> Result<(), Error> {
        self.clear(ClearBuffer::Input)?;
        Ok(())
    }
}


/// A connection to a firmware application
pub struct Conn {
    link: Box<dyn Link>,
}

impl Conn {
    /// Open the connection
    ///
    /// `path` is the path to the serial device file that connects to the
    /// firmware.
    pub fn new(path: &str) -> Result<Self, ConnInitError> {
        // The configuration is hardcoded for now. We might want to load this
        // from the configuration file later.
        let port = serialport::new(path, 115200)
            .open()
            .map_err(|err| ConnInitError(err))?;

        Ok(Self::from_link(port))
    }

    /// Create a connection over any link
    pub fn from_link<L>(link: L) -> Self
        where L: Link + 'static
    {
        Self {
            link: Box::new(link),
        }
    }

    /// Send a message
    ///
    /// `message` can be any type that can be serialized using `serde`.
    pub fn send<T>(&mut self, message: &T) -> Result<(), ConnSendError>
        where T: Serialize
    {
        self.send_inner(message)
            .map_err(|err| ConnSendError(err))
    }

    fn send_inner<T>(&mut self, message: &T) -> Result<(), Error>
        where T: Serialize
    {
        let mut buf = [0; MAX_FRAME_LEN];
        send(message, &mut self.link, &mut buf)
    }

    /// Receive a message
    ///
    /// Accepts the following arguments:
    /// - `timeout`, which specifies (unsurprisingly) the timeout. An error is
    ///   returned, if nothing is received after this duration.
    /// - `buf` is the buffer used to receive data into. Its lifetime is tied to
    ///   the return value, as the received type might still borrow data from
    ///   this buffer.
    pub fn receive<'de, T>(&mut self, timeout: Duration, buf: &'de mut Vec<u8>)
        -> Result<T, ConnReceiveError>
        where T: Deserialize<'de>
    {
        self.receive_inner(timeout, buf)
            .map_err(|err| ConnReceiveError(err))
    }

    fn receive_inner<'de, T>(&mut self,
        timeout: Duration,
        buf:     &'de mut Vec<u8>,
    )
        -> Result<T, Error>
        where T: Deserialize<'de>
    {
        self.link.set_timeout(timeout)?;
        receive(&mut self.link, buf)
    }

    /// Send a request and wait for the reply
    ///
    /// Input that is pending before the request is sent is discarded. It can
    /// only be a late reply to an earlier request that timed out.
    pub fn request<Req, Rep>(&mut self, request: &Req, timeout: Duration)
        -> Result<Rep, ConnRequestError>
        where
            Req: Serialize,
            Rep: for<'de> Deserialize<'de>,
    {
        self.link.clear_input()
            .map_err(|err| ConnRequestError::Send(ConnSendError(err)))?;
        self.send(request)
            .map_err(|err| ConnRequestError::Send(err))?;
        trace!("Request sent, waiting {:?} for reply", timeout);

        let mut buf = Vec::new();
        self.receive(timeout, &mut buf)
            .map_err(|err| {
                if err.is_timeout() {
                    debug!("No reply within {:?}", timeout);
                }
                ConnRequestError::Receive(err)
            })
    }
}


/// Error initializing connection
#[derive(Debug)]
pub struct ConnInitError(pub serialport::Error);


/// Error sending data through a connection
#[derive(Debug)]
pub struct ConnSendError(pub Error);


/// Error receiving from a connection
#[derive(Debug)]
pub struct ConnReceiveError(pub Error);

impl ConnReceiveError {
    pub fn is_timeout(&self) -> bool {
        match &self.0 {
            Error::Io(err) if err.kind() == io::ErrorKind::TimedOut => {
                true
            }
            _ => {
                false
            }
        }
    }
}


/// Error during a request/reply exchange
#[derive(Debug)]
pub enum ConnRequestError {
    Send(ConnSendError),
    Receive(ConnReceiveError),
}


#[cfg(test)]
mod tests {
    use std::{
        collections::VecDeque,
        io,
        time::Duration,
    };

    use protocol::{
        HostToTarget,
        TargetToHost,
    };

    use crate::{
        Error,
        send::send,
    };

    use super::{
        Conn,
        Link,
    };


    const TIMEOUT: Duration = Duration::from_millis(10);


    /// Replies with the next queued frame, whenever a request is flushed
    #[derive(Default)]
    struct Node {
        input:   VecDeque<u8>,
        replies: VecDeque<Vec<u8>>,
    }

    impl Node {
        fn frame(message: &TargetToHost) -> Vec<u8> {
            let mut stream = Vec::new();
            let mut buf    = [0; 32];
            send(message, &mut stream, &mut buf).unwrap();
            stream
        }

        /// A frame that arrived before the next request is sent
        fn pending(mut self, message: &TargetToHost) -> Self {
            self.input.extend(Self::frame(message));
            self
        }

        fn reply(mut self, message: &TargetToHost) -> Self {
            self.replies.push_back(Self::frame(message));
            self
        }
    }

    impl io::Read for Node {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.input.is_empty() {
                return Err(io::ErrorKind::TimedOut.into());
            }

            let mut n = 0;
            while n < buf.len() {
                match self.input.pop_front() {
                    Some(b) => buf[n] = b,
                    None    => break,
                }
                n += 1;
            }

            Ok(n)
        }
    }

    impl io::Write for Node {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            if let Some(reply) = self.replies.pop_front() {
                self.input.extend(reply);
            }
            Ok(())
        }
    }

    impl Link for Node {
        fn set_timeout(&mut self, _: Duration) -> Result<(), Error> {
            Ok(())
        }

        fn clear_input(&mut self) -> Result<(), Error> {
            self.input.clear();
            Ok(())
        }
    }


    #[test]
    fn request_should_ignore_late_reply_to_earlier_request() {
        let node = Node::default()
            .pending(&TargetToHost::SpiReply(149))
            .reply(&TargetToHost::Ack);
        let mut conn = Conn::from_link(node);

        let reply: TargetToHost = conn
            .request(&HostToTarget::SpiFree, TIMEOUT)
            .unwrap();

        assert_eq!(reply, TargetToHost::Ack);
    }

    #[test]
    fn request_should_time_out_without_reply() {
        let mut conn = Conn::from_link(Node::default());

        let result = conn.request::<_, TargetToHost>(
            &HostToTarget::SpiFree,
            TIMEOUT,
        );

        match result {
            Err(super::ConnRequestError::Receive(err)) => {
                assert!(err.is_timeout());
            }
            result => {
                panic!("Unexpected result: {:?}", result);
            }
        }
    }
}
