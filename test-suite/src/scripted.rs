//! A test node that replies from a script
//!
//! Stands in for the serial connection to the target or the tester, so the
//! adapters in [`crate::target`] and [`crate::tester`] can be tested without
//! hardware.


use std::{
    cell::RefCell,
    collections::VecDeque,
    io,
    rc::Rc,
    time::Duration,
};

use serde::{
    Serialize,
    de::DeserializeOwned,
};

use host_lib::{
    Conn,
    conn::Link,
    receive::receive,
    send::send,
};


/// Sends one scripted reply for every request that is flushed
pub struct ScriptedNode {
    input:    VecDeque<u8>,
    replies:  VecDeque<Vec<u8>>,
    request:  Vec<u8>,
    requests: Requests,
}

impl ScriptedNode {
    /// Create a connection to a node that sends `replies`, in order
    ///
    /// Once the replies run out, requests time out.
    pub fn connect<T>(replies: &[T]) -> (Conn, Requests)
        where T: Serialize
    {
        let requests = Requests::default();

        let node = Self {
            input:    VecDeque::new(),
            replies:  replies.iter().map(|reply| frame(reply)).collect(),
            request:  Vec::new(),
            requests: requests.clone(),
        };

        (Conn::from_link(node), requests)
    }
}

fn frame<T>(message: &T) -> Vec<u8>
    where T: Serialize
{
    let mut stream = Vec::new();
    let mut buf    = [0; 64];
    send(message, &mut stream, &mut buf)
        .expect("Failed to encode scripted reply");
    stream
}

impl io::Read for ScriptedNode {
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

impl io::Write for ScriptedNode {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.request.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        let request = std::mem::replace(&mut self.request, Vec::new());
        self.requests.0.borrow_mut().push(request);

        if let Some(reply) = self.replies.pop_front() {
            self.input.extend(reply);
        }

        Ok(())
    }
}

impl Link for ScriptedNode {
    fn set_timeout(&mut self, _: Duration) -> host_lib::Result {
        Ok(())
    }

    fn clear_input(&mut self) -> host_lib::Result {
        self.input.clear();
        Ok(())
    }
}


/// The requests a [`ScriptedNode`] has received
#[derive(Clone, Default)]
pub struct Requests(Rc<RefCell<Vec<Vec<u8>>>>);

impl Requests {
    /// Decode all requests received so far
    pub fn decode<T>(&self) -> Vec<T>
        where T: DeserializeOwned
    {
        self.0.borrow()
            .iter()
            .map(|request| {
                let mut buf = Vec::new();
                receive(&request[..], &mut buf)
                    .expect("Failed to decode request")
            })
            .collect()
    }
}
