//! Exclusive access to the test stand hardware


use std::sync::{
    LockResult,
    Mutex,
    MutexGuard,
};

use lazy_static::lazy_static;
use log::debug;

use crate::{
    config::{
        Config,
        ConfigReadError,
    },
    conn::{
        Conn,
        ConnInitError,
    },
};


lazy_static! {
    /// Held by the one `TestStand` that may talk to the hardware
    ///
    /// `cargo test` runs tests on multiple threads. Test cases sharing the
    /// target and the tester must run one after the other.
    static ref MUTEX: Mutex<()> = Mutex::new(());
}


/// The target and the tester, as configured in `test-stand.toml`
pub struct TestStand {
    /// Keeps other test cases from using the hardware
    ///
    /// A poisoned lock still excludes everybody else, so the error case is
    /// kept as it is.
    pub guard: LockResult<MutexGuard<'static, ()>>,

    /// Connection to the test target, unless it is not configured
    pub target: Result<Conn, NotConfiguredError>,

    /// Connection to the tester of the FPGA shield, unless it is not
    /// configured
    pub tester: Result<Conn, NotConfiguredError>,
}

impl TestStand {
    /// Wait for exclusive access, then connect to the configured nodes
    pub fn new() -> Result<Self, TestStandInitError> {
        let guard = MUTEX.lock();

        let config = Config::read()
            .map_err(|err| TestStandInitError::ConfigRead(err))?;

        Ok(
            Self {
                guard,
                target: connect("target", config.target)?,
                tester: connect("tester", config.tester)?,
            }
        )
    }
}

/// Open the connection to a node, if its serial device is configured
fn connect(node: &'static str, path: Option<String>)
    -> Result<Result<Conn, NotConfiguredError>, TestStandInitError>
{
    let path = match path {
        Some(path) => path,
        None       => return Ok(Err(NotConfiguredError(node))),
    };

    debug!("Connecting to {} at {}", node, path);
    let conn = Conn::new(&path)
        .map_err(|err| TestStandInitError::ConnInit(err))?;

    Ok(Ok(conn))
}


#[derive(Debug)]
pub enum TestStandInitError {
    ConfigRead(ConfigReadError),
    ConnInit(ConnInitError),
}

impl TestStandInitError {
    /// Indicates whether there is no test stand on this host at all
    pub fn is_not_set_up(&self) -> bool {
        match self {
            TestStandInitError::ConfigRead(err) => err.is_missing(),
            TestStandInitError::ConnInit(_)     => false,
        }
    }
}


/// A node is not listed in `test-stand.toml`
///
/// Holds the name of the node.
#[derive(Clone, Copy, Debug)]
pub struct NotConfiguredError(pub &'static str);
