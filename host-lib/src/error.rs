use std::io;


pub type Result<T = ()> = core::result::Result<T, Error>;


#[derive(Debug)]
pub enum Error {
    /// An I/O error occured
    Io(io::Error),

    /// An error originated from Postcard
    ///
    /// The `postcard` crate is used for (de-)serialization.
    Postcard(postcard::Error),

    /// An error originated from the serial port driver
    Serial(serialport::Error),

    /// An error reading the configuration file
    Toml(toml::de::Error),

    /// A received frame exceeded the maximum frame length
    FrameTooLong,
}

impl Error {
    /// Indicates whether the error was caused by a missing file
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Io(err) if err.kind() == io::ErrorKind::NotFound => {
                true
            }
            _ => {
                false
            }
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<postcard::Error> for Error {
    fn from(err: postcard::Error) -> Self {
        Self::Postcard(err)
    }
}

impl From<serialport::Error> for Error {
    fn from(err: serialport::Error) -> Self {
        Self::Serial(err)
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::Toml(err)
    }
}
