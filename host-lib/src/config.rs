//! Test suite configuration


use std::{
    fs::File,
    io::prelude::*,
};

use serde::{
    Deserialize,
    de::DeserializeOwned,
};

use crate::Error;


/// The file the configuration is read from, relative to the working directory
pub const CONFIG_FILE: &str = "test-stand.toml";


/// The configuration options shared by all test suites
///
/// Test suites can read additional, suite-specific options from the same
/// file, using [`read`].
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Path to the serial device connected to the test target
    pub target: Option<String>,

    /// Path to the serial device connected to the tester
    pub tester: Option<String>,
}

impl Config {
    /// Read configuration from the `test-stand.toml` file
    pub fn read() -> Result<Self, ConfigReadError> {
        read()
    }
}


/// Read any configuration type from the `test-stand.toml` file
pub fn read<T>() -> Result<T, ConfigReadError>
    where T: DeserializeOwned
{
    read_inner()
        .map_err(|err| ConfigReadError(err))
}

fn read_inner<T>() -> Result<T, Error>
    where T: DeserializeOwned
{
    // Read configuration file
    let mut config = Vec::new();
    File::open(CONFIG_FILE)?
        .read_to_end(&mut config)?;

    // Parse configuration file
    let config = toml::from_slice(&config)?;

    Ok(config)
}


/// Error reading the configuration file
#[derive(Debug)]
pub struct ConfigReadError(pub Error);

impl ConfigReadError {
    /// Indicates whether there is no configuration file
    pub fn is_missing(&self) -> bool {
        self.0.is_not_found()
    }
}


#[cfg(test)]
mod tests {
    use super::Config;


    #[test]
    fn it_should_ignore_suite_specific_options() {
        let config: Config = toml::from_str(r#"
            target = "/dev/ttyACM0"

            [[spi]]
            peripheral = 1
        "#)
        .unwrap();

        assert_eq!(config.target.as_deref(), Some("/dev/ttyACM0"));
        assert!(config.tester.is_none());
    }
}
