pub mod cli;

use crate::core::ConfigProvider;
use crate::domain::model::OutputFormat;
use crate::utils::error::{Result, SenseError};
use crate::utils::validation::{
    validate_i2c_address, validate_non_empty_string, validate_path, validate_range, Validate,
};
#[cfg(feature = "cli")]
use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(Parser))]
#[cfg_attr(feature = "cli", command(name = "sense-monitor"))]
#[cfg_attr(feature = "cli", command(about = "write sensor value to file"))]
pub struct CliConfig {
    /// initialize sensors. Data are discarded.
    #[cfg_attr(feature = "cli", arg(long))]
    pub init: bool,

    /// I2C bus device (e.g. /dev/i2c-1)
    #[cfg_attr(feature = "cli", arg(long, default_value = "/dev/i2c-1"))]
    pub i2c_bus: String,

    /// LPS25H I2C address
    #[cfg_attr(feature = "cli", arg(long, default_value_t = 0x5c))]
    pub lps25h_addr: u16,

    /// HTS221 I2C address
    #[cfg_attr(feature = "cli", arg(long, default_value_t = 0x5f))]
    pub hts221_addr: u16,

    /// Output file, appended to (default: stdout)
    #[cfg_attr(feature = "cli", arg(long))]
    pub output: Option<String>,

    /// Record format
    #[cfg_attr(feature = "cli", arg(long, value_enum, default_value = "tsv"))]
    pub format: OutputFormat,

    /// Delay after sensor power-up before sampling, in milliseconds
    #[cfg_attr(feature = "cli", arg(long, default_value_t = 50))]
    pub settle_ms: u64,

    #[cfg_attr(feature = "cli", arg(long, help = "Enable verbose output"))]
    pub verbose: bool,

    #[cfg_attr(feature = "cli", arg(long, help = "Log process resource usage per phase"))]
    pub monitor: bool,
}

impl ConfigProvider for CliConfig {
    fn i2c_bus(&self) -> &str {
        &self.i2c_bus
    }

    fn pressure_addr(&self) -> u16 {
        self.lps25h_addr
    }

    fn humidity_addr(&self) -> u16 {
        self.hts221_addr
    }

    fn output(&self) -> Option<&str> {
        self.output.as_deref()
    }

    fn format(&self) -> OutputFormat {
        self.format
    }

    fn settle_delay_ms(&self) -> u64 {
        self.settle_ms
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("i2c_bus", &self.i2c_bus)?;
        validate_path("i2c_bus", &self.i2c_bus)?;
        validate_i2c_address("lps25h_addr", self.lps25h_addr)?;
        validate_i2c_address("hts221_addr", self.hts221_addr)?;

        if self.lps25h_addr == self.hts221_addr {
            return Err(SenseError::InvalidConfigValueError {
                field: "hts221_addr".to_string(),
                value: format!("{:#04x}", self.hts221_addr),
                reason: "LPS25H and HTS221 cannot share an address".to_string(),
            });
        }

        if let Some(output) = &self.output {
            validate_path("output", output)?;
        }

        validate_range("settle_ms", self.settle_ms, 10, 5000)?;

        Ok(())
    }
}
