use thiserror::Error;

#[derive(Error, Debug)]
pub enum SenseError {
    #[error("I2C bus error: {0}")]
    I2cError(#[from] i2cdev::linux::LinuxI2CError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Sensor task failed: {0}")]
    TaskError(#[from] tokio::task::JoinError),

    #[error("{sensor} sensor error: {message}")]
    SensorError { sensor: &'static str, message: String },

    #[error("Invalid value for {field}: {value} ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Bus,
    Sensor,
    Io,
    Config,
    Internal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl SenseError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            SenseError::I2cError(_) => ErrorCategory::Bus,
            SenseError::SensorError { .. } => ErrorCategory::Sensor,
            SenseError::IoError(_) => ErrorCategory::Io,
            SenseError::SerializationError(_) => ErrorCategory::Io,
            SenseError::InvalidConfigValueError { .. } => ErrorCategory::Config,
            SenseError::TaskError(_) => ErrorCategory::Internal,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Bus | ErrorCategory::Sensor => ErrorSeverity::High,
            ErrorCategory::Io => ErrorSeverity::Medium,
            ErrorCategory::Config => ErrorSeverity::High,
            ErrorCategory::Internal => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            SenseError::I2cError(e) => format!("Could not talk to the I2C bus: {}", e),
            SenseError::SensorError { sensor, message } => {
                format!("The {} sensor returned bad data: {}", sensor, message)
            }
            SenseError::IoError(e) => format!("Could not write the record: {}", e),
            SenseError::SerializationError(e) => format!("Could not render the record: {}", e),
            SenseError::TaskError(_) => "A sensor read task failed unexpectedly".to_string(),
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self.category() {
            ErrorCategory::Bus => {
                "Check that the I2C interface is enabled (raspi-config), the device path \
                 exists, and the user is in the i2c group"
                    .to_string()
            }
            ErrorCategory::Sensor => {
                "Check the Sense HAT is seated on the GPIO header and the sensor addresses \
                 are correct; run once with --init after boot"
                    .to_string()
            }
            ErrorCategory::Io => {
                "Check the output path is writable and the filesystem has space".to_string()
            }
            ErrorCategory::Config => {
                "Review the command-line flags; run with --help for accepted values".to_string()
            }
            ErrorCategory::Internal => {
                "Re-run with --verbose and report the log output".to_string()
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, SenseError>;
