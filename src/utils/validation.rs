use crate::utils::error::{Result, SenseError};

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Valid 7-bit I2C device addresses. 0x00-0x07 and 0x78-0x7f are reserved.
const I2C_ADDR_MIN: u16 = 0x08;
const I2C_ADDR_MAX: u16 = 0x77;

pub fn validate_i2c_address(field_name: &str, addr: u16) -> Result<()> {
    if !(I2C_ADDR_MIN..=I2C_ADDR_MAX).contains(&addr) {
        return Err(SenseError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: format!("{:#04x}", addr),
            reason: format!(
                "7-bit I2C addresses must be between {:#04x} and {:#04x}",
                I2C_ADDR_MIN, I2C_ADDR_MAX
            ),
        });
    }
    Ok(())
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(SenseError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(SenseError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(SenseError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(SenseError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}
