use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Raw LPS25H output block: PRESS_OUT_XL, PRESS_OUT_L, PRESS_OUT_H,
/// TEMP_OUT_L, TEMP_OUT_H (auto-increment read starting at 0x28).
#[derive(Debug, Clone, Copy)]
pub struct PressureFrame(pub [u8; 5]);

impl PressureFrame {
    /// Pressure in hPa. The 24-bit count is scaled by 4096 LSB/hPa.
    pub fn pressure_hpa(&self) -> f64 {
        let [xl, l, h, ..] = self.0;
        let raw = ((h as u32) << 16 | (l as u32) << 8 | xl as u32) as i32;
        // Sign-extend the 24-bit two's-complement count
        let raw = (raw << 8) >> 8;
        raw as f64 / 4096.0
    }

    /// Die temperature in degrees Celsius: 42.5 offset, 480 LSB/degC.
    pub fn temperature_c(&self) -> f64 {
        let raw = i16::from_le_bytes([self.0[3], self.0[4]]);
        42.5 + raw as f64 / 480.0
    }
}

/// HTS221 factory calibration, parsed from the 16-byte block at 0x30.
///
/// The sensor reports uncalibrated counts; temperature and humidity come
/// from linear interpolation between two factory-measured points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HumidityCalibration {
    pub h0_rh: f64,
    pub h1_rh: f64,
    pub t0_deg_c: f64,
    pub t1_deg_c: f64,
    pub h0_t0_out: i16,
    pub h1_t0_out: i16,
    pub t0_out: i16,
    pub t1_out: i16,
}

impl HumidityCalibration {
    pub fn from_registers(calib: &[u8; 16]) -> Self {
        let t0_deg_c_x8 = (calib[2] as u16) | (((calib[5] & 0x03) as u16) << 8);
        let t1_deg_c_x8 = (calib[3] as u16) | (((calib[5] & 0x0C) as u16) << 6);

        Self {
            h0_rh: calib[0] as f64 / 2.0,
            h1_rh: calib[1] as f64 / 2.0,
            t0_deg_c: t0_deg_c_x8 as f64 / 8.0,
            t1_deg_c: t1_deg_c_x8 as f64 / 8.0,
            h0_t0_out: i16::from_le_bytes([calib[6], calib[7]]),
            h1_t0_out: i16::from_le_bytes([calib[10], calib[11]]),
            t0_out: i16::from_le_bytes([calib[12], calib[13]]),
            t1_out: i16::from_le_bytes([calib[14], calib[15]]),
        }
    }
}

/// Raw HTS221 output block: H_OUT then T_OUT, little-endian
/// (auto-increment read starting at 0x28).
#[derive(Debug, Clone, Copy)]
pub struct HumidityFrame {
    pub h_out: i16,
    pub t_out: i16,
}

impl HumidityFrame {
    pub fn from_registers(data: &[u8; 4]) -> Self {
        Self {
            h_out: i16::from_le_bytes([data[0], data[1]]),
            t_out: i16::from_le_bytes([data[2], data[3]]),
        }
    }
}

/// One HTS221 acquisition: output counts plus the calibration needed to
/// turn them into physical units.
#[derive(Debug, Clone, Copy)]
pub struct HumiditySample {
    pub calibration: HumidityCalibration,
    pub frame: HumidityFrame,
}

impl HumiditySample {
    /// Temperature in degrees Celsius, interpolated between the two
    /// calibration points. Degenerate calibration (equal output counts)
    /// falls back to the first point.
    pub fn temperature_c(&self) -> f64 {
        let c = &self.calibration;
        if c.t1_out == c.t0_out {
            return c.t0_deg_c;
        }
        let slope = (c.t1_deg_c - c.t0_deg_c) / (c.t1_out - c.t0_out) as f64;
        c.t0_deg_c + (self.frame.t_out - c.t0_out) as f64 * slope
    }

    /// Relative humidity in percent, clamped to [0, 100].
    pub fn humidity_percent(&self) -> f64 {
        let c = &self.calibration;
        let raw = if c.h1_t0_out == c.h0_t0_out {
            c.h0_rh
        } else {
            let slope = (c.h1_rh - c.h0_rh) / (c.h1_t0_out - c.h0_t0_out) as f64;
            c.h0_rh + (self.frame.h_out - c.h0_t0_out) as f64 * slope
        };
        raw.clamp(0.0, 100.0)
    }
}

/// Everything read off the bus in one acquisition pass.
#[derive(Debug, Clone, Copy)]
pub struct RawSample {
    pub pressure: PressureFrame,
    pub humidity: HumiditySample,
}

/// A converted, timestamped reading ready to be recorded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Observation {
    pub timestamp: i64,
    pub pressure_hpa: f64,
    pub pressure_temperature_c: f64,
    pub humidity_percent: f64,
    pub humidity_temperature_c: f64,
}

impl Observation {
    pub fn from_sample(sample: &RawSample) -> Self {
        Self {
            timestamp: Utc::now().timestamp(),
            pressure_hpa: sample.pressure.pressure_hpa(),
            pressure_temperature_c: sample.pressure.temperature_c(),
            humidity_percent: sample.humidity.humidity_percent(),
            humidity_temperature_c: sample.humidity.temperature_c(),
        }
    }

    /// Record layout shared with the Python collector: timestamp, pressure,
    /// temperature from the pressure sensor, humidity, temperature from the
    /// humidity sensor. No header line.
    pub fn to_tsv_line(&self) -> String {
        format!(
            "{}\t{:.2}\t{:.2}\t{:.2}\t{:.2}",
            self.timestamp,
            self.pressure_hpa,
            self.pressure_temperature_c,
            self.humidity_percent,
            self.humidity_temperature_c
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum OutputFormat {
    Tsv,
    Json,
}
