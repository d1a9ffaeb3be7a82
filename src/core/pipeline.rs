use crate::core::{ConfigProvider, Observation, Pipeline, RawSample, RecordSink, SensorBus};
use crate::domain::model::{HumidityCalibration, HumidityFrame, HumiditySample, OutputFormat, PressureFrame};
use crate::utils::error::{Result, SenseError};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task;
use tokio::time::sleep;

// Register map shared by the LPS25H and HTS221 (both ST parts):
// CTRL_REG1 powers the device, output blocks start at 0x28, and setting
// the top bit of the register address enables auto-increment reads.
const CTRL_REG1: u8 = 0x20;
const POWER_UP: u8 = 0x80;
const AUTO_INCREMENT: u8 = 0x80;
const OUTPUT_BLOCK: u8 = 0x28;
const CALIBRATION_BLOCK: u8 = 0x30;

fn read_block<B: SensorBus>(bus: &mut B, start: u8, buf: &mut [u8]) -> Result<()> {
    bus.write(&[start | AUTO_INCREMENT])?;
    bus.read(buf)
}

/// Attribute a bus failure to the sensor being read, so an error on a
/// shared bus says which part failed.
fn sensor_error(sensor: &'static str, source: SenseError) -> SenseError {
    match source {
        err @ SenseError::SensorError { .. } => err,
        other => SenseError::SensorError {
            sensor,
            message: other.to_string(),
        },
    }
}

fn read_pressure_frame<B: SensorBus>(bus: &mut B) -> Result<PressureFrame> {
    let mut data = [0u8; 5];
    read_block(bus, OUTPUT_BLOCK, &mut data).map_err(|e| sensor_error("LPS25H", e))?;
    Ok(PressureFrame(data))
}

fn read_humidity_sample<B: SensorBus>(bus: &mut B) -> Result<HumiditySample> {
    let mut calib = [0u8; 16];
    read_block(bus, CALIBRATION_BLOCK, &mut calib).map_err(|e| sensor_error("HTS221", e))?;

    // An unpowered or absent HTS221 reads back zeroes; factory calibration
    // is never all-zero on a real part.
    if calib.iter().all(|&b| b == 0) {
        return Err(SenseError::SensorError {
            sensor: "HTS221",
            message: "calibration block read back all zeroes".to_string(),
        });
    }

    let mut data = [0u8; 4];
    read_block(bus, OUTPUT_BLOCK, &mut data).map_err(|e| sensor_error("HTS221", e))?;

    Ok(HumiditySample {
        calibration: HumidityCalibration::from_registers(&calib),
        frame: HumidityFrame::from_registers(&data),
    })
}

pub struct SenseHatPipeline<B, S, C>
where
    B: SensorBus + 'static,
    S: RecordSink,
    C: ConfigProvider,
{
    pressure_bus: Arc<Mutex<B>>,
    humidity_bus: Arc<Mutex<B>>,
    sink: S,
    config: C,
}

impl<B, S, C> SenseHatPipeline<B, S, C>
where
    B: SensorBus + 'static,
    S: RecordSink,
    C: ConfigProvider,
{
    pub fn new(pressure_bus: B, humidity_bus: B, sink: S, config: C) -> Self {
        Self {
            pressure_bus: Arc::new(Mutex::new(pressure_bus)),
            humidity_bus: Arc::new(Mutex::new(humidity_bus)),
            sink,
            config,
        }
    }
}

#[async_trait::async_trait]
impl<B, S, C> Pipeline for SenseHatPipeline<B, S, C>
where
    B: SensorBus + 'static,
    S: RecordSink,
    C: ConfigProvider,
{
    async fn prepare(&self) -> Result<()> {
        tracing::debug!("Powering up LPS25H and HTS221");
        self.pressure_bus
            .lock()
            .await
            .write_register(CTRL_REG1, POWER_UP)?;
        self.humidity_bus
            .lock()
            .await
            .write_register(CTRL_REG1, POWER_UP)?;

        // Let the first conversion complete before sampling
        sleep(Duration::from_millis(self.config.settle_delay_ms())).await;
        Ok(())
    }

    async fn acquire(&self) -> Result<RawSample> {
        let pressure_bus = Arc::clone(&self.pressure_bus);
        let humidity_bus = Arc::clone(&self.humidity_bus);

        // Userspace I2C transfers block, so each sensor gets its own
        // blocking task and the two reads overlap.
        let pressure_task = task::spawn_blocking(move || {
            let mut bus = pressure_bus.blocking_lock();
            read_pressure_frame(&mut *bus)
        });
        let humidity_task = task::spawn_blocking(move || {
            let mut bus = humidity_bus.blocking_lock();
            read_humidity_sample(&mut *bus)
        });

        let pressure = pressure_task.await??;
        let humidity = humidity_task.await??;

        Ok(RawSample { pressure, humidity })
    }

    async fn convert(&self, sample: RawSample) -> Result<Observation> {
        let observation = Observation::from_sample(&sample);
        tracing::debug!(
            "Converted sample: {:.2} hPa, {:.2}% rH, {:.2}/{:.2} degC",
            observation.pressure_hpa,
            observation.humidity_percent,
            observation.pressure_temperature_c,
            observation.humidity_temperature_c
        );
        Ok(observation)
    }

    async fn record(&self, observation: Observation) -> Result<String> {
        let line = match self.config.format() {
            OutputFormat::Tsv => observation.to_tsv_line(),
            OutputFormat::Json => serde_json::to_string(&observation)?,
        };
        self.sink.append_line(&line).await
    }
}
