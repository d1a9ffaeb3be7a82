use sense_monitor::core::SensorBus;
use sense_monitor::domain::model::OutputFormat;
use sense_monitor::utils::error::{ErrorSeverity, Result, SenseError};
use sense_monitor::{CliConfig, LocalSink, SampleEngine, SenseHatPipeline};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

const AUTO_INCREMENT: u8 = 0x80;
const OUTPUT_BLOCK: u8 = 0x28;
const CALIBRATION_BLOCK: u8 = 0x30;

/// In-memory stand-in for a sensor on the I2C bus: canned register blocks
/// keyed by the address byte written before each read.
#[derive(Clone, Default)]
struct ScriptedBus {
    blocks: Arc<Mutex<HashMap<u8, Vec<u8>>>>,
    pending: Arc<Mutex<Option<u8>>>,
    register_writes: Arc<Mutex<Vec<(u8, u8)>>>,
    fail_transfers: Arc<Mutex<bool>>,
    panic_on_read: Arc<Mutex<bool>>,
}

impl ScriptedBus {
    fn with_block(self, start: u8, data: &[u8]) -> Self {
        self.blocks
            .lock()
            .unwrap()
            .insert(start | AUTO_INCREMENT, data.to_vec());
        self
    }

    /// Every transfer fails the way a dead device on a real bus does.
    fn failing_transfers(self) -> Self {
        *self.fail_transfers.lock().unwrap() = true;
        self
    }

    fn panicking_on_read(self) -> Self {
        *self.panic_on_read.lock().unwrap() = true;
        self
    }
}

impl SensorBus for ScriptedBus {
    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        if *self.fail_transfers.lock().unwrap() {
            return Err(SenseError::IoError(std::io::Error::other(
                "Remote I/O error",
            )));
        }
        *self.pending.lock().unwrap() = Some(bytes[0]);
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<()> {
        if *self.panic_on_read.lock().unwrap() {
            panic!("scripted read panic");
        }
        let pending = self
            .pending
            .lock()
            .unwrap()
            .take()
            .ok_or_else(|| SenseError::SensorError {
                sensor: "scripted",
                message: "read without address write".to_string(),
            })?;
        let blocks = self.blocks.lock().unwrap();
        let data = blocks
            .get(&pending)
            .ok_or_else(|| SenseError::SensorError {
                sensor: "scripted",
                message: format!("no canned block for {:#04x}", pending),
            })?;
        buf.copy_from_slice(&data[..buf.len()]);
        Ok(())
    }

    fn write_register(&mut self, register: u8, value: u8) -> Result<()> {
        self.register_writes.lock().unwrap().push((register, value));
        Ok(())
    }
}

/// LPS25H frame for exactly 1000.0 hPa and 42.5 degC.
fn pressure_bus() -> ScriptedBus {
    ScriptedBus::default().with_block(OUTPUT_BLOCK, &[0x00, 0x80, 0x3E, 0x00, 0x00])
}

/// HTS221 calibrated so the canned output reads 45.0 %rH and 25.0 degC.
fn humidity_bus() -> ScriptedBus {
    let mut calib = [0u8; 16];
    calib[0] = 80; // H0: 40.0 %rH
    calib[1] = 120; // H1: 60.0 %rH
    calib[2] = 160; // T0: 20.0 degC
    calib[3] = 64; // T1: 40.0 degC (bit 8 in calib[5])
    calib[5] = 0x04;
    calib[10..12].copy_from_slice(&2000i16.to_le_bytes());
    calib[14..16].copy_from_slice(&1000i16.to_le_bytes());

    let mut data = [0u8; 4];
    data[0..2].copy_from_slice(&500i16.to_le_bytes());
    data[2..4].copy_from_slice(&250i16.to_le_bytes());

    ScriptedBus::default()
        .with_block(CALIBRATION_BLOCK, &calib)
        .with_block(OUTPUT_BLOCK, &data)
}

fn config(output: Option<String>, format: OutputFormat) -> CliConfig {
    CliConfig {
        init: false,
        i2c_bus: "/dev/i2c-1".to_string(),
        lps25h_addr: 0x5c,
        hts221_addr: 0x5f,
        output,
        format,
        settle_ms: 10,
        verbose: false,
        monitor: false,
    }
}

#[tokio::test]
async fn test_end_to_end_tsv_record_to_file() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir
        .path()
        .join("records.tsv")
        .to_str()
        .unwrap()
        .to_string();

    let sink = LocalSink::file(output_path.clone());
    let pipeline = SenseHatPipeline::new(
        pressure_bus(),
        humidity_bus(),
        sink,
        config(Some(output_path.clone()), OutputFormat::Tsv),
    );
    let engine = SampleEngine::new_with_monitoring(pipeline, false);

    let destination = engine.run().await.unwrap();
    assert_eq!(destination, output_path);

    let contents = std::fs::read_to_string(&output_path).unwrap();
    let lines: Vec<&str> = contents.trim_end().split('\n').collect();
    assert_eq!(lines.len(), 1);

    let fields: Vec<&str> = lines[0].split('\t').collect();
    assert_eq!(fields.len(), 5);
    assert!(fields[0].parse::<i64>().unwrap() > 0);
    assert_eq!(fields[1], "1000.00");
    assert_eq!(fields[2], "42.50");
    assert_eq!(fields[3], "45.00");
    assert_eq!(fields[4], "25.00");
}

#[tokio::test]
async fn test_repeated_runs_append_records() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir
        .path()
        .join("records.tsv")
        .to_str()
        .unwrap()
        .to_string();

    for _ in 0..3 {
        let pipeline = SenseHatPipeline::new(
            pressure_bus(),
            humidity_bus(),
            LocalSink::file(output_path.clone()),
            config(Some(output_path.clone()), OutputFormat::Tsv),
        );
        SampleEngine::new(pipeline).run().await.unwrap();
    }

    let contents = std::fs::read_to_string(&output_path).unwrap();
    assert_eq!(contents.trim_end().split('\n').count(), 3);
}

#[tokio::test]
async fn test_init_run_discards_the_reading() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir
        .path()
        .join("records.tsv")
        .to_str()
        .unwrap()
        .to_string();

    let pressure = pressure_bus();
    let pipeline = SenseHatPipeline::new(
        pressure.clone(),
        humidity_bus(),
        LocalSink::file(output_path.clone()),
        config(Some(output_path.clone()), OutputFormat::Tsv),
    );
    let engine = SampleEngine::new(pipeline);

    engine.run_init().await.unwrap();

    // Sensors were powered up, but nothing was recorded
    assert_eq!(
        pressure.register_writes.lock().unwrap().as_slice(),
        &[(0x20, 0x80)]
    );
    assert!(!std::path::Path::new(&output_path).exists());
}

#[tokio::test]
async fn test_json_records_parse_back() {
    let temp_dir = TempDir::new().unwrap();
    let output_path = temp_dir
        .path()
        .join("records.jsonl")
        .to_str()
        .unwrap()
        .to_string();

    let pipeline = SenseHatPipeline::new(
        pressure_bus(),
        humidity_bus(),
        LocalSink::file(output_path.clone()),
        config(Some(output_path.clone()), OutputFormat::Json),
    );
    SampleEngine::new(pipeline).run().await.unwrap();

    let contents = std::fs::read_to_string(&output_path).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(contents.trim_end()).unwrap();
    assert!((parsed["pressure_hpa"].as_f64().unwrap() - 1000.0).abs() < 1e-9);
    assert!((parsed["humidity_percent"].as_f64().unwrap() - 45.0).abs() < 1e-9);
    assert!(parsed["timestamp"].as_i64().unwrap() > 0);
}

#[tokio::test]
async fn test_bus_failure_names_the_failing_sensor() {
    // Humidity bus whose transfers fail with an I/O error, as a real
    // LinuxI2cBus does when the device is absent
    let humidity = humidity_bus().failing_transfers();
    let pipeline = SenseHatPipeline::new(
        pressure_bus(),
        humidity,
        LocalSink::stdout(),
        config(None, OutputFormat::Tsv),
    );

    let err = SampleEngine::new(pipeline).run().await.unwrap_err();
    match err {
        SenseError::SensorError { sensor, message } => {
            assert_eq!(sensor, "HTS221");
            assert!(message.contains("Remote I/O error"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_sensor_task_panic_is_an_internal_error() {
    let pressure = pressure_bus().panicking_on_read();
    let pipeline = SenseHatPipeline::new(
        pressure,
        humidity_bus(),
        LocalSink::stdout(),
        config(None, OutputFormat::Tsv),
    );

    // The engine returns an error instead of tearing the process down
    let err = SampleEngine::new(pipeline).run().await.unwrap_err();
    assert!(matches!(err, SenseError::TaskError(_)));
    assert_eq!(err.severity(), ErrorSeverity::Critical);
}
