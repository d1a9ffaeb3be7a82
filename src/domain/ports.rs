use crate::domain::model::{Observation, OutputFormat, RawSample};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Byte-level access to a sensor on the I2C bus. Implementations are
/// blocking; the pipeline moves them onto blocking tasks.
pub trait SensorBus: Send {
    fn write(&mut self, bytes: &[u8]) -> Result<()>;
    fn read(&mut self, buf: &mut [u8]) -> Result<()>;
    fn write_register(&mut self, register: u8, value: u8) -> Result<()>;
}

/// Destination for finished record lines. Returns a human-readable
/// description of where the line went.
pub trait RecordSink: Send + Sync {
    fn append_line(&self, line: &str) -> impl std::future::Future<Output = Result<String>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn i2c_bus(&self) -> &str;
    fn pressure_addr(&self) -> u16;
    fn humidity_addr(&self) -> u16;
    fn output(&self) -> Option<&str>;
    fn format(&self) -> OutputFormat;
    fn settle_delay_ms(&self) -> u64;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    /// Power the sensors up and wait for the first conversion.
    async fn prepare(&self) -> Result<()>;
    async fn acquire(&self) -> Result<RawSample>;
    async fn convert(&self, sample: RawSample) -> Result<Observation>;
    async fn record(&self, observation: Observation) -> Result<String>;
}
