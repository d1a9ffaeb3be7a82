pub mod engine;
pub mod pipeline;

pub use crate::domain::model::{Observation, RawSample};
pub use crate::domain::ports::{ConfigProvider, Pipeline, RecordSink, SensorBus};
pub use crate::utils::error::Result;
