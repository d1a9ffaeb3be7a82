use crate::core::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

/// Drives one sampling pass through the pipeline phases.
pub struct SampleEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> SampleEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(false),
        }
    }

    pub fn new_with_monitoring(pipeline: P, enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(enabled),
        }
    }

    /// Take one reading and append it. Returns the record destination.
    pub async fn run(&self) -> Result<String> {
        let observation = self.sample().await?;

        tracing::info!("Recording observation");
        let destination = self.pipeline.record(observation).await?;
        self.monitor.log_stats("Record");

        Ok(destination)
    }

    /// Take one reading and throw it away. The first LPS25H conversion
    /// after power-up is unreliable, so the boot-time init service runs
    /// this once and later readings start from a sane state.
    pub async fn run_init(&self) -> Result<()> {
        let observation = self.sample().await?;
        tracing::info!(
            "Init read complete, discarding observation ({:.2} hPa)",
            observation.pressure_hpa
        );
        Ok(())
    }

    async fn sample(&self) -> Result<crate::core::Observation> {
        tracing::info!("Preparing sensors");
        self.pipeline.prepare().await?;
        self.monitor.log_stats("Prepare");

        tracing::info!("Acquiring sensor frames");
        let sample = self.pipeline.acquire().await?;
        self.monitor.log_stats("Acquire");

        let observation = self.pipeline.convert(sample).await?;
        self.monitor.log_stats("Convert");

        Ok(observation)
    }
}
