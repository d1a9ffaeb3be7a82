use clap::Parser;
use sense_monitor::utils::{logger, validation::Validate};
use sense_monitor::{CliConfig, LinuxI2cBus, LocalSink, SampleEngine, SenseHatPipeline};

async fn run(config: CliConfig) -> sense_monitor::Result<Option<String>> {
    let pressure_bus = LinuxI2cBus::open(&config.i2c_bus, config.lps25h_addr)?;
    let humidity_bus = LinuxI2cBus::open(&config.i2c_bus, config.hts221_addr)?;

    let sink = match &config.output {
        Some(path) => LocalSink::file(path.clone()),
        None => LocalSink::stdout(),
    };

    let init = config.init;
    let monitor = config.monitor;
    let pipeline = SenseHatPipeline::new(pressure_bus, humidity_bus, sink, config);
    let engine = SampleEngine::new_with_monitoring(pipeline, monitor);

    if init {
        engine.run_init().await?;
        Ok(None)
    } else {
        engine.run().await.map(Some)
    }
}

#[tokio::main]
async fn main() {
    let config = CliConfig::parse();

    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting sense-monitor");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
        std::process::exit(1);
    }

    if config.monitor {
        tracing::info!("🔍 System monitoring enabled");
    }

    match run(config).await {
        Ok(Some(destination)) => {
            tracing::info!("✅ Observation recorded");
            tracing::info!("📁 Record appended to: {}", destination);
        }
        Ok(None) => {
            tracing::info!("✅ Sensors initialized, reading discarded");
        }
        Err(e) => {
            tracing::error!(
                "❌ Sampling failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                sense_monitor::utils::error::ErrorSeverity::Low => 0,
                sense_monitor::utils::error::ErrorSeverity::Medium => 2,
                sense_monitor::utils::error::ErrorSeverity::High => 1,
                sense_monitor::utils::error::ErrorSeverity::Critical => 3,
            };

            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }
}
