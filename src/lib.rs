// Public modules
pub mod bus;
pub mod config;
pub mod device;
pub mod errors;
pub mod node;
pub mod registry;
pub mod sample;
pub mod sensors;

// Re-export commonly used types
pub use config::{load_device_config, DeviceConfig};
pub use device::DeviceContext;
pub use errors::{SensorError, SensorResult};
pub use node::NodeRegistration;
pub use registry::init_device;
pub use sample::{celsius, Reading};

use tracing::info;
use tracing_subscriber::EnvFilter;

/// Initialize tracing with default configuration
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();
}

/// Run the drvSHTC daemon with the given configuration.
pub async fn run_device(cfg: DeviceConfig) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = init_device(&cfg).await?;
    info!("[main] sensor attached");

    let registration = node::register(&cfg.node.path)?;
    info!("[main] serving on {}", registration.path().display());

    tokio::select! {
        _ = node::serve(&registration, ctx) => {}
        _ = tokio::signal::ctrl_c() => {
            info!("[main] shutdown requested");
        }
    }

    // Dropping the registration unwinds exactly what bring-up created.
    drop(registration);
    info!("[main] goodbye");
    Ok(())
}
