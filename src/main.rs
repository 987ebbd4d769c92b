use tracing::{error, info, warn};

use drvshtc::{load_device_config, run_device, DeviceConfig};

#[tokio::main]
async fn main() {
    // RUST_LOG=debug for verbose, RUST_LOG=info for normal, RUST_LOG=warn for production
    drvshtc::init_tracing();

    info!("[drvSHTC] starting up...");

    // Load configuration from CONFIG_PATH or default
    let config_path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config".to_string());
    let device_config_path = format!("{}/drvshtc.toml", config_path);
    let cfg = match load_device_config(&device_config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!("[config] {} (using defaults)", e);
            DeviceConfig::default()
        }
    };
    info!(
        "[config] bus={} address={:#04x} node={}",
        cfg.bus.path,
        cfg.sensor.address,
        cfg.node.path.display()
    );

    if let Err(e) = run_device(cfg).await {
        error!("[drvSHTC] fatal: {}", e);
        std::process::exit(1);
    }
}
