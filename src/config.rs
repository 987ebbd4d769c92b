use std::fs;
use std::path::PathBuf;

use serde::Deserialize;

use crate::errors::{ConfigError, ConfigResult};

/// Root configuration, loaded from `$CONFIG_PATH/drvshtc.toml`.
///
/// Every field has a default matching a Raspberry Pi with the SHTC3 on
/// adapter 1 at slave address 0x70, so the daemon runs without a file.
#[derive(Debug, Deserialize, Default)]
pub struct DeviceConfig {
    #[serde(default)]
    pub bus: BusSection,
    #[serde(default)]
    pub sensor: SensorSection,
    #[serde(default)]
    pub node: NodeSection,
}

#[derive(Debug, Deserialize)]
pub struct BusSection {
    #[serde(default = "default_bus_path")]
    pub path: String,
}

#[derive(Debug, Deserialize)]
pub struct SensorSection {
    /// 7-bit slave address
    #[serde(default = "default_address")]
    pub address: u16,
    /// Conversion wait between measure command and read-back
    #[serde(default = "default_measure_delay_ms")]
    pub measure_delay_ms: u64,
}

#[derive(Debug, Deserialize)]
pub struct NodeSection {
    /// Filesystem path of the device node socket
    #[serde(default = "default_node_path")]
    pub path: PathBuf,
}

fn default_bus_path() -> String {
    "/dev/i2c-1".to_string()
}

fn default_address() -> u16 {
    0x70
}

fn default_measure_delay_ms() -> u64 {
    20
}

fn default_node_path() -> PathBuf {
    PathBuf::from("/run/drvSHTC.sock")
}

impl Default for BusSection {
    fn default() -> Self {
        Self {
            path: default_bus_path(),
        }
    }
}

impl Default for SensorSection {
    fn default() -> Self {
        Self {
            address: default_address(),
            measure_delay_ms: default_measure_delay_ms(),
        }
    }
}

impl Default for NodeSection {
    fn default() -> Self {
        Self {
            path: default_node_path(),
        }
    }
}

/// Loads config from a TOML file
pub fn load_device_config(path: &str) -> ConfigResult<DeviceConfig> {
    let content = fs::read_to_string(path).map_err(|e| ConfigError::Load {
        path: path.to_string(),
        source: e,
    })?;
    let parsed: DeviceConfig = toml::from_str(&content)?;
    if parsed.sensor.address > 0x7F {
        return Err(ConfigError::InvalidValue {
            field: "sensor.address".to_string(),
            reason: format!("{:#x} is not a 7-bit address", parsed.sensor.address),
        });
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_original_board() {
        let cfg = DeviceConfig::default();
        assert_eq!(cfg.bus.path, "/dev/i2c-1");
        assert_eq!(cfg.sensor.address, 0x70);
        assert_eq!(cfg.sensor.measure_delay_ms, 20);
        assert_eq!(cfg.node.path, PathBuf::from("/run/drvSHTC.sock"));
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let cfg: DeviceConfig = toml::from_str(
            r#"
            [bus]
            path = "/dev/i2c-3"

            [node]
            path = "/tmp/shtc.sock"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.bus.path, "/dev/i2c-3");
        assert_eq!(cfg.sensor.address, 0x70);
        assert_eq!(cfg.node.path, PathBuf::from("/tmp/shtc.sock"));
    }

    #[test]
    fn wide_address_is_rejected() {
        let dir = std::env::temp_dir().join(format!("drvshtc-cfg-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("drvshtc.toml");
        fs::write(&path, "[sensor]\naddress = 200\n").unwrap();

        let err = load_device_config(path.to_str().unwrap()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
        fs::remove_dir_all(&dir).unwrap();
    }
}
