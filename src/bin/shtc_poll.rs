//! Polling consumer: opens the device node and reads the temperature in a
//! loop, converting the raw word with the Sensirion formula.
//!
//! Usage: `shtc-poll [interval_ms]` (default 500). The node path comes from
//! `DRVSHTC_NODE`, output format from `DRVSHTC_FORMAT` (`text` or `json`).

use std::io::{Read, Write};
use std::os::unix::net::UnixStream;
use std::thread::sleep;
use std::time::Duration;

use tracing::{error, warn};

use drvshtc::node::{REQ_READ, STATUS_BUS_FAULT, STATUS_OK};
use drvshtc::Reading;

fn main() {
    drvshtc::init_tracing();

    let interval_ms = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse::<u64>().ok())
        .unwrap_or(500);
    let node_path =
        std::env::var("DRVSHTC_NODE").unwrap_or_else(|_| "/run/drvSHTC.sock".to_string());
    let json = matches!(std::env::var("DRVSHTC_FORMAT").as_deref(), Ok("json"));

    let mut stream = match UnixStream::connect(&node_path) {
        Ok(stream) => stream,
        Err(e) => {
            error!("[poll] failed to open the device at {}: {}", node_path, e);
            std::process::exit(1);
        }
    };

    println!("Starting device test drvSHTC...");

    let mut seq = 0u64;
    loop {
        let mut reply = [0u8; 3];
        let io = stream
            .write_all(&[REQ_READ])
            .and_then(|_| stream.read_exact(&mut reply));
        if let Err(e) = io {
            error!("[poll] device went away: {}", e);
            std::process::exit(1);
        }

        match reply[0] {
            STATUS_OK => {
                seq += 1;
                let raw = u16::from_be_bytes([reply[1], reply[2]]);
                let reading = Reading::new(raw, seq);
                if json {
                    match reading.to_json() {
                        Ok(line) => println!("{}", line),
                        Err(e) => warn!("[poll] serialization failed: {}", e),
                    }
                } else {
                    println!("Temperature = {:.2}°C", reading.celsius);
                }
            }
            STATUS_BUS_FAULT => {
                warn!("[poll] bus fault reported by device, no sample");
            }
            other => {
                warn!("[poll] unexpected reply status {:#04x}", other);
            }
        }

        sleep(Duration::from_millis(interval_ms));
    }
}
