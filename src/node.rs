//! Device node: a Unix-domain socket standing in for `/dev/drvSHTC`.
//!
//! One connection is one open of the device; EOF is the release. A request
//! is a single opcode byte and every reply is a fixed 3-byte frame, so the
//! consumer contract stays as close to a bare `read()` as a socket allows.

use std::fs;
use std::os::unix::fs::{FileTypeExt, PermissionsExt};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{UnixListener, UnixStream};
use tracing::{debug, info, warn};

use crate::bus::I2cTransport;
use crate::device::DeviceContext;
use crate::errors::{NodeError, NodeResult};

/// Request opcode: perform one sensor read.
pub const REQ_READ: u8 = 0x01;

/// Reply status: sample follows, big-endian.
pub const STATUS_OK: u8 = 0x00;
/// Reply status: the bus transaction failed; no sample.
pub const STATUS_BUS_FAULT: u8 = 0x01;
/// Reply status: unknown opcode.
pub const STATUS_BAD_REQUEST: u8 = 0x02;

/// Tracks exactly the filesystem state this registration created, so
/// teardown unwinds that set and nothing else.
struct NodeGuard {
    socket_path: PathBuf,
    created_dir: Option<PathBuf>,
    bound: bool,
}

impl Drop for NodeGuard {
    fn drop(&mut self) {
        if self.bound {
            if let Err(e) = fs::remove_file(&self.socket_path) {
                debug!("[node] could not remove {}: {}", self.socket_path.display(), e);
            } else {
                info!("[node] unregistered {}", self.socket_path.display());
            }
        }
        if let Some(dir) = &self.created_dir {
            if let Err(e) = fs::remove_dir(dir) {
                debug!("[node] could not remove {}: {}", dir.display(), e);
            }
        }
    }
}

/// A live device node. Dropping it tears the node down exactly once.
pub struct NodeRegistration {
    listener: UnixListener,
    guard: NodeGuard,
}

impl NodeRegistration {
    pub fn path(&self) -> &Path {
        &self.guard.socket_path
    }
}

/// Registers the device node at `path`.
///
/// Acquisition is staged: create the parent directory if missing, clear a
/// stale socket left by a previous run, bind the listener, open up node
/// permissions. A failure at any stage unwinds only the stages that
/// succeeded before it.
pub fn register(path: &Path) -> NodeResult<NodeRegistration> {
    let mut guard = NodeGuard {
        socket_path: path.to_path_buf(),
        created_dir: None,
        bound: false,
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| NodeError::CreateDir {
                path: parent.display().to_string(),
                source: e,
            })?;
            guard.created_dir = Some(parent.to_path_buf());
        }
    }

    match fs::metadata(path) {
        Ok(meta) if meta.file_type().is_socket() => {
            // Leftover from an unclean shutdown; nothing can be listening on
            // it anymore once we bind.
            fs::remove_file(path).map_err(|e| NodeError::ClearStale {
                path: path.display().to_string(),
                source: e,
            })?;
            debug!("[node] cleared stale node at {}", path.display());
        }
        Ok(_) => {
            return Err(NodeError::PathOccupied {
                path: path.display().to_string(),
            });
        }
        Err(_) => {}
    }

    let listener = UnixListener::bind(path).map_err(|e| NodeError::Bind {
        path: path.display().to_string(),
        source: e,
    })?;
    guard.bound = true;

    fs::set_permissions(path, fs::Permissions::from_mode(0o666)).map_err(|e| {
        NodeError::Permissions {
            path: path.display().to_string(),
            source: e,
        }
    })?;

    info!("[node] registered {}", path.display());
    Ok(NodeRegistration { listener, guard })
}

/// Accept loop. Runs until the caller drops the future (e.g. on ctrl-c).
pub async fn serve<T>(registration: &NodeRegistration, ctx: Arc<DeviceContext<T>>)
where
    T: I2cTransport + 'static,
{
    loop {
        match registration.listener.accept().await {
            Ok((stream, _)) => {
                let ctx = ctx.clone();
                tokio::spawn(async move {
                    handle_client(stream, ctx).await;
                });
            }
            Err(e) => {
                warn!("[node] accept failed: {}", e);
            }
        }
    }
}

async fn handle_client<T: I2cTransport>(mut stream: UnixStream, ctx: Arc<DeviceContext<T>>) {
    ctx.open();

    let mut op = [0u8; 1];
    loop {
        match stream.read_exact(&mut op).await {
            Ok(_) => {}
            Err(e) => {
                if e.kind() != std::io::ErrorKind::UnexpectedEof {
                    debug!("[node] client read failed: {}", e);
                }
                break;
            }
        }

        let reply = match op[0] {
            REQ_READ => match ctx.read_raw().await {
                Ok(raw) => {
                    let [hi, lo] = raw.to_be_bytes();
                    [STATUS_OK, hi, lo]
                }
                Err(e) => {
                    warn!("[node] read failed: {}", e);
                    [STATUS_BUS_FAULT, 0, 0]
                }
            },
            other => {
                warn!("[node] unknown request {:#04x}", other);
                [STATUS_BAD_REQUEST, 0, 0]
            }
        };

        if let Err(e) = stream.write_all(&reply).await {
            debug!("[node] client write failed: {}", e);
            break;
        }
    }

    ctx.release();
}
