//! Gateway process supervisor.
//!
//! The gateway reads its bind address from the `HOST` and `PORT` environment
//! variables. [`start_server`] spawns it with those set and all standard
//! streams discarded, and returns right away: the gateway is usually not yet
//! accepting connections at that point. Use [`wait_until_ready`] or pace the
//! first call yourself.
//!
//! [`stop_server`] sends `SIGTERM`. If the process is already gone it returns
//! [`NcmApiError::NoSuchProcess`], which callers should treat as success.
//! Pid 0 never names a single process and is always reported as gone.

use crate::error::{NcmApiError, Result};
use std::ffi::OsStr;
use std::net::{TcpStream, ToSocketAddrs};
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

const READY_POLL_INTERVAL: Duration = Duration::from_millis(100);
const CONNECT_TIMEOUT: Duration = Duration::from_millis(500);
const REAP_GRACE: Duration = Duration::from_secs(2);
const REAP_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Handle to a running gateway process.
///
/// Wraps the process id. When the process was spawned by [`start_server`]
/// the handle also owns the [`Child`], so it can be reaped once stopped.
#[derive(Debug)]
pub struct ServerHandle {
    pid: u32,
    child: Option<Child>,
}

impl ServerHandle {
    /// Refer to a process started elsewhere (e.g. a pid printed by
    /// `ncmapi serve`).
    pub fn from_pid(pid: u32) -> Self {
        Self { pid, child: None }
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// Whether the process still exists.
    pub fn is_running(&mut self) -> bool {
        if let Some(child) = self.child.as_mut() {
            return matches!(child.try_wait(), Ok(None));
        }
        pid_alive(self.pid)
    }
}

/// Spawn the gateway with `HOST`/`PORT` set, without waiting for it to
/// become ready.
pub fn start_server<S: AsRef<OsStr>>(command: &[S], port: u16, host: &str) -> Result<ServerHandle> {
    let Some((program, rest)) = command.split_first() else {
        return Err(NcmApiError::Spawn {
            command: String::new(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty command"),
        });
    };

    let child = Command::new(program)
        .args(rest)
        .env("HOST", host)
        .env("PORT", port.to_string())
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|source| NcmApiError::Spawn {
            command: program.as_ref().to_string_lossy().into_owned(),
            source,
        })?;

    let pid = child.id();
    log::info!("started gateway pid={pid} on {host}:{port}");
    Ok(ServerHandle {
        pid,
        child: Some(child),
    })
}

/// Send a graceful termination signal to the gateway.
///
/// A child spawned by [`start_server`] is given a short grace period to exit
/// and is reaped if it does. One that ignores `SIGTERM` for longer stays a
/// zombie until this process exits.
pub fn stop_server(mut handle: ServerHandle) -> Result<()> {
    let pid = handle.pid;
    if pid == 0 {
        return Err(NcmApiError::NoSuchProcess { pid });
    }

    // An exited child is still a zombie until reaped, and signalling a
    // zombie succeeds. Reap first so a vanished gateway is reported as such.
    if let Some(child) = handle.child.as_mut() {
        if let Ok(Some(status)) = child.try_wait() {
            log::debug!("gateway pid={pid} already exited with {status}");
            return Err(NcmApiError::NoSuchProcess { pid });
        }
    }

    terminate(&mut handle)?;
    log::info!("sent termination signal to gateway pid={pid}");

    if let Some(child) = handle.child.as_mut() {
        reap(pid, child, REAP_GRACE);
    }
    Ok(())
}

fn reap(pid: u32, child: &mut Child, grace: Duration) {
    let start = Instant::now();
    loop {
        match child.try_wait() {
            Ok(Some(status)) => {
                log::debug!("gateway pid={pid} exited with {status}");
                return;
            }
            Ok(None) if start.elapsed() < grace => thread::sleep(REAP_POLL_INTERVAL),
            Ok(None) => {
                log::warn!("gateway pid={pid} still running {grace:?} after SIGTERM");
                return;
            }
            Err(e) => {
                log::debug!("could not reap gateway pid={pid}: {e}");
                return;
            }
        }
    }
}

#[cfg(unix)]
fn terminate(handle: &mut ServerHandle) -> Result<()> {
    let pid = handle.pid;
    // kill(0, ..) signals the whole process group.
    let raw = match libc::pid_t::try_from(pid) {
        Ok(raw) if raw > 0 => raw,
        _ => return Err(NcmApiError::NoSuchProcess { pid }),
    };
    // SAFETY: kill(2) has no memory-safety preconditions.
    #[allow(unsafe_code)]
    let rc = unsafe { libc::kill(raw, libc::SIGTERM) };
    if rc == 0 {
        return Ok(());
    }
    let err = std::io::Error::last_os_error();
    if err.raw_os_error() == Some(libc::ESRCH) {
        Err(NcmApiError::NoSuchProcess { pid })
    } else {
        Err(NcmApiError::Signal { pid, source: err })
    }
}

#[cfg(not(unix))]
fn terminate(handle: &mut ServerHandle) -> Result<()> {
    let pid = handle.pid;
    let Some(child) = handle.child.as_mut() else {
        return Err(NcmApiError::Signal {
            pid,
            source: std::io::Error::new(
                std::io::ErrorKind::Unsupported,
                "stopping a process by pid is only supported on Unix",
            ),
        });
    };
    child.kill().map_err(|source| {
        if source.kind() == std::io::ErrorKind::InvalidInput {
            NcmApiError::NoSuchProcess { pid }
        } else {
            NcmApiError::Signal { pid, source }
        }
    })
}

#[cfg(unix)]
fn pid_alive(pid: u32) -> bool {
    let raw = match libc::pid_t::try_from(pid) {
        Ok(raw) if raw > 0 => raw,
        _ => return false,
    };
    // SAFETY: signal 0 only checks for existence and permission.
    #[allow(unsafe_code)]
    let rc = unsafe { libc::kill(raw, 0) };
    rc == 0 || std::io::Error::last_os_error().raw_os_error() == Some(libc::EPERM)
}

#[cfg(not(unix))]
fn pid_alive(_pid: u32) -> bool {
    false
}

/// Poll `host:port` until a TCP connection succeeds or `timeout` elapses.
pub fn wait_until_ready(host: &str, port: u16, timeout: Duration) -> Result<()> {
    let addr = format!("{host}:{port}");
    let start = Instant::now();
    loop {
        if let Ok(addrs) = (host, port).to_socket_addrs() {
            for sa in addrs {
                if TcpStream::connect_timeout(&sa, CONNECT_TIMEOUT).is_ok() {
                    log::debug!("gateway at {addr} ready after {:?}", start.elapsed());
                    return Ok(());
                }
            }
        }
        if start.elapsed() >= timeout {
            return Err(NcmApiError::NotReady {
                addr,
                waited_ms: start.elapsed().as_millis(),
            });
        }
        thread::sleep(READY_POLL_INTERVAL);
    }
}
