//! A gateway process and a client bound to it, torn down together.
//!
//! ```no_run
//! use ncmapi::{Args, Gateway};
//! use std::time::Duration;
//!
//! let gw = Gateway::start(&["node", "app.js"], 3000, "localhost")?;
//! gw.wait_until_ready(Duration::from_secs(10))?;
//! let song = gw.song_detail(347_230_u64, Args::new())?;
//! println!("{}", song["songs"][0]["name"]);
//! // dropping `gw` logs out, then stops the process
//! # Ok::<(), ncmapi::NcmApiError>(())
//! ```

use crate::client::ApiClient;
use crate::config::ApiConfig;
use crate::error::Result;
use crate::server::{self, ServerHandle};
use std::ffi::OsStr;
use std::ops::Deref;
use std::time::Duration;

/// Owns a running gateway and an [`ApiClient`] talking to it.
///
/// Teardown order is fixed: the client is closed first (best-effort
/// logout), then the process is stopped. A process that already exited is
/// not an error.
#[derive(Debug)]
pub struct Gateway {
    client: ApiClient,
    server: Option<ServerHandle>,
    host: String,
    port: u16,
}

impl Gateway {
    /// Start `command` on `host:port` with a default client.
    pub fn start<S: AsRef<OsStr>>(command: &[S], port: u16, host: &str) -> Result<Self> {
        let server = server::start_server(command, port, host)?;
        let client = match ApiClient::new(port, host) {
            Ok(c) => c,
            Err(e) => {
                stop_quietly(server);
                return Err(e);
            }
        };
        Ok(Self {
            client,
            server: Some(server),
            host: host.to_owned(),
            port,
        })
    }

    /// Start from config. Waits for readiness when `ready_timeout_secs` is
    /// set; on timeout the process is stopped again.
    pub fn start_with_config(config: &ApiConfig) -> Result<Self> {
        let server = server::start_server(&config.server_command, config.port, &config.host)?;
        let client = match ApiClient::from_config(config) {
            Ok(c) => c,
            Err(e) => {
                stop_quietly(server);
                return Err(e);
            }
        };
        let gw = Self {
            client,
            server: Some(server),
            host: config.host.clone(),
            port: config.port,
        };
        if let Some(timeout) = config.ready_timeout() {
            // On error `gw` is dropped, which stops the process.
            gw.wait_until_ready(timeout)?;
        }
        Ok(gw)
    }

    /// Block until the gateway accepts TCP connections.
    pub fn wait_until_ready(&self, timeout: Duration) -> Result<()> {
        server::wait_until_ready(&self.host, self.port, timeout)
    }

    /// Process id of the gateway, while it is owned.
    pub fn pid(&self) -> Option<u32> {
        self.server.as_ref().map(ServerHandle::pid)
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Log out and stop the process now instead of on drop.
    pub fn shutdown(mut self) {
        self.teardown();
    }

    fn teardown(&mut self) {
        self.client.close();
        if let Some(server) = self.server.take() {
            stop_quietly(server);
        }
    }
}

impl Deref for Gateway {
    type Target = ApiClient;

    fn deref(&self) -> &ApiClient {
        &self.client
    }
}

impl Drop for Gateway {
    fn drop(&mut self) {
        self.teardown();
    }
}

fn stop_quietly(server: ServerHandle) {
    let pid = server.pid();
    match server::stop_server(server) {
        Ok(()) => {}
        Err(e) if e.is_no_such_process() => log::debug!("gateway pid={pid} already gone"),
        Err(e) => log::warn!("failed to stop gateway pid={pid}: {e}"),
    }
}
