//! Client for a local NeteaseCloudMusicApi gateway.
//!
//! The gateway is an external HTTP server that implements the music
//! service's API; this crate starts and stops it and exposes one method per
//! route. Each method forwards its parameters as query arguments and returns
//! the response body as [`serde_json::Value`].
//!
//! ```no_run
//! use ncmapi::{Args, Gateway};
//! use std::time::Duration;
//!
//! let gw = Gateway::start(&["node", "app.js"], 3000, "localhost")?;
//! gw.wait_until_ready(Duration::from_secs(10))?;
//!
//! let resp = gw.login_cellphone(13_800_000_000_u64, "password", None, None, Args::new())?;
//! assert_eq!(resp["code"], 200);
//!
//! let lists = gw.user_playlist(32_953_014_u64, Some(10), None, Args::new())?;
//! # Ok::<(), ncmapi::NcmApiError>(())
//! ```
//!
//! # Pieces
//!
//! | Item                                | Role                                       |
//! |-------------------------------------|--------------------------------------------|
//! | [`start_server`] / [`stop_server`]  | spawn with `HOST`/`PORT`, stop with SIGTERM |
//! | [`ApiClient`]                       | HTTP session; logs out when closed/dropped |
//! | [`Gateway`]                         | both of the above, torn down together      |
//! | [`ENDPOINTS`]                       | route table behind the generated methods   |
//! | [`Args`]                            | query parameters for one call              |
//! | [`ApiConfig`]                       | persisted host/port/flags                  |
//!
//! # Boolean parameters
//!
//! Booleans are sent as `true`/`false`. The gateway reads query values as
//! JavaScript strings, so `false` is *truthy* on routes that only test for
//! presence (e.g. `qrimg`). Omit a flag rather than sending `false` when in
//! doubt.

pub mod auth;
pub mod client;
pub mod config;
mod crypto;
pub mod endpoints;
pub mod error;
pub mod gateway;
mod playlist;
pub mod qr;
pub mod server;
mod track;
pub mod types;
mod user;

pub use client::{ApiClient, ApiClientBuilder};
pub use config::ApiConfig;
pub use crypto::md5_hex;
pub use endpoints::{ENDPOINTS, Endpoint};
pub use error::{NcmApiError, Result};
pub use gateway::Gateway;
pub use server::{ServerHandle, start_server, stop_server, wait_until_ready};
pub use types::{Args, Ids, Scalar};
