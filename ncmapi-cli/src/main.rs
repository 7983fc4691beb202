use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use ncmapi::auth::{QR_AUTHORIZED, QR_EXPIRED, QR_SCANNED};
use ncmapi::{ApiClient, ApiConfig, Args, Scalar, ServerHandle};
use serde_json::Value;

#[derive(Parser)]
#[command(
    name = "ncmapi",
    version,
    about = "Run and call a local NeteaseCloudMusicApi gateway"
)]
struct Cli {
    /// Gateway host (overrides config)
    #[arg(long, global = true)]
    host: Option<String>,
    /// Gateway port (overrides config)
    #[arg(long, global = true)]
    port: Option<u16>,
    /// Return error bodies instead of failing on non-2xx status
    #[arg(long, global = true)]
    no_raise: bool,
    /// Add a timestamp to every call
    #[arg(long, global = true)]
    add_timestamp: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the gateway and print its pid
    Serve {
        /// Gateway command line (default from config)
        #[arg(trailing_var_arg = true)]
        server_command: Vec<String>,
        /// Seconds to wait for the port to open
        #[arg(long, default_value = "10")]
        wait: u64,
    },
    /// Stop a gateway started with `serve`
    Stop {
        pid: u32,
    },
    /// Call a route directly
    Call {
        /// Route path, e.g. /song/detail
        path: String,
        /// Query arguments as key=value
        args: Vec<String>,
        /// Force a timestamp argument
        #[arg(long)]
        timestamp: bool,
    },
    /// Call a table endpoint by method name
    Endpoint {
        /// Method name, e.g. artist_album
        name: String,
        /// Query arguments as key=value
        args: Vec<String>,
    },
    /// List table endpoints
    Endpoints,
    /// Show song details
    Song {
        #[arg(required = true)]
        ids: Vec<u64>,
    },
    /// Show playlist details
    Playlist {
        id: u64,
    },
    /// Log in by scanning a QR code and print the account status.
    ///
    /// The session lives only as long as this command: it logs out again on
    /// exit.
    QrLogin {
        /// Give up after this many seconds
        #[arg(long, default_value = "120")]
        timeout: u64,
    },
    /// Show or write the config file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective config
    Show,
    /// Write the effective config to the config file
    Init,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let config = effective_config(&cli)?;

    match cli.command {
        Command::Serve {
            server_command,
            wait,
        } => cmd_serve(config, server_command, wait),
        Command::Stop { pid } => cmd_stop(pid),
        Command::Call {
            path,
            args,
            timestamp,
        } => {
            let client = ApiClient::from_config(&config)?;
            print_json(&client.call_api(&path, parse_args(&args)?, timestamp)?)
        }
        Command::Endpoint { name, args } => {
            let client = ApiClient::from_config(&config)?;
            print_json(&client.call_endpoint(&name, parse_args(&args)?)?)
        }
        Command::Endpoints => {
            cmd_endpoints();
            Ok(())
        }
        Command::Song { ids } => cmd_song(&config, ids),
        Command::Playlist { id } => cmd_playlist(&config, id),
        Command::QrLogin { timeout } => cmd_qr_login(&config, Duration::from_secs(timeout)),
        Command::Config { action } => cmd_config(&config, &action),
    }
}

fn effective_config(cli: &Cli) -> Result<ApiConfig> {
    let mut config = ApiConfig::load().context("failed to load config")?;
    if let Some(host) = &cli.host {
        config.host.clone_from(host);
    }
    if let Some(port) = cli.port {
        config.port = port;
    }
    if cli.no_raise {
        config.raise_for_status = false;
    }
    if cli.add_timestamp {
        config.add_timestamp = true;
    }
    log::debug!("gateway at {}", config.base_url());
    Ok(config)
}

/// `key=value` pairs. Values are sent exactly as typed, so `0123` keeps its
/// leading zero.
fn parse_args(raw: &[String]) -> Result<Args> {
    let mut args = Args::new();
    for pair in raw {
        let Some((k, v)) = pair.split_once('=') else {
            bail!("argument `{pair}` is not key=value");
        };
        args.insert(k, Scalar::Str(v.to_owned()));
    }
    Ok(args)
}

fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// ── serve / stop ──

fn cmd_serve(mut config: ApiConfig, server_command: Vec<String>, wait: u64) -> Result<()> {
    if !server_command.is_empty() {
        config.server_command = server_command;
    }
    let handle = ncmapi::start_server(&config.server_command, config.port, &config.host)
        .context("failed to start gateway")?;
    let pid = handle.pid();
    if wait > 0 {
        if let Err(e) = ncmapi::wait_until_ready(&config.host, config.port, Duration::from_secs(wait))
        {
            let _ = ncmapi::stop_server(handle);
            return Err(e.into());
        }
    }
    println!("Gateway running at {} (pid={pid})", config.base_url());
    Ok(())
}

fn cmd_stop(pid: u32) -> Result<()> {
    match ncmapi::stop_server(ServerHandle::from_pid(pid)) {
        Ok(()) => println!("Stopped gateway (pid={pid})."),
        Err(e) if e.is_no_such_process() => println!("Gateway pid={pid} is not running."),
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

// ── endpoints ──

fn cmd_endpoints() {
    for ep in ncmapi::endpoints::all_endpoints() {
        let ts = if ep.timestamp { " [timestamp]" } else { "" };
        if ep.required.is_empty() {
            println!("{:<36} {}{ts}", ep.name, ep.path);
        } else {
            println!("{:<36} {} ({}){ts}", ep.name, ep.path, ep.required.join(", "));
        }
    }
}

// ── song / playlist ──

fn cmd_song(config: &ApiConfig, ids: Vec<u64>) -> Result<()> {
    let client = ApiClient::from_config(config)?;
    let resp = client.song_detail(ids, Args::new())?;
    let songs = resp["songs"].as_array().context("response has no songs")?;
    for s in songs {
        let artists: Vec<&str> = s["ar"]
            .as_array()
            .map(|ar| ar.iter().filter_map(|a| a["name"].as_str()).collect())
            .unwrap_or_default();
        let dt = s["dt"].as_u64().unwrap_or(0);
        println!(
            "[{}] {} - {} ({}) {}:{:02}",
            s["id"],
            artists.join(", "),
            s["name"].as_str().unwrap_or(""),
            s["al"]["name"].as_str().unwrap_or(""),
            dt / 60000,
            (dt / 1000) % 60
        );
    }
    Ok(())
}

fn cmd_playlist(config: &ApiConfig, id: u64) -> Result<()> {
    let client = ApiClient::from_config(config)?;
    let resp = client.playlist_detail(id, None, Args::new())?;
    let p = &resp["playlist"];
    println!("Playlist: {} (id={})", p["name"].as_str().unwrap_or(""), p["id"]);
    println!("Tracks:   {}", p["trackCount"]);
    if let Some(desc) = p["description"].as_str() {
        println!("Desc:     {desc}");
    }
    if let Some(creator) = p["creator"]["nickname"].as_str() {
        println!("Creator:  {creator} (id={})", p["creator"]["userId"]);
    }
    if let Some(tracks) = p["tracks"].as_array() {
        println!();
        for t in tracks {
            println!("  [{}] {}", t["id"], t["name"].as_str().unwrap_or(""));
        }
    }
    Ok(())
}

// ── qr login ──

fn cmd_qr_login(config: &ApiConfig, timeout: Duration) -> Result<()> {
    let client = ApiClient::from_config(config)?;
    let key = client.login_qr_key(Args::new())?;
    let art = client.login_qr_create(&key, true, true, Args::new())?;
    println!("{art}");
    println!("Scan with the Netease Cloud Music app.");

    let start = Instant::now();
    let mut scanned = false;
    loop {
        let resp = client.login_qr_check(key.as_str(), Args::new())?;
        match resp["code"].as_i64() {
            Some(QR_AUTHORIZED) => {
                println!("Logged in.");
                break;
            }
            Some(QR_EXPIRED) => bail!("QR code expired"),
            Some(QR_SCANNED) if !scanned => {
                scanned = true;
                println!("Scanned, confirm on your phone.");
            }
            _ => {}
        }
        if start.elapsed() >= timeout {
            bail!("timed out waiting for QR confirmation");
        }
        thread::sleep(Duration::from_secs(2));
    }

    let status = client.login_status(Args::new())?;
    let profile = &status["data"]["profile"];
    match profile["nickname"].as_str() {
        Some(name) => println!("User: {name} (id={})", profile["userId"]),
        None => print_json(&status)?,
    }
    println!("Logging out.");
    Ok(())
}

// ── config ──

fn cmd_config(config: &ApiConfig, action: &ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            println!("# {}", ApiConfig::path()?.display());
            println!("{}", serde_json::to_string_pretty(config)?);
        }
        ConfigAction::Init => {
            let path = config.save()?;
            println!("Config written to {}", path.display());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn raw(pairs: &[&str]) -> Vec<String> {
        pairs.iter().map(|p| (*p).to_owned()).collect()
    }

    #[test]
    fn values_pass_through_verbatim() {
        let args = parse_args(&raw(&["captcha=0123", "keywords=+7", "limit=30"])).unwrap();
        assert_eq!(args.to_query_string(), "captcha=0123&keywords=%2B7&limit=30");
    }

    #[test]
    fn value_may_contain_equals() {
        let args = parse_args(&raw(&["q=a=b"])).unwrap();
        assert_eq!(args.get("q").map(ToString::to_string).as_deref(), Some("a=b"));
    }

    #[test]
    fn pair_without_equals_is_rejected() {
        assert!(parse_args(&raw(&["oops"])).is_err());
    }

    #[test]
    fn qr_login_help_says_session_ends_on_exit() {
        let cmd = Cli::command();
        let qr = cmd.find_subcommand("qr-login").unwrap();
        let help = qr.get_long_about().unwrap().to_string();
        assert!(help.contains("logs out again on"), "{help}");
    }
}
