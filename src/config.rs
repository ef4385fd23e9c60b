//! Service Configuration
//!
//! Settings come from the environment first and are then overridden by command-line flags.
//!
//! | Flag                | Environment        | Default                          |
//! |---------------------|--------------------|----------------------------------|
//! | `--bind`            | `PORT` (port only) | `0.0.0.0:3001`                   |
//! | `--proxy-db`        | `PROXY_DB_PATH`    | `data/IP2PROXY-LITE-PX12.CSV`    |
//! | `--location-db`     | `LOCATION_DB_PATH` | `data/IP2LOCATION-LITE-DB11.CSV` |
//! | `--allowed-origins` | `ALLOWED_ORIGINS`  | any origin                       |
//! | `--rate-limit`      | `RATE_LIMIT_MAX`   | `100` requests per minute        |

use anyhow::{Context, Result, bail};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BIND: &str = "0.0.0.0:3001";
pub const DEFAULT_PROXY_DB: &str = "data/IP2PROXY-LITE-PX12.CSV";
pub const DEFAULT_LOCATION_DB: &str = "data/IP2LOCATION-LITE-DB11.CSV";
pub const DEFAULT_RATE_LIMIT_MAX: u32 = 100;
pub const DEFAULT_RATE_LIMIT_WINDOW: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub bind: SocketAddr,
    pub proxy_db: PathBuf,
    pub location_db: PathBuf,
    /// `None` allows any origin.
    pub allowed_origins: Option<Vec<String>>,
    pub rate_limit_max: u32,
    pub rate_limit_window: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 3001)),
            proxy_db: PathBuf::from(DEFAULT_PROXY_DB),
            location_db: PathBuf::from(DEFAULT_LOCATION_DB),
            allowed_origins: None,
            rate_limit_max: DEFAULT_RATE_LIMIT_MAX,
            rate_limit_window: DEFAULT_RATE_LIMIT_WINDOW,
        }
    }
}

impl Config {
    /// Reads the process environment and arguments.
    pub fn from_env_and_args() -> Result<Self> {
        Self::from_sources(std::env::vars(), std::env::args().skip(1))
    }

    pub fn from_sources<E, A>(env: E, args: A) -> Result<Self>
    where
        E: IntoIterator<Item = (String, String)>,
        A: IntoIterator<Item = String>,
    {
        let env: HashMap<String, String> = env.into_iter().collect();
        let mut config = Config::default();

        if let Some(port) = env.get("PORT") {
            let port: u16 = port
                .parse()
                .with_context(|| format!("PORT is not a valid port: {:?}", port))?;
            config.bind.set_port(port);
        }
        if let Some(path) = env.get("PROXY_DB_PATH") {
            config.proxy_db = PathBuf::from(path);
        }
        if let Some(path) = env.get("LOCATION_DB_PATH") {
            config.location_db = PathBuf::from(path);
        }
        if let Some(origins) = env.get("ALLOWED_ORIGINS") {
            config.allowed_origins = parse_origins(origins);
        }
        if let Some(max) = env.get("RATE_LIMIT_MAX") {
            config.rate_limit_max = max
                .parse()
                .with_context(|| format!("RATE_LIMIT_MAX is not a number: {:?}", max))?;
        }

        let args: Vec<String> = args.into_iter().collect();
        let mut i = 0;
        while i < args.len() {
            match args[i].as_str() {
                "--bind" => {
                    config.bind = flag_value(&args, i)?
                        .parse()
                        .context("--bind expects <addr:port>")?;
                    i += 2;
                }
                "--proxy-db" => {
                    config.proxy_db = PathBuf::from(flag_value(&args, i)?);
                    i += 2;
                }
                "--location-db" => {
                    config.location_db = PathBuf::from(flag_value(&args, i)?);
                    i += 2;
                }
                "--allowed-origins" => {
                    config.allowed_origins = parse_origins(flag_value(&args, i)?);
                    i += 2;
                }
                "--rate-limit" => {
                    config.rate_limit_max = flag_value(&args, i)?
                        .parse()
                        .context("--rate-limit expects a request count")?;
                    i += 2;
                }
                _ => {
                    i += 1;
                }
            }
        }

        if config.rate_limit_max == 0 {
            bail!("rate limit must allow at least one request per window");
        }

        Ok(config)
    }
}

fn flag_value(args: &[String], i: usize) -> Result<&str> {
    match args.get(i + 1) {
        Some(value) => Ok(value.as_str()),
        None => bail!("{} requires a value", args[i]),
    }
}

/// Comma-separated origin list; an empty list means no restriction.
fn parse_origins(raw: &str) -> Option<Vec<String>> {
    let origins: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect();

    if origins.is_empty() { None } else { Some(origins) }
}
