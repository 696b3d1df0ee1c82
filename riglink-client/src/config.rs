//! Load config from file and environment.

use serde::Deserialize;
use std::path::PathBuf;

/// Client configuration. File: ~/.config/riglink/config.toml or
/// /etc/riglink/config.toml. Env overrides: RIGLINK_PORT,
/// RIGLINK_PROBE_TIMEOUT_MS, RIGLINK_TICK_INTERVAL_MS.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Feed service TCP port (default 8765). The host is discovered.
    #[serde(default = "default_service_port")]
    pub service_port: u16,
    /// Per-attempt probe timeout in milliseconds (default 1000).
    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,
    /// Scheduler loop tick interval in milliseconds (default 100).
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    /// Dispatch queue depth before frames are dropped (default 64).
    #[serde(default = "default_dispatch_queue")]
    pub dispatch_queue: usize,
    /// Dispatch worker count (default 2).
    #[serde(default = "default_dispatch_workers")]
    pub dispatch_workers: usize,
}

fn default_service_port() -> u16 {
    8765
}
fn default_probe_timeout_ms() -> u64 {
    1000
}
fn default_tick_interval_ms() -> u64 {
    100
}
fn default_dispatch_queue() -> usize {
    64
}
fn default_dispatch_workers() -> usize {
    2
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_port: default_service_port(),
            probe_timeout_ms: default_probe_timeout_ms(),
            tick_interval_ms: default_tick_interval_ms(),
            dispatch_queue: default_dispatch_queue(),
            dispatch_workers: default_dispatch_workers(),
        }
    }
}

/// Load config: merge default, then config file (if present), then env vars.
pub fn load() -> Config {
    let mut c = load_file().unwrap_or_else(Config::default);
    if let Ok(s) = std::env::var("RIGLINK_PORT") {
        if let Ok(p) = s.parse::<u16>() {
            c.service_port = p;
        }
    }
    if let Ok(s) = std::env::var("RIGLINK_PROBE_TIMEOUT_MS") {
        if let Ok(ms) = s.parse::<u64>() {
            c.probe_timeout_ms = ms;
        }
    }
    if let Ok(s) = std::env::var("RIGLINK_TICK_INTERVAL_MS") {
        if let Ok(ms) = s.parse::<u64>() {
            c.tick_interval_ms = ms;
        }
    }
    c
}

fn config_paths() -> Vec<PathBuf> {
    let home = std::env::var_os("HOME").map(PathBuf::from);
    let mut out = Vec::new();
    if let Some(h) = home {
        out.push(h.join(".config/riglink/config.toml"));
    }
    out.push(PathBuf::from("/etc/riglink/config.toml"));
    out
}

fn load_file() -> Option<Config> {
    for p in config_paths() {
        if p.exists() {
            if let Ok(s) = std::fs::read_to_string(&p) {
                if let Ok(c) = toml::from_str::<Config>(&s) {
                    return Some(c);
                }
            }
            break;
        }
    }
    None
}
