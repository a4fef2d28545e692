use anyhow::{Context, bail};
use clap::Parser;
use core::time::Duration;
use pwhash::HashServiceConfig;
use std::net::SocketAddr;

/// Runtime configuration for the `pwhash-server` binary.
///
/// All values are parsed from CLI arguments or environment variables (a
/// `.env` file is loaded first).
#[derive(Parser, Debug, Clone)]
#[command(
    name = "pwhash-server",
    version,
    about = "An HTTP service that issues ids for secrets and digests them in the background"
)]
pub struct CliArgs {
    /// Address to listen on.
    ///
    /// Environment variable: `SERVER_ADDR`
    #[arg(long, env = "SERVER_ADDR", default_value_t = String::from("0.0.0.0:8080"))]
    pub server_addr: String,

    /// Delay, in milliseconds, before each submitted secret is digested.
    ///
    /// Environment variable: `HASH_DELAY_MS`
    #[arg(long, env = "HASH_DELAY_MS", default_value_t = 5000)]
    pub hash_delay_ms: u64,

    /// Upper bound, in seconds, on how long shutdown waits for in-flight
    /// digests. Unset means wait for as long as it takes.
    ///
    /// Environment variable: `DRAIN_TIMEOUT_SECS`
    #[arg(long, env = "DRAIN_TIMEOUT_SECS")]
    pub drain_timeout_secs: Option<u64>,

    /// Refuse new submissions with `503` once shutdown has been requested.
    ///
    /// Environment variable: `REJECT_DURING_DRAIN`
    #[arg(long, env = "REJECT_DURING_DRAIN", default_value_t = false)]
    pub reject_during_drain: bool,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub server_addr: SocketAddr,
    pub hash_delay: Duration,
    pub drain_timeout: Option<Duration>,
    pub reject_during_drain: bool,
}

impl ServerConfig {
    pub fn service_config(&self) -> HashServiceConfig {
        HashServiceConfig {
            hash_delay: self.hash_delay,
            reject_during_drain: self.reject_during_drain,
            drain_timeout: self.drain_timeout,
        }
    }
}

impl TryFrom<CliArgs> for ServerConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        let server_addr = args
            .server_addr
            .parse::<SocketAddr>()
            .with_context(|| format!("SERVER_ADDR ({}) is not a socket address", args.server_addr))?;

        if args.drain_timeout_secs == Some(0) {
            bail!("DRAIN_TIMEOUT_SECS must be greater than 0 when set");
        }

        Ok(Self {
            server_addr,
            hash_delay: Duration::from_millis(args.hash_delay_ms),
            drain_timeout: args.drain_timeout_secs.map(Duration::from_secs),
            reject_during_drain: args.reject_during_drain,
        })
    }
}
