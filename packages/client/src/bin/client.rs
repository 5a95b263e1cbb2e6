//! Terminal chat client for Murmur.
//!
//! Connects to the message server as `--id`, announces itself with a
//! handshake, and sends each typed line as a direct message to `--to`.
//! Messages typed before the connection opens are queued and flushed once it
//! does.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin murmur-client -- --id alice --to bob
//! cargo run --bin murmur-client -- --id bob --to alice --api-base http://127.0.0.1:8080
//! ```

use std::time::Duration;

use clap::{Parser, ValueEnum};

use murmur_client::{
    config::{ChannelConfig, DEFAULT_ENDPOINT, endpoint_from_api_base},
    domain::{OverflowPolicy, ReconnectPolicy},
    ui::run_chat,
};
use murmur_shared::logger::setup_logger;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Overflow {
    DropOldest,
    Reject,
}

impl From<Overflow> for OverflowPolicy {
    fn from(value: Overflow) -> Self {
        match value {
            Overflow::DropOldest => OverflowPolicy::DropOldest,
            Overflow::Reject => OverflowPolicy::Reject,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "murmur-client")]
#[command(about = "Realtime direct-message client", long_about = None)]
struct Args {
    /// Your participant ID
    #[arg(short = 'i', long)]
    id: String,

    /// Participant to send messages to
    #[arg(short = 't', long)]
    to: String,

    /// WebSocket endpoint of the message server
    #[arg(short = 'u', long, default_value = DEFAULT_ENDPOINT, conflicts_with = "api_base")]
    url: String,

    /// HTTP API base URL; the socket endpoint is derived from it
    #[arg(long)]
    api_base: Option<String>,

    /// Maximum number of messages held while disconnected
    #[arg(long, default_value_t = 256)]
    queue_capacity: usize,

    /// What to do when the queue is full
    #[arg(long, value_enum, default_value_t = Overflow::DropOldest)]
    overflow: Overflow,

    /// Reconnection attempts after the connection drops (0 = never)
    #[arg(long, default_value_t = 0)]
    reconnect_attempts: u32,

    /// Seconds between reconnection attempts
    #[arg(long, default_value_t = 5)]
    reconnect_interval_secs: u64,

    /// Give up on a connection attempt after this many seconds
    #[arg(long)]
    connect_timeout_secs: Option<u64>,
}

impl Args {
    fn channel_config(&self) -> Result<ChannelConfig, murmur_client::error::ChannelError> {
        let endpoint = match &self.api_base {
            Some(base) => endpoint_from_api_base(base)?,
            None => self.url.clone(),
        };

        let reconnect = if self.reconnect_attempts == 0 {
            ReconnectPolicy::Never
        } else {
            ReconnectPolicy::Fixed {
                max_attempts: self.reconnect_attempts,
                interval: Duration::from_secs(self.reconnect_interval_secs),
            }
        };

        Ok(ChannelConfig {
            queue_capacity: self.queue_capacity,
            overflow: self.overflow.into(),
            reconnect,
            connect_timeout: self.connect_timeout_secs.map(Duration::from_secs),
            ..ChannelConfig::with_endpoint(endpoint)
        })
    }
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();

    let config = match args.channel_config() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run_chat(config, args.id, args.to).await {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}
