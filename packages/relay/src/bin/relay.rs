//! Development message relay for the Murmur realtime channel.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin murmur-relay
//! cargo run --bin murmur-relay -- --host 0.0.0.0 --port 3000
//! ```

use clap::Parser;
use murmur_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "murmur-relay")]
#[command(about = "Development message relay for Murmur", long_about = None)]
struct Args {
    /// Host address to bind the relay to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the relay to
    #[arg(short = 'p', long, default_value = "8080")]
    port: u16,
}

#[tokio::main]
async fn main() {
    setup_logger(env!("CARGO_BIN_NAME"), "debug");

    let args = Args::parse();

    if let Err(e) = murmur_relay::run(&args.host, args.port).await {
        tracing::error!("Relay error: {}", e);
        std::process::exit(1);
    }
}
