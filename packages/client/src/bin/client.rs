//! HireWire notification client.
//!
//! Connects to the gateway with a bearer token and prints a toast for every
//! event it receives. Reconnects on connection loss (max 5 attempts with a
//! 5 second interval by default). A rejected token is never retried.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin hirewire-client -- --role user --id u1 --token <token>
//! HIREWIRE_TOKEN=<token> cargo run --bin hirewire-client -- --role admin --id a1
//! ```

use std::time::Duration;

use clap::Parser;

use hirewire_client::{
    domain::{ReconnectPolicy, Role, SessionCredential},
    runner::{ClientConfig, run_client},
};
use hirewire_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "hirewire-client")]
#[command(about = "Notification client for the HireWire gateway", long_about = None)]
struct Args {
    /// Gateway WebSocket URL
    #[arg(short = 'u', long, default_value = "ws://127.0.0.1:8080/ws")]
    url: String,

    /// Bearer token issued by the REST layer
    #[arg(short = 't', long, env = "HIREWIRE_TOKEN", hide_env_values = true)]
    token: String,

    /// Role the token was issued for (user or admin)
    #[arg(short = 'r', long)]
    role: Role,

    /// Id the token was issued for
    #[arg(short = 'i', long)]
    id: String,

    /// REST API origin used to refetch state on (re)connect
    #[arg(long)]
    api_url: Option<String>,

    /// Reconnect attempts after a lost connection
    #[arg(long, default_value = "5")]
    max_reconnect_attempts: u32,

    /// Seconds between reconnect attempts
    #[arg(long, default_value = "5")]
    reconnect_interval_secs: u64,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();

    let config = ClientConfig {
        url: args.url,
        credential: SessionCredential::new(args.role, args.id, args.token),
        policy: ReconnectPolicy::new(
            args.max_reconnect_attempts,
            Duration::from_secs(args.reconnect_interval_secs),
        ),
        api_url: args.api_url,
    };

    if let Err(e) = run_client(config).await {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}
