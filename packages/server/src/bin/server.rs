//! HireWire notification gateway.
//!
//! Authenticated WebSocket connections are joined to their identity's private
//! group and to `all-users` or `admin-room`. Events pushed through the emitter
//! (or `POST /api/notify`) fan out to those groups.
//!
//! Run with:
//! ```not_rust
//! HIREWIRE_JWT_SECRET=dev cargo run --bin hirewire-server -- serve
//! HIREWIRE_JWT_SECRET=dev cargo run --bin hirewire-server -- serve --host 0.0.0.0 --port 3000
//! HIREWIRE_JWT_SECRET=dev cargo run --bin hirewire-server -- issue-token --admin a1 --default
//! ```

use clap::{ArgGroup, Args, Parser, Subcommand};

use hirewire_server::{config::ServerConfig, infrastructure::auth::TokenIssuer, ui::Server};
use hirewire_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "hirewire-server")]
#[command(about = "Realtime notification gateway for HireWire", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the gateway
    Serve(ServeArgs),
    /// Print a signed token for local testing
    IssueToken(IssueTokenArgs),
}

#[derive(Args, Debug)]
struct ServeArgs {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8080")]
    port: u16,

    /// HS256 secret shared with the REST layer
    #[arg(long, env = "HIREWIRE_JWT_SECRET", hide_env_values = true)]
    jwt_secret: String,

    /// Seconds between server pings
    #[arg(long, default_value = "25")]
    heartbeat_secs: u64,

    /// Seconds of silence after which a connection is dropped
    #[arg(long, default_value = "60")]
    idle_timeout_secs: u64,
}

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("identity").required(true).args(["user", "admin"])))]
struct IssueTokenArgs {
    /// Issue a user token for this id
    #[arg(long)]
    user: Option<String>,

    /// Issue an admin token for this id
    #[arg(long)]
    admin: Option<String>,

    /// Mark the admin as the default (privileged) admin
    #[arg(long, requires = "admin")]
    default: bool,

    /// Token lifetime in seconds
    #[arg(long, default_value = "3600")]
    ttl_secs: i64,

    /// HS256 secret shared with the REST layer
    #[arg(long, env = "HIREWIRE_JWT_SECRET", hide_env_values = true)]
    jwt_secret: String,
}

async fn serve(args: ServeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = ServerConfig::new(
        args.host,
        args.port,
        args.jwt_secret,
        args.heartbeat_secs,
        args.idle_timeout_secs,
    )?;
    tracing::debug!(?config, "Configuration loaded");

    let server = Server::from_config(&config);
    server.run(config.host(), config.port()).await
}

fn issue_token(args: IssueTokenArgs) -> Result<String, Box<dyn std::error::Error>> {
    let issuer = TokenIssuer::new(&args.jwt_secret, args.ttl_secs);
    let token = match (args.user, args.admin) {
        (Some(user), _) => issuer.issue_user(&user)?,
        (None, Some(admin)) => issuer.issue_admin(&admin, args.default)?,
        (None, None) => return Err("either --user or --admin is required".into()),
    };
    Ok(token)
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "debug");

    let cli = Cli::parse();

    match cli.command {
        Command::Serve(args) => {
            if let Err(e) = serve(args).await {
                tracing::error!("Server error: {}", e);
                std::process::exit(1);
            }
        }
        Command::IssueToken(args) => match issue_token(args) {
            Ok(token) => println!("{token}"),
            Err(e) => {
                tracing::error!("Failed to issue token: {}", e);
                std::process::exit(1);
            }
        },
    }
}
