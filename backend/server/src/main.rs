use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;

use snapjudge_config::Settings;
use snapjudge_gateway::start_server;

#[derive(Parser)]
#[command(name = "snapjudge")]
#[command(about = "Snapjudge — AI photo judgment service")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP gateway
    Serve {
        /// Port to bind, overriding SNAPJUDGE_BIND
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { port } => {
            let mut settings = Settings::from_env()?;
            if let Some(port) = port {
                settings.bind_addr.set_port(port);
            }

            snapjudge_logging::init_logging(&settings.log_level);
            info!(
                api_url = %settings.api_url,
                model = %settings.model,
                bind = %settings.bind_addr,
                "starting snapjudge"
            );

            start_server(&settings).await
        }
    }
}
