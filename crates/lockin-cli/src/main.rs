use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "lockin-cli", version, about = "Lock In CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Focus sessions
    Focus {
        #[command(subcommand)]
        action: commands::focus::FocusAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Logged-in user session
    Session {
        #[command(subcommand)]
        action: commands::session::SessionAction,
    },
    /// Run a named remote query
    Query(commands::query::QueryArgs),
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Focus { action } => commands::focus::run(action).await,
        Commands::Config { action } => commands::config::run(action),
        Commands::Session { action } => commands::session::run(action).await,
        Commands::Query(args) => commands::query::run(args).await,
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
