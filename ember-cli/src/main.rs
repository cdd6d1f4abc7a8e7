mod commands;
mod process;
mod scaffold;
mod templates;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "ember")]
#[command(about = "Scaffolding and development tools for Ember applications", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build and run the application's `serve` command
    Serve {
        /// Port to listen on (default: SERVER_PORT from .env, else 8080)
        #[arg(long, short = 'p')]
        port: Option<u16>,
    },
    /// Rebuild and restart the server when src/ or config/ changes
    Watch {
        /// Port to listen on (default: SERVER_PORT from .env, else 8080)
        #[arg(long, short = 'p')]
        port: Option<u16>,
    },
    /// Generate a new controller
    #[command(name = "make:controller")]
    MakeController {
        /// Name of the controller (e.g., Photo, user_profile)
        name: String,

        /// Generate a ResourceController with all seven actions
        #[arg(long)]
        resource: bool,
    },
    /// Generate a new middleware
    #[command(name = "make:middleware")]
    MakeMiddleware {
        /// Name of the middleware (e.g., Auth, RateLimit)
        name: String,
    },
    /// Generate a new service provider
    #[command(name = "make:provider")]
    MakeProvider {
        /// Name of the provider (e.g., Mail, Billing)
        name: String,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { port } => {
            commands::serve::run(port);
        }
        Commands::Watch { port } => {
            commands::watch::run(port);
        }
        Commands::MakeController { name, resource } => {
            commands::make_controller::run(name, resource);
        }
        Commands::MakeMiddleware { name } => {
            commands::make_middleware::run(name);
        }
        Commands::MakeProvider { name } => {
            commands::make_provider::run(name);
        }
    }
}
