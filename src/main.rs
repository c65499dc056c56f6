use anyhow::Result;
use clap::{Parser, Subcommand};
use std::net::SocketAddr;

use reservd::db::Database;
use reservd::seed;

#[derive(Parser)]
#[command(name = "reservd")]
#[command(about = "Community Space Reservation Service", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the API server
    Serve {
        /// Port to listen on
        #[arg(long, default_value = "8080")]
        port: u16,
        /// Database file path
        #[arg(long, default_value = "./reservd.db")]
        db: String,
    },
    /// Load demo spaces and bootstrap an admin account
    Seed {
        /// Database file path
        #[arg(long, default_value = "./reservd.db")]
        db: String,
        /// Admin email
        #[arg(long, default_value = "admin@example.com")]
        admin_email: String,
        /// Admin password
        #[arg(long, default_value = "admin")]
        admin_password: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("reservd=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { port, db } => {
            let addr: SocketAddr = format!("0.0.0.0:{}", port).parse()?;
            reservd::server::run_server(addr, &db).await?;
        }
        Commands::Seed {
            db,
            admin_email,
            admin_password,
        } => {
            let database = Database::open(&db)?;
            let report = seed::seed(&database, &admin_email, &admin_password)?;
            println!("Seeded {} spaces", report.spaces);
            println!("Admin account: {}", report.admin_email);
            println!("Admin API key (shown once): {}", report.admin_api_key);
        }
    }

    Ok(())
}
