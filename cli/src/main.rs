//! Bootcamp Directory API command line
//!
//! ```sh
//! # Run with default config (~/.config/bootcamp-service/config.toml)
//! bootcamp serve
//!
//! # Custom config path and port
//! bootcamp --config /etc/bootcamp/config.toml serve --port 8080
//!
//! # Validate config without starting
//! bootcamp check
//!
//! # Load or wipe the sample data
//! bootcamp seed import ./data
//! bootcamp seed delete
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::{error, info};

use bootcamp_api::config::AppConfig;
use bootcamp_api::infrastructure::build_geocoder;
use bootcamp_api::seeder::{SeedData, Seeder};
use bootcamp_api::server::{init_tracing, open_database, ServerHandle, ServerOptions};
use bootcamp_api::StoreRepositoryProvider;

/// Bootcamp Directory API: bootcamps, courses and their publishers.
#[derive(Parser, Debug)]
#[command(
    name = "bootcamp",
    version,
    about = "REST API for bootcamps and courses",
    long_about = "Bootcamp Directory API server and maintenance commands.\n\n\
                  Default config: ~/.config/bootcamp-service/config.toml"
)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, global = true, env = "BOOTCAMP_CONFIG")]
    config: Option<PathBuf>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP server.
    Serve {
        /// Override the listen port.
        #[arg(long)]
        port: Option<u16>,

        /// Skip database migrations on startup.
        #[arg(long)]
        no_migrate: bool,

        /// Skip creating the default admin user.
        #[arg(long)]
        no_admin: bool,
    },
    /// Validate the configuration file and exit.
    Check,
    /// Import or wipe seed data.
    Seed {
        #[command(subcommand)]
        action: SeedAction,
    },
}

#[derive(Subcommand, Debug)]
enum SeedAction {
    /// Import users.json, bootcamps.json and courses.json from a directory.
    Import {
        #[arg(default_value = "./data")]
        dir: PathBuf,
    },
    /// Delete every bootcamp, course and user.
    Delete,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .unwrap_or_else(bootcamp_api::default_config_path);

    let (mut config, load_error) = match AppConfig::load(&config_path) {
        Ok(cfg) => (cfg, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };
    if let Some(ref level) = cli.log_level {
        config.logging.level = level.clone();
    }
    init_tracing(&config);
    match load_error {
        None => info!("Configuration loaded from {}", config_path.display()),
        Some(e) => {
            error!("Failed to load config from {}: {}", config_path.display(), e);
            error!("Using default configuration.");
        }
    }

    match cli.command {
        Command::Check => {
            println!("✅ Configuration is valid");
            println!("   Config file : {}", config_path.display());
            println!("   API address : {}", config.server.address());
            println!("   Environment : {}", config.server.environment);
            println!("   Database    : {}", config.database.url);
            println!("   Uploads     : {}", config.uploads.dir.display());
            println!("   Geocoder    : {:?}", config.geocoder.provider);
            println!("   Log level   : {}", config.logging.level);
        }
        Command::Serve {
            port,
            no_migrate,
            no_admin,
        } => {
            if let Some(port) = port {
                info!("CLI override: port = {}", port);
                config.server.port = port;
            }
            let handle = ServerHandle::start(ServerOptions {
                config,
                auto_migrate: !no_migrate,
                create_default_admin: !no_admin,
            })
            .await?;
            handle.install_signal_handler();
            info!("🚀 Press Ctrl+C to shutdown gracefully.");
            handle.wait().await;
        }
        Command::Seed { action } => {
            let db = open_database(&config, true).await?;
            let repos = Arc::new(StoreRepositoryProvider::sqlite(db.clone()));
            let seeder = Seeder::new(repos, build_geocoder(&config.geocoder));
            let report = match action {
                SeedAction::Import { dir } => seeder.import(SeedData::load(&dir)?).await?,
                SeedAction::Delete => seeder.delete().await?,
            };
            println!(
                "users: {}, bootcamps: {}, courses: {}",
                report.users, report.bootcamps, report.courses
            );
            db.close().await?;
        }
    }

    Ok(())
}
