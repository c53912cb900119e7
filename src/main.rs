use clap::Parser;
use std::io;
use std::path::Path;
use std::sync::{Arc, atomic::{AtomicBool, Ordering}};

use rust_passgen::api;
use rust_passgen::cli::{self, Args, CliCommand};
use rust_passgen::core::config::Config;
use rust_passgen::core::keyring::Keyring;
use rust_passgen::db;

fn to_io_error<E: std::fmt::Display>(context: &str, e: E) -> io::Error {
    let message = format!("{}: {}", context, e);
    log::error!("{}", message);
    io::Error::new(io::ErrorKind::Other, message)
}

fn init_logging(config: &Config) -> io::Result<()> {
    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(config.log_level)
        .format_timestamp_secs()
        .format_module_path(true)
        .format_target(false)
        // RUST_LOG still wins for fine-grained filters
        .parse_env("RUST_LOG");

    if let Some(log_file) = &config.log_file {
        if let Some(parent) = log_file.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        builder.target(env_logger::Target::Pipe(Box::new(std::fs::File::create(log_file)?)));
    }

    builder.init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), io::Error> {
    // Load environment variables
    if Path::new(".env").exists() {
        dotenvy::dotenv().ok();
    }

    let args = Args::parse();
    let mut config = Config::load();

    init_logging(&config)?;
    log::debug!("Command line args: {:?}", args);
    log::debug!("Loaded config: {:?}", config);

    if let Some(db_url) = &args.db {
        config.database_url = db_url.clone();
        config.database_type = rust_passgen::core::config::DatabaseType::Auto;
    }
    if let Some(port) = args.api_port {
        config.web_port = port;
    }

    let db_url = config.get_database_url();
    log::info!("Connecting to database: {}", db_url);

    let db = match db::init_db(&db_url).await {
        Ok(db) => {
            log::info!("Database connection established ({})", db.get_backend_type());
            db
        }
        Err(e) => {
            eprintln!("❌ Database connection failed: {e}");
            eprintln!("Troubleshooting:");
            eprintln!("• Is your DB server running?");
            eprintln!("• Are credentials correct?");
            eprintln!("• For Postgres: create the DB if needed: `createdb passgen -U postgres`");
            eprintln!("• Use --db or set DATABASE_URL in `.env`");
            return Err(to_io_error("Database connection failed", e));
        }
    };

    let keyring = Keyring::from_config(Arc::new(db), &config)
        .map_err(|e| to_io_error("Failed to initialise sessions", e))?;
    let keyring = Arc::new(keyring);

    let should_exit = Arc::new(AtomicBool::new(false));
    {
        let should_exit = Arc::clone(&should_exit);
        ctrlc::set_handler(move || {
            log::info!("🔴 Ctrl+C received. Shutting down...");
            should_exit.store(true, Ordering::SeqCst);
            println!("\n👋 Goodbye!");
            std::process::exit(0);
        })
        .map_err(|e| to_io_error("Failed to set Ctrl+C handler", e))?;
    }

    // API-only mode (blocks until the server stops)
    if args.api_only || matches!(args.command, Some(CliCommand::Serve)) {
        log::info!("🔒 API-only mode active on {}:{}", config.web_address, config.web_port);
        return api::start_server(keyring, &config.web_address, config.web_port)
            .await
            .map_err(|e| to_io_error("API server failed", e));
    }

    if let Some(command) = args.command {
        return cli::handlers::run_command(&keyring, command, args.json)
            .await
            .map_err(|e| {
                eprintln!("❌ {}", e);
                to_io_error("Command failed", e)
            });
    }

    cli::menu::run_cli_menu(keyring, should_exit)
        .await
        .map_err(|e| to_io_error("CLI menu error", e))?;

    log::info!("✅ Shutdown complete.");
    Ok(())
}
