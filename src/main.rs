use std::sync::Arc;

use tracing::{error, info};

use s3nav::{
    AppState, BucketRegistry, Config, FolderSizeJobService, StorageService, UserService,
    WebServer,
};

const DEFAULT_CONFIG_PATH: &str = "config.toml";

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  s3nav [config.toml]            Run the server");
    eprintln!("  s3nav hash-password <password> Print an Argon2 hash for [[ldap.embedded.users]]");
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

async fn serve(config: Config) -> s3nav::Result<()> {
    let registry = Arc::new(BucketRegistry::from_config(&config.s3)?);
    let storage = Arc::new(StorageService::new(Arc::clone(&registry)));
    let jobs = Arc::new(FolderSizeJobService::new(
        registry,
        config.folder_size.clone(),
    ));
    let cleanup = jobs.start_cleanup_task();
    let users = Arc::new(UserService::from_config(&config.ldap));

    let state = AppState::new(storage, Arc::clone(&jobs), users, &config.web);
    let server = WebServer::new(&config.web, state)?;
    let result = server.run(shutdown_signal()).await;

    cleanup.abort();
    jobs.shutdown().await;
    result
}

#[tokio::main]
async fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();

    match args.first().map(String::as_str) {
        Some("hash-password") => {
            let Some(password) = args.get(1) else {
                print_usage();
                std::process::exit(2);
            };
            match s3nav::hash_password(password) {
                Ok(hash) => println!("{hash}"),
                Err(e) => {
                    eprintln!("Failed to hash password: {e}");
                    std::process::exit(1);
                }
            }
            return;
        }
        Some("-h") | Some("--help") => {
            print_usage();
            return;
        }
        _ => {}
    }

    let config_path = args
        .first()
        .map(String::as_str)
        .unwrap_or(DEFAULT_CONFIG_PATH);

    let config = match Config::load_with_env(config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load {config_path}: {e}");
            std::process::exit(1);
        }
    };
    if let Err(e) = config.validate() {
        eprintln!("Invalid configuration: {e}");
        std::process::exit(1);
    }

    if let Err(e) = s3nav::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        // Fall back to console-only logging
        s3nav::logging::init_console_only(&config.logging.level);
    }

    info!("s3nav starting");
    info!(
        buckets = config.s3.buckets.len(),
        "Web server configured on {}:{}", config.web.host, config.web.port
    );

    if let Err(e) = serve(config).await {
        error!("Server error: {}", e);
        std::process::exit(1);
    }
    info!("s3nav stopped");
}
