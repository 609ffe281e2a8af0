//! ChiParts CLI
//!
//! Runs the order intake server and a couple of operational commands.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

use chiparts::api::HttpServer;
use chiparts::audit::AuditLog;
use chiparts::config::{Config, LoggingConfig, Overrides};
use chiparts::intake::OrderIntake;
use chiparts::notify::TelegramNotifier;

/// ChiParts - spare-part orders relayed to Telegram
#[derive(Parser)]
#[command(name = "chiparts")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, env = "CHIPARTS_CONFIG")]
    config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// HTTP port
    #[arg(long, global = true, env = "PORT")]
    port: Option<u16>,

    /// Telegram bot token
    #[arg(long, global = true, env = "BOT_TOKEN", hide_env_values = true)]
    bot_token: Option<String>,

    /// Comma-separated destination chat ids
    #[arg(long, global = true, env = "ADMIN_CHAT_IDS")]
    chat_ids: Option<String>,

    /// Externally visible base URL
    #[arg(long, global = true, env = "RENDER_EXTERNAL_URL")]
    public_url: Option<String>,

    /// Order log file
    #[arg(long, global = true, env = "ORDERS_LOG")]
    orders_log: Option<PathBuf>,

    /// Front-end bundle directory
    #[arg(long, global = true, env = "STATIC_DIR")]
    static_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the order intake server (default)
    Serve,

    /// Print the number of logged orders
    Stats,

    /// Send a test message to every destination
    Ping,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            port: self.port,
            public_url: self.public_url.clone(),
            static_dir: self.static_dir.clone(),
            bot_token: self.bot_token.clone(),
            chat_ids: self.chat_ids.clone(),
            audit_path: self.orders_log.clone(),
            log_level: self.verbose.then(|| "debug".to_string()),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // .env must be loaded before clap reads the environment
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    init_logging(&config.logging);

    let result = match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => run_serve(config).await,
        Commands::Stats => run_stats(config).await,
        Commands::Ping => run_ping(config).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = Config::load(cli.config.as_deref())?;
    config.apply(cli.overrides());
    config.validate()?;
    Ok(config)
}

fn init_logging(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&logging.level));

    if logging.format == "json" {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

fn build_intake(config: &Config) -> anyhow::Result<OrderIntake> {
    let notifier = Arc::new(TelegramNotifier::new(&config.telegram)?);
    let audit = Arc::new(AuditLog::new(&config.audit.path));
    Ok(OrderIntake::new(notifier, audit))
}

async fn run_serve(config: Config) -> anyhow::Result<()> {
    let intake = build_intake(&config)?;

    let metrics = match metrics_exporter_prometheus::PrometheusBuilder::new().install_recorder() {
        Ok(handle) => Some(handle),
        Err(e) => {
            warn!(error = %e, "Metrics recorder not installed");
            None
        }
    };

    let listener = TcpListener::bind(config.bind_addr()).await?;
    let port = listener.local_addr()?.port();

    info!("ChiParts server started");
    info!("  Site:      http://localhost:{port}");
    info!("  API:       http://localhost:{port}/api/order");
    info!("  Stats:     http://localhost:{port}/api/stats");
    info!("  Bot token: {}", config.telegram.masked_token());
    info!("  Chats:     {}", config.telegram.chat_ids.join(", "));
    info!("  Order log: {}", config.audit.path.display());

    let announcer = intake.clone();
    let public_url = config.server.public_url.clone();
    tokio::spawn(async move {
        announcer.announce_startup(port, &public_url).await;
    });

    let server = HttpServer::new(intake, metrics, &config.server.static_dir);
    server.serve(listener).await?;
    Ok(())
}

async fn run_stats(config: Config) -> anyhow::Result<()> {
    let audit = AuditLog::new(&config.audit.path);
    let total = audit.count_marker().await?;
    println!("{}: {total} orders", audit.path().display());
    Ok(())
}

async fn run_ping(config: Config) -> anyhow::Result<()> {
    let intake = build_intake(&config)?;
    let results = intake
        .announce_startup(config.server.port, &config.server.public_url)
        .await;

    for result in &results {
        match &result.error {
            None => println!("✅ {}", result.chat_id),
            Some(error) => println!("❌ {}: {error}", result.chat_id),
        }
    }

    if results.iter().any(|r| r.success) {
        Ok(())
    } else {
        anyhow::bail!("no destination accepted the test message")
    }
}
