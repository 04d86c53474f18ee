//! Lost & Found CLI
//!
//! Serve the notification function, send notifications through it, and
//! inspect trust badges.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use lostfound_core::{
    points_to_next_tier, BadgeSize, Metadata, NotificationEvent, NotificationKind, TrustBadge,
};
use lostfound_function::{run_with_config, MemoryStore, ServerConfig};
use lostfound_notify::{check_function_health, Dispatcher, FunctionConfig};

#[derive(Parser)]
#[command(name = "lostfound")]
#[command(author, version, about = "Lost & Found notifications and trust badges", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbosity level (0-3)
    #[arg(short, long, default_value = "1")]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the notification function server
    Serve {
        /// Port to listen on (or set PORT, default 54321)
        #[arg(short, long)]
        port: Option<u16>,

        /// Require this bearer token on every call (or set LOSTFOUND_API_KEY)
        #[arg(long)]
        api_key: Option<String>,
    },

    /// Send one notification through the notification function
    Notify {
        /// Recipient user id
        #[arg(short, long)]
        user: String,

        /// Notification type: comment, claim, status_change or system
        #[arg(short, long, default_value = "system")]
        kind: String,

        #[arg(short, long)]
        title: String,

        #[arg(short, long)]
        message: String,

        /// In-app link, e.g. /items/42
        #[arg(long)]
        link: Option<String>,

        /// Metadata as a JSON object
        #[arg(long)]
        metadata: Option<String>,

        #[command(flatten)]
        function: FunctionArgs,
    },

    /// Check that the notification function is reachable
    Status {
        #[command(flatten)]
        function: FunctionArgs,
    },

    /// Show the trust badge for a score
    Badge {
        #[arg(allow_hyphen_values = true)]
        score: i64,

        /// small, medium or large
        #[arg(short, long, default_value = "medium")]
        size: BadgeSize,
    },
}

#[derive(clap::Args)]
struct FunctionArgs {
    /// TOML file with function_url, api_key and timeout_secs
    #[arg(long)]
    config: Option<PathBuf>,

    /// Notification function URL (or set LOSTFOUND_FUNCTION_URL)
    #[arg(long, env = "LOSTFOUND_FUNCTION_URL")]
    function_url: Option<String>,

    /// API key (or set LOSTFOUND_API_KEY)
    #[arg(long, env = "LOSTFOUND_API_KEY")]
    api_key: Option<String>,
}

impl FunctionArgs {
    /// File settings first, then flags and environment on top
    fn resolve(self) -> Result<FunctionConfig> {
        let mut config = match &self.config {
            Some(path) => FunctionConfig::load(path)?,
            None => FunctionConfig::from_env(),
        };
        if let Some(url) = self.function_url {
            config.function_url = url;
        }
        if let Some(key) = self.api_key {
            config.api_key = Some(key);
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let log_level = match cli.verbose {
        0 => Level::ERROR,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .init();

    match cli.command {
        Commands::Serve { port, api_key } => {
            let mut config = ServerConfig::from_env();
            if let Some(port) = port {
                config.port = port;
            }
            if let Some(key) = api_key.filter(|k| !k.is_empty()) {
                config.api_key = Some(key);
            }
            run_with_config(config, Arc::new(MemoryStore::new())).await?;
        }
        Commands::Notify {
            user,
            kind,
            title,
            message,
            link,
            metadata,
            function,
        } => {
            let event = build_event(&user, &kind, &title, &message, link, metadata)?;
            send(event, function.resolve()?).await?;
        }
        Commands::Status { function } => {
            check_status(function.resolve()?).await?;
        }
        Commands::Badge { score, size } => {
            show_badge(score, size);
        }
    }

    Ok(())
}

fn build_event(
    user: &str,
    kind: &str,
    title: &str,
    message: &str,
    link: Option<String>,
    metadata: Option<String>,
) -> Result<NotificationEvent> {
    let kind: NotificationKind = kind.parse()?;
    let mut builder = NotificationEvent::builder(kind, user)
        .title(title)
        .message(message);

    if let Some(link) = link {
        builder = builder.link(&link);
    }

    if let Some(raw) = metadata {
        let metadata: Metadata =
            serde_json::from_str(&raw).context("--metadata must be a JSON object")?;
        builder = builder.metadata(metadata);
    }

    Ok(builder.build())
}

async fn send(event: NotificationEvent, config: FunctionConfig) -> Result<()> {
    println!("📨 Sending {} notification to {}", event.kind, event.target_user_id);
    println!("   Function: {}", config.function_url);

    let dispatcher = Dispatcher::from_config(config)?;

    // The CLI reports failures instead of swallowing them
    match dispatcher.dispatch(&event).await {
        Ok(result) => {
            println!("✅ Delivered in {}ms", result.latency_ms);
            println!("{}", serde_json::to_string_pretty(&result.record)?);
            Ok(())
        }
        Err(e) => {
            let hint = if e.is_transient() {
                "the function looks unreachable"
            } else {
                "the notification was refused"
            };
            bail!("delivery failed ({}): {}", hint, e)
        }
    }
}

async fn check_status(config: FunctionConfig) -> Result<()> {
    println!("🔌 Checking notification function...\n");

    if check_function_health(&config).await? {
        println!("✅ Notification function is up");
        println!("   URL: {}", config.function_url);
    } else {
        println!("❌ Notification function is not reachable");
        println!("   Expected at: {}", config.function_url);
        println!("\n   Start one locally with: lostfound serve");
    }

    Ok(())
}

fn show_badge(score: i64, size: BadgeSize) {
    let badge = TrustBadge::new(score, size);

    println!("🏅 {} ({})", badge.label, badge.icon.as_str());
    println!("   Score: {}", badge.score);
    println!("   Classes: {}", badge.color_class);
    println!("   Icon size: {}px", badge.icon_px);
    match points_to_next_tier(score) {
        Some(points) => println!("   {} points to the next tier", points),
        None => println!("   Top tier reached"),
    }
}
