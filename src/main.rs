//! Vitrine — server-rendered video gallery, package channel and account pages
//!
//! Usage:
//!   vitrine                                  # Default port 8000, ./templates, ./media, ./channel
//!   vitrine --port 0                         # OS-assigned port
//!   vitrine --media ~/Videos --page-size 24  # Custom media directory
//!   vitrine --verbose --log-file vitrine.log # Debug logs to a file

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;
use vitrine_http::{HttpServer, ServerConfig, build_router};
use vitrine_render::{JinjaTemplates, Renderer};
use vitrine_views::{AppState, app_router};

#[derive(Parser, Debug)]
#[command(name = "vitrine", about = "Vitrine — server-rendered HTML pages with htmx partials")]
struct Cli {
    /// Port to listen on (0 for OS-assigned)
    #[arg(long, default_value = "8000")]
    port: u16,

    /// Hostname to bind to
    #[arg(long, default_value = "127.0.0.1")]
    hostname: String,

    /// Template directory
    #[arg(long, default_value = "templates")]
    templates: PathBuf,

    /// Directory served under /static
    #[arg(long, default_value = "static")]
    static_dir: PathBuf,

    /// Directory scanned for videos
    #[arg(long, default_value = "media")]
    media: PathBuf,

    /// Directory scanned for package archives
    #[arg(long, default_value = "channel")]
    channel: PathBuf,

    /// Items per listing page
    #[arg(long, default_value = "12")]
    page_size: usize,

    /// Enable verbose logging
    #[arg(long)]
    verbose: bool,

    /// Write logs to a file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Cli {
    fn config(&self) -> ServerConfig {
        ServerConfig {
            port: self.port,
            hostname: self.hostname.clone(),
            templates_dir: self.templates.clone(),
            static_dir: self.static_dir.clone(),
            media_dir: self.media.clone(),
            channel_dir: self.channel.clone(),
            page_size: self.page_size.max(1),
        }
    }
}

fn init_tracing(cli: &Cli) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info,tower_http=warn")
        }
    });

    if let Some(log_path) = &cli.log_file {
        if let Some(parent) = log_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating log directory {}", parent.display()))?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)
            .with_context(|| format!("opening log file {}", log_path.display()))?;

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
            .init();

        eprintln!("Logging to {}", log_path.display());
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli)?;

    let config = cli.config();
    let templates = JinjaTemplates::from_dir(&config.templates_dir);
    let state = AppState::new(Renderer::new(templates), config.clone());
    let app = build_router(app_router(state), &config);

    let mut server = HttpServer::start(&config, app)
        .await
        .context("starting HTTP server")?;

    println!();
    println!("  Vitrine");
    println!();
    println!("  URL:        http://{}:{}/", config.hostname, server.port());
    println!("  Templates:  {}", config.templates_dir.display());
    println!("  Media:      {}", config.media_dir.display());
    println!("  Channel:    {}", config.channel_dir.display());
    println!();
    println!("  Press Ctrl+C to stop.");
    println!();

    tokio::signal::ctrl_c()
        .await
        .context("waiting for Ctrl+C")?;

    info!("Shutting down");
    server.stop().await;
    Ok(())
}
