//! CLI entry point for pineapple-rs

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pineapple_rs::commands;
use pineapple_rs::Site;

#[derive(Parser)]
#[command(name = "pineapple-rs")]
#[command(version)]
#[command(about = "Publishes a markdown blog and newsletter as a static site", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Layout {
    Post,
    Newsletter,
}

impl Layout {
    fn name(self) -> &'static str {
        match self {
            Layout::Post => "post",
            Layout::Newsletter => "newsletter",
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Build the site into the public folder
    #[command(alias = "b")]
    Build {
        /// Rebuild on file changes
        #[arg(short, long)]
        watch: bool,
    },

    /// Build, then serve the site locally
    #[command(alias = "s")]
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8000")]
        port: u16,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,

        /// Static mode (no rebuild on file changes)
        #[arg(long)]
        r#static: bool,
    },

    /// Create a new post or newsletter issue
    New {
        /// Title of the new record
        title: String,

        #[arg(short, long, value_enum, default_value = "post")]
        layout: Layout,
    },

    /// List posts, newsletter issues or tags
    List {
        #[arg(default_value = "posts")]
        r#type: String,
    },

    /// Remove the public folder
    Clean,

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "pineapple_rs=debug,info"
    } else {
        "pineapple_rs=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir().context("Cannot determine the current directory")?,
    };

    match cli.command {
        Commands::Build { watch } => {
            let site = Site::new(&base_dir)?;
            let summary = site.build()?;
            println!(
                "Built {} pages ({} published of {} records)",
                summary.pages, summary.published, summary.records
            );

            if watch {
                tokio::task::spawn_blocking(move || {
                    commands::build::watch(&site, |summary| {
                        println!("Rebuilt {} pages", summary.pages);
                    })
                })
                .await??;
            }
        }

        Commands::Serve { port, ip, r#static } => {
            let site = Site::new(&base_dir)?;
            tracing::info!("Building site...");
            site.build()?;

            tracing::info!("Starting server at http://{}:{}", ip, port);
            pineapple_rs::server::start(&site, &ip, port, !r#static).await?;
        }

        Commands::New { title, layout } => {
            let site = Site::new(&base_dir)?;
            tracing::info!("Creating new {} with title: {}", layout.name(), title);
            site.new_record(&title, layout.name())?;
        }

        Commands::List { r#type } => {
            let site = Site::new(&base_dir)?;
            commands::list::run(&site, &r#type)?;
        }

        Commands::Clean => {
            let site = Site::new(&base_dir)?;
            site.clean()?;
            println!("Cleaned successfully!");
        }

        Commands::Version => {
            println!("pineapple-rs version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
