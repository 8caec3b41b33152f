//! CLI entry point for folio

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use folio::commands::new::NewPost;
use folio::content::{BuildMode, ContentKind};
use folio::Folio;

#[derive(Parser)]
#[command(name = "folio")]
#[command(version)]
#[command(about = "A static site generator and dev server for project portfolios", long_about = None)]
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

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new site
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        folder: PathBuf,
    },

    /// Create a new project post or blog post
    New {
        /// Kind of post
        #[arg(value_enum)]
        kind: NewKind,

        /// Title of the new post
        title: String,

        /// Project the post belongs to
        #[arg(short, long)]
        project: Option<String>,

        /// Create the project's index post
        #[arg(short, long)]
        index: bool,
    },

    /// Build the static site
    #[command(alias = "b")]
    Build {
        /// Leave out demo- sample content
        #[arg(short, long)]
        release: bool,

        /// Rebuild on file changes
        #[arg(short, long)]
        watch: bool,
    },

    /// Start the development server
    #[command(alias = "s")]
    Server {
        /// Port to listen on (defaults to server.port from config)
        #[arg(short, long)]
        port: Option<u16>,

        /// IP address to bind to (defaults to server.ip from config)
        #[arg(short, long)]
        ip: Option<String>,

        /// Open browser automatically
        #[arg(short, long)]
        open: bool,
    },

    /// Remove the output directory
    Clean,

    /// List site content
    List {
        /// What to list (projects, blog, updates, tags)
        #[arg(default_value = "projects")]
        r#type: String,
    },

    /// Display version information
    Version,
}

#[derive(Clone, Copy, ValueEnum)]
enum NewKind {
    Project,
    Blog,
}

impl From<NewKind> for ContentKind {
    fn from(kind: NewKind) -> Self {
        match kind {
            NewKind::Project => ContentKind::Project,
            NewKind::Blog => ContentKind::Blog,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "folio=debug,info"
    } else {
        "folio=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to read the current directory")?,
    };

    match cli.command {
        Commands::Init { folder } => {
            let target_dir = if folder.is_absolute() {
                folder
            } else {
                base_dir.join(folder)
            };
            tracing::info!("Initializing site in {:?}", target_dir);
            folio::commands::init::init_site(&target_dir)?;
            println!("Initialized folio site in {:?}", target_dir);
        }

        Commands::New {
            kind,
            title,
            project,
            index,
        } => {
            let app = Folio::new(&base_dir)?;
            let post = NewPost {
                title,
                project,
                index,
            };
            let path = folio::commands::new::create_post(&app, kind.into(), &post)?;
            println!("Created: {:?}", path);
        }

        Commands::Build { release, watch } => {
            let app = Folio::new(&base_dir)?;
            let mode = if release {
                BuildMode::Release
            } else {
                BuildMode::Dev
            };
            tracing::info!("Building static site...");
            app.build(mode)?;
            println!("Built successfully!");

            if watch {
                tokio::task::spawn_blocking(move || folio::commands::build::watch(&app, mode))
                    .await??;
            }
        }

        Commands::Server { port, ip, open } => {
            let app = Folio::new(&base_dir)?;
            let ip = ip.unwrap_or_else(|| app.config.server.ip.clone());
            let port = port.unwrap_or(app.config.server.port);

            tracing::info!("Starting server at http://{}:{}", ip, port);
            folio::server::start(&app, &ip, port, open).await?;
        }

        Commands::Clean => {
            let app = Folio::new(&base_dir)?;
            tracing::info!("Cleaning output folder...");
            app.clean()?;
            println!("Cleaned successfully!");
        }

        Commands::List { r#type } => {
            let app = Folio::new(&base_dir)?;
            folio::commands::list::run(&app, &r#type)?;
        }

        Commands::Version => {
            println!("folio version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
