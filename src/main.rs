//! CLI entry point for sitepub

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sitepub::commands::deploy::DeployOptions;
use sitepub::config::PublishMode;

#[derive(Parser)]
#[command(name = "sitepub")]
#[command(version)]
#[command(about = "Render a markdown blog and publish it to a sibling checkout", long_about = None)]
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
    /// Render the site and replace the publishing target with it
    #[command(alias = "d")]
    Deploy {
        /// Pass the verbose flag to the generator
        #[arg(short, long)]
        verbose: bool,

        /// Wipe the target and copy without checking any step
        #[arg(long)]
        legacy: bool,

        /// Publishing target (overrides target_dir)
        #[arg(short, long)]
        target: Option<PathBuf>,
    },

    /// Render the site into the build output directory only
    #[command(alias = "g")]
    Generate {
        /// Pass the verbose flag to the generator
        #[arg(short, long)]
        verbose: bool,
    },

    /// Clean the build output directory
    Clean,

    /// List site content
    List {
        /// Type of content to list (post, tag, category)
        #[arg(default_value = "post")]
        r#type: String,
    },

    /// Report articles with missing or malformed front matter
    Check,

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "sitepub=debug,info"
    } else {
        "sitepub=info"
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
        None => std::env::current_dir()?,
    };

    match cli.command {
        Commands::Deploy {
            verbose,
            legacy,
            target,
        } => {
            let mut site = sitepub::Site::new(&base_dir)?;
            if let Some(target) = target {
                site.set_target(target);
            }

            let options = DeployOptions {
                verbose,
                mode: legacy.then_some(PublishMode::Legacy),
            };
            let report = sitepub::commands::deploy::run(&site, &options)?;
            println!(
                "Published {} files to {:?}",
                report.files_published, site.target_dir
            );
        }

        Commands::Generate { verbose } => {
            let site = sitepub::Site::new(&base_dir)?;
            tracing::info!("Generating static files...");
            let files = sitepub::commands::generate::run_with_options(&site, verbose)?;
            println!("Generated {} files in {:?}", files, site.public_dir);
        }

        Commands::Clean => {
            let site = sitepub::Site::new(&base_dir)?;
            tracing::info!("Cleaning public folder...");
            site.clean()?;
            println!("Cleaned successfully!");
        }

        Commands::List { r#type } => {
            let site = sitepub::Site::new(&base_dir)?;
            sitepub::commands::list::run(&site, &r#type)?;
        }

        Commands::Check => {
            let site = sitepub::Site::new(&base_dir)?;
            sitepub::commands::check::run(&site)?;
        }

        Commands::Version => {
            println!("sitepub version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
